//! Loading of grid certificate material into a ureq TLS configuration.
//!
//! A proxy file holds the certificate chain and its private key in one PEM
//! file, so the same path serves as both. The CA directory is the usual
//! grid layout: hashed `*.0` certificates next to signing policies, CRL URLs
//! and other non-certificate files, which are skipped.

use std::fs;
use std::path::Path;

use ureq::tls::{parse_pem, Certificate, ClientCert, PemItem, PrivateKey, RootCerts, TlsConfig};

use crate::error::TransportError;

/// Build the TLS configuration for one client: optional client certificate
/// plus the CA certificates found in `ca_dir`.
pub fn tls_config(certificate: Option<&Path>, ca_dir: &Path) -> Result<TlsConfig, TransportError> {
    let client_cert = certificate.map(load_client_cert).transpose()?;
    let roots = load_ca_dir(ca_dir)?;
    Ok(TlsConfig::builder()
        .client_cert(client_cert)
        .root_certs(RootCerts::new_with_certs(&roots))
        .build())
}

/// Read a proxy/user certificate file holding the chain and the key.
pub fn load_client_cert(path: &Path) -> Result<ClientCert, TransportError> {
    let pem = read(path)?;
    let mut chain: Vec<Certificate<'static>> = Vec::new();
    let mut key: Option<PrivateKey<'static>> = None;

    for item in parse_pem(&pem) {
        match item {
            Ok(PemItem::Certificate(cert)) => chain.push(cert),
            Ok(PemItem::PrivateKey(k)) if key.is_none() => key = Some(k),
            Ok(_) => {}
            Err(e) => {
                return Err(TransportError::Certificate {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
        }
    }

    let key = key.ok_or_else(|| TransportError::Certificate {
        path: path.to_path_buf(),
        reason: "no private key".to_string(),
    })?;
    if chain.is_empty() {
        return Err(TransportError::Certificate {
            path: path.to_path_buf(),
            reason: "no certificate".to_string(),
        });
    }

    tracing::debug!(path = %path.display(), chain = chain.len(), "loaded client certificate");
    Ok(ClientCert::new_with_certs(&chain, key))
}

/// Collect every PEM certificate in the regular files of `dir`.
pub fn load_ca_dir(dir: &Path) -> Result<Vec<Certificate<'static>>, TransportError> {
    let entries = fs::read_dir(dir).map_err(|source| TransportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut certs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| TransportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let pem = read(&path)?;
        for item in parse_pem(&pem) {
            match item {
                Ok(PemItem::Certificate(cert)) => certs.push(cert),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unparsable CA file");
                    break;
                }
            }
        }
    }

    if certs.is_empty() {
        return Err(TransportError::NoCaCertificates(dir.to_path_buf()));
    }
    tracing::debug!(dir = %dir.display(), count = certs.len(), "loaded CA certificates");
    Ok(certs)
}

fn read(path: &Path) -> Result<Vec<u8>, TransportError> {
    fs::read(path).map_err(|source| TransportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
