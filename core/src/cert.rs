//! Location of the CA trust directory.
//!
//! Lookup sits behind `CaPathResolver` so tests and embedders can supply a
//! fixed directory instead of mutating the process environment.

use std::path::PathBuf;

use crate::error::EnvironmentError;

/// Environment variable naming the directory of trusted CA certificates.
pub const CA_DIR_ENV: &str = "X509_CERT_DIR";

const CA_DIR_HINT: &str = "Did you forget to source the grid environment before running?";

/// Resolves the directory used to validate the server certificate.
pub trait CaPathResolver {
    fn ca_dir(&self) -> Result<PathBuf, EnvironmentError>;
}

/// Reads the CA directory from `X509_CERT_DIR` on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCaPath;

impl CaPathResolver for EnvCaPath {
    fn ca_dir(&self) -> Result<PathBuf, EnvironmentError> {
        ca_dir_from(std::env::var_os(CA_DIR_ENV).map(PathBuf::from))
    }
}

/// Always resolves to the same directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedCaPath(pub PathBuf);

impl CaPathResolver for FixedCaPath {
    fn ca_dir(&self) -> Result<PathBuf, EnvironmentError> {
        Ok(self.0.clone())
    }
}

fn ca_dir_from(value: Option<PathBuf>) -> Result<PathBuf, EnvironmentError> {
    match value {
        Some(dir) if !dir.as_os_str().is_empty() => Ok(dir),
        _ => Err(EnvironmentError::MissingVariable {
            name: CA_DIR_ENV,
            hint: CA_DIR_HINT,
        }),
    }
}
