//! TLS credential loading.
//!
//! The source of the certificate and key is chosen once from configuration
//! (`QOD_TLS_ENV`). Only a local directory source exists today.

use log::info;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CERT_FILE: &str = "cert.pem";
const KEY_FILE: &str = "key.pem";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Unsupported credential environment {0:?}")]
    UnsupportedEnv(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),
}

/// PEM encoded certificate chain and PKCS#8 private key.
pub struct Credentials {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

pub trait CredentialReader: Send + Sync {
    fn read(&self) -> Result<Credentials, CredentialError>;
}

/// Reads `cert.pem` and `key.pem` from a directory.
pub struct LocalFileReader {
    dir: PathBuf,
}

impl LocalFileReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, CredentialError> {
    std::fs::read(path).map_err(|source| CredentialError::Read {
        path: path.to_path_buf(),
        source,
    })
}

impl CredentialReader for LocalFileReader {
    fn read(&self) -> Result<Credentials, CredentialError> {
        let cert_path = self.dir.join(CERT_FILE);
        let key_path = self.dir.join(KEY_FILE);
        info!(
            "Loading TLS credentials from {} and {}",
            cert_path.display(),
            key_path.display()
        );
        Ok(Credentials {
            cert_pem: read_file(&cert_path)?,
            key_pem: read_file(&key_path)?,
        })
    }
}

/// Picks the credential source named by `env`.
pub fn reader_for(env: &str, dir: &Path) -> Result<Box<dyn CredentialReader>, CredentialError> {
    match env {
        "local" => Ok(Box::new(LocalFileReader::new(dir))),
        other => Err(CredentialError::UnsupportedEnv(other.to_string())),
    }
}

pub fn tls_acceptor(
    reader: &dyn CredentialReader,
) -> Result<tokio_native_tls::TlsAcceptor, CredentialError> {
    let credentials = reader.read()?;
    let identity = native_tls::Identity::from_pkcs8(&credentials.cert_pem, &credentials.key_pem)?;
    let acceptor = native_tls::TlsAcceptor::new(identity)?;
    Ok(tokio_native_tls::TlsAcceptor::from(acceptor))
}
