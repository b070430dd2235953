//! Credential loading for mutual TLS.
//!
//! Reads the server certificate, private key, and CA root from the
//! configured paths and builds the transport-level TLS config. Any
//! unreadable file is fatal at startup; nothing here is retried.

use std::path::{Path, PathBuf};

use tonic::transport::{Certificate, Identity, ServerTlsConfig};

use crate::config::TlsConfig;

/// Failure to load certificate material. Always startup-fatal.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("cannot read {role} at {path}: {source}")]
    Unreadable {
        role: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Builds the server TLS configuration from certificate material on disk.
///
/// The CA certificate is used exclusively to verify peer client
/// certificates. When `require_client_cert` is false the peer may
/// connect without one (documented escape hatch).
///
/// # Errors
///
/// Returns [`CredentialError`] when any of the three files is missing
/// or unreadable.
pub fn build_tls_config(config: &TlsConfig) -> Result<ServerTlsConfig, CredentialError> {
    let cert = read_pem("server certificate", &config.cert_path)?;
    let key = read_pem("server private key", &config.key_path)?;
    let ca = read_pem("client CA certificate", &config.ca_cert_path)?;

    let mut tls = ServerTlsConfig::new()
        .identity(Identity::from_pem(cert, key))
        .client_ca_root(Certificate::from_pem(ca));

    if !config.require_client_cert {
        tls = tls.client_auth_optional(true);
    }

    Ok(tls)
}

fn read_pem(role: &'static str, path: &Path) -> Result<Vec<u8>, CredentialError> {
    std::fs::read(path).map_err(|source| CredentialError::Unreadable {
        role,
        path: path.to_path_buf(),
        source,
    })
}
