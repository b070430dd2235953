//! Gateway configuration types.

use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for the lookup gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind address for the server.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Optional TLS configuration. Production deployments always set
    /// this; plaintext serving exists for local testing only.
    pub tls: Option<TlsConfig>,
    /// Maximum time to wait for in-flight calls after shutdown is
    /// triggered. Calls still running when it expires are cut off.
    pub drain_grace: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            tls: None,
            drain_grace: Duration::from_secs(30),
        }
    }
}

/// Certificate material for mutual TLS.
///
/// No `Default` impl because certificate paths have no sensible defaults.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the server certificate (PEM).
    pub cert_path: PathBuf,
    /// Path to the server private key (PEM).
    pub key_path: PathBuf,
    /// Path to the CA certificate used to verify peer client
    /// certificates. Never distributed to clients.
    pub ca_cert_path: PathBuf,
    /// When false, peers without a client certificate are accepted.
    /// Operational escape hatch, not the default.
    pub require_client_cert: bool,
}
