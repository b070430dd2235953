//! Development server: the full gateway stack wired to in-memory
//! collaborators, optionally seeded from a JSON file.
//!
//! Production deployments embed the library with real directory and
//! catalog clients; this binary exists to exercise the wire path
//! locally, including the mTLS handshake when certificate paths are
//! given.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use storegate_server::directory::{MemoryProductCatalog, MemoryStoreDirectory};
use storegate_server::{
    Environment, GatewayConfig, GatewayModule, ProductRecord, StoreRecord, TlsConfig,
};

#[derive(Debug, Parser)]
#[command(name = "dev-server", about = "storegate development server")]
struct Args {
    /// Bind address.
    #[arg(long, env = "STOREGATE_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listening port (0 = OS-assigned).
    #[arg(long, env = "STOREGATE_PORT", default_value_t = 50051)]
    port: u16,

    /// Path to the server certificate (PEM). TLS is enabled when all
    /// three certificate paths are provided.
    #[arg(long, env = "STOREGATE_CERT", requires_all = ["key", "ca_cert"])]
    cert: Option<PathBuf>,

    /// Path to the server private key (PEM).
    #[arg(long, env = "STOREGATE_KEY", requires_all = ["cert", "ca_cert"])]
    key: Option<PathBuf>,

    /// Path to the CA certificate used to verify peer certificates.
    #[arg(long, env = "STOREGATE_CA_CERT", requires_all = ["cert", "key"])]
    ca_cert: Option<PathBuf>,

    /// Require peers to present a client certificate. Disable only as
    /// an operational escape hatch.
    #[arg(
        long,
        env = "STOREGATE_REQUIRE_CLIENT_CERT",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    require_client_cert: bool,

    /// Grace period for in-flight calls on shutdown, in seconds.
    #[arg(long, env = "STOREGATE_DRAIN_GRACE_SECS", default_value_t = 30)]
    drain_grace_secs: u64,

    /// JSON file seeding the in-memory store directory and product
    /// catalog.
    #[arg(long, env = "STOREGATE_SEED")]
    seed: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct Seed {
    #[serde(default)]
    stores: Vec<StoreSeed>,
    #[serde(default)]
    products: Vec<ProductSeed>,
}

#[derive(Debug, Deserialize)]
struct StoreSeed {
    #[serde(default)]
    environment: String,
    store_id: String,
    record: StoreRecord,
}

#[derive(Debug, Deserialize)]
struct ProductSeed {
    #[serde(default)]
    environment: String,
    store_id: String,
    stripe_code: String,
    record: ProductRecord,
}

fn load_seed(path: &Path) -> anyhow::Result<(MemoryStoreDirectory, MemoryProductCatalog)> {
    let text = std::fs::read_to_string(path)?;
    let seed: Seed = serde_json::from_str(&text)?;

    let mut directory = MemoryStoreDirectory::new();
    for entry in seed.stores {
        directory.insert(
            Environment::normalize(&entry.environment),
            entry.store_id,
            entry.record,
        );
    }

    let mut catalog = MemoryProductCatalog::new();
    for entry in seed.products {
        catalog.insert(
            Environment::normalize(&entry.environment),
            entry.store_id,
            entry.stripe_code,
            entry.record,
        );
    }

    Ok((directory, catalog))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let (directory, catalog) = match &args.seed {
        Some(path) => {
            let (directory, catalog) = load_seed(path)?;
            info!("seeded collaborators from {}", path.display());
            (directory, catalog)
        }
        None => (MemoryStoreDirectory::new(), MemoryProductCatalog::new()),
    };

    let tls = match (args.cert, args.key, args.ca_cert) {
        (Some(cert_path), Some(key_path), Some(ca_cert_path)) => Some(TlsConfig {
            cert_path,
            key_path,
            ca_cert_path,
            require_client_cert: args.require_client_cert,
        }),
        _ => None,
    };

    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        tls,
        drain_grace: Duration::from_secs(args.drain_grace_secs),
    };

    let mut module = GatewayModule::new(config, Arc::new(directory), Arc::new(catalog));
    let port = module.start().await?;
    info!("storegate dev server listening on port {port}");

    module
        .serve(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
