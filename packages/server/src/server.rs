//! Server lifecycle with deferred startup.
//!
//! `new()` allocates, `start()` binds the TCP listener, `serve()`
//! builds credentials and accepts calls until the shutdown signal
//! fires. After the signal, in-flight calls get a bounded grace period
//! to complete before the server stops regardless.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tonic::transport::server::TcpIncoming;
use tonic::transport::Server;
use tracing::{info, warn};

use storegate_proto::v1::store_service_server::StoreServiceServer;

use crate::config::GatewayConfig;
use crate::directory::{ProductCatalog, StoreDirectory};
use crate::service::StoreServiceHandler;
use crate::tls::build_tls_config;

/// Manages the full gRPC server lifecycle.
///
/// Follows the deferred startup pattern:
/// 1. `new()` -- captures configuration and collaborator handles
/// 2. `start()` -- binds the TCP listener to the configured address
/// 3. `serve()` -- accepts calls until shutdown is signalled
pub struct GatewayModule {
    config: GatewayConfig,
    listener: Option<TcpListener>,
    directory: Arc<dyn StoreDirectory>,
    catalog: Arc<dyn ProductCatalog>,
}

impl GatewayModule {
    /// Creates a new gateway module without binding any port.
    #[must_use]
    pub fn new(
        config: GatewayConfig,
        directory: Arc<dyn StoreDirectory>,
        catalog: Arc<dyn ProductCatalog>,
    ) -> Self {
        Self {
            config,
            listener: None,
            directory,
            catalog,
        }
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the
    /// configured port when port 0 is used (OS-assigned ephemeral port).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves calls until the shutdown future completes, then drains.
    ///
    /// Consumes `self` because the listener is moved into the server.
    /// Credential loading happens here: an unreadable certificate file
    /// aborts startup with the underlying error. Without a TLS config
    /// the server runs plaintext (local testing only) and says so.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials cannot be loaded or the server
    /// encounters a fatal transport error.
    ///
    /// # Panics
    ///
    /// Panics if `start()` was not called before `serve()`.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .expect("start() must be called before serve()");
        let incoming = TcpIncoming::from_listener(listener, true, None)
            .map_err(|err| anyhow::anyhow!("failed to prepare incoming connections: {err}"))?;

        let mut builder = Server::builder();
        if let Some(tls) = &self.config.tls {
            builder = builder.tls_config(build_tls_config(tls)?)?;
            if tls.require_client_cert {
                info!("mutual TLS enabled; peer certificates required");
            } else {
                warn!("client certificate verification disabled");
            }
        } else {
            warn!("TLS is not configured; serving plaintext gRPC");
        }

        let handler = StoreServiceHandler::new(self.directory, self.catalog);
        let (drain_tx, drain_rx) = watch::channel(false);
        let grace = self.config.drain_grace;

        let serve = builder
            .add_service(StoreServiceServer::new(handler))
            .serve_with_incoming_shutdown(incoming, async move {
                shutdown.await;
                info!("shutdown signalled; draining in-flight calls");
                let _ = drain_tx.send(true);
            });
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => result.map_err(Into::into),
            () = drain_deadline(drain_rx, grace) => {
                warn!("drain grace period expired with calls still in flight");
                Ok(())
            }
        }
    }
}

/// Resolves once the drain signal has fired and the grace period has
/// elapsed. Never resolves if the signal sender is dropped first (the
/// server already stopped on its own).
async fn drain_deadline(mut drain_rx: watch::Receiver<bool>, grace: Duration) {
    loop {
        if *drain_rx.borrow() {
            break;
        }
        if drain_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
    tokio::time::sleep(grace).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{MemoryProductCatalog, MemoryStoreDirectory};

    fn module(config: GatewayConfig) -> GatewayModule {
        GatewayModule::new(
            config,
            Arc::new(MemoryStoreDirectory::new()),
            Arc::new(MemoryProductCatalog::new()),
        )
    }

    #[test]
    fn new_creates_module_without_binding() {
        let module = module(GatewayConfig::default());
        assert!(module.listener.is_none());
    }

    #[tokio::test]
    async fn start_binds_to_os_assigned_port() {
        let mut module = module(GatewayConfig::default());
        let port = module.start().await.expect("start should succeed");
        assert!(port > 0, "OS-assigned port should be > 0");
        assert!(module.listener.is_some());
    }

    #[tokio::test]
    #[should_panic(expected = "start() must be called before serve()")]
    async fn serve_panics_without_start() {
        let module = module(GatewayConfig::default());
        let _ = module.serve(std::future::pending::<()>()).await;
    }

    #[tokio::test]
    async fn serve_aborts_on_unreadable_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let config = GatewayConfig {
            tls: Some(crate::config::TlsConfig {
                cert_path: dir.path().join("missing.pem"),
                key_path: dir.path().join("missing.key"),
                ca_cert_path: dir.path().join("missing-ca.pem"),
                require_client_cert: true,
            }),
            ..GatewayConfig::default()
        };
        let mut module = module(config);
        module.start().await.unwrap();

        let err = module
            .serve(std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("server certificate"));
    }

    #[tokio::test]
    async fn serve_stops_after_shutdown_signal() {
        let mut module = module(GatewayConfig::default());
        module.start().await.unwrap();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(module.serve(async move {
            let _ = rx.await;
        }));

        tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server should stop promptly")
            .unwrap();
        assert!(result.is_ok());
    }
}
