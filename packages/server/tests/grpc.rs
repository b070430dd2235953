//! End-to-end wire tests: a real client against a bound server.
//!
//! Runs plaintext so the suite needs no certificate fixtures; the
//! credential path is covered by unit tests in `tls.rs` and
//! `server.rs`.

use std::sync::Arc;
use std::time::Duration;

use tonic::metadata::MetadataValue;
use tonic::Request;

use storegate_proto::v1::store_service_client::StoreServiceClient;
use storegate_proto::v1::{ProductLookupRequest, StoreAccessRequest};
use storegate_server::directory::{MemoryProductCatalog, MemoryStoreDirectory};
use storegate_server::{Environment, GatewayConfig, GatewayModule, ProductRecord, StoreRecord};

struct RunningServer {
    port: u16,
    shutdown: tokio::sync::oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

async fn spawn_server() -> RunningServer {
    let mut directory = MemoryStoreDirectory::new();
    directory.insert(
        Environment::Prod,
        "s1",
        StoreRecord {
            name: Some("Prod Store".to_string()),
            ..StoreRecord::default()
        },
    );
    directory.insert(
        Environment::Demo,
        "s1",
        StoreRecord {
            status: Some("closed".to_string()),
            ..StoreRecord::default()
        },
    );

    let mut catalog = MemoryProductCatalog::new();
    catalog.insert(
        Environment::Prod,
        "s1",
        "sc-1",
        ProductRecord {
            title: Some("Espresso".to_string()),
            price: Some(3.5),
            ..ProductRecord::default()
        },
    );

    // Short drain grace keeps the suite bounded even if a client
    // channel lingers past the shutdown signal.
    let config = GatewayConfig {
        drain_grace: Duration::from_secs(2),
        ..GatewayConfig::default()
    };
    let mut module = GatewayModule::new(config, Arc::new(directory), Arc::new(catalog));
    let port = module.start().await.expect("bind");

    let (shutdown, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(module.serve(async move {
        let _ = rx.await;
    }));

    RunningServer {
        port,
        shutdown,
        handle,
    }
}

async fn connect(port: u16) -> StoreServiceClient<tonic::transport::Channel> {
    StoreServiceClient::connect(format!("http://127.0.0.1:{port}"))
        .await
        .expect("connect")
}

fn with_env<T>(inner: T, environment: &str) -> Request<T> {
    let mut request = Request::new(inner);
    request
        .metadata_mut()
        .insert("env", MetadataValue::try_from(environment).unwrap());
    request
}

#[tokio::test]
async fn full_round_trip_and_graceful_shutdown() {
    let server = spawn_server().await;
    let mut client = connect(server.port).await;

    // Environment tag routes the lookup: the store exists in prod.
    let access = client
        .verify_store_access(with_env(
            StoreAccessRequest {
                project_id: "p1".to_string(),
                store_id: "s1".to_string(),
            },
            "prod",
        ))
        .await
        .unwrap()
        .into_inner();
    assert!(access.has_access);
    assert_eq!(access.message, "Access granted");

    // No metadata defaults to demo, where the same store is closed.
    let access = client
        .verify_store_access(Request::new(StoreAccessRequest {
            project_id: "p1".to_string(),
            store_id: "s1".to_string(),
        }))
        .await
        .unwrap()
        .into_inner();
    assert!(!access.has_access);
    assert_eq!(access.message, "Store s1 is closed");

    let info = client
        .get_store_info(with_env(
            StoreAccessRequest {
                project_id: "p1".to_string(),
                store_id: "s1".to_string(),
            },
            "prod",
        ))
        .await
        .unwrap()
        .into_inner();
    assert!(info.exists);
    assert_eq!(info.name, "Prod Store");
    assert_eq!(info.environment, "prod");

    let product = client
        .get_product_by_stripe_code(with_env(
            ProductLookupRequest {
                project_id: "p1".to_string(),
                store_id: "s1".to_string(),
                stripe_code: "sc-1".to_string(),
            },
            "prod",
        ))
        .await
        .unwrap()
        .into_inner();
    assert!(product.exists);
    assert_eq!(product.title, "Espresso");
    assert_eq!(product.price, 3.5);

    drop(client);
    server.shutdown.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server should drain promptly")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn invalid_argument_crosses_the_wire() {
    let server = spawn_server().await;
    let mut client = connect(server.port).await;

    let err = client
        .verify_store_access(Request::new(StoreAccessRequest {
            project_id: String::new(),
            store_id: "s1".to_string(),
        }))
        .await
        .unwrap_err();
    assert_eq!(err.code(), tonic::Code::InvalidArgument);
    assert_eq!(err.message(), "project_id and store_id are required");

    drop(client);
    server.shutdown.send(()).unwrap();
    let _ = server.handle.await;
}

#[tokio::test]
async fn legacy_environment_header_is_honoured() {
    let server = spawn_server().await;
    let mut client = connect(server.port).await;

    let mut request = Request::new(StoreAccessRequest {
        project_id: "p1".to_string(),
        store_id: "s1".to_string(),
    });
    request
        .metadata_mut()
        .insert("x-environment", MetadataValue::try_from("prod").unwrap());

    let access = client.verify_store_access(request).await.unwrap().into_inner();
    assert!(access.has_access);

    drop(client);
    server.shutdown.send(()).unwrap();
    let _ = server.handle.await;
}
