//! The `StoreService` RPC handler.
//!
//! Each RPC follows the same sequence: validate identifiers, resolve
//! the tenant environment from call metadata, query the collaborator,
//! map the outcome. Not-found is a successful response with its flag
//! set false; only invalid input and collaborator failures surface as
//! RPC errors.

use std::sync::Arc;

use chrono::Utc;
use tonic::{Request, Response, Status};
use tracing::error;

use storegate_proto::v1::store_service_server::StoreService;
use storegate_proto::v1::{
    ProductLookupRequest, ProductLookupResult, StoreAccessRequest, StoreAccessResult,
    StoreInfoResult,
};

use crate::directory::{ProductCatalog, StoreDirectory, StoreStatus};
use crate::environment::Environment;
use crate::metadata::{product_metadata, store_metadata};

/// Stateless handler for the three lookup RPCs.
///
/// Holds only shared collaborator handles; safe to execute concurrently
/// across calls.
pub struct StoreServiceHandler {
    directory: Arc<dyn StoreDirectory>,
    catalog: Arc<dyn ProductCatalog>,
}

impl StoreServiceHandler {
    #[must_use]
    pub fn new(directory: Arc<dyn StoreDirectory>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { directory, catalog }
    }
}

/// Logs a collaborator failure with full detail and converts it into a
/// generic internal status carrying only the summarized message.
fn internal(context: &'static str, err: &anyhow::Error) -> Status {
    error!("{context}: {err:#}");
    Status::internal(format!("{context}: {err}"))
}

/// Default "not found" product shape: numeric fields zero, identifiers
/// empty, requested values echoed.
fn missing_product(request: &ProductLookupRequest) -> ProductLookupResult {
    ProductLookupResult {
        stripe_code: request.stripe_code.clone(),
        shop_id: request.store_id.clone(),
        ..ProductLookupResult::default()
    }
}

#[tonic::async_trait]
impl StoreService for StoreServiceHandler {
    async fn verify_store_access(
        &self,
        request: Request<StoreAccessRequest>,
    ) -> Result<Response<StoreAccessResult>, Status> {
        if request.get_ref().project_id.is_empty() || request.get_ref().store_id.is_empty() {
            return Err(Status::invalid_argument(
                "project_id and store_id are required",
            ));
        }
        let environment = Environment::from_metadata(request.metadata());
        let request = request.into_inner();

        let store = self
            .directory
            .store_by_id(environment, &request.store_id)
            .await
            .map_err(|err| internal("store lookup failed", &err))?;

        let (has_access, message) = match store {
            None => (false, format!("Store {} not found", request.store_id)),
            Some(record) if record.status() == StoreStatus::Closed => {
                (false, format!("Store {} is closed", request.store_id))
            }
            Some(_) => (true, "Access granted".to_string()),
        };

        // project_id is echoed but not yet used to restrict access; it
        // is a placeholder for per-project authorization.
        Ok(Response::new(StoreAccessResult {
            has_access,
            message,
            store_id: request.store_id,
            project_id: request.project_id,
        }))
    }

    async fn get_store_info(
        &self,
        request: Request<StoreAccessRequest>,
    ) -> Result<Response<StoreInfoResult>, Status> {
        if request.get_ref().project_id.is_empty() || request.get_ref().store_id.is_empty() {
            return Err(Status::invalid_argument(
                "project_id and store_id are required",
            ));
        }
        let environment = Environment::from_metadata(request.metadata());
        let request = request.into_inner();

        let store = self
            .directory
            .store_by_id(environment, &request.store_id)
            .await
            .map_err(|err| internal("store lookup failed", &err))?;

        let result = match store {
            None => StoreInfoResult {
                store_id: request.store_id,
                environment: environment.as_str().to_string(),
                project_id: request.project_id,
                ..StoreInfoResult::default()
            },
            Some(record) => {
                let updated_at = record
                    .updated_at
                    .map_or_else(|| Utc::now().timestamp(), |at| at.timestamp());
                StoreInfoResult {
                    exists: true,
                    store_id: record.id.clone().unwrap_or(request.store_id),
                    name: record.name.clone().unwrap_or_default(),
                    environment: environment.as_str().to_string(),
                    project_id: request.project_id,
                    metadata: store_metadata(&record),
                    updated_at,
                }
            }
        };

        Ok(Response::new(result))
    }

    async fn get_product_by_stripe_code(
        &self,
        request: Request<ProductLookupRequest>,
    ) -> Result<Response<ProductLookupResult>, Status> {
        {
            let req = request.get_ref();
            if req.project_id.is_empty() || req.store_id.is_empty() || req.stripe_code.is_empty() {
                return Err(Status::invalid_argument(
                    "project_id, store_id and stripe_code are required",
                ));
            }
        }
        let environment = Environment::from_metadata(request.metadata());
        let request = request.into_inner();

        // An unknown store short-circuits; the catalog is never queried.
        let store = self
            .directory
            .store_by_id(environment, &request.store_id)
            .await
            .map_err(|err| internal("store lookup failed", &err))?;
        if store.is_none() {
            return Ok(Response::new(missing_product(&request)));
        }

        let product = self
            .catalog
            .product_by_stripe_code(environment, &request.store_id, &request.stripe_code)
            .await
            .map_err(|err| internal("product lookup failed", &err))?;

        let result = match product {
            None => missing_product(&request),
            Some(record) => {
                let metadata = product_metadata(&record);
                ProductLookupResult {
                    exists: true,
                    stripe_code: record.stripe_code.unwrap_or(request.stripe_code),
                    title: record.title.unwrap_or_default(),
                    category: record.category.unwrap_or_default(),
                    picture: record.picture.unwrap_or_default(),
                    price: record.price.unwrap_or_default(),
                    purchase_price: record.purchase_price.unwrap_or_default(),
                    shop_id: record.shop_id.unwrap_or(request.store_id),
                    id: record.id.unwrap_or_default(),
                    metadata,
                }
            }
        };

        Ok(Response::new(result))
    }
}
