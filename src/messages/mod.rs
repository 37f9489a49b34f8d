use tokio::sync::{mpsc, oneshot};

use crate::catalog::CatalogError;
use crate::domain::{DocumentChange, Product};
use crate::gateway::{GatewayError, SubscriptionEvent};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Typed message enums for actor communication. Each variant includes parameters
/// and a oneshot channel for responses.

#[derive(Debug)]
pub enum StoreRequest {
    Subscribe {
        respond_to: ServiceResponse<mpsc::UnboundedReceiver<SubscriptionEvent>, GatewayError>,
    },
    FetchAll {
        respond_to: ServiceResponse<Vec<Product>, GatewayError>,
    },
    ReserveId {
        respond_to: ServiceResponse<String, GatewayError>,
    },
    Create {
        product: Product,
        respond_to: ServiceResponse<String, GatewayError>,
    },
    Set {
        id: String,
        product: Product,
        respond_to: ServiceResponse<(), GatewayError>,
    },
    Delete {
        id: String,
        respond_to: ServiceResponse<(), GatewayError>,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum CatalogRequest {
    ApplyChanges {
        changes: Vec<DocumentChange>,
        respond_to: ServiceResponse<usize, CatalogError>,
    },
    LoadSnapshot {
        products: Vec<Product>,
        respond_to: ServiceResponse<usize, CatalogError>,
    },
    GetProduct {
        id: String,
        respond_to: ServiceResponse<Option<Product>, CatalogError>,
    },
    ListProducts {
        respond_to: ServiceResponse<Vec<Product>, CatalogError>,
    },
    Clear {
        respond_to: ServiceResponse<(), CatalogError>,
    },
    Shutdown,
    #[cfg(test)]
    GetProductCount {
        respond_to: ServiceResponse<usize, CatalogError>,
    },
}
