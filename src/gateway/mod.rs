//! Seams to the remote collaborators: the document store holding the product
//! collection and the object store holding product photos.
//!
//! Both are async traits used behind `Arc<dyn ..>`. In-memory implementations
//! live in [`memory_store`] and [`image_store`].

pub mod error;
pub mod image_store;
pub mod memory_store;
pub mod upload;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{DocumentChange, Product};

pub use error::*;
pub use image_store::InMemoryImageStore;
pub use memory_store::{DocumentStoreClient, DocumentStoreService};
pub use upload::*;

/// One delivery on a catalog subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    /// One snapshot batch of document changes.
    Changes(Vec<DocumentChange>),
    /// The listener failed; later events may still arrive.
    Error(GatewayError),
}

/// A live catalog listener. Dropping it (or calling [`Subscription::remove`])
/// detaches the listener from the store.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<SubscriptionEvent>,
}

impl Subscription {
    pub fn new(events: mpsc::UnboundedReceiver<SubscriptionEvent>) -> Self {
        Self { events }
    }

    pub async fn next(&mut self) -> Option<SubscriptionEvent> {
        self.events.recv().await
    }

    pub fn remove(mut self) {
        self.events.close();
    }
}

/// Remote product collection.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// Opens a listener: one `Added` per existing document, then live deltas.
    async fn subscribe(&self) -> Result<Subscription, GatewayError>;

    /// One-time read of the whole collection.
    async fn fetch_all(&self) -> Result<Vec<Product>, GatewayError>;

    /// Mints a fresh document id without writing anything.
    async fn reserve_id(&self) -> Result<String, GatewayError>;

    /// Persists a transient product under a store-assigned id.
    async fn create(&self, product: &Product) -> Result<String, GatewayError>;

    /// Persists a transient product under a previously reserved id.
    async fn create_at(&self, id: &str, product: &Product) -> Result<(), GatewayError>;

    /// Full overwrite of the document at `id`.
    async fn replace(&self, id: &str, product: &Product) -> Result<(), GatewayError>;

    async fn delete_by_id(&self, id: &str) -> Result<(), GatewayError>;
}

/// Remote blob storage for product photos.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Starts uploading `image` under `key`. Progress and the terminal result
    /// arrive on the returned task.
    async fn upload(&self, key: &str, image: LocalImage) -> UploadTask;
}

/// Object key of the photo belonging to a product document.
pub fn image_key(image_path: &str, document_id: &str) -> String {
    format!("{}/{}", image_path.trim_end_matches('/'), document_id)
}
