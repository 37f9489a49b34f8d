use tokio::sync::mpsc;
use tracing::{debug, instrument};

use super::CatalogError;
use crate::domain::{DocumentChange, Product};
use crate::messages::CatalogRequest;

/// Client for [`super::CatalogService`]. Thin wrapper around the mailbox with
/// macro-generated methods.
#[derive(Clone)]
pub struct CatalogClient {
    sender: mpsc::Sender<CatalogRequest>,
}

impl CatalogClient {
    pub fn new(sender: mpsc::Sender<CatalogRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), String> {
        debug!("Sending shutdown request");
        self.sender
            .send(CatalogRequest::Shutdown)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

client_method!(CatalogClient => fn apply_changes(changes: Vec<DocumentChange>) -> usize as CatalogRequest::ApplyChanges, Error = CatalogError);
client_method!(CatalogClient => fn load_snapshot(products: Vec<Product>) -> usize as CatalogRequest::LoadSnapshot, Error = CatalogError);
client_method!(CatalogClient => fn get_product(id: String) -> Option<Product> as CatalogRequest::GetProduct, Error = CatalogError);
client_method!(CatalogClient => fn list_products() -> Vec<Product> as CatalogRequest::ListProducts, Error = CatalogError);
client_method!(CatalogClient => fn clear() -> () as CatalogRequest::Clear, Error = CatalogError);

// Test-only method for internal state inspection
#[cfg(test)]
client_method!(CatalogClient => fn get_product_count() -> usize as CatalogRequest::GetProductCount, Error = CatalogError);
