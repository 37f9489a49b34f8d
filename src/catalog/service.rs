use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use super::{Catalog, CatalogChange, CatalogClient, CatalogError, CatalogObserver};
use crate::domain::{DocumentChange, Product};
use crate::messages::{CatalogRequest, ServiceResponse};

/// Owns the local [`Catalog`]. Every mutation runs inside this task, in
/// mailbox order, and is reported to the bound observer before the reply is
/// sent.
pub struct CatalogService {
    receiver: mpsc::Receiver<CatalogRequest>,
    catalog: Catalog,
    observer: Arc<dyn CatalogObserver>,
}

impl CatalogService {
    pub fn new(buffer_size: usize, observer: Arc<dyn CatalogObserver>) -> (Self, CatalogClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            catalog: Catalog::new(),
            observer,
        };
        (service, CatalogClient::new(sender))
    }

    #[instrument(name = "catalog_service", skip(self))]
    pub async fn run(mut self) {
        info!("CatalogService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CatalogRequest::ApplyChanges { changes, respond_to } => {
                    self.handle_apply_changes(changes, respond_to);
                }
                CatalogRequest::LoadSnapshot { products, respond_to } => {
                    self.handle_load_snapshot(products, respond_to);
                }
                CatalogRequest::GetProduct { id, respond_to } => {
                    self.handle_get_product(id, respond_to);
                }
                CatalogRequest::ListProducts { respond_to } => {
                    let _ = respond_to.send(Ok(self.catalog.products().to_vec()));
                }
                CatalogRequest::Clear { respond_to } => {
                    if let Some(change) = self.catalog.clear() {
                        self.observer.on_change(&change);
                    }
                    let _ = respond_to.send(Ok(()));
                }
                CatalogRequest::Shutdown => {
                    info!("CatalogService shutting down");
                    break;
                }
                #[cfg(test)]
                CatalogRequest::GetProductCount { respond_to } => {
                    let _ = respond_to.send(Ok(self.catalog.len()));
                }
            }
        }

        info!("CatalogService stopped");
    }

    #[instrument(fields(batch = changes.len()), skip(self, changes, respond_to))]
    fn handle_apply_changes(
        &mut self,
        changes: Vec<DocumentChange>,
        respond_to: ServiceResponse<usize, CatalogError>,
    ) {
        debug!("Processing apply_changes request");

        let mut applied = 0;
        for change in &changes {
            if let Some(effect) = self.catalog.apply(change) {
                self.observer.on_change(&effect);
                applied += 1;
            }
        }

        info!(applied, products = self.catalog.len(), "Changes applied");
        let _ = respond_to.send(Ok(applied));
    }

    #[instrument(fields(snapshot = products.len()), skip(self, products, respond_to))]
    fn handle_load_snapshot(
        &mut self,
        products: Vec<Product>,
        respond_to: ServiceResponse<usize, CatalogError>,
    ) {
        debug!("Processing load_snapshot request");

        for change in self.catalog.replace_all(products) {
            self.observer.on_change(&change);
        }

        info!(products = self.catalog.len(), "Snapshot loaded");
        let _ = respond_to.send(Ok(self.catalog.len()));
    }

    #[instrument(fields(product_id = %id), skip(self, respond_to))]
    fn handle_get_product(&self, id: String, respond_to: ServiceResponse<Option<Product>, CatalogError>) {
        debug!("Processing get_product request");

        let product = self.catalog.product(&id).cloned();
        match &product {
            Some(product) => debug!(product_name = %product.name, "Product found"),
            None => debug!("Product not found"),
        }

        let _ = respond_to.send(Ok(product));
    }
}
