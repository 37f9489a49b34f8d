use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

use super::{CatalogGateway, GatewayError, Subscription, SubscriptionEvent};
use crate::domain::{DocumentChange, Product};
use crate::messages::{ServiceResponse, StoreRequest};

/// Length of a minted document id.
const DOCUMENT_ID_LEN: usize = 20;

/// Mints a random document id.
pub fn new_document_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(DOCUMENT_ID_LEN);
    id
}

/// Parses a seed file mapping document id to document body.
pub fn parse_seed(json: &str) -> serde_json::Result<Vec<Product>> {
    let documents: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
    documents
        .into_iter()
        .map(|(id, document)| Product::from_document(id, document))
        .collect()
}

/// In-memory product collection with live listeners.
///
/// Every write is fanned out to all open subscriptions as a one-change batch.
/// Subscriptions whose receiver has been dropped are pruned on the next write.
pub struct DocumentStoreService {
    receiver: mpsc::Receiver<StoreRequest>,
    documents: BTreeMap<String, Product>,
    subscribers: Vec<mpsc::UnboundedSender<SubscriptionEvent>>,
    next_id_fn: Box<dyn Fn() -> String + Send + Sync>,
}

impl DocumentStoreService {
    pub fn new(buffer_size: usize) -> (Self, DocumentStoreClient) {
        Self::with_id_generator(buffer_size, new_document_id)
    }

    pub fn with_id_generator(
        buffer_size: usize,
        next_id_fn: impl Fn() -> String + Send + Sync + 'static,
    ) -> (Self, DocumentStoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            documents: BTreeMap::new(),
            subscribers: Vec::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        (service, DocumentStoreClient::new(sender))
    }

    /// Preloads documents before the service starts. Products without an id
    /// are skipped.
    pub fn seed(mut self, products: impl IntoIterator<Item = Product>) -> Self {
        for product in products {
            match product.id.clone() {
                Some(id) => {
                    self.documents.insert(id, product);
                }
                None => warn!(product_name = %product.name, "Skipping seed product without id"),
            }
        }
        self
    }

    #[instrument(name = "document_store", skip(self))]
    pub async fn run(mut self) {
        info!(documents = self.documents.len(), "DocumentStore starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Subscribe { respond_to } => self.handle_subscribe(respond_to),
                StoreRequest::FetchAll { respond_to } => self.handle_fetch_all(respond_to),
                StoreRequest::ReserveId { respond_to } => {
                    let id = (self.next_id_fn)();
                    debug!(document_id = %id, "Reserved document id");
                    let _ = respond_to.send(Ok(id));
                }
                StoreRequest::Create { product, respond_to } => {
                    let id = (self.next_id_fn)();
                    self.handle_set(id.clone(), product);
                    let _ = respond_to.send(Ok(id));
                }
                StoreRequest::Set { id, product, respond_to } => {
                    self.handle_set(id, product);
                    let _ = respond_to.send(Ok(()));
                }
                StoreRequest::Delete { id, respond_to } => self.handle_delete(id, respond_to),
                StoreRequest::Shutdown => {
                    info!("DocumentStore shutting down");
                    break;
                }
            }
        }

        info!("DocumentStore stopped");
    }

    #[instrument(skip(self, respond_to))]
    fn handle_subscribe(
        &mut self,
        respond_to: ServiceResponse<mpsc::UnboundedReceiver<SubscriptionEvent>, GatewayError>,
    ) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let initial = self
            .documents
            .values()
            .cloned()
            .map(DocumentChange::added)
            .collect();
        if sender.send(SubscriptionEvent::Changes(initial)).is_ok() {
            self.subscribers.push(sender);
        }
        info!(listeners = self.subscribers.len(), "Listener attached");
        let _ = respond_to.send(Ok(receiver));
    }

    fn handle_fetch_all(&self, respond_to: ServiceResponse<Vec<Product>, GatewayError>) {
        debug!(documents = self.documents.len(), "Processing fetch_all request");
        let _ = respond_to.send(Ok(self.documents.values().cloned().collect()));
    }

    #[instrument(fields(document_id = %id), skip(self, product))]
    fn handle_set(&mut self, id: String, product: Product) {
        let product = product.with_id(id.clone());
        let change = match self.documents.insert(id, product.clone()) {
            Some(_) => DocumentChange::modified(product),
            None => DocumentChange::added(product),
        };
        info!(kind = ?change.kind, "Document written");
        self.publish(change);
    }

    #[instrument(fields(document_id = %id), skip(self, respond_to))]
    fn handle_delete(&mut self, id: String, respond_to: ServiceResponse<(), GatewayError>) {
        let Some(product) = self.documents.remove(&id) else {
            error!("Document not found for delete");
            send_error!(respond_to, GatewayError::NotFound(id));
        };
        info!("Document deleted");
        self.publish(DocumentChange::removed(product));
        let _ = respond_to.send(Ok(()));
    }

    fn publish(&mut self, change: DocumentChange) {
        let event = SubscriptionEvent::Changes(vec![change]);
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
        debug!(listeners = self.subscribers.len(), "Change published");
    }
}

/// Handle to a [`DocumentStoreService`]; implements [`CatalogGateway`].
#[derive(Clone)]
pub struct DocumentStoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl DocumentStoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    async fn call<T>(
        &self,
        request: impl FnOnce(ServiceResponse<T, GatewayError>) -> StoreRequest,
    ) -> Result<T, GatewayError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| GatewayError::ActorCommunicationError("Actor closed".to_string()))?;
        response
            .await
            .map_err(|_| GatewayError::ActorCommunicationError("Actor dropped".to_string()))?
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), String> {
        debug!("Sending shutdown request");
        self.sender
            .send(StoreRequest::Shutdown)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[async_trait]
impl CatalogGateway for DocumentStoreClient {
    #[instrument(skip(self))]
    async fn subscribe(&self) -> Result<Subscription, GatewayError> {
        debug!("Sending request");
        let events = self
            .call(|respond_to| StoreRequest::Subscribe { respond_to })
            .await?;
        Ok(Subscription::new(events))
    }

    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Product>, GatewayError> {
        debug!("Sending request");
        self.call(|respond_to| StoreRequest::FetchAll { respond_to }).await
    }

    #[instrument(skip(self))]
    async fn reserve_id(&self) -> Result<String, GatewayError> {
        debug!("Sending request");
        self.call(|respond_to| StoreRequest::ReserveId { respond_to }).await
    }

    #[instrument(skip(self, product), fields(product_name = %product.name))]
    async fn create(&self, product: &Product) -> Result<String, GatewayError> {
        debug!("Sending request");
        let product = product.clone();
        self.call(|respond_to| StoreRequest::Create { product, respond_to })
            .await
    }

    #[instrument(skip(self, product))]
    async fn create_at(&self, id: &str, product: &Product) -> Result<(), GatewayError> {
        debug!("Sending request");
        let (id, product) = (id.to_string(), product.clone());
        self.call(|respond_to| StoreRequest::Set { id, product, respond_to })
            .await
    }

    #[instrument(skip(self, product))]
    async fn replace(&self, id: &str, product: &Product) -> Result<(), GatewayError> {
        debug!("Sending request");
        let (id, product) = (id.to_string(), product.clone());
        self.call(|respond_to| StoreRequest::Set { id, product, respond_to })
            .await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: &str) -> Result<(), GatewayError> {
        debug!("Sending request");
        let id = id.to_string();
        self.call(|respond_to| StoreRequest::Delete { id, respond_to })
            .await
    }
}
