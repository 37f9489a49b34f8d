//! # Mock Framework
//!
//! Utilities for testing the editor and session flows in isolation.
//!
//! Use [`create_mock_gateway`] / [`create_mock_image_store`] to get a gateway
//! and a receiver. Then use helpers like [`expect_create`] or [`expect_upload`]
//! to assert each remote call and decide its outcome.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::catalog::{CatalogChange, CatalogObserver};
use crate::domain::Product;
use crate::editor::EditorSurface;
use crate::gateway::{
    CatalogGateway, GatewayError, ImageStore, LocalImage, Subscription, SubscriptionEvent,
    UploadEvent, UploadTask,
};
use crate::notice::Notice;
use crate::session::{AuthError, AuthProvider, AuthUser, IdentityProvider, SessionScreen, SignInError};

pub type Responder<T> = oneshot::Sender<Result<T, GatewayError>>;

/// One call made against [`MockCatalogGateway`].
#[derive(Debug)]
pub enum GatewayCall {
    Subscribe {
        respond_to: Responder<mpsc::UnboundedReceiver<SubscriptionEvent>>,
    },
    FetchAll {
        respond_to: Responder<Vec<Product>>,
    },
    ReserveId {
        respond_to: Responder<String>,
    },
    Create {
        product: Product,
        respond_to: Responder<String>,
    },
    CreateAt {
        id: String,
        product: Product,
        respond_to: Responder<()>,
    },
    Replace {
        id: String,
        product: Product,
        respond_to: Responder<()>,
    },
    Delete {
        id: String,
        respond_to: Responder<()>,
    },
}

/// Catalog gateway that forwards every call to a channel the test controls.
pub struct MockCatalogGateway {
    sender: mpsc::UnboundedSender<GatewayCall>,
}

impl MockCatalogGateway {
    async fn call<T>(&self, call: impl FnOnce(Responder<T>) -> GatewayCall) -> Result<T, GatewayError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(call(respond_to))
            .map_err(|_| GatewayError::ActorCommunicationError("Mock closed".to_string()))?;
        response
            .await
            .map_err(|_| GatewayError::ActorCommunicationError("Mock dropped".to_string()))?
    }
}

#[async_trait]
impl CatalogGateway for MockCatalogGateway {
    async fn subscribe(&self) -> Result<Subscription, GatewayError> {
        let events = self.call(|respond_to| GatewayCall::Subscribe { respond_to }).await?;
        Ok(Subscription::new(events))
    }

    async fn fetch_all(&self) -> Result<Vec<Product>, GatewayError> {
        self.call(|respond_to| GatewayCall::FetchAll { respond_to }).await
    }

    async fn reserve_id(&self) -> Result<String, GatewayError> {
        self.call(|respond_to| GatewayCall::ReserveId { respond_to }).await
    }

    async fn create(&self, product: &Product) -> Result<String, GatewayError> {
        let product = product.clone();
        self.call(|respond_to| GatewayCall::Create { product, respond_to }).await
    }

    async fn create_at(&self, id: &str, product: &Product) -> Result<(), GatewayError> {
        let (id, product) = (id.to_string(), product.clone());
        self.call(|respond_to| GatewayCall::CreateAt { id, product, respond_to }).await
    }

    async fn replace(&self, id: &str, product: &Product) -> Result<(), GatewayError> {
        let (id, product) = (id.to_string(), product.clone());
        self.call(|respond_to| GatewayCall::Replace { id, product, respond_to }).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), GatewayError> {
        let id = id.to_string();
        self.call(|respond_to| GatewayCall::Delete { id, respond_to }).await
    }
}

/// Creates a mock gateway and the receiver its calls arrive on.
///
/// # Testing Strategy
/// The code under test runs in a spawned task; the test pulls each call off
/// the receiver, asserts on it, and answers through the responder. This makes
/// ordering between remote calls (upload before write, no write at all)
/// directly observable.
pub fn create_mock_gateway() -> (Arc<MockCatalogGateway>, mpsc::UnboundedReceiver<GatewayCall>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Arc::new(MockCatalogGateway { sender }), receiver)
}

macro_rules! expect_call {
    ($name:ident, $variant:ident -> $response:ty) => {
        /// Waits for the next call and returns its responder if it is the expected kind.
        pub async fn $name(receiver: &mut mpsc::UnboundedReceiver<GatewayCall>) -> Option<Responder<$response>> {
            match receiver.recv().await {
                Some(GatewayCall::$variant { respond_to }) => Some(respond_to),
                _ => None,
            }
        }
    };
    ($name:ident, $variant:ident { $($field:ident: $ty:ty),+ } -> $response:ty) => {
        /// Waits for the next call and returns its parts if it is the expected kind.
        pub async fn $name(
            receiver: &mut mpsc::UnboundedReceiver<GatewayCall>,
        ) -> Option<($($ty,)+ Responder<$response>)> {
            match receiver.recv().await {
                Some(GatewayCall::$variant { $($field,)+ respond_to }) => Some(($($field,)+ respond_to)),
                _ => None,
            }
        }
    };
}

expect_call!(expect_subscribe, Subscribe -> mpsc::UnboundedReceiver<SubscriptionEvent>);
expect_call!(expect_fetch_all, FetchAll -> Vec<Product>);
expect_call!(expect_reserve_id, ReserveId -> String);
expect_call!(expect_create, Create { product: Product } -> String);
expect_call!(expect_create_at, CreateAt { id: String, product: Product } -> ());
expect_call!(expect_replace, Replace { id: String, product: Product } -> ());
expect_call!(expect_delete, Delete { id: String } -> ());

/// Asserts that no call is pending on the receiver.
pub fn assert_no_calls(receiver: &mut mpsc::UnboundedReceiver<GatewayCall>) {
    if let Ok(call) = receiver.try_recv() {
        panic!("Unexpected gateway call: {:?}", call);
    }
}

/// One upload started against [`MockImageStore`].
#[derive(Debug)]
pub struct UploadCall {
    pub key: String,
    pub image: LocalImage,
    pub events: mpsc::Sender<UploadEvent>,
}

pub struct MockImageStore {
    sender: mpsc::UnboundedSender<UploadCall>,
}

#[async_trait]
impl ImageStore for MockImageStore {
    async fn upload(&self, key: &str, image: LocalImage) -> UploadTask {
        let (events, receiver) = mpsc::channel(16);
        let _ = self.sender.send(UploadCall {
            key: key.to_string(),
            image,
            events,
        });
        UploadTask::new(receiver)
    }
}

pub fn create_mock_image_store() -> (Arc<MockImageStore>, mpsc::UnboundedReceiver<UploadCall>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (Arc::new(MockImageStore { sender }), receiver)
}

pub async fn expect_upload(receiver: &mut mpsc::UnboundedReceiver<UploadCall>) -> Option<UploadCall> {
    receiver.recv().await
}

/// Everything a presentation surface was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Enabled(bool),
    Progress(Option<u8>),
    Notice(Notice),
    Closed,
    Title(String),
    CatalogShown(bool),
    Catalog(CatalogChange),
}

/// Surface double implementing every presentation trait.
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    fn record(&self, event: SurfaceEvent) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SurfaceEvent::Notice(notice) => Some(notice),
                _ => None,
            })
            .collect()
    }

    /// Last enable/disable state; surfaces start enabled.
    pub fn is_enabled(&self) -> bool {
        self.events()
            .iter()
            .rev()
            .find_map(|e| match e {
                SurfaceEvent::Enabled(enabled) => Some(*enabled),
                _ => None,
            })
            .unwrap_or(true)
    }

    pub fn is_closed(&self) -> bool {
        self.events().contains(&SurfaceEvent::Closed)
    }

    pub fn progress(&self) -> Vec<u8> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                SurfaceEvent::Progress(Some(p)) => Some(*p),
                _ => None,
            })
            .collect()
    }
}

impl EditorSurface for RecordingSurface {
    fn set_enabled(&self, enabled: bool) {
        self.record(SurfaceEvent::Enabled(enabled));
    }

    fn show_progress(&self, percent: Option<u8>) {
        self.record(SurfaceEvent::Progress(percent));
    }

    fn notify(&self, notice: Notice) {
        self.record(SurfaceEvent::Notice(notice));
    }

    fn close(&self) {
        self.record(SurfaceEvent::Closed);
    }
}

impl SessionScreen for RecordingSurface {
    fn set_title(&self, title: &str) {
        self.record(SurfaceEvent::Title(title.to_string()));
    }

    fn show_catalog(&self) {
        self.record(SurfaceEvent::CatalogShown(true));
    }

    fn hide_catalog(&self) {
        self.record(SurfaceEvent::CatalogShown(false));
    }

    fn notify(&self, notice: Notice) {
        self.record(SurfaceEvent::Notice(notice));
    }
}

impl CatalogObserver for RecordingSurface {
    fn on_change(&self, change: &CatalogChange) {
        self.record(SurfaceEvent::Catalog(change.clone()));
    }
}

/// Auth provider answering sign-in attempts from a script.
///
/// Each `sign_in` pops the next scripted outcome; an exhausted script
/// behaves like a dismissed sign-in flow.
#[derive(Default)]
pub struct ScriptedAuthProvider {
    outcomes: Mutex<VecDeque<Result<AuthUser, SignInError>>>,
    current: Mutex<Option<AuthUser>>,
    sign_in_attempts: Mutex<usize>,
}

impl ScriptedAuthProvider {
    pub fn new(outcomes: impl IntoIterator<Item = Result<AuthUser, SignInError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn sign_in_attempts(&self) -> usize {
        *self.sign_in_attempts.lock().unwrap()
    }
}

#[async_trait]
impl AuthProvider for ScriptedAuthProvider {
    async fn current_user(&self) -> Option<AuthUser> {
        self.current.lock().unwrap().clone()
    }

    async fn sign_in(&self, _providers: &[IdentityProvider]) -> Result<AuthUser, SignInError> {
        *self.sign_in_attempts.lock().unwrap() += 1;
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SignInError::Cancelled));
        if let Ok(user) = &outcome {
            *self.current.lock().unwrap() = Some(user.clone());
        }
        outcome
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self.current.lock().unwrap() = None;
        Ok(())
    }
}

pub fn partner(name: &str) -> AuthUser {
    AuthUser {
        uid: format!("uid_{}", name.to_lowercase()),
        display_name: name.to_string(),
        email: format!("{}@nilo.test", name.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_gateway() {
        let (gateway, mut receiver) = create_mock_gateway();

        let create_task = tokio::spawn(async move {
            let product = Product::new("Test", "", 1, 1.0);
            gateway.create(&product).await
        });

        let (product, responder) = expect_create(&mut receiver).await.expect("Expected Create call");
        assert_eq!(product.name, "Test");
        responder.send(Ok("p_1".to_string())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok("p_1".to_string()));
    }
}
