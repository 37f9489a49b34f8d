use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn, Instrument};

use super::{AuthProvider, AuthUser, IdentityProvider, SessionScreen, SignInError};
use crate::catalog::{CatalogClient, CatalogError};
use crate::domain::ChangeKind;
use crate::editor::{EditorContext, EditorSurface, ProductEditor};
use crate::gateway::{GatewayError, Subscription, SubscriptionEvent};
use crate::notice::Notice;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SessionError {
    #[error("No partner is signed in")]
    NotAuthenticated,
    #[error("Product not in catalog: {0}")]
    UnknownProduct(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(AuthUser),
}

/// What the driver should do after an auth-state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
    Continue,
    Exit,
}

/// A running catalog listener: the subscription pump task.
struct CatalogListener {
    task: JoinHandle<()>,
}

impl CatalogListener {
    fn stop(self) {
        self.task.abort();
    }
}

/// Owns the auth state of the catalog screen and the lifetime of the live
/// catalog listener, which only runs while the screen is visible and a
/// partner is signed in.
pub struct SessionController {
    state: SessionState,
    visible: bool,
    auth: Arc<dyn AuthProvider>,
    providers: Vec<IdentityProvider>,
    catalog: CatalogClient,
    editor_context: EditorContext,
    screen: Arc<dyn SessionScreen>,
    listener: Option<CatalogListener>,
}

impl SessionController {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        catalog: CatalogClient,
        editor_context: EditorContext,
        screen: Arc<dyn SessionScreen>,
    ) -> Self {
        Self {
            state: SessionState::Unauthenticated,
            visible: false,
            auth,
            providers: vec![IdentityProvider::EmailPassword, IdentityProvider::Google],
            catalog,
            editor_context,
            screen,
            listener: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Screen became visible: re-read the auth state and reattach the listener.
    #[instrument(skip(self))]
    pub async fn resume(&mut self) -> SessionFlow {
        self.visible = true;
        let user = self.auth.current_user().await;
        self.on_auth_state_changed(user).await
    }

    /// Screen hidden: detach the listener.
    #[instrument(skip(self))]
    pub fn pause(&mut self) {
        self.visible = false;
        self.stop_listener();
    }

    #[instrument(skip(self, user), fields(signed_in = user.is_some()))]
    pub async fn on_auth_state_changed(&mut self, user: Option<AuthUser>) -> SessionFlow {
        match user {
            Some(user) => {
                self.enter_authenticated(user).await;
                SessionFlow::Continue
            }
            None => {
                self.enter_unauthenticated();
                self.prompt_sign_in().await
            }
        }
    }

    /// Ends the session, then starts the sign-in flow again.
    ///
    /// The catalog is hidden and emptied even when the provider reports an
    /// error. The returned flow is the outcome of the new sign-in attempt.
    #[instrument(skip(self))]
    pub async fn sign_out(&mut self) -> SessionFlow {
        match self.auth.sign_out().await {
            Ok(()) => self.screen.notify(Notice::SessionFinalized),
            Err(e) => {
                error!(error = %e, "Sign-out reported an error");
                self.screen.notify(Notice::SignOutFailed);
            }
        }

        self.enter_unauthenticated();
        if let Err(e) = self.catalog.clear().await {
            error!(error = %e, "Could not clear catalog");
        }
        self.prompt_sign_in().await
    }

    /// Opens an editor for a new product.
    pub fn new_product(&self, surface: &Arc<dyn EditorSurface>) -> Result<ProductEditor, SessionError> {
        self.ensure_authenticated()?;
        Ok(ProductEditor::open(None, self.editor_context.clone(), surface))
    }

    /// Item click: opens an editor for the clicked product.
    #[instrument(skip(self, surface))]
    pub async fn on_click(
        &self,
        id: &str,
        surface: &Arc<dyn EditorSurface>,
    ) -> Result<ProductEditor, SessionError> {
        self.ensure_authenticated()?;
        let product = self
            .catalog
            .get_product(id.to_string())
            .await?
            .ok_or_else(|| SessionError::UnknownProduct(id.to_string()))?;
        Ok(ProductEditor::open(Some(product), self.editor_context.clone(), surface))
    }

    /// Item long click: deletes the product remotely. The local list is left
    /// to the listener to reconcile.
    #[instrument(skip(self))]
    pub async fn on_long_click(&self, id: &str) -> Result<(), SessionError> {
        self.ensure_authenticated()?;
        if let Err(e) = self.editor_context.catalog.delete_by_id(id).await {
            error!(error = %e, "Delete failed");
            self.screen.notify(Notice::DeleteFailed);
            return Err(e.into());
        }
        info!("Delete requested");
        Ok(())
    }

    /// One-time read of the whole collection into the local list.
    #[instrument(skip(self))]
    pub async fn load_catalog_once(&self) -> Result<usize, SessionError> {
        self.ensure_authenticated()?;
        let products = match self.editor_context.catalog.fetch_all().await {
            Ok(products) => products,
            Err(e) => {
                error!(error = %e, "Catalog query failed");
                self.screen.notify(Notice::QueryFailed);
                return Err(e.into());
            }
        };
        Ok(self.catalog.load_snapshot(products).await?)
    }

    pub fn shutdown(mut self) {
        self.stop_listener();
    }

    async fn prompt_sign_in(&mut self) -> SessionFlow {
        match self.auth.sign_in(&self.providers).await {
            Ok(user) => {
                self.screen.notify(Notice::Welcome);
                self.enter_authenticated(user).await;
                SessionFlow::Continue
            }
            Err(SignInError::Cancelled) => {
                info!("Sign-in cancelled; closing");
                self.screen.notify(Notice::Farewell);
                SessionFlow::Exit
            }
            Err(SignInError::NoNetwork) => {
                warn!("Sign-in failed: no network");
                self.screen.notify(Notice::NeedInternet);
                SessionFlow::Continue
            }
            Err(SignInError::Failed { code }) => {
                error!(code = %code, "Sign-in failed");
                self.screen.notify(Notice::SignInFailed(code));
                SessionFlow::Continue
            }
        }
    }

    async fn enter_authenticated(&mut self, user: AuthUser) {
        info!(uid = %user.uid, "Partner authenticated");
        self.screen.set_title(&user.display_name);
        self.screen.show_catalog();
        self.state = SessionState::Authenticated(user);
        if self.visible {
            self.start_listener().await;
        }
    }

    fn enter_unauthenticated(&mut self) {
        self.stop_listener();
        self.screen.hide_catalog();
        self.state = SessionState::Unauthenticated;
    }

    async fn start_listener(&mut self) {
        if self.listener.is_some() {
            return;
        }
        match self.editor_context.catalog.subscribe().await {
            Ok(subscription) => {
                let pump = pump_subscription(subscription, self.catalog.clone(), Arc::clone(&self.screen));
                let task = tokio::spawn(pump.instrument(tracing::info_span!("catalog_listener")));
                self.listener = Some(CatalogListener { task });
                info!("Catalog listener attached");
            }
            Err(e) => {
                error!(error = %e, "Could not attach catalog listener");
                self.screen.notify(Notice::QueryFailed);
            }
        }
    }

    fn stop_listener(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.stop();
            info!("Catalog listener detached");
        }
    }

    fn ensure_authenticated(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Authenticated(_) => Ok(()),
            SessionState::Unauthenticated => Err(SessionError::NotAuthenticated),
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop_listener();
    }
}

/// Feeds subscription batches into the catalog service. The first batch is
/// the full collection and replaces the local list; later batches are deltas.
/// Listener errors are reported and the pump keeps reading.
async fn pump_subscription(
    mut subscription: Subscription,
    catalog: CatalogClient,
    screen: Arc<dyn SessionScreen>,
) {
    let mut synced = false;
    while let Some(event) = subscription.next().await {
        match event {
            SubscriptionEvent::Changes(changes) => {
                let result = if synced {
                    catalog.apply_changes(changes).await
                } else {
                    synced = true;
                    let products = changes
                        .into_iter()
                        .filter(|change| change.kind != ChangeKind::Removed)
                        .map(|change| change.product)
                        .collect();
                    catalog.load_snapshot(products).await
                };
                if let Err(e) = result {
                    error!(error = %e, "Catalog service unavailable; stopping listener");
                    break;
                }
            }
            SubscriptionEvent::Error(e) => {
                error!(error = %e, "Catalog listener error");
                screen.notify(Notice::QueryFailed);
            }
        }
    }
    debug!("Catalog listener ended");
}
