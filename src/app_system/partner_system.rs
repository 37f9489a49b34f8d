use std::sync::Arc;

use tracing::{error, info, instrument};

use super::{AppConfig, ConfigError};
use crate::catalog::{CatalogClient, CatalogObserver, CatalogService};
use crate::domain::Product;
use crate::editor::EditorContext;
use crate::gateway::memory_store::parse_seed;
use crate::gateway::{DocumentStoreClient, DocumentStoreService, InMemoryImageStore};
use crate::session::{AuthProvider, LocalAuthProvider, SessionController, SessionScreen};

/// The running application: store, image store, catalog service and the
/// session controller wired together.
///
/// **Startup Order:**
/// 1. Document store (no dependencies)
/// 2. Catalog service bound to the presentation observer
/// 3. Session controller with the store, image store and auth provider
pub struct PartnerSystem {
    pub session: SessionController,
    pub catalog: CatalogClient,
    pub store: DocumentStoreClient,
    pub images: InMemoryImageStore,
    pub auth: Arc<LocalAuthProvider>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl PartnerSystem {
    /// Reads the seed file named in the config, if any.
    pub async fn load_seed(config: &AppConfig) -> Result<Vec<Product>, ConfigError> {
        let Some(path) = &config.store.seed_file else {
            return Ok(Vec::new());
        };
        let seed_error = |reason: String| ConfigError::Seed {
            path: path.display().to_string(),
            reason,
        };
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| seed_error(e.to_string()))?;
        parse_seed(&json).map_err(|e| seed_error(e.to_string()))
    }

    /// Create and start the entire system.
    #[instrument(name = "partner_system", skip_all)]
    pub fn start<S>(config: &AppConfig, seed: Vec<Product>, screen: Arc<S>) -> Self
    where
        S: SessionScreen + CatalogObserver + 'static,
    {
        let mut handles = Vec::new();
        info!(seeded = seed.len(), "Starting partner system");

        let (store_service, store) = DocumentStoreService::new(config.channel_buffer);
        handles.push(tokio::spawn(store_service.seed(seed).run()));

        let observer: Arc<dyn CatalogObserver> = screen.clone();
        let (catalog_service, catalog) = CatalogService::new(config.channel_buffer, observer);
        handles.push(tokio::spawn(catalog_service.run()));

        let images = InMemoryImageStore::new(
            config.images.base_url.clone(),
            config.images.upload_chunk_size,
        );

        let mut auth = LocalAuthProvider::new();
        if let Some(partner) = &config.partner {
            auth = auth
                .with_account(&partner.email, &partner.password, &partner.display_name)
                .with_credentials(&partner.email, &partner.password);
        }
        let auth = Arc::new(auth);

        let editor_context = EditorContext {
            catalog: Arc::new(store.clone()),
            images: Arc::new(images.clone()),
            image_path: config.images.products_image_path.clone(),
        };
        let auth_provider: Arc<dyn AuthProvider> = auth.clone();
        let session_screen: Arc<dyn SessionScreen> = screen;
        let session = SessionController::new(auth_provider, catalog.clone(), editor_context, session_screen);

        info!("Partner system started successfully");

        Self {
            session,
            catalog,
            store,
            images,
            auth,
            handles,
        }
    }

    /// Gracefully shut down: detach the listener, then stop the services.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down partner system");

        self.session.shutdown();
        let _ = self.catalog.shutdown().await;
        let _ = self.store.shutdown().await;

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Service shutdown error");
            }
        }

        info!("Partner system shutdown complete");
        Ok(())
    }
}
