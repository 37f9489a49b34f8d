use std::sync::{Arc, Weak};

use tracing::{debug, error, info, instrument, warn};

use super::{EditorError, ProductForm};
use crate::domain::Product;
use crate::gateway::{image_key, CatalogGateway, ImageStore, LocalImage, UploadError, UploadEvent};
use crate::notice::Notice;

/// Presentation side of an editor: fields, the two action buttons, the
/// progress indicator and the dialog itself.
pub trait EditorSurface: Send + Sync {
    /// Enables or disables every field and both action buttons.
    fn set_enabled(&self, enabled: bool);
    /// `None` hides the progress indicator.
    fn show_progress(&self, percent: Option<u8>);
    fn notify(&self, notice: Notice);
    fn close(&self);
}

/// Remote collaborators an editor commits to.
#[derive(Clone)]
pub struct EditorContext {
    pub catalog: Arc<dyn CatalogGateway>,
    pub images: Arc<dyn ImageStore>,
    pub image_path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorMode {
    Create,
    Edit { id: String, original: Product },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorStage {
    Idle,
    Uploading { percent: u8 },
    Writing,
    Done,
    Failed,
    Cancelled,
}

impl EditorStage {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, EditorStage::Uploading { .. } | EditorStage::Writing)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, EditorStage::Done | EditorStage::Failed | EditorStage::Cancelled)
    }
}

/// Create-or-edit workflow for a single product.
///
/// The surface is held weakly: once the presentation side has released it,
/// UI side effects are dropped while remote work already started still runs
/// to completion.
pub struct ProductEditor {
    mode: EditorMode,
    form: ProductForm,
    photo: Option<LocalImage>,
    stage: EditorStage,
    context: EditorContext,
    surface: Weak<dyn EditorSurface>,
}

impl ProductEditor {
    /// Opens an editor for `product`, or for a new product when `None`.
    pub fn open(
        product: Option<Product>,
        context: EditorContext,
        surface: &Arc<dyn EditorSurface>,
    ) -> Self {
        let (mode, form) = match product {
            Some(product) => {
                let form = ProductForm::from_product(&product);
                match product.id.clone() {
                    Some(id) => (EditorMode::Edit { id, original: product }, form),
                    None => {
                        warn!(product_name = %product.name, "Transient product opened; editing as new");
                        (EditorMode::Create, form)
                    }
                }
            }
            None => (EditorMode::Create, ProductForm::default()),
        };
        debug!(?mode, "Editor opened");

        Self {
            mode,
            form,
            photo: None,
            stage: EditorStage::Idle,
            context,
            surface: Arc::downgrade(surface),
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn stage(&self) -> EditorStage {
        self.stage
    }

    pub fn form(&self) -> &ProductForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProductForm {
        &mut self.form
    }

    pub fn selected_photo(&self) -> Option<&LocalImage> {
        self.photo.as_ref()
    }

    /// Holds a photo locally until the next submit.
    pub fn select_photo(&mut self, photo: LocalImage) -> Result<(), EditorError> {
        self.ensure_idle()?;
        debug!(photo = %photo.name, bytes = photo.len(), "Photo selected");
        self.photo = Some(photo);
        Ok(())
    }

    /// Closes the editor without touching the remote store.
    #[instrument(skip(self))]
    pub fn cancel(&mut self) -> Result<(), EditorError> {
        self.ensure_idle()?;
        info!("Editor cancelled");
        self.stage = EditorStage::Cancelled;
        self.ui(|surface| surface.close());
        Ok(())
    }

    /// Commits the form: optional photo upload, then a create or a replace.
    ///
    /// Returns the persisted product.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<Product, EditorError> {
        self.ensure_idle()?;
        info!("Processing submit");
        self.ui(|surface| surface.set_enabled(false));

        // Step 1: Validate fields
        let fields = match self.form.parse() {
            Ok(fields) => fields,
            Err(e) => {
                warn!(error = %e, "Rejected submission");
                self.ui(|surface| {
                    surface.notify(Notice::InvalidInput(e.to_string()));
                    surface.set_enabled(true);
                });
                return Err(e.into());
            }
        };

        // Step 2: Upload the selected photo
        let mut reserved_id = None;
        let uploaded_url = match self.photo.clone() {
            Some(photo) => {
                let editing_id = match &self.mode {
                    EditorMode::Edit { id, .. } => Some(id.clone()),
                    EditorMode::Create => None,
                };
                let document_id = match editing_id {
                    Some(id) => id,
                    None => match self.context.catalog.reserve_id().await {
                        Ok(id) => id,
                        Err(e) => return Err(self.abort_upload(EditorError::Reserve(e))),
                    },
                };
                match self.upload_photo(&document_id, photo).await {
                    Ok(url) => {
                        if self.mode == EditorMode::Create {
                            reserved_id = Some(document_id);
                        }
                        Some(url)
                    }
                    Err(e) => return Err(self.abort_upload(e.into())),
                }
            }
            None => None,
        };

        // Step 3: Build the record
        let mut product = match &self.mode {
            EditorMode::Create => Product::default(),
            EditorMode::Edit { original, .. } => original.clone(),
        };
        fields.apply_to(&mut product);
        if let Some(url) = uploaded_url {
            product.img_url = url;
        }

        // Step 4: Persist
        self.stage = EditorStage::Writing;
        let catalog = Arc::clone(&self.context.catalog);
        let outcome = match (&self.mode, reserved_id) {
            (EditorMode::Edit { id, .. }, _) => catalog.replace(id, &product).await.map(|_| id.clone()),
            (EditorMode::Create, Some(id)) => catalog.create_at(&id, &product).await.map(|_| id),
            (EditorMode::Create, None) => catalog.create(&product).await,
        };

        let creating = self.mode == EditorMode::Create;
        self.ui(|surface| {
            surface.show_progress(None);
            surface.set_enabled(true);
        });

        match outcome {
            Ok(id) => {
                info!(product_id = %id, "Product persisted");
                self.photo = None;
                self.stage = EditorStage::Done;
                let notice = if creating { Notice::ProductAdded } else { Notice::ProductUpdated };
                self.ui(|surface| {
                    surface.notify(notice);
                    surface.close();
                });
                Ok(product.with_id(id))
            }
            Err(e) => {
                error!(error = %e, "Product write failed");
                self.stage = EditorStage::Failed;
                let notice = if creating { Notice::InsertFailed } else { Notice::UpdateFailed };
                self.ui(|surface| {
                    surface.notify(notice);
                    surface.close();
                });
                Err(EditorError::Write(e))
            }
        }
    }

    #[instrument(skip_all, fields(document_id = %document_id))]
    async fn upload_photo(&mut self, document_id: &str, photo: LocalImage) -> Result<String, UploadError> {
        let key = image_key(&self.context.image_path, document_id);
        self.set_progress(0);

        let mut task = self.context.images.upload(&key, photo).await;
        let mut percent = 0u8;
        while let Some(event) = task.next().await {
            match event {
                UploadEvent::Progress(p) => {
                    percent = percent.max(p.min(100));
                    self.set_progress(percent);
                }
                UploadEvent::Completed { url } => {
                    self.set_progress(100);
                    info!(url = %url, "Photo uploaded");
                    return Ok(url);
                }
                UploadEvent::Failed(e) => return Err(e),
            }
        }
        Err(UploadError::Interrupted)
    }

    fn set_progress(&mut self, percent: u8) {
        self.stage = EditorStage::Uploading { percent };
        self.ui(|surface| surface.show_progress(Some(percent)));
    }

    fn abort_upload(&mut self, err: EditorError) -> EditorError {
        error!(error = %err, "Upload step failed; nothing written");
        self.stage = EditorStage::Idle;
        self.ui(|surface| {
            surface.notify(Notice::UploadFailed);
            surface.show_progress(None);
            surface.set_enabled(true);
        });
        err
    }

    fn ensure_idle(&self) -> Result<(), EditorError> {
        if self.stage.is_in_flight() {
            Err(EditorError::SubmitInFlight)
        } else if self.stage.is_closed() {
            Err(EditorError::Closed)
        } else {
            Ok(())
        }
    }

    fn ui(&self, f: impl FnOnce(&dyn EditorSurface)) {
        match self.surface.upgrade() {
            Some(surface) => f(surface.as_ref()),
            None => debug!("Editor surface released; skipping UI update"),
        }
    }
}
