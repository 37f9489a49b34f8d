use std::sync::Arc;

use tracing::{error, info, warn, Instrument};

use nilo_partner::app_system::{setup_tracing, AppConfig, PartnerSystem};
use nilo_partner::catalog::{CatalogChange, CatalogObserver};
use nilo_partner::editor::{EditorSurface, ProductForm};
use nilo_partner::gateway::LocalImage;
use nilo_partner::notice::Notice;
use nilo_partner::session::{SessionFlow, SessionScreen};

/// Console stand-in for the catalog screen and its editor dialogs.
struct TerminalScreen;

impl SessionScreen for TerminalScreen {
    fn set_title(&self, title: &str) {
        info!(title, "Screen title");
    }

    fn show_catalog(&self) {
        info!("Catalog visible");
    }

    fn hide_catalog(&self) {
        info!("Catalog hidden");
    }

    fn notify(&self, notice: Notice) {
        info!(notice = %notice, "Notice");
    }
}

impl CatalogObserver for TerminalScreen {
    fn on_change(&self, change: &CatalogChange) {
        match change {
            CatalogChange::Inserted { index, product } => {
                info!(index, name = %product.name, price = product.price, "Row inserted")
            }
            CatalogChange::Updated { index, product } => {
                info!(index, name = %product.name, quantity = product.quantity, "Row updated")
            }
            CatalogChange::Removed { index, id } => info!(index, id = %id, "Row removed"),
            CatalogChange::Cleared => info!("Rows cleared"),
        }
    }
}

struct TerminalDialog;

impl EditorSurface for TerminalDialog {
    fn set_enabled(&self, enabled: bool) {
        info!(enabled, "Dialog controls");
    }

    fn show_progress(&self, percent: Option<u8>) {
        if let Some(percent) = percent {
            info!(percent, "Upload progress");
        }
    }

    fn notify(&self, notice: Notice) {
        info!(notice = %notice, "Dialog notice");
    }

    fn close(&self) {
        info!("Dialog closed");
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    dotenv::dotenv().ok();
    setup_tracing();

    let config = AppConfig::from_env().map_err(|e| e.to_string())?;
    let seed = PartnerSystem::load_seed(&config).await.map_err(|e| e.to_string())?;

    info!("Starting partner catalog");
    let mut system = PartnerSystem::start(&config, seed, Arc::new(TerminalScreen));

    if system.session.resume().await == SessionFlow::Exit {
        warn!("No partner signed in; set NILO_PARTNER_EMAIL and NILO_PARTNER_PASSWORD");
        return system.shutdown().await;
    }

    let dialog: Arc<dyn EditorSurface> = Arc::new(TerminalDialog);

    let span = tracing::info_span!("product_creation");
    let created = async {
        let mut editor = system.session.new_product(&dialog).map_err(|e| e.to_string())?;
        *editor.form_mut() = ProductForm::new("Ceramic mug", "Hand made, 350ml", "12", "8.50");
        editor.submit().await.map_err(|e| e.to_string())
    }
    .instrument(span)
    .await;

    match created {
        Ok(product) => {
            let id = product.id.clone().unwrap_or_default();
            info!(product_id = %id, "Product created");

            // Give the listener a moment to deliver the new row before clicking it
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;

            let span = tracing::info_span!("product_edit", product_id = %id);
            let edited = async {
                let mut editor = system.session.on_click(&id, &dialog).await.map_err(|e| e.to_string())?;
                editor.form_mut().price = "9.25".to_string();
                editor
                    .select_photo(LocalImage::from_bytes("mug.jpg", vec![0u8; 200_000]))
                    .map_err(|e| e.to_string())?;
                editor.submit().await.map_err(|e| e.to_string())
            }
            .instrument(span)
            .await;

            match edited {
                Ok(product) => info!(img_url = %product.img_url, "Product edited"),
                Err(e) => error!(error = %e, "Product edit failed"),
            }

            if let Err(e) = system.session.on_long_click(&id).await {
                error!(error = %e, "Delete failed");
            }
        }
        Err(e) => error!(error = %e, "Product creation failed"),
    }

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    // Signing out restarts the sign-in flow; with a configured account it signs straight back in
    let flow = system.session.sign_out().await;
    info!(?flow, "Signed out");

    system.shutdown().await?;

    info!("Partner catalog stopped");
    Ok(())
}
