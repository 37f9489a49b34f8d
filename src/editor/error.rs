use thiserror::Error;

use super::ValidationError;
use crate::gateway::{GatewayError, UploadError};

/// Why a submit or cancel was refused or failed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EditorError {
    #[error("Rejected submission: {0}")]
    Validation(#[from] ValidationError),
    #[error("Image upload failed: {0}")]
    Upload(#[from] UploadError),
    #[error("Could not reserve a product id: {0}")]
    Reserve(GatewayError),
    #[error("Product write failed: {0}")]
    Write(GatewayError),
    #[error("A submit is already in flight")]
    SubmitInFlight,
    #[error("Editor is closed")]
    Closed,
}
