use thiserror::Error;

/// Errors reported by the remote document store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

/// Errors reported by the object store during an upload.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UploadError {
    #[error("Upload rejected: {0}")]
    Rejected(String),
    #[error("Network error during upload: {0}")]
    Network(String),
    #[error("Upload interrupted before completion")]
    Interrupted,
    #[error("Cannot read local image: {0}")]
    LocalImage(String),
}
