use thiserror::Error;

/// Errors that can occur while talking to the catalog service.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
