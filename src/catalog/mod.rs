//! Local catalog view: the reducer over remote document changes and the
//! service that owns it.

pub mod client;
pub mod error;
pub mod service;
pub mod view_model;

pub use client::CatalogClient;
pub use error::*;
pub use service::CatalogService;
pub use view_model::*;
