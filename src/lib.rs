//! # nilo-partner
//!
//! Partner-side product catalog: a live, de-duplicated local view of a remote
//! product collection plus the create/edit/delete/photo-upload workflow that
//! mutates it.
//!
//! ## Layout
//!
//! - **Domain** - [`domain::Product`] and the [`domain::DocumentChange`] events
//!   a catalog listener delivers
//! - **Gateways** - [`gateway::CatalogGateway`] and [`gateway::ImageStore`]
//!   traits, with in-memory implementations
//! - **Catalog** - the [`catalog::Catalog`] reducer and the
//!   [`catalog::CatalogService`] actor that owns it
//! - **Editor** - [`editor::ProductEditor`], the submit pipeline
//!   (validate, upload, write)
//! - **Session** - [`session::SessionController`], auth state and the
//!   listener lifecycle
//! - **System** - [`app_system::PartnerSystem`] startup/shutdown,
//!   configuration and tracing setup
//!
//! Services follow the same shape: a struct owning an `mpsc::Receiver`, a
//! `run` loop instrumented with `tracing`, and a cloneable client that sends
//! requests carrying a `oneshot` responder.

#[macro_use]
mod macros;

pub mod app_system;
pub mod catalog;
pub mod domain;
pub mod editor;
pub mod gateway;
pub mod messages;
pub mod notice;
pub mod session;

#[cfg(test)]
mod mock_framework;
