//! Auth state, screen visibility and the catalog listener lifecycle.

pub mod auth;
pub mod controller;
pub mod screen;

pub use auth::*;
pub use controller::*;
pub use screen::*;
