//! Product editor workflow: form parsing, optional photo upload and the
//! create-or-replace commit.

pub mod error;
pub mod form;
pub mod workflow;

pub use error::*;
pub use form::*;
pub use workflow::*;
