//! System orchestration, configuration, startup, and shutdown logic.

pub mod config;
pub mod partner_system;
pub mod telemetry;

pub use config::*;
pub use partner_system::*;
pub use telemetry::*;
