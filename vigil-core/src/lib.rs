//! # Vigil Core — shared infrastructure for the Vigil audit backend
//!
//! Everything the domain crates need but do not own:
//! - **error**: the `VigilError` taxonomy and `VigilResult` alias
//! - **notify**: the in-process notification bus (audit-change fan-out)
//! - **config**: typed TOML configuration with defaults

pub mod config;
pub mod error;
pub mod notify;

pub use config::VigilConfig;
pub use error::{VigilError, VigilResult};
