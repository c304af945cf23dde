//! Keel Core - Foundational Types
//!
//! Error and configuration types shared by the image and server crates.

pub mod config;
pub mod error;

pub use config::{DaemonConfig, ImageConfig};
pub use error::{KeelError, Result};

/// Keel version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
