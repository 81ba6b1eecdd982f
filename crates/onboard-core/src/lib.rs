//! Core utilities and types shared across all Onboard crates

pub mod config;
pub mod error;
pub mod source;
pub mod types;
pub mod utils;
mod constants;

// Re-export commonly used types
pub use config::*;
pub use constants::*;
pub use error::*;
pub use source::*;
pub use types::*;
pub use utils::*;

// Re-export external dependencies
pub use anyhow;
pub use async_trait;
pub use chrono;
pub use serde;
pub use serde_json;
pub use thiserror;
pub use tracing;
