//! Shared types for the air-quality dashboard.

pub mod config;
pub mod error;
pub mod types;

pub use error::Error;
pub use types::*;
