//! Core types, config, and errors for Beseda.

pub mod config;
pub mod error;
pub mod types;

pub use error::{BesedaError, Result};
