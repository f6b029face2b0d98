//! # Holdings Common Library
//!
//! Shared code for the holdings exchange tooling:
//! - Error and result types
//! - Configuration loading (CLI → ENV → TOML → compiled defaults)
//! - Tracing initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
