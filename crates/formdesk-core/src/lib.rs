//! Formdesk Core Library
//!
//! This crate provides the domain models, error types, configuration, HTML
//! escaping and validation helpers shared by every Formdesk component.

pub mod config;
pub mod error;
pub mod html;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
