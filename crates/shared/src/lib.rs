//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types with HTTP mappings
//! - Configuration management
//! - Pagination types for list endpoints
//! - Currency code validation

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
