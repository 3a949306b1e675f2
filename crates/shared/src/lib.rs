//! Shared types, errors, and configuration for Tijori.
//!
//! This crate provides common types used across all other crates:
//! - Money types in integer minor units
//! - Typed IDs for type-safe entity references
//! - Pagination types for list queries
//! - Application-wide error types and the response envelope
//! - Configuration management

pub mod config;
pub mod envelope;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use envelope::{ApiError, ApiResponse};
pub use error::{AppError, AppResult};
