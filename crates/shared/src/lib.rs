//! Shared types, errors, and configuration for AuditDesk.
//!
//! This crate provides common types used across all other crates:
//! - Currency and locale types for decimal amounts
//! - Lenient amount parsing for raw imported rows
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
