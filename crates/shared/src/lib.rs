//! Shared types, errors, and configuration for Ledgerly.
//!
//! This crate provides common types used across all other crates:
//! - Money helpers with decimal precision and the comparison tolerance
//! - Typed IDs for type-safe entity references
//! - The acting user and role types
//! - Application-wide error types
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod types;

pub use auth::{Actor, Role};
pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorKind};
