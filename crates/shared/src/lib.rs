//! Shared types, errors, and configuration for Tally.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Configuration management
//! - Auth claims and role capabilities
//! - JWT token service

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

pub use auth::{Claims, Role};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
