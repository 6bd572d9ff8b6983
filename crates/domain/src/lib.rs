//! # Adoptly Domain
//!
//! Data model shared by the dashboard synchronization crates.
//!
//! This crate contains:
//! - Dashboard data types (DashboardData, Gap, Badge, etc.)
//! - Error taxonomy for fetches, local validation and configuration
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Adoptly crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
