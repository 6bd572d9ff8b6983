//! # Adoptly Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest-based HTTP client
//! - [`BackendClient`], the HTTP implementation of
//!   [`adoptly_core::DashboardApi`]
//! - Configuration loading from environment variables and files
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `adoptly-core`
//! - Contains all "impure" code (network, environment, filesystem)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::BackendClient;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
