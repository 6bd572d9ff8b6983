//! HTTP implementation of the dashboard backend port

pub mod client;
pub mod errors;

pub use client::BackendClient;
pub use errors::error_message;
