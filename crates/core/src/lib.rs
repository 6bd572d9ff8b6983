//! # Adoptly Core
//!
//! Dashboard synchronization logic - no HTTP.
//!
//! This crate contains:
//! - The [`DashboardApi`] port implemented by the infra layer
//! - Dashboard and recommendation caches built on
//!   [`adoptly_common::cache::CacheStore`]
//! - The progress transition handler and its pure reconciliation functions
//! - The email subscription service
//!
//! ## Architecture Principles
//! - Only depends on `adoptly-common` and `adoptly-domain`
//! - All backend access goes through [`DashboardApi`]
//! - Reconciliation is pure and testable without a network

pub mod dashboard;
pub mod ports;
pub mod progress;
pub mod recommendation;
pub mod settings;
pub mod subscription;

pub use dashboard::{DashboardCache, DashboardHandle, DashboardState, DashboardView};
pub use ports::{DashboardApi, FetchResult};
pub use progress::{
    apply_progress_update, merge_badges, reconcile, validate_transition, ProgressTransitionHandler,
    TransitionError, TransitionOutcome,
};
pub use recommendation::{RecommendationCache, RecommendationHandle};
pub use subscription::{SubscribeError, SubscriptionService};
