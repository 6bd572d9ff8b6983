//! Progress email subscription

use std::sync::Arc;

use adoptly_common::resilience::Clock;
use adoptly_domain::{
    EmailFrequency, FetchError, SubscribeRequest, SubscribeResponse, ValidationError,
};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::dashboard::DashboardHandle;
use crate::ports::DashboardApi;

/// A subscription that was not accepted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubscribeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Subscription failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Subscribes an address to periodic progress emails
pub struct SubscriptionService {
    api: Arc<dyn DashboardApi>,
}

impl SubscriptionService {
    /// Create a service that subscribes through `api`
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self { api }
    }

    /// Validate and send a subscription
    #[instrument(skip(self, email), fields(frequency = %frequency))]
    pub async fn subscribe(
        &self,
        email: &str,
        frequency: EmailFrequency,
        hourly_rate: Option<f64>,
    ) -> Result<SubscribeResponse, SubscribeError> {
        let request = build_request(email, frequency, hourly_rate)?;
        let response = self.api.subscribe(&request).await?;
        info!(next_email_date = %response.next_email_date, "Subscribed to progress emails");
        Ok(response)
    }

    /// Subscribe, then refresh `dashboard` so the money value computed from
    /// the hourly rate shows up
    ///
    /// A failed refresh is logged and does not fail the subscription.
    pub async fn subscribe_and_refresh<C: Clock>(
        &self,
        dashboard: &DashboardHandle<C>,
        email: &str,
        frequency: EmailFrequency,
        hourly_rate: Option<f64>,
    ) -> Result<SubscribeResponse, SubscribeError> {
        let response = self.subscribe(email, frequency, hourly_rate).await?;
        if let Err(error) = dashboard.retry().await {
            warn!(
                analysis_id = ?dashboard.analysis_id(),
                error = %error,
                "Dashboard refresh after subscribing failed"
            );
        }
        Ok(response)
    }
}

impl std::fmt::Debug for SubscriptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionService").finish_non_exhaustive()
    }
}

fn build_request(
    email: &str,
    frequency: EmailFrequency,
    hourly_rate: Option<f64>,
) -> Result<SubscribeRequest, ValidationError> {
    let email = email.trim();
    if !is_plausible_email(email) {
        return Err(ValidationError::InvalidEmail(email.to_owned()));
    }
    if let Some(rate) = hourly_rate {
        if !rate.is_finite() || rate < 0.0 {
            return Err(ValidationError::InvalidHourlyRate(rate));
        }
    }

    Ok(SubscribeRequest { email: email.to_owned(), frequency, hourly_rate })
}

/// `local@domain.tld` with no whitespace; the backend does the real check
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}
