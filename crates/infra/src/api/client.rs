//! Backend API client
//!
//! One HTTP request per call. Retries, dedupe and caching live in the
//! `adoptly-core` caches above this client.

use std::time::Duration;

use adoptly_core::DashboardApi;
use adoptly_domain::constants::USER_AGENT;
use adoptly_domain::{
    AnalysisId, ApiConfig, DashboardData, FetchError, OpportunityType, RecommendationData,
    SubscribeRequest, SubscribeResponse, TaskStatus, UpdateProgressRequest,
    UpdateProgressResponse,
};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::errors::error_message;
use crate::http::HttpClient;

/// [`DashboardApi`] over HTTP+JSON
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: HttpClient,
    base_url: Url,
}

impl BackendClient {
    /// Create a client for `config.base_url`
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Config`] if the base URL is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;

        Self::with_http_client(&config.base_url, http)
    }

    /// Create a client around an existing [`HttpClient`]
    pub fn with_http_client(base_url: &str, http: HttpClient) -> Result<Self, FetchError> {
        Ok(Self { http, base_url: parse_base_url(base_url)? })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.http.timeout()
    }

    /// Absolute URL for `segments` below the base URL, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut raw = self.base_url.as_str().trim_end_matches('/').to_owned();
        for segment in segments {
            raw.push('/');
            raw.push_str(&urlencoding::encode(segment));
        }
        Url::parse(&raw).map_err(|err| FetchError::Config(format!("invalid endpoint {raw}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let request = self.http.request(Method::GET, url.clone());
        self.execute(request, &url).await
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.request(Method::POST, url.clone()).json(body);
        self.execute(request, &url).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, FetchError> {
        debug!(%url, "Sending backend request");
        let response = self.http.send(request).await.inspect_err(|err| {
            warn!(%url, category = err.category(), error = %err, "Backend request failed");
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            FetchError::Transport(format!("failed to read response body: {err}"))
        })?;

        if !status.is_success() {
            let message = error_message(status, &String::from_utf8_lossy(&body));
            warn!(%url, status = status.as_u16(), %message, "Backend returned an error status");
            return Err(FetchError::Http { status: status.as_u16(), message });
        }

        serde_json::from_slice(&body).map_err(|err| {
            warn!(%url, error = %err, "Backend response did not match the expected shape");
            FetchError::Decode(err.to_string())
        })
    }
}

#[async_trait]
impl DashboardApi for BackendClient {
    #[instrument(skip(self), fields(analysis_id = %id))]
    async fn fetch_dashboard(&self, id: &AnalysisId) -> Result<DashboardData, FetchError> {
        let url = self.endpoint(&["dashboard", id.as_str()])?;
        let dashboard: DashboardData = self.get_json(url).await?;

        if let Err(err) = dashboard.validate() {
            warn!(error = %err, "Dashboard snapshot breaks analysis invariants");
            return Err(err.into());
        }
        if dashboard.analysis_id != *id {
            warn!(returned = %dashboard.analysis_id, "Dashboard returned for a different analysis");
        }

        info!(
            completion = dashboard.progress_summary.completion_percentage,
            "Dashboard fetched"
        );
        Ok(dashboard)
    }

    #[instrument(skip(self), fields(analysis_id = %id))]
    async fn fetch_recommendation(
        &self,
        id: &AnalysisId,
    ) -> Result<RecommendationData, FetchError> {
        let url = self.endpoint(&["dashboard", id.as_str(), "recommendations"])?;
        let recommendation: RecommendationData = self.get_json(url).await?;
        info!(
            next_task = %recommendation.next_task.opportunity_type,
            priority = recommendation.priority(),
            "Recommendation fetched"
        );
        Ok(recommendation)
    }

    #[instrument(skip(self), fields(analysis_id = %id))]
    async fn submit_progress_update(
        &self,
        id: &AnalysisId,
        opportunity: OpportunityType,
        status: TaskStatus,
    ) -> Result<UpdateProgressResponse, FetchError> {
        let url = self.endpoint(&["dashboard", id.as_str(), "progress"])?;
        let body = UpdateProgressRequest { opportunity_type: opportunity, status };
        let response: UpdateProgressResponse = self.post_json(url, &body).await?;
        info!(
            new_status = %response.new_status,
            badges_earned = response.badges_earned.len(),
            "Progress update accepted"
        );
        Ok(response)
    }

    #[instrument(skip(self, request), fields(frequency = %request.frequency))]
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<SubscribeResponse, FetchError> {
        let url = self.endpoint(&["subscribe"])?;
        let response: SubscribeResponse = self.post_json(url, request).await?;
        info!(next_email_date = %response.next_email_date, "Subscription accepted");
        Ok(response)
    }
}

fn parse_base_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| FetchError::Config(format!("invalid base URL {raw:?}: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::Config(format!("unsupported base URL scheme {other:?}"))),
    }
}
