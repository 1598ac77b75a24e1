//! Incident sink adapter
//!
//! Submits incident creation requests to the ServiceNow table API. One
//! outbound POST per call, basic auth, fixed request timeout; any transport
//! error or non-2xx status is reported as a typed failure for the caller to
//! log. The sink never retries -- a breach that persists will naturally come
//! back on a later poll cycle, subject to its cooldown.

use crate::config::ServiceNowConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Request timeout for incident creation calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Default urgency for raised incidents (ServiceNow scale 1-3).
const DEFAULT_URGENCY: &str = "2";
/// Default impact for raised incidents (ServiceNow scale 1-3).
const DEFAULT_IMPACT: &str = "2";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("incident request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("incident rejected with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Creates one incident in the external ticketing system.
#[async_trait]
pub trait IncidentSink: Send + Sync {
    async fn create_incident(&self, title: &str, description: &str) -> Result<(), SinkError>;
}

/// Incident creation body for the ServiceNow table API.
#[derive(Debug, Serialize)]
struct IncidentRequest<'a> {
    short_description: &'a str,
    description: &'a str,
    urgency: &'a str,
    impact: &'a str,
}

#[derive(Debug, Deserialize)]
struct IncidentResponse {
    result: Option<IncidentRecord>,
}

#[derive(Debug, Deserialize)]
struct IncidentRecord {
    number: Option<String>,
}

/// ServiceNow-backed incident sink.
pub struct ServiceNowSink {
    client: reqwest::Client,
    config: ServiceNowConfig,
    url: String,
}

impl ServiceNowSink {
    pub fn new(config: ServiceNowConfig) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let url = format!(
            "{}/api/now/table/incident",
            config.instance.trim_end_matches('/')
        );
        Ok(Self {
            client,
            config,
            url,
        })
    }
}

#[async_trait]
impl IncidentSink for ServiceNowSink {
    async fn create_incident(&self, title: &str, description: &str) -> Result<(), SinkError> {
        let payload = IncidentRequest {
            short_description: title,
            description,
            urgency: DEFAULT_URGENCY,
            impact: DEFAULT_IMPACT,
        };

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected { status, body });
        }

        // Ticket number is informational; a success without a parseable body
        // is still a success.
        let number = response
            .json::<IncidentResponse>()
            .await
            .ok()
            .and_then(|r| r.result)
            .and_then(|r| r.number);
        match number {
            Some(number) => info!(%number, "incident created"),
            None => info!("incident created (no ticket number in response)"),
        }
        Ok(())
    }
}
