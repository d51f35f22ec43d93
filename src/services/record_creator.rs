//! Lead creation abstraction.
//!
//! `RecordCreator` is the seam between the import executor and the lead
//! service: `HttpRecordCreator` talks to the customer service REST API,
//! `LogRecordCreator` only logs (dry runs), `FakeRecordCreator` records calls
//! in tests.
//!
//! The trait is object-safe so callers can hold `Arc<dyn RecordCreator>`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::RecordCreationError;
use crate::types::{CreateLeadRequest, DuplicateAction};

// =============================================================================
// Core trait
// =============================================================================

/// Creates one lead per call. Duplicate handling is up to the implementation;
/// the operator's choice is passed along with every record.
#[async_trait]
pub trait RecordCreator: Send + Sync {
    async fn create_record(
        &self,
        lead: &CreateLeadRequest,
        duplicate_action: DuplicateAction,
    ) -> Result<(), RecordCreationError>;

    /// Name of this implementation (for logs)
    fn name(&self) -> &'static str;
}

// =============================================================================
// LogRecordCreator: dry run
// =============================================================================

pub struct LogRecordCreator;

#[async_trait]
impl RecordCreator for LogRecordCreator {
    async fn create_record(
        &self,
        lead: &CreateLeadRequest,
        duplicate_action: DuplicateAction,
    ) -> Result<(), RecordCreationError> {
        info!(
            first_name = %lead.first_name,
            last_name = %lead.last_name,
            email = %lead.email,
            duplicate_action = %duplicate_action,
            "[LogRecordCreator] Would create lead"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

// =============================================================================
// HttpRecordCreator: lead service REST API
// =============================================================================

pub struct HttpRecordCreator {
    leads_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpRecordCreator {
    /// `base_url` is the customer service API root, e.g. `http://localhost:8082/api`
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lead-importer/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            leads_url: format!("{}/leads", base_url.trim_end_matches('/')),
            token,
            client,
        })
    }
}

#[async_trait]
impl RecordCreator for HttpRecordCreator {
    async fn create_record(
        &self,
        lead: &CreateLeadRequest,
        duplicate_action: DuplicateAction,
    ) -> Result<(), RecordCreationError> {
        let mut request = self
            .client
            .post(&self.leads_url)
            .query(&[("duplicateAction", duplicate_action.as_str())])
            .json(lead);

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RecordCreationError::new(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            debug!("Lead created ({})", status);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(RecordCreationError::new(failure_reason(status.as_u16(), &body)))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Best human-readable reason from an error response body.
///
/// Understands the Spring error shape (`message`, `error`, validation
/// `errors[].defaultMessage`); otherwise reports the status code.
fn failure_reason(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let validation: Vec<&str> = json
            .get("errors")
            .and_then(Value::as_array)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.get("defaultMessage").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();
        if !validation.is_empty() {
            return validation.join("; ");
        }

        for key in ["message", "error"] {
            if let Some(text) = json.get(key).and_then(Value::as_str) {
                if !text.trim().is_empty() {
                    return text.trim().to_string();
                }
            }
        }
    } else {
        let text = body.trim();
        if !text.is_empty() && text.len() <= 200 && !text.starts_with('<') {
            return text.to_string();
        }
    }

    format!("Request failed with status code {}", status)
}

// =============================================================================
// FakeRecordCreator: captures calls in memory (tests)
// =============================================================================

#[cfg(test)]
pub use fake::FakeRecordCreator;
