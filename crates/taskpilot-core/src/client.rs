use anyhow::Context;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use taskpilot_shared::{CalendarExportRequest, ScheduleResult, SubmissionRequest};
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, instrument, warn};

use crate::datetime::created_iso;

pub const PRIORITIZE_PATH: &str = "/api/prioritize";
pub const CALENDAR_PATH: &str = "/api/ics";

/// Failure of a call to the scheduling service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("API returned {status}")]
    Status { status: u16, body: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("malformed response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("submission cancelled")]
    Cancelled,

    #[error("submission task failed: {0}")]
    Aborted(#[source] JoinError),
}

impl ServiceError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionClient {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
    timezone: Tz,
}

impl SubmissionClient {
    /// No request timeout is set; a call lasts as long as the transport allows.
    pub fn new(base_url: &str, user_id: &str, timezone: Tz) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context("failed building HTTP client for the scheduling service")?;

        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
            timezone,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timezone(&self) -> &Tz {
        &self.timezone
    }

    /// None when there is nothing to submit.
    pub fn build_request(&self, tasks: &[String], now: DateTime<Utc>) -> Option<SubmissionRequest> {
        if tasks.is_empty() {
            debug!("no tasks; submission skipped");
            return None;
        }

        Some(SubmissionRequest {
            tasks_text: tasks.to_vec(),
            created_iso: created_iso(now, &self.timezone),
            timezone: self.timezone.name().to_string(),
            user_id: self.user_id.clone(),
        })
    }

    /// Issues the request on the current runtime and returns a handle to it.
    pub fn submit(&self, tasks: &[String], now: DateTime<Utc>) -> Option<PendingSubmission> {
        let request = self.build_request(tasks, now)?;
        let client = self.clone();
        let handle = tokio::spawn(async move { client.prioritize(&request).await });
        Some(PendingSubmission { handle })
    }

    #[instrument(skip(self, request), fields(count = request.tasks_text.len()))]
    pub async fn prioritize(
        &self,
        request: &SubmissionRequest,
    ) -> Result<ScheduleResult, ServiceError> {
        info!(timezone = %request.timezone, "submitting tasks for prioritization");
        let body = self.post_json(PRIORITIZE_PATH, request).await?;
        let result: ScheduleResult = serde_json::from_str(&body).map_err(ServiceError::Decode)?;
        debug!(
            items = result.schedule_plan.len(),
            "received schedule from service"
        );
        Ok(result)
    }

    pub fn calendar_request(&self, result: &ScheduleResult) -> CalendarExportRequest {
        CalendarExportRequest {
            user_id: self.user_id.clone(),
            timezone: self.timezone.name().to_string(),
            note: result.note.clone(),
            schedule_plan: result.schedule_plan.clone(),
        }
    }

    /// Returns the iCalendar document produced by the service.
    #[instrument(skip(self, request), fields(items = request.schedule_plan.len()))]
    pub async fn export_calendar(
        &self,
        request: &CalendarExportRequest,
    ) -> Result<String, ServiceError> {
        info!("requesting calendar export");
        self.post_json(CALENDAR_PATH, request).await
    }

    async fn post_json<T: Serialize>(&self, path: &str, payload: &T) -> Result<String, ServiceError> {
        let url = format!("{}{}", self.base_url, path);
        let body = serde_json::to_vec(payload).map_err(ServiceError::Encode)?;

        let response = self
            .http
            .post(url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|source| ServiceError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = %status, "service returned non-success status");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|source| ServiceError::Transport {
                url: url.clone(),
                source,
            })?;

        Ok(text)
    }
}

/// An outstanding submission. Dropping the handle does not stop the request.
#[derive(Debug)]
pub struct PendingSubmission {
    handle: JoinHandle<Result<ScheduleResult, ServiceError>>,
}

impl PendingSubmission {
    pub fn cancel(&self) {
        debug!("cancelling submission");
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> Result<ScheduleResult, ServiceError> {
        self.handle
            .await
            .unwrap_or_else(|err| Err(join_failure(err)))
    }
}

fn join_failure(err: JoinError) -> ServiceError {
    if err.is_cancelled() {
        ServiceError::Cancelled
    } else {
        ServiceError::Aborted(err)
    }
}
