//! Job definition, status and live handle types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a durable job.
///
/// Serialized as its wire code: 1 (enabled), 2 (disabled), 3 (done).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum JobStatus {
    /// Job has (or should have) a live schedule.
    #[default]
    Enabled,
    /// Job is kept but never fires.
    Disabled,
    /// One-shot job that already fired.
    Done,
}

impl JobStatus {
    /// Numeric code used on the wire and in storage.
    pub fn code(self) -> u8 {
        match self {
            JobStatus::Enabled => 1,
            JobStatus::Disabled => 2,
            JobStatus::Done => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(JobStatus::Enabled),
            2 => Some(JobStatus::Disabled),
            3 => Some(JobStatus::Done),
            _ => None,
        }
    }
}

impl From<JobStatus> for u8 {
    fn from(status: JobStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for JobStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        JobStatus::from_code(code as i64).ok_or_else(|| format!("invalid job status: {}", code))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Enabled => write!(f, "enabled"),
            JobStatus::Disabled => write!(f, "disabled"),
            JobStatus::Done => write!(f, "done"),
        }
    }
}

/// Opaque identifier of a live schedule inside the scheduler bridge.
///
/// Only meaningful while the process that issued it is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(u64);

impl JobHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Storage representation (SQLite INTEGER).
    pub fn as_i64(self) -> i64 {
        self.0 as i64
    }

    pub fn from_i64(raw: i64) -> Option<Self> {
        u64::try_from(raw).ok().map(Self)
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied job fields for create and replace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    pub name: String,
    pub trigger_type: String,
    pub expression: String,
    pub http_method: String,
    pub http_target_url: String,
    #[serde(default)]
    pub http_request_body: String,
    #[serde(default)]
    pub json_web_token: String,
}

impl JobSpec {
    pub fn new(
        name: impl Into<String>,
        trigger_type: impl Into<String>,
        expression: impl Into<String>,
        http_method: impl Into<String>,
        http_target_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger_type: trigger_type.into(),
            expression: expression.into(),
            http_method: http_method.into(),
            http_target_url: http_target_url.into(),
            http_request_body: String::new(),
            json_web_token: String::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.http_request_body = body.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.json_web_token = token.into();
        self
    }
}

/// Durable job record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDefinition {
    /// Globally unique job ID (UUID v4).
    pub id: String,
    pub name: String,
    pub trigger_type: String,
    pub expression: String,
    pub http_method: String,
    pub http_target_url: String,
    pub http_request_body: String,
    pub json_web_token: String,
    pub status: JobStatus,
    /// Handle of the live schedule, if one currently exists.
    pub live_handle: Option<JobHandle>,
    pub creation_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl JobDefinition {
    /// Create a new enabled record with a fresh ID.
    pub fn new(spec: JobSpec, live_handle: Option<JobHandle>) -> Self {
        // Storage keeps whole seconds.
        let now = DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_else(Utc::now);
        Self {
            id: Uuid::new_v4().to_string(),
            name: spec.name,
            trigger_type: spec.trigger_type,
            expression: spec.expression,
            http_method: spec.http_method,
            http_target_url: spec.http_target_url,
            http_request_body: spec.http_request_body,
            json_web_token: spec.json_web_token,
            status: JobStatus::Enabled,
            live_handle,
            creation_time: now,
            update_time: now,
        }
    }

    /// The caller-visible fields of this record.
    pub fn spec(&self) -> JobSpec {
        JobSpec {
            name: self.name.clone(),
            trigger_type: self.trigger_type.clone(),
            expression: self.expression.clone(),
            http_method: self.http_method.clone(),
            http_target_url: self.http_target_url.clone(),
            http_request_body: self.http_request_body.clone(),
            json_web_token: self.json_web_token.clone(),
        }
    }

    /// Overwrite the caller-visible fields, keeping identity and timestamps.
    pub fn apply_spec(&mut self, spec: JobSpec) {
        self.name = spec.name;
        self.trigger_type = spec.trigger_type;
        self.expression = spec.expression;
        self.http_method = spec.http_method;
        self.http_target_url = spec.http_target_url;
        self.http_request_body = spec.http_request_body;
        self.json_web_token = spec.json_web_token;
    }

    /// Refresh `update_time` to the current second.
    pub fn touch(&mut self) {
        self.update_time =
            DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_else(Utc::now);
    }

    pub fn is_enabled(&self) -> bool {
        self.status == JobStatus::Enabled
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
