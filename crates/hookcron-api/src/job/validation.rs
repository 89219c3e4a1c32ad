//! Field validation for job requests.
//!
//! Checks shape only. Whether an expression actually parses is decided by
//! the trigger factory when the job is scheduled.

use hookcron_core::{JobError, JobResult, JobUpdate};
use hookcron_protocols::{JobSpec, JobStatus};
use hookcron_scheduler::TriggerType;
use url::Url;
use uuid::{Uuid, Version};

use super::model::{DesiredJob, JobFields};

pub const MAX_NAME_LEN: usize = 32;

pub const HTTP_METHODS: [&str; 4] = ["POST", "GET", "PUT", "DELETE"];

/// Validate create fields.
pub fn validate_create(fields: JobFields) -> JobResult<JobSpec> {
    let mut problems = Vec::new();
    check_fields(&fields, &mut problems);
    finish(problems)?;
    Ok(fields.into())
}

/// Validate a replace request. Only 1 (enable) and 2 (disable) are
/// accepted; callers cannot mark a job done.
pub fn validate_replace(desire: DesiredJob) -> JobResult<JobUpdate> {
    let mut problems = Vec::new();

    let status = match desire.status {
        1 => Some(JobStatus::Enabled),
        2 => Some(JobStatus::Disabled),
        _ => {
            problems.push("status must be 1 (enable) or 2 (disable)".to_string());
            None
        }
    };
    check_fields(&desire.fields, &mut problems);
    finish(problems)?;

    Ok(JobUpdate {
        status: status.unwrap_or_default(),
        spec: desire.fields.into(),
    })
}

/// Job ids are UUID v4.
pub fn validate_job_id(id: &str) -> JobResult<()> {
    match Uuid::parse_str(id) {
        Ok(uuid) if uuid.get_version() == Some(Version::Random) => Ok(()),
        _ => Err(JobError::Validation(format!("invalid job id: {}", id))),
    }
}

fn check_fields(fields: &JobFields, problems: &mut Vec<String>) {
    let name_len = fields.name.chars().count();
    if name_len == 0 || name_len > MAX_NAME_LEN {
        problems.push(format!(
            "name must be between 1 and {} characters",
            MAX_NAME_LEN
        ));
    }

    if fields.trigger_type.parse::<TriggerType>().is_err() {
        problems.push(format!(
            "triggerType '{}' is not one of cron, interval, once",
            fields.trigger_type
        ));
    }

    if fields.expression.trim().is_empty() {
        problems.push("expression must not be empty".to_string());
    }

    if !HTTP_METHODS.contains(&fields.http_method.as_str()) {
        problems.push(format!(
            "httpMethod '{}' is not one of {}",
            fields.http_method,
            HTTP_METHODS.join(", ")
        ));
    }

    if !is_request_url(&fields.http_target_url) {
        problems.push(format!(
            "httpTargetUrl '{}' is not an absolute http(s) URL",
            fields.http_target_url
        ));
    }
}

fn is_request_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

fn finish(problems: Vec<String>) -> JobResult<()> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(JobError::Validation(problems.join("; ")))
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
