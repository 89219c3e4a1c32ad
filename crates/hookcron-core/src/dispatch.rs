//! Dispatch action - one outbound HTTP request per firing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hookcron_protocols::{JobDefinition, JobStore};
use hookcron_scheduler::{Action, ActionError, ActionResult, TriggerType};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::{JobError, JobResult};

/// Content type sent with every outbound body.
pub const DISPATCH_CONTENT_TYPE: &str = "application/octet-stream";

/// Outbound HTTP client settings.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Whole-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("hookcron/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builds the action a job's live schedule runs.
pub trait ActionFactory: Send + Sync {
    fn build(&self, job: &JobDefinition) -> Arc<dyn Action>;
}

/// [`ActionFactory`] producing [`HttpDispatchAction`]s that share one
/// connection pool.
pub struct HttpActionFactory {
    client: Client,
    store: Arc<dyn JobStore>,
}

impl HttpActionFactory {
    pub fn new(config: &DispatchConfig, store: Arc<dyn JobStore>) -> JobResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| JobError::DispatchFailure(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, store })
    }
}

impl ActionFactory for HttpActionFactory {
    fn build(&self, job: &JobDefinition) -> Arc<dyn Action> {
        Arc::new(HttpDispatchAction::new(job, self.client.clone(), self.store.clone()))
    }
}

/// Issues the HTTP request described by a job.
///
/// Captures the job's fields when built; a replaced job gets a new action.
pub struct HttpDispatchAction {
    job_id: String,
    name: String,
    one_shot: bool,
    method: String,
    target_url: String,
    body: String,
    token: String,
    client: Client,
    store: Arc<dyn JobStore>,
}

impl HttpDispatchAction {
    pub fn new(job: &JobDefinition, client: Client, store: Arc<dyn JobStore>) -> Self {
        Self {
            job_id: job.id.clone(),
            name: job.name.clone(),
            one_shot: job.trigger_type == TriggerType::Once.as_str(),
            method: job.http_method.clone(),
            target_url: job.http_target_url.clone(),
            body: job.http_request_body.clone(),
            token: job.json_web_token.clone(),
            client,
            store,
        }
    }

    fn target(&self) -> Result<(Method, Url), ActionError> {
        let url = Url::parse(&self.target_url)
            .map_err(|e| ActionError::InvalidTarget(format!("{}: {}", self.target_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ActionError::InvalidTarget(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let method = Method::from_bytes(self.method.as_bytes())
            .map_err(|_| ActionError::InvalidTarget(format!("invalid method '{}'", self.method)))?;

        Ok((method, url))
    }
}

#[async_trait]
impl Action for HttpDispatchAction {
    fn key(&self) -> &str {
        &self.job_id
    }

    async fn execute(&self) -> ActionResult {
        // A one-shot job is consumed before its request goes out.
        if self.one_shot {
            if let Err(e) = self.store.mark_done(&self.job_id).await {
                error!(
                    job_id = %self.job_id,
                    name = %self.name,
                    error = %e,
                    "Failed to mark one-shot job done, firing aborted"
                );
                return Err(ActionError::Precondition(e.to_string()));
            }
        }

        let (method, url) = self.target().map_err(|e| {
            error!(job_id = %self.job_id, name = %self.name, error = %e, "Dispatch failed");
            e
        })?;

        debug!(
            job_id = %self.job_id,
            method = %method,
            url = %url,
            secure = url.scheme() == "https",
            "Dispatching"
        );

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, DISPATCH_CONTENT_TYPE)
            .body(self.body.clone());
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request.send().await.map_err(|e| {
            error!(
                job_id = %self.job_id,
                name = %self.name,
                method = %method,
                url = %url,
                error = %e,
                "Dispatch failed"
            );
            ActionError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            warn!(
                job_id = %self.job_id,
                name = %self.name,
                method = %method,
                url = %url,
                status,
                body = %body,
                "Dispatch target returned an error status"
            );
        } else {
            info!(
                job_id = %self.job_id,
                name = %self.name,
                method = %method,
                url = %url,
                status,
                "Dispatched"
            );
        }

        Ok(status)
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
