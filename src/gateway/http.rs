//! HTTP implementation of the session gateway using `reqwest`.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::gateway::types::{
    DecisionRequest, DecisionResponse, PendingApprovalResponse, RunOutputResponse, StartRunRequest,
    StartRunResponse, StatusResponse,
};
use crate::gateway::SessionGateway;
use crate::{AppError, Result};

/// JSON-over-HTTP gateway to the remote agent service.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Build a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Gateway` if the HTTP client cannot be constructed.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|err| AppError::Gateway(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "gateway GET");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| AppError::Gateway(format!("GET {path} failed: {err}")))?;
        Self::decode(path, response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "gateway POST");
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| AppError::Gateway(format!("POST {path} failed: {err}")))?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("{path} returned 404")));
        }
        if !status.is_success() {
            return Err(AppError::Gateway(format!("{path} returned {status}")));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| AppError::Protocol(format!("invalid response from {path}: {err}")))
    }
}

impl SessionGateway for HttpGateway {
    fn start_run(
        &self,
        query: &str,
    ) -> Pin<Box<dyn Future<Output = Result<StartRunResponse>> + Send + '_>> {
        let request = StartRunRequest {
            query: query.to_owned(),
        };
        Box::pin(async move { self.post_json("/agent/execute", &request).await })
    }

    fn get_status(
        &self,
        run_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<StatusResponse>> + Send + '_>> {
        let path = format!("/agent/status/{run_id}");
        Box::pin(async move { self.get_json(&path).await })
    }

    fn get_output(
        &self,
        run_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<RunOutputResponse>> + Send + '_>> {
        let path = format!("/agent/response/{run_id}");
        Box::pin(async move { self.get_json(&path).await })
    }

    fn get_pending_approval(
        &self,
        run_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<PendingApprovalResponse>> + Send + '_>> {
        let path = format!("/critical-action/{run_id}");
        Box::pin(async move { self.get_json(&path).await })
    }

    fn submit_decision(
        &self,
        run_id: &str,
        approved: bool,
        reason: Option<String>,
    ) -> Pin<Box<dyn Future<Output = Result<DecisionResponse>> + Send + '_>> {
        let request = DecisionRequest {
            run_id: run_id.to_owned(),
            approved,
            reasoning: reason,
        };
        Box::pin(async move { self.post_json("/user/approve", &request).await })
    }
}
