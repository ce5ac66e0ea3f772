//! Remote session gateway: the client's only I/O boundary.
//!
//! The [`SessionGateway`] trait decouples the session controller and poll
//! scheduler from the transport. The production implementation is
//! [`http::HttpGateway`]; tests substitute a scripted in-process gateway.
//! Every operation is a direct pass-through: no retries, no caching, no
//! interpretation of responses.

pub mod http;
pub mod types;

use std::future::Future;
use std::pin::Pin;

use crate::Result;

use types::{
    DecisionResponse, PendingApprovalResponse, RunOutputResponse, StartRunResponse, StatusResponse,
};

/// Transport-agnostic interface to the remote agent service.
///
/// All reads are idempotent; `start_run` and `submit_decision` are
/// at-most-once writes. Responses are returned as-is; the session
/// controller owns all interpretation, including tolerating a `COMPLETED`
/// status whose output payload has not been published yet.
pub trait SessionGateway: Send + Sync {
    /// Start a new run for a natural-language query.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) on transport
    /// failure or a non-success response.
    fn start_run(
        &self,
        query: &str,
    ) -> Pin<Box<dyn Future<Output = Result<StartRunResponse>> + Send + '_>>;

    /// Fetch the current status of a run.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) on transport
    /// failure or a non-success response.
    fn get_status(
        &self,
        run_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<StatusResponse>> + Send + '_>>;

    /// Fetch the completed output of a run.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) on transport
    /// failure or a non-success response.
    fn get_output(
        &self,
        run_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<RunOutputResponse>> + Send + '_>>;

    /// Fetch the critical action currently suspending a run.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`](crate::AppError::NotFound) if the run
    /// has no pending action, or
    /// [`AppError::Gateway`](crate::AppError::Gateway) on transport failure.
    fn get_pending_approval(
        &self,
        run_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<PendingApprovalResponse>> + Send + '_>>;

    /// Submit the operator's decision for a suspended run.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Gateway`](crate::AppError::Gateway) on transport
    /// failure or a non-success response.
    fn submit_decision(
        &self,
        run_id: &str,
        approved: bool,
        reason: Option<String>,
    ) -> Pin<Box<dyn Future<Output = Result<DecisionResponse>> + Send + '_>>;
}
