//! Scripted [`SessionGateway`] double.
//!
//! Responses are queued per operation and popped in call order; every call
//! is recorded so tests can assert exact gateway traffic (e.g. that
//! `SubmitDecision` was called exactly once).

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use agent_console::gateway::types::{
    DecisionResponse, OutputMessage, PendingApprovalResponse, RunOutput, RunOutputResponse,
    StartRunResponse, StatusResponse,
};
use agent_console::gateway::SessionGateway;
use agent_console::{AppError, Result};

/// Record of one gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    StartRun {
        query: String,
    },
    GetStatus {
        run_id: String,
    },
    GetOutput {
        run_id: String,
    },
    GetPendingApproval {
        run_id: String,
    },
    SubmitDecision {
        run_id: String,
        approved: bool,
        reason: Option<String>,
    },
}

/// In-process gateway with per-operation response queues.
#[derive(Default)]
pub struct ScriptedGateway {
    start: Mutex<VecDeque<Result<StartRunResponse>>>,
    status: Mutex<VecDeque<Result<StatusResponse>>>,
    output: Mutex<VecDeque<Result<RunOutputResponse>>>,
    approval: Mutex<VecDeque<Result<PendingApprovalResponse>>>,
    decision: Mutex<VecDeque<Result<DecisionResponse>>>,
    /// Fallback status returned when the status queue is empty.
    default_status: Mutex<Option<StatusResponse>>,
    calls: Mutex<Vec<GatewayCall>>,
}

impl ScriptedGateway {
    pub fn script_start(&self, response: Result<StartRunResponse>) {
        self.start.lock().unwrap().push_back(response);
    }

    pub fn script_status(&self, response: Result<StatusResponse>) {
        self.status.lock().unwrap().push_back(response);
    }

    pub fn script_output(&self, response: Result<RunOutputResponse>) {
        self.output.lock().unwrap().push_back(response);
    }

    pub fn script_approval(&self, response: Result<PendingApprovalResponse>) {
        self.approval.lock().unwrap().push_back(response);
    }

    pub fn script_decision(&self, response: Result<DecisionResponse>) {
        self.decision.lock().unwrap().push_back(response);
    }

    /// Status returned for every sample once the queue is drained.
    pub fn set_default_status(&self, response: StatusResponse) {
        *self.default_status.lock().unwrap() = Some(response);
    }

    /// All recorded calls in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded `SubmitDecision` calls only.
    pub fn decision_calls(&self) -> Vec<GatewayCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, GatewayCall::SubmitDecision { .. }))
            .collect()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SessionGateway for ScriptedGateway {
    fn start_run(
        &self,
        query: &str,
    ) -> Pin<Box<dyn Future<Output = Result<StartRunResponse>> + Send + '_>> {
        let query = query.to_owned();
        Box::pin(async move {
            self.record(GatewayCall::StartRun { query });
            self.start
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::Gateway("no scripted start response".into())))
        })
    }

    fn get_status(
        &self,
        run_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<StatusResponse>> + Send + '_>> {
        let run_id = run_id.to_owned();
        Box::pin(async move {
            self.record(GatewayCall::GetStatus {
                run_id: run_id.clone(),
            });
            if let Some(response) = self.status.lock().unwrap().pop_front() {
                return response;
            }
            if let Some(default) = self.default_status.lock().unwrap().clone() {
                return Ok(default);
            }
            Err(AppError::Gateway(format!(
                "no scripted status for {run_id}"
            )))
        })
    }

    fn get_output(
        &self,
        run_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<RunOutputResponse>> + Send + '_>> {
        let run_id = run_id.to_owned();
        Box::pin(async move {
            self.record(GatewayCall::GetOutput {
                run_id: run_id.clone(),
            });
            self.output
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::Gateway("no scripted output response".into())))
        })
    }

    fn get_pending_approval(
        &self,
        run_id: &str,
    ) -> Pin<Box<dyn Future<Output = Result<PendingApprovalResponse>> + Send + '_>> {
        let run_id = run_id.to_owned();
        Box::pin(async move {
            self.record(GatewayCall::GetPendingApproval {
                run_id: run_id.clone(),
            });
            self.approval
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::NotFound("no scripted pending action".into())))
        })
    }

    fn submit_decision(
        &self,
        run_id: &str,
        approved: bool,
        reason: Option<String>,
    ) -> Pin<Box<dyn Future<Output = Result<DecisionResponse>> + Send + '_>> {
        let run_id = run_id.to_owned();
        Box::pin(async move {
            self.record(GatewayCall::SubmitDecision {
                run_id: run_id.clone(),
                approved,
                reason,
            });
            self.decision
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::Gateway("no scripted decision response".into())))
        })
    }
}

// ── Response builders ────────────────────────────────────────────────────────

pub fn start_response(run_id: &str) -> StartRunResponse {
    StartRunResponse {
        run_id: run_id.to_owned(),
        status: "RUNNING".to_owned(),
        message: "Agent execution started in background".to_owned(),
    }
}

pub fn status_response(run_id: &str, tag: &str) -> StatusResponse {
    StatusResponse {
        run_id: run_id.to_owned(),
        status: tag.to_owned(),
        message: None,
    }
}

pub fn agent_message(content: &str) -> OutputMessage {
    OutputMessage {
        kind: agent_console::gateway::types::MessageKind::AgentMessage,
        content: Some(content.to_owned()),
        tool_name: None,
        arguments: None,
        timestamp: Some("2026-08-23T10:00:00".to_owned()),
    }
}

pub fn output_with_messages(run_id: &str, messages: Vec<OutputMessage>) -> RunOutputResponse {
    RunOutputResponse {
        status: "COMPLETED".to_owned(),
        completed_at: Some("2026-08-23T10:00:05".to_owned()),
        run_id: Some(run_id.to_owned()),
        output: Some(RunOutput {
            messages,
            tool_call_count: 2,
            nodes_visited: vec!["planner".to_owned(), "executor".to_owned()],
            summary: Some("Task completed".to_owned()),
        }),
        message: None,
    }
}

/// Completed response whose output payload has not been published yet.
pub fn output_not_published(run_id: &str) -> RunOutputResponse {
    RunOutputResponse {
        status: "COMPLETED".to_owned(),
        completed_at: None,
        run_id: Some(run_id.to_owned()),
        output: None,
        message: Some("Execution still in progress".to_owned()),
    }
}

pub fn approval_response(run_id: &str, tool_name: &str) -> PendingApprovalResponse {
    PendingApprovalResponse {
        run_id: run_id.to_owned(),
        tool_name: tool_name.to_owned(),
        tool_arguments: serde_json::json!({ "target": "production" }),
        reasoning_summary: "This operation is irreversible.".to_owned(),
        timestamp: "2026-08-23T10:00:02".to_owned(),
    }
}

pub fn decision_response(run_id: &str, approved: bool) -> DecisionResponse {
    DecisionResponse {
        status: "resuming".to_owned(),
        run_id: run_id.to_owned(),
        approved,
        message: "Agent resuming in background".to_owned(),
    }
}
