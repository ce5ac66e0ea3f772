//! Wire types for the remote session gateway.
//!
//! Field names follow the reference service contract, which reports run
//! identifiers as `thread_id` and statuses as upper-case string tags.

use serde::{Deserialize, Serialize};

/// Classified run status as sampled from the remote service.
///
/// The remote contract may introduce unseen tags, so classification always
/// falls back to [`RunStatus::Unknown`] rather than failing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Run is executing; keep polling.
    Active,
    /// Run is suspended on a critical action.
    AwaitingApproval,
    /// Run declared complete; output may lag behind.
    Completed,
    /// Run terminated with a remote-declared failure.
    Failed,
    /// Unrecognized status tag; treated as transient.
    Unknown,
}

impl RunStatus {
    /// Classify a raw status tag from the wire.
    ///
    /// Failure tags carry an appended detail string (`ERROR: ...`), so the
    /// failure arm matches on prefix.
    #[must_use]
    pub fn classify(tag: &str) -> Self {
        match tag {
            "RUNNING" => Self::Active,
            "AWAITING_APPROVAL" => Self::AwaitingApproval,
            "COMPLETED" => Self::Completed,
            tag if tag.starts_with("ERROR") => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Request body for starting a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartRunRequest {
    /// Natural-language task for the agent.
    pub query: String,
}

/// Response from `StartRun`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartRunResponse {
    /// Identifier assigned to the new run.
    #[serde(rename = "thread_id")]
    pub run_id: String,
    /// Initial status tag.
    pub status: String,
    /// Human-readable acknowledgement.
    pub message: String,
}

/// Response from `GetStatus`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    /// Run the status refers to.
    #[serde(rename = "thread_id")]
    pub run_id: String,
    /// Raw status tag; classify with [`RunStatus::classify`].
    pub status: String,
    /// Optional human-readable detail.
    #[serde(default)]
    pub message: Option<String>,
}

/// Kind discriminator for an output message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Natural-language message authored by the agent.
    #[serde(rename = "ai_message")]
    AgentMessage,
    /// Record of a tool invocation.
    ToolCall,
    /// Record of a tool result.
    ToolResult,
    /// Unrecognized kind; ignored when selecting the terminal message.
    #[serde(other)]
    Unknown,
}

/// One message in a run's completed output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputMessage {
    /// Message kind.
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Natural-language content, present for agent messages.
    #[serde(default)]
    pub content: Option<String>,
    /// Tool name for `tool_call` entries.
    #[serde(default)]
    pub tool_name: Option<String>,
    /// Tool arguments for `tool_call` entries.
    #[serde(default)]
    pub arguments: Option<serde_json::Value>,
    /// Remote-reported timestamp, carried verbatim.
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Structured output payload published once a run completes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunOutput {
    /// Full ordered message list for the run.
    #[serde(default)]
    pub messages: Vec<OutputMessage>,
    /// Total number of tool invocations.
    #[serde(rename = "tool_calls", default)]
    pub tool_call_count: u32,
    /// Graph nodes visited during execution.
    #[serde(default)]
    pub nodes_visited: Vec<String>,
    /// Optional natural-language run summary.
    #[serde(default)]
    pub summary: Option<String>,
}

/// Response from `GetOutput`.
///
/// The service declares completion before the output payload is fully
/// published, so `output` may be absent or empty on early fetches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunOutputResponse {
    /// Raw status tag at fetch time.
    pub status: String,
    /// Completion timestamp, when terminal.
    #[serde(default)]
    pub completed_at: Option<String>,
    /// Run the output belongs to.
    #[serde(rename = "thread_id", default)]
    pub run_id: Option<String>,
    /// Structured output, once published.
    #[serde(default)]
    pub output: Option<RunOutput>,
    /// Optional human-readable detail.
    #[serde(default)]
    pub message: Option<String>,
}

impl RunOutputResponse {
    /// The last qualifying agent message, used as the terminal timeline body.
    ///
    /// A message qualifies when it is an agent message with non-empty
    /// content. Returns `None` when the output payload is not yet
    /// populated, which the controller treats as "not terminal yet".
    #[must_use]
    pub fn last_agent_message(&self) -> Option<&str> {
        self.output.as_ref()?.messages.iter().rev().find_map(|msg| {
            if msg.kind != MessageKind::AgentMessage {
                return None;
            }
            msg.content
                .as_deref()
                .filter(|content| !content.trim().is_empty())
        })
    }
}

/// Response from `GetPendingApproval`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingApprovalResponse {
    /// Run the proposal belongs to.
    #[serde(rename = "thread_id")]
    pub run_id: String,
    /// Name of the proposed operation.
    pub tool_name: String,
    /// Opaque structured arguments.
    pub tool_arguments: serde_json::Value,
    /// Natural-language justification.
    pub reasoning_summary: String,
    /// Remote-reported proposal timestamp.
    pub timestamp: String,
}

/// Request body for submitting an approval decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionRequest {
    /// Run the decision applies to.
    #[serde(rename = "thread_id")]
    pub run_id: String,
    /// Whether the critical action may proceed.
    pub approved: bool,
    /// Operator-supplied reason; required for denials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// Response from `SubmitDecision`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionResponse {
    /// Acknowledgement status tag.
    pub status: String,
    /// Run the decision applied to.
    #[serde(rename = "thread_id")]
    pub run_id: String,
    /// Echo of the decision.
    pub approved: bool,
    /// Human-readable acknowledgement.
    pub message: String,
}
