//! Pending critical action awaiting a human decision.

use serde::{Deserialize, Serialize};

use crate::gateway::types::PendingApprovalResponse;

/// A critical action proposed by the agent, suspended until the operator
/// approves or denies it.
///
/// Exists only while the run is in the `AwaitingApproval` phase. At most one
/// pending approval exists per run, always tied to the currently active run
/// ID; decisions received for a stale run ID are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PendingApproval {
    /// Owning run identifier.
    pub run_id: String,
    /// Name of the operation the agent wants to perform.
    pub tool_name: String,
    /// Opaque structured arguments for the operation.
    pub tool_arguments: serde_json::Value,
    /// Natural-language justification supplied by the agent.
    pub reasoning_summary: String,
    /// Remote-reported proposal timestamp, carried verbatim.
    pub timestamp: String,
}

impl From<PendingApprovalResponse> for PendingApproval {
    fn from(resp: PendingApprovalResponse) -> Self {
        Self {
            run_id: resp.run_id,
            tool_name: resp.tool_name,
            tool_arguments: resp.tool_arguments,
            reasoning_summary: resp.reasoning_summary,
            timestamp: resp.timestamp,
        }
    }
}
