//! Run model and lifecycle helpers.

use serde::{Deserialize, Serialize};

/// Lifecycle phase for a remote agent run.
///
/// `Idle` is both the initial state and the reentrant terminal state: a
/// finished run returns the controller to `Idle`. `Completed` and `Failed`
/// are observed transiently while flushing terminal side effects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// No active run.
    Idle,
    /// Run executing on the remote service; scheduler is sampling.
    Active,
    /// Run suspended on a critical action awaiting a human decision.
    AwaitingApproval,
    /// Run finished and its output has been flushed.
    Completed,
    /// Run terminated with a remote-declared failure.
    Failed,
}

impl RunPhase {
    /// Determine whether a lifecycle transition is permitted.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Active)
                | (
                    Self::Active,
                    Self::AwaitingApproval | Self::Completed | Self::Failed
                )
                | (Self::AwaitingApproval, Self::Active | Self::Idle)
                | (Self::Completed | Self::Failed, Self::Idle)
        )
    }

    /// Whether this phase ends polling for the run.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One remote agent execution, identified by a gateway-assigned run ID.
///
/// Owned exclusively by the session controller for the duration of the run
/// and destroyed (the ID released) on terminal phase or abandonment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Run {
    /// Opaque identifier assigned by the remote service on start.
    pub run_id: String,
    /// Current lifecycle phase.
    pub phase: RunPhase,
}

impl Run {
    /// Construct a newly started run in the `Active` phase.
    #[must_use]
    pub fn new(run_id: String) -> Self {
        Self {
            run_id,
            phase: RunPhase::Active,
        }
    }
}
