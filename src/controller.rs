//! Session controller: the client-side orchestration state machine.
//!
//! Owns the active run, its lifecycle phase, the pending critical action,
//! and the message timeline. Interprets classified status samples from the
//! poll scheduler, drives the gateway, and exposes the submit and decision
//! entry points.
//!
//! All state is owned by one controller instance and mutated only from the
//! single event-processing task that drives it (`&mut self` on every entry
//! point); samples, outputs, and decisions correlated to a run ID that is
//! no longer active are discarded without side effects.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::gateway::types::RunStatus;
use crate::gateway::SessionGateway;
use crate::models::approval::PendingApproval;
use crate::models::run::{Run, RunPhase};
use crate::models::timeline::{Author, Timeline};
use crate::scheduler::{PollSample, PollScheduler};

/// Capacity of the sample channel between scheduler and controller.
const SAMPLE_QUEUE_CAPACITY: usize = 32;

/// Synthesized agent entry appended when a run cannot be started.
const START_FAILED_BODY: &str = "Failed to start agent. Please try again.";
/// Synthesized agent entry appended on a remote-declared failure.
const RUN_FAILED_BODY: &str = "An error occurred during execution.";
/// Synthesized agent entry appended after an approval is granted.
const APPROVED_BODY: &str = "Action approved. Continuing execution...";
/// Synthesized agent entry appended after a denial.
const REJECTED_BODY: &str = "Action rejected. Task cancelled.";

/// Outcome of submitting a new operator query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Run created; the scheduler is sampling it.
    Started {
        /// Identifier assigned by the remote service.
        run_id: String,
    },
    /// The start call failed; the controller is back in `Idle`.
    StartFailed,
}

/// Outcome of processing one status sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Sample was for a stale run or a phase that cannot accept it.
    Discarded,
    /// Run is still executing; polling continues.
    StillActive,
    /// Run suspended on a critical action; the scheduler is disarmed and
    /// the pending approval is stored.
    Suspended,
    /// Completion declared but no qualifying output yet; polling continues.
    AwaitingOutput,
    /// Run completed; the terminal agent entry was appended.
    Completed {
        /// Optional run summary from the output payload.
        summary: Option<String>,
        /// Number of tool invocations reported for the run.
        tool_call_count: u32,
    },
    /// Run failed; a failure entry was appended.
    Failed,
}

/// Outcome of an operator approval decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// Approval submitted; execution resumes and the scheduler is re-armed.
    Approved,
    /// Denial submitted; the run is cancelled and released.
    Denied,
    /// Denial requires a non-empty reason; no transition occurred and no
    /// decision was submitted.
    ReasonRequired,
    /// A decision was already submitted for this run.
    AlreadyDecided,
    /// No critical action is currently pending.
    NoPendingApproval,
    /// The submission failed; the decision controls are re-enabled.
    SubmitFailed,
}

/// Client-side orchestration state machine for one operator session.
pub struct SessionController {
    gateway: Arc<dyn SessionGateway>,
    scheduler: PollScheduler,
    run: Option<Run>,
    pending: Option<PendingApproval>,
    /// Idempotency guard: run ID a decision has been submitted for.
    decided_run: Option<String>,
    timeline: Timeline,
}

impl SessionController {
    /// Construct an idle controller and the sample channel its scheduler
    /// feeds. The caller drives the returned receiver from its event loop
    /// and passes each sample to [`handle_sample`](Self::handle_sample).
    #[must_use]
    pub fn new(
        gateway: Arc<dyn SessionGateway>,
        poll_interval: Duration,
    ) -> (Self, mpsc::Receiver<PollSample>) {
        let (sample_tx, sample_rx) = mpsc::channel(SAMPLE_QUEUE_CAPACITY);
        let scheduler = PollScheduler::new(Arc::clone(&gateway), sample_tx, poll_interval);
        let controller = Self {
            gateway,
            scheduler,
            run: None,
            pending: None,
            decided_run: None,
            timeline: Timeline::default(),
        };
        (controller, sample_rx)
    }

    /// Submit a new operator query, starting a remote run.
    ///
    /// Any previous run is abandoned first: the scheduler is disarmed and
    /// the run ID and pending approval are released. An unresolved approval
    /// is never resolved server-side in that case; abandonment is the
    /// documented behavior.
    pub async fn submit(&mut self, query: &str) -> SubmitOutcome {
        self.abandon_run();
        self.timeline.append(Author::Human, query);

        let result = self.gateway.start_run(query).await;
        match result {
            Ok(response) => {
                info!(run_id = %response.run_id, "run started");
                self.scheduler.arm(&response.run_id);
                self.run = Some(Run::new(response.run_id.clone()));
                SubmitOutcome::Started {
                    run_id: response.run_id,
                }
            }
            Err(err) => {
                warn!(%err, "failed to start run");
                self.timeline.append(Author::Agent, START_FAILED_BODY);
                SubmitOutcome::StartFailed
            }
        }
    }

    /// Process one classified status sample from the poll scheduler.
    pub async fn handle_sample(&mut self, sample: PollSample) -> SampleOutcome {
        let Some(run) = self.run.as_ref() else {
            debug!(run_id = %sample.run_id, "discarding sample for released run");
            return SampleOutcome::Discarded;
        };
        if run.run_id != sample.run_id {
            debug!(
                sampled = %sample.run_id,
                active = %run.run_id,
                "discarding stale sample"
            );
            return SampleOutcome::Discarded;
        }

        match sample.status {
            RunStatus::Active => SampleOutcome::StillActive,
            RunStatus::Unknown => {
                // The remote contract may introduce unseen tags; keep polling.
                debug!(run_id = %sample.run_id, "unknown status tag; continuing to poll");
                SampleOutcome::StillActive
            }
            RunStatus::AwaitingApproval => self.handle_suspension(&sample.run_id).await,
            RunStatus::Completed => self.handle_completion(&sample.run_id).await,
            RunStatus::Failed => self.handle_failure(),
        }
    }

    /// Submit the operator's decision for the pending critical action.
    ///
    /// A denial requires a non-empty reason; without one no transition
    /// occurs and no decision is submitted. Re-entrant submission for a run
    /// that already has a decision in flight is rejected.
    pub async fn decide(&mut self, approved: bool, reason: Option<&str>) -> DecisionOutcome {
        let Some(pending) = self.pending.as_ref() else {
            return DecisionOutcome::NoPendingApproval;
        };
        let run_id = pending.run_id.clone();

        if self.decided_run.as_deref() == Some(run_id.as_str()) {
            debug!(%run_id, "decision already submitted for this run");
            return DecisionOutcome::AlreadyDecided;
        }

        let reason = reason.map(str::trim).filter(|reason| !reason.is_empty());
        if !approved && reason.is_none() {
            return DecisionOutcome::ReasonRequired;
        }

        self.decided_run = Some(run_id.clone());
        let result = self
            .gateway
            .submit_decision(&run_id, approved, reason.map(ToOwned::to_owned))
            .await;

        match result {
            Ok(_ack) => {
                self.pending = None;
                if approved {
                    info!(%run_id, "critical action approved; resuming");
                    self.timeline.append(Author::Agent, APPROVED_BODY);
                    if let Some(run) = self.run.as_mut() {
                        run.phase = RunPhase::Active;
                    }
                    // Never assume the pre-suspension timer survived.
                    self.scheduler.arm(&run_id);
                    DecisionOutcome::Approved
                } else {
                    info!(%run_id, "critical action denied; run cancelled");
                    self.timeline.append(Author::Agent, REJECTED_BODY);
                    self.release_run(RunPhase::Idle);
                    DecisionOutcome::Denied
                }
            }
            Err(err) => {
                // Surface the failure and re-enable the decision controls.
                warn!(%run_id, %err, "decision submission failed");
                self.decided_run = None;
                DecisionOutcome::SubmitFailed
            }
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.run.as_ref().map_or(RunPhase::Idle, |run| run.phase)
    }

    /// The active run ID, if a run is live.
    #[must_use]
    pub fn active_run_id(&self) -> Option<&str> {
        self.run.as_ref().map(|run| run.run_id.as_str())
    }

    /// The critical action awaiting a decision, if any.
    #[must_use]
    pub fn pending_approval(&self) -> Option<&PendingApproval> {
        self.pending.as_ref()
    }

    /// The append-only message timeline.
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Whether the poll scheduler currently has a live sampling task.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.scheduler.is_armed()
    }

    /// The run ID the scheduler is armed for, if any.
    #[must_use]
    pub fn polling_run_id(&self) -> Option<&str> {
        self.scheduler.armed_run_id()
    }

    async fn handle_suspension(&mut self, run_id: &str) -> SampleOutcome {
        if self.pending.is_some() {
            // Already suspended; a queued duplicate sample carries no news.
            return SampleOutcome::Discarded;
        }
        if !self.phase().can_transition_to(RunPhase::AwaitingApproval) {
            debug!(run_id, phase = ?self.phase(), "suspension sample not applicable");
            return SampleOutcome::Discarded;
        }

        self.scheduler.disarm();

        let result = self.gateway.get_pending_approval(run_id).await;
        match result {
            Ok(response) => {
                if self.active_run_id() != Some(run_id) {
                    debug!(run_id, "run released while fetching pending action");
                    return SampleOutcome::Discarded;
                }
                info!(run_id, tool = %response.tool_name, "run suspended on critical action");
                self.pending = Some(PendingApproval::from(response));
                if let Some(run) = self.run.as_mut() {
                    run.phase = RunPhase::AwaitingApproval;
                }
                SampleOutcome::Suspended
            }
            Err(err) => {
                // Transient: resume polling and retry on the next sample.
                warn!(run_id, %err, "failed to fetch pending action");
                self.scheduler.arm(run_id);
                SampleOutcome::StillActive
            }
        }
    }

    async fn handle_completion(&mut self, run_id: &str) -> SampleOutcome {
        if self.phase() != RunPhase::Active {
            debug!(run_id, phase = ?self.phase(), "completion sample not applicable");
            return SampleOutcome::Discarded;
        }
        let result = self.gateway.get_output(run_id).await;
        match result {
            Ok(response) => {
                if self.active_run_id() != Some(run_id) {
                    debug!(run_id, "run released while fetching output");
                    return SampleOutcome::Discarded;
                }
                let Some(body) = response.last_agent_message() else {
                    // Known eventual-consistency gap: completion is declared
                    // before the output payload is published. Not terminal yet.
                    debug!(run_id, "completed status without qualifying output; still polling");
                    return SampleOutcome::AwaitingOutput;
                };

                info!(run_id, "run completed");
                self.timeline.append(Author::Agent, body);
                let (summary, tool_call_count) = response
                    .output
                    .as_ref()
                    .map_or((None, 0), |output| {
                        (output.summary.clone(), output.tool_call_count)
                    });
                self.release_run(RunPhase::Completed);
                SampleOutcome::Completed {
                    summary,
                    tool_call_count,
                }
            }
            Err(err) => {
                // Transient: the next sample retries the fetch.
                warn!(run_id, %err, "failed to fetch run output");
                SampleOutcome::StillActive
            }
        }
    }

    fn handle_failure(&mut self) -> SampleOutcome {
        if let Some(run) = self.run.as_ref() {
            info!(run_id = %run.run_id, "run failed");
        }
        self.timeline.append(Author::Agent, RUN_FAILED_BODY);
        self.release_run(RunPhase::Failed);
        SampleOutcome::Failed
    }

    /// Disarm, flush terminal bookkeeping, and return to `Idle`.
    fn release_run(&mut self, terminal: RunPhase) {
        if let Some(run) = self.run.as_mut() {
            if run.phase.can_transition_to(terminal) {
                run.phase = terminal;
            }
        }
        self.scheduler.disarm();
        self.run = None;
        self.pending = None;
        self.decided_run = None;
    }

    /// Abandon any live run without resolving its pending approval.
    fn abandon_run(&mut self) {
        if let Some(run) = self.run.as_ref() {
            info!(run_id = %run.run_id, "abandoning previous run");
        }
        self.scheduler.disarm();
        self.run = None;
        self.pending = None;
        self.decided_run = None;
    }
}
