//! Single-armed poll scheduler for run status sampling.
//!
//! The scheduler owns at most one live sampling task at a time, bound to at
//! most one run ID. [`PollScheduler::arm`] on an already-armed scheduler
//! disarms the previous handle first, so two timers can never sample
//! concurrently. A resume after approval must re-arm explicitly rather
//! than assume the previous timer survived the suspension.
//!
//! Samples are delivered to the session controller via a
//! `tokio::sync::mpsc` channel. The scheduler holds no business logic: each
//! tick fetches the status, classifies it, and hands the classification to
//! the controller, which decides whether to disarm.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};

use crate::gateway::types::RunStatus;
use crate::gateway::SessionGateway;

/// One classified status sample handed to the session controller.
#[derive(Debug, Clone)]
pub struct PollSample {
    /// Run the sample was taken for. The controller discards samples whose
    /// run ID no longer matches its active run.
    pub run_id: String,
    /// Classified status.
    pub status: RunStatus,
}

/// Identity of the live sampling task.
///
/// At most one handle exists at a time; it is invalidated before any new
/// handle for the same or a different run is created.
struct PollHandle {
    run_id: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Recurring status sampler bound to at most one active run.
pub struct PollScheduler {
    gateway: Arc<dyn SessionGateway>,
    sample_tx: mpsc::Sender<PollSample>,
    interval: Duration,
    handle: Option<PollHandle>,
}

impl PollScheduler {
    /// Construct a disarmed scheduler.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn SessionGateway>,
        sample_tx: mpsc::Sender<PollSample>,
        interval: Duration,
    ) -> Self {
        Self {
            gateway,
            sample_tx,
            interval,
            handle: None,
        }
    }

    /// Start sampling the given run at the fixed interval.
    ///
    /// Any previously armed handle is disarmed first, including handles for
    /// stale runs.
    pub fn arm(&mut self, run_id: &str) {
        self.disarm();

        let cancel = CancellationToken::new();
        let task = tokio::spawn(
            Self::run(
                Arc::clone(&self.gateway),
                run_id.to_owned(),
                self.interval,
                self.sample_tx.clone(),
                cancel.clone(),
            )
            .instrument(info_span!("poll_scheduler", run_id)),
        );

        debug!(run_id, "poll scheduler armed");
        self.handle = Some(PollHandle {
            run_id: run_id.to_owned(),
            cancel,
            task,
        });
    }

    /// Cancel any live sampling task unconditionally.
    ///
    /// A sample already issued before disarm may still resolve; the
    /// controller's stale-response guard discards it.
    pub fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!(run_id = %handle.run_id, "poll scheduler disarmed");
            handle.cancel.cancel();
            drop(handle.task);
        }
    }

    /// Whether a sampling task is currently armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// The run ID the scheduler is currently armed for, if any.
    #[must_use]
    pub fn armed_run_id(&self) -> Option<&str> {
        self.handle.as_ref().map(|handle| handle.run_id.as_str())
    }

    /// Core sampling loop. Sequential awaits guarantee at most one
    /// outstanding sample cycle per armed run.
    async fn run(
        gateway: Arc<dyn SessionGateway>,
        run_id: String,
        interval: Duration,
        sample_tx: mpsc::Sender<PollSample>,
        cancel: CancellationToken,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Consume the immediate first tick so the first sample lands one
        // full interval after arming.
        ticker.tick().await;

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!(%run_id, "sampling task cancelled");
                    return;
                }
                _ = ticker.tick() => {}
            }

            let result = tokio::select! {
                () = cancel.cancelled() => return,
                result = gateway.get_status(&run_id) => result,
            };

            match result {
                Ok(response) => {
                    let status = RunStatus::classify(&response.status);
                    let sample = PollSample {
                        run_id: run_id.clone(),
                        status,
                    };
                    if sample_tx.send(sample).await.is_err() {
                        // Controller dropped its receiver; nothing left to sample for.
                        return;
                    }
                }
                Err(err) => {
                    // Transient: discard the sample and self-heal on the next tick.
                    warn!(%run_id, %err, "status sample failed");
                }
            }
        }
    }
}

impl Drop for PollScheduler {
    /// Cancel the live sampling task when the scheduler is dropped.
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.cancel.cancel();
        }
    }
}
