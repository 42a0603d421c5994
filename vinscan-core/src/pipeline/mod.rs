//! Scan-to-verification state machine.
//!
//! `Idle → AwaitingCode → Checking → Resolved → AwaitingCode | Idle`
//!
//! One task drives everything: pull a frame, validate the first payload,
//! look it up, show the result, wait out the display delay, repeat. Frames
//! are not pulled while a lookup or a display delay is in progress, so they
//! are dropped rather than queued. A resolved code is ignored for the
//! cooldown window after it settles so holding a sticker in front of the
//! camera does not trigger a stream of lookups.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use vinscan_model::{LookupOutcome, ValidationResult};

use crate::{
    error::{Result, ScanError},
    lookup::LookupClient,
    presenter::Presenter,
    reader::CodeReader,
    retry::RetryingLookup,
    validator,
};

mod state;

pub use state::{PipelineState, Resolution, ScanCandidate, StateKind};

/// Timing knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineSettings {
    /// How long a resolved code is ignored when scanned again.
    pub cooldown: Duration,
    /// How long a resolved state stays on screen before scanning resumes.
    pub display_delay: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(2),
            display_delay: Duration::from_secs(1),
        }
    }
}

/// Counters for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Frames pulled from the reader, empty ones included.
    pub frames: u64,
    /// Frames that carried at least one payload.
    pub candidates: u64,
    /// Repeats ignored inside the cooldown window.
    pub suppressed: u64,
    /// Payloads rejected by the validator.
    pub invalid: u64,
    pub lookups: u64,
    pub found: u64,
    pub not_found: u64,
    /// Lookups that ended in a transient or fatal error.
    pub failed: u64,
}

impl ScanSummary {
    fn record(&mut self, outcome: &LookupOutcome) {
        self.lookups += 1;
        match outcome {
            LookupOutcome::Found(_) => self.found += 1,
            LookupOutcome::NotFound => self.not_found += 1,
            LookupOutcome::TransientError(_) | LookupOutcome::FatalError(_) => {
                self.failed += 1
            }
        }
    }
}

#[derive(Debug)]
struct Cooldown {
    code: String,
    resolved_at: Instant,
}

/// Drives a [`CodeReader`] through validation, lookup and presentation.
///
/// [`run`](Self::run) consumes the pipeline, so the reader (and whatever
/// device it holds) is dropped on every exit path.
#[derive(Debug)]
pub struct ScanPipeline<R, C, P> {
    reader: R,
    lookup: RetryingLookup<C>,
    presenter: P,
    settings: PipelineSettings,
    state: PipelineState,
    last_resolved: Option<Cooldown>,
    summary: ScanSummary,
}

impl<R, C, P> ScanPipeline<R, C, P>
where
    R: CodeReader,
    C: LookupClient,
    P: Presenter,
{
    /// Assemble a pipeline. Nothing is read until [`run`](Self::run).
    pub fn new(
        reader: R,
        lookup: RetryingLookup<C>,
        presenter: P,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            reader,
            lookup,
            presenter,
            settings,
            state: PipelineState::Idle,
            last_resolved: None,
            summary: ScanSummary::default(),
        }
    }

    /// The state most recently handed to the presenter.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Scan until `stop` fires or the reader fails.
    ///
    /// `stop` is honoured while waiting for a frame or sitting in the display
    /// delay, never in the middle of a lookup. Only a reader failure is
    /// returned as an error; the pipeline is `Idle` either way.
    pub async fn run(mut self, stop: CancellationToken) -> Result<ScanSummary> {
        info!(
            reader = %self.reader.describe(),
            cooldown_ms = self.settings.cooldown.as_millis() as u64,
            display_delay_ms = self.settings.display_delay.as_millis() as u64,
            max_attempts = self.lookup.policy().max_attempts,
            "scan pipeline starting"
        );
        self.transition(PipelineState::AwaitingCode).await;

        while !stop.is_cancelled() {
            let frame = tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                frame = self.reader.next_frame() => frame,
            };

            let payloads = match frame {
                Ok(payloads) => payloads,
                Err(err) => {
                    error!(error = %err, "code reader failed, stopping scan");
                    self.transition(PipelineState::Idle).await;
                    return Err(ScanError::Device(err));
                }
            };
            self.summary.frames += 1;

            let mut payloads = payloads.into_iter();
            let Some(payload) = payloads.next() else {
                continue;
            };
            let dropped = payloads.count();
            if dropped > 0 {
                debug!(dropped, "frame held several codes, keeping the first");
            }

            let candidate = ScanCandidate::new(payload, Instant::now());
            self.summary.candidates += 1;
            if !self.settle(candidate).await {
                continue;
            }

            let cancelled = tokio::select! {
                biased;
                _ = stop.cancelled() => true,
                _ = tokio::time::sleep(self.settings.display_delay) => false,
            };
            if cancelled {
                break;
            }
            self.transition(PipelineState::AwaitingCode).await;
        }

        info!(summary = ?self.summary, "scan pipeline stopped");
        self.transition(PipelineState::Idle).await;
        Ok(self.summary)
    }

    /// Validate and, when needed, look up one candidate. Returns `false` when
    /// the candidate was suppressed by the cooldown and nothing changed.
    async fn settle(&mut self, candidate: ScanCandidate) -> bool {
        let code = match validator::validate(&candidate.payload) {
            ValidationResult::Valid(code) => code,
            ValidationResult::Invalid(reason) => {
                info!(
                    payload = %candidate.payload.display_lossy(),
                    reason = %reason,
                    "rejected payload"
                );
                self.summary.invalid += 1;
                self.transition(PipelineState::Resolved {
                    candidate,
                    resolution: Resolution::Invalid(reason),
                })
                .await;
                return true;
            }
        };

        if self.in_cooldown(&code, candidate.observed_at) {
            debug!(code = %code, "duplicate scan inside cooldown, ignoring");
            self.summary.suppressed += 1;
            return false;
        }

        self.transition(PipelineState::Checking {
            candidate: candidate.clone(),
            code: code.clone(),
        })
        .await;

        let outcome = self.lookup.lookup_with_retry(&code).await;
        self.summary.record(&outcome);
        match &outcome {
            LookupOutcome::Found(record) => {
                info!(code = %code, description = %record.description, "VIN found")
            }
            LookupOutcome::NotFound => info!(code = %code, "VIN not found"),
            LookupOutcome::TransientError(detail) => {
                warn!(code = %code, error = %detail, "lookup failed")
            }
            LookupOutcome::FatalError(err) => {
                warn!(code = %code, error = %err, "lookup failed")
            }
        }

        self.last_resolved = Some(Cooldown {
            code: code.clone(),
            resolved_at: Instant::now(),
        });
        self.transition(PipelineState::Resolved {
            candidate,
            resolution: Resolution::Lookup { code, outcome },
        })
        .await;
        true
    }

    fn in_cooldown(&self, code: &str, observed_at: Instant) -> bool {
        self.last_resolved.as_ref().is_some_and(|last| {
            last.code == code
                && observed_at.saturating_duration_since(last.resolved_at)
                    < self.settings.cooldown
        })
    }

    async fn transition(&mut self, next: PipelineState) {
        debug!(from = %self.state.kind(), to = %next.kind(), "pipeline transition");
        self.state = next;
        self.presenter.present(&self.state).await;
    }
}
