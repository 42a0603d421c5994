//! Rendering pipeline state for an operator.
//!
//! Presenters only ever see a borrowed snapshot of [`PipelineState`]; they
//! have no way to drive the pipeline.

use std::io::Write;

use async_trait::async_trait;
use crossterm::style::Stylize;
use tokio::sync::watch;
use tracing::{info, warn};
use vinscan_model::LookupOutcome;

use crate::pipeline::{PipelineState, Resolution};

#[async_trait]
pub trait Presenter: Send {
    /// Called after every state change, before the pipeline moves on.
    async fn present(&mut self, state: &PipelineState);
}

#[async_trait]
impl<P: Presenter + ?Sized> Presenter for Box<P> {
    async fn present(&mut self, state: &PipelineState) {
        (**self).present(state).await
    }
}

/// Colour family of a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Busy,
    Success,
    Warning,
    Failure,
}

/// Text an operator sees for `state`.
pub fn render(state: &PipelineState) -> (Tone, String) {
    match state {
        PipelineState::Idle => (Tone::Neutral, "Scanner stopped".to_string()),
        PipelineState::AwaitingCode => {
            (Tone::Neutral, "Ready to scan VIN QR Code...".to_string())
        }
        PipelineState::Checking { code, .. } => {
            (Tone::Busy, format!("CHECKING DATABASE... VIN: {code}"))
        }
        PipelineState::Resolved {
            candidate,
            resolution: Resolution::Invalid(reason),
        } => (
            Tone::Warning,
            format!(
                "Rejected scan {:?}: {reason}",
                candidate.payload.display_lossy()
            ),
        ),
        PipelineState::Resolved {
            resolution: Resolution::Lookup { code, outcome },
            ..
        } => match outcome {
            LookupOutcome::Found(record) => (
                Tone::Success,
                format!(
                    "VIN: {code} | {} | Scan date: {}",
                    outcome.summary(),
                    record.recorded_at.format("%Y-%m-%d %H:%M:%S")
                ),
            ),
            LookupOutcome::NotFound => {
                (Tone::Failure, format!("VIN: {code} | {}", outcome.summary()))
            }
            LookupOutcome::TransientError(_) | LookupOutcome::FatalError(_) => {
                (Tone::Warning, format!("VIN: {code} | {}", outcome.summary()))
            }
        },
    }
}

/// Writes one line per state change, coloured unless told otherwise.
#[derive(Debug)]
pub struct TerminalPresenter<W> {
    out: W,
    color: bool,
}

impl TerminalPresenter<std::io::Stdout> {
    pub fn stdout(color: bool) -> Self {
        Self::new(std::io::stdout(), color)
    }
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, tone: Tone, line: String) -> std::io::Result<()> {
        if !self.color {
            return writeln!(self.out, "{line}");
        }
        let styled = match tone {
            Tone::Neutral => line.white(),
            Tone::Busy => line.yellow().bold(),
            Tone::Success => line.green().bold(),
            Tone::Warning => line.magenta(),
            Tone::Failure => line.red().bold(),
        };
        writeln!(self.out, "{styled}")
    }
}

#[async_trait]
impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    async fn present(&mut self, state: &PipelineState) {
        let (tone, line) = render(state);
        if let Err(err) = self.write_line(tone, line).and_then(|_| self.out.flush()) {
            warn!(error = %err, "failed to write scan status");
        }
    }
}

/// Publishes every state on a watch channel for other tasks to observe.
#[derive(Debug)]
pub struct WatchPresenter {
    tx: watch::Sender<PipelineState>,
}

impl WatchPresenter {
    pub fn channel() -> (Self, watch::Receiver<PipelineState>) {
        let (tx, rx) = watch::channel(PipelineState::Idle);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Presenter for WatchPresenter {
    async fn present(&mut self, state: &PipelineState) {
        // No receivers left is fine; the value is still stored.
        self.tx.send_replace(state.clone());
    }
}

/// Emits each state as a tracing event. Used in headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

#[async_trait]
impl Presenter for LogPresenter {
    async fn present(&mut self, state: &PipelineState) {
        let (_, line) = render(state);
        info!(state = %state.kind(), "{line}");
    }
}
