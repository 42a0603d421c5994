use std::fmt;

use tokio::time::Instant;
use vinscan_model::{InvalidReason, LookupOutcome, RawPayload};

/// A payload paired with the moment it was pulled from the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCandidate {
    pub payload: RawPayload,
    pub observed_at: Instant,
}

impl ScanCandidate {
    pub fn new(payload: RawPayload, observed_at: Instant) -> Self {
        Self {
            payload,
            observed_at,
        }
    }
}

/// How a candidate was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Rejected by format validation; no lookup was made.
    Invalid(InvalidReason),
    /// Looked up under its normalized code.
    Lookup { code: String, outcome: LookupOutcome },
}

/// UI-visible pipeline state. Only the pipeline writes it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Idle,
    AwaitingCode,
    Checking {
        candidate: ScanCandidate,
        code: String,
    },
    Resolved {
        candidate: ScanCandidate,
        resolution: Resolution,
    },
}

/// Discriminant of [`PipelineState`], handy for assertions and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Idle,
    AwaitingCode,
    Checking,
    Resolved,
}

impl PipelineState {
    pub fn kind(&self) -> StateKind {
        match self {
            PipelineState::Idle => StateKind::Idle,
            PipelineState::AwaitingCode => StateKind::AwaitingCode,
            PipelineState::Checking { .. } => StateKind::Checking,
            PipelineState::Resolved { .. } => StateKind::Resolved,
        }
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKind::Idle => write!(f, "idle"),
            StateKind::AwaitingCode => write!(f, "awaiting code"),
            StateKind::Checking => write!(f, "checking"),
            StateKind::Resolved => write!(f, "resolved"),
        }
    }
}
