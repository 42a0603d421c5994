use std::process::ExitCode;

use tokio::time::Instant;
use vinscan_config::ScanConfig;
use vinscan_core::{
    pipeline::{PipelineState, Resolution, ScanCandidate},
    presenter::{Presenter, TerminalPresenter},
    retry::RetryingLookup,
    validator,
};
use vinscan_model::{RawPayload, ValidationResult};

use crate::{backend::Backend, cli::CheckArgs};

/// One validated, retried lookup. Exit status is success only for a hit.
pub async fn run(
    args: CheckArgs,
    config: &ScanConfig,
    backend: &Backend,
    color: bool,
) -> anyhow::Result<ExitCode> {
    let candidate = ScanCandidate::new(RawPayload::from(args.vin.as_str()), Instant::now());
    let mut presenter = TerminalPresenter::stdout(color);

    let resolution = match validator::validate(&candidate.payload) {
        ValidationResult::Invalid(reason) => Resolution::Invalid(reason),
        ValidationResult::Valid(code) => {
            let lookup = RetryingLookup::new(backend.lookup_client(), config.retry.policy());
            let outcome = lookup.lookup_with_retry(&code).await;
            Resolution::Lookup { code, outcome }
        }
    };
    let found = matches!(&resolution, Resolution::Lookup { outcome, .. } if outcome.is_found());

    presenter
        .present(&PipelineState::Resolved {
            candidate,
            resolution,
        })
        .await;

    Ok(if found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
