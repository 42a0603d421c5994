use std::process::ExitCode;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use vinscan_config::{ScanConfig, SourceKind};
use vinscan_core::{
    pipeline::ScanPipeline,
    presenter::{LogPresenter, Presenter, TerminalPresenter},
    reader::{CodeReader, FrameDirReader, LineReader},
    retry::RetryingLookup,
};

use crate::{backend::Backend, cli::ScanArgs};

/// Exit status when the code reader cannot be acquired or is lost mid-run.
pub const DEVICE_FAILURE: u8 = 2;

pub async fn run(
    args: ScanArgs,
    config: &ScanConfig,
    backend: &Backend,
    color: bool,
) -> anyhow::Result<ExitCode> {
    let reader = match open_reader(config) {
        Ok(reader) => reader,
        Err(err) => {
            error!(error = %format!("{err:#}"), "code reader unavailable");
            eprintln!("{err:#}");
            return Ok(ExitCode::from(DEVICE_FAILURE));
        }
    };
    let presenter: Box<dyn Presenter> = if args.headless {
        Box::new(LogPresenter)
    } else {
        Box::new(TerminalPresenter::stdout(color))
    };

    let pipeline = ScanPipeline::new(
        reader,
        RetryingLookup::new(backend.lookup_client(), config.retry.policy()),
        presenter,
        config.pipeline.settings(),
    );

    let stop = CancellationToken::new();
    let ctrl_c = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("stop requested");
            ctrl_c.cancel();
        }
    });

    match pipeline.run(stop).await {
        Ok(summary) => {
            info!(
                lookups = summary.lookups,
                found = summary.found,
                not_found = summary.not_found,
                failed = summary.failed,
                invalid = summary.invalid,
                suppressed = summary.suppressed,
                "scan finished"
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            error!(error = %err, "scan aborted");
            eprintln!("{err}");
            Ok(ExitCode::from(DEVICE_FAILURE))
        }
    }
}

fn open_reader(config: &ScanConfig) -> anyhow::Result<Box<dyn CodeReader>> {
    match config.source.kind {
        SourceKind::Stdin => Ok(Box::new(LineReader::stdin())),
        SourceKind::Dir => {
            let dir = config
                .source
                .frame_dir()
                .context("source.frame_dir is not set")?;
            let reader = FrameDirReader::open(dir, config.source.poll_interval())
                .with_context(|| format!("cannot open frame directory {}", dir.display()))?;
            Ok(Box::new(reader))
        }
    }
}
