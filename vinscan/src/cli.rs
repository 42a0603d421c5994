use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vinscan_config::{ScanConfig, SourceKind};

#[derive(Parser, Debug)]
#[command(name = "vinscan", version)]
#[command(about = "Scan VIN QR codes and verify them against the record store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Config file (TOML or JSON); overrides VINSCAN_CONFIG_PATH
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Record store base URL; overrides API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Use a local JSON record store instead of the remote API
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Do not read a .env file
    #[arg(long, global = true, default_value_t = false)]
    pub no_env_file: bool,

    /// Plain status lines without colour
    #[arg(long, global = true, default_value_t = false)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan continuously until Ctrl-C or the reader fails
    Scan(ScanArgs),
    /// Look up a single VIN
    Check(CheckArgs),
    /// Add or update a VIN in the record store
    Enroll(EnrollArgs),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Where codes come from: `stdin` (handheld scanner) or `dir` (camera frames)
    #[arg(long, value_parser = parse_source)]
    pub source: Option<SourceKind>,

    /// Directory camera frames are written to (implies --source dir)
    #[arg(long)]
    pub frame_dir: Option<PathBuf>,

    /// How often to look for new frames
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Ignore a repeat of the last VIN for this long
    #[arg(long)]
    pub cooldown_ms: Option<u64>,

    /// Keep each result on screen for this long
    #[arg(long)]
    pub display_delay_ms: Option<u64>,

    /// Report states through the log instead of the terminal
    #[arg(long, default_value_t = false)]
    pub headless: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// VIN to look up
    pub vin: String,
}

#[derive(Args, Debug)]
pub struct EnrollArgs {
    /// VIN to enroll
    pub vin: String,

    /// Free-form note shown when the VIN is scanned
    #[arg(long, short, default_value = "")]
    pub description: String,
}

fn parse_source(raw: &str) -> Result<SourceKind, String> {
    raw.parse()
}

impl GlobalArgs {
    pub fn apply(&self, config: &mut ScanConfig) {
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
    }
}

impl ScanArgs {
    pub fn apply(&self, config: &mut ScanConfig) {
        if let Some(source) = self.source {
            config.source.kind = source;
        }
        if let Some(dir) = &self.frame_dir {
            config.source.frame_dir = Some(dir.clone());
            if self.source.is_none() {
                config.source.kind = SourceKind::Dir;
            }
        }
        if let Some(ms) = self.poll_interval_ms {
            config.source.poll_interval_ms = ms;
        }
        if let Some(ms) = self.cooldown_ms {
            config.pipeline.cooldown_ms = ms;
        }
        if let Some(ms) = self.display_delay_ms {
            config.pipeline.display_delay_ms = ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn frame_dir_implies_dir_source() {
        let cli = Cli::parse_from([
            "vinscan",
            "scan",
            "--frame-dir",
            "/tmp/frames",
            "--cooldown-ms",
            "500",
        ]);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };

        let mut config = ScanConfig::default();
        args.apply(&mut config);
        assert_eq!(config.source.kind, SourceKind::Dir);
        assert_eq!(config.pipeline.cooldown_ms, 500);
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(Cli::try_parse_from(["vinscan", "scan", "--source", "webcam"]).is_err());
    }
}
