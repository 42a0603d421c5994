use std::process::ExitCode;

use vinscan_core::validator;
use vinscan_model::ValidationResult;

use crate::{backend::Backend, cli::EnrollArgs};

pub async fn run(args: EnrollArgs, backend: &Backend) -> anyhow::Result<ExitCode> {
    let code = match validator::validate_str(&args.vin) {
        ValidationResult::Valid(code) => code,
        ValidationResult::Invalid(reason) => {
            println!("{:?}: {reason}", args.vin);
            return Ok(ExitCode::FAILURE);
        }
    };

    let created = backend.upsert(&code, args.description.trim()).await?;
    if created {
        println!("Enrolled {code}");
    } else {
        println!("Updated {code}");
    }
    Ok(ExitCode::SUCCESS)
}
