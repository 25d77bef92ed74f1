use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sigvet_cli::commands::inspect::run_inspect;
use sigvet_cli::commands::trust::run_trust;
use sigvet_cli::commands::verify::{run_verify, VerifyArgs};

#[derive(Parser)]
#[command(name = "sigvet", about = "Vets the provenance of signed update payloads")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every certificate found in a file's signatures as JSON
    Inspect {
        /// Signed file to inspect
        file: PathBuf,
    },
    /// Check that a file is signed by the expected publisher
    Verify {
        /// Signed file to verify
        file: PathBuf,
        /// Expected publisher name (first CN of the signing certificate)
        #[arg(long)]
        publisher: String,
        /// Require this exact certificate thumbprint (hex)
        #[arg(long)]
        thumbprint: Option<String>,
        /// Require this exact public-key hash (hex)
        #[arg(long)]
        key_hash: Option<String>,
        /// Also accept the " (TEST)" publisher name variant
        #[arg(long)]
        allow_test_variant: bool,
        /// Skip the validity-window check against the current time
        #[arg(long)]
        no_validity_check: bool,
    },
    /// Ask the platform trust engine for a raw verdict
    Trust {
        /// Signed file to evaluate
        file: PathBuf,
        /// Accept the internal test-signing root
        #[arg(long)]
        test_signing: bool,
        /// Evaluate validity as of signing time instead of now
        #[arg(long)]
        at_signing_time: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    match run(&Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Inspect { file } => {
            run_inspect(file)?;
            Ok(true)
        }
        Commands::Verify {
            file,
            publisher,
            thumbprint,
            key_hash,
            allow_test_variant,
            no_validity_check,
        } => run_verify(
            file,
            &VerifyArgs {
                publisher: publisher.clone(),
                thumbprint: thumbprint.clone(),
                key_hash: key_hash.clone(),
                allow_test_variant: *allow_test_variant,
                no_validity_check: *no_validity_check,
            },
        ),
        Commands::Trust {
            file,
            test_signing,
            at_signing_time,
        } => {
            let verdict = run_trust(file, *test_signing, *at_signing_time)?;
            Ok(verdict.is_trusted())
        }
    }
}
