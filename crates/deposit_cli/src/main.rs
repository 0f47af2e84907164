//! `deposit-client`: deposit a zipped bag over SWORD2 and follow it until it
//! is published, or send it to a validation endpoint.

mod cli;
mod config;
mod package;
mod report;

use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use deposit_engine::{BlockingDepositor, Credentials, DepositError, FileTokenProvider};
use deposit_logging::{deposit_debug, deposit_error, deposit_info, LevelFilter};

use crate::cli::{Cli, Command, Target};
use crate::config::ClientConfig;
use crate::report::LogProgressSink;

/// Exit status for configuration and argument problems.
const EXIT_INVALID_INPUT: u8 = 4;

fn main() -> ExitCode {
    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(code) => return ExitCode::from(code),
    };

    let config_path = ClientConfig::locate(cli.config.as_deref());
    let config = match ClientConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    };

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    deposit_logging::initialize(config.log_destination(), level);
    if let Some(path) = &config_path {
        deposit_info!("Loaded configuration from {}", path.display());
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            deposit_error!("{}", err);
            if let Some(body) = err.response_body() {
                eprintln!("Response body:\n{body}");
            }
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// Parses the command line. Usage errors map to the invalid-input status;
/// `--help` and `--version` print and exit successfully.
fn parse_args<I, T>(args: I) -> Result<Cli, u8>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|err| {
        let _ = err.print();
        if err.use_stderr() {
            EXIT_INVALID_INPUT
        } else {
            0
        }
    })
}

fn run(command: Command, config: &ClientConfig) -> Result<(), DepositError> {
    let tokens = Arc::new(FileTokenProvider::new(config.token_file.clone()));
    deposit_debug!("X-Authorization is read from {}", tokens.path().display());
    let depositor = BlockingDepositor::new(config.deposit_settings(), tokens)?;
    let sink = LogProgressSink;

    match command {
        Command::Deposit(target) => {
            let (credentials, payload) = prepare(&target, config)?;
            let outcome = depositor.deposit(&target.uri, credentials, payload, &sink)?;
            if let Some(line) = report::outcome_line(&outcome) {
                println!("{line}");
            }
        }
        Command::Validate(target) => {
            let (credentials, payload) = prepare(&target, config)?;
            let response = depositor.validate(&target.uri, credentials, payload, &sink)?;
            println!("{}", response.body);
        }
    }
    Ok(())
}

fn prepare(
    target: &Target,
    config: &ClientConfig,
) -> Result<(Credentials, deposit_engine::PackagedPayload), DepositError> {
    let payload = package::stage_zip(&target.package, &config.package_filename)?;
    let credentials = Credentials::new(target.user.clone(), target.password.clone());
    Ok((credentials, payload))
}
