use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "deposit-client", version, about = "Deposit a zipped bag over SWORD2 and track it")]
pub struct Cli {
    /// RON configuration file. Defaults to ./deposit.ron when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a bag to a collection (Col-IRI) and poll until it is published or fails.
    Deposit(Target),
    /// Send a bag to a validation endpoint and print its answer.
    Validate(Target),
}

#[derive(Debug, Args)]
pub struct Target {
    pub uri: Url,
    pub user: String,
    pub password: String,
    /// Zipped bag.
    pub package: PathBuf,
}
