//! Command line options for the fork-publisher tool
use crate::{
    config::PublisherConfig,
    credentials::TerminalPrompter,
    errors::PublisherError,
    utils::main_publish,
};
use clap::Parser;
use std::path::PathBuf;

/// fork-publisher - Publish private assignment forks as public repositories
#[derive(Parser, Default, Clone, Debug)]
#[command(version, about)]
pub struct ForkPublisherCli {
    /// Owner of the upstream repositories (default: learn-co-students)
    #[arg(short, long)]
    pub org: Option<String>,

    /// Skip a repository whose public copy can't be created instead of stopping
    #[arg(long = "continue-on-create-failure")]
    pub continue_on_create_failure: bool,

    /// Don't verify the SSH host key of the git server
    #[arg(long = "accept-any-host-key")]
    pub accept_any_host_key: bool,

    /// Custom configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show the current config path
    #[arg(long)]
    pub show_config_path: bool,

    /// Verbose mode (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl ForkPublisherCli {
    /// Log level selected by the verbosity flag
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// Initialise env_logger; `RUST_LOG` (also read from `.env`) takes precedence
fn init_logger(level: log::LevelFilter) {
    let _ = dotenv::dotenv();
    let _ = env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .format_timestamp(None)
        .try_init();
}

/// Run the fork-publisher tool with the command line options
/// # Errors
/// Error if any fatal stage of the run fails
pub async fn fork_publisher_main() -> Result<(), PublisherError> {
    let args = ForkPublisherCli::parse();
    init_logger(args.log_level());
    let config = PublisherConfig::try_new(args)?;
    if config.cli_args.show_config_path {
        println!("{}", config.config_path.display());
        return Ok(());
    }
    main_publish(&config, &TerminalPrompter).await?;
    Ok(())
}
