//! Configuration handling
use std::{fs::read_to_string, path::PathBuf};

use serde::Deserialize;

use crate::{
    cli::ForkPublisherCli,
    credentials::get_home_dir,
    errors::{PublisherError, PublisherErrorKind},
    git::HostKeyPolicy,
    github::config::GithubConfig,
    mirror::CreateFailurePolicy,
};

/// Organization owning the assignments the forks come from
pub const DEFAULT_SOURCE_ORG: &str = "learn-co-students";

/// Directory name of the clone workspace inside the temp dir
const DEFAULT_CLONE_DIR: &str = "fork-publisher-clone";

/// Configuration data
#[derive(Default, Clone, Debug)]
pub struct PublisherConfig {
    /// path to the configuration file
    pub config_path: PathBuf,

    /// actual configuration data
    pub config_data: ConfigData,

    /// CLI arguments
    pub cli_args: ForkPublisherCli,
}

/// Content of the configuration file
#[derive(Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct ConfigData {
    /// Owner of the upstream repositories to publish forks of
    pub source_org: Option<String>,

    /// Directory reused for every bare clone
    pub clone_path: Option<PathBuf>,

    /// Stop the whole batch when a public repository can't be created
    pub abort_on_create_failure: Option<bool>,

    /// Skip SSH host key verification
    pub accept_any_host_key: Option<bool>,

    /// Github configuration
    pub github: Option<GithubConfig>,
}

impl PublisherConfig {
    /// Create a new Config object, from `--config` or the default path.
    /// A missing file gives the defaults.
    /// # Errors
    /// Error if the file exists but can't be read or parsed
    pub fn try_new(cli_args: ForkPublisherCli) -> Result<Self, PublisherError> {
        let config_path = match cli_args.config.clone() {
            Some(p) => p,
            None => Self::get_config_path()?,
        };
        let config_data = if config_path.exists() {
            let contents = read_to_string(&config_path).map_err(|e| {
                PublisherError::new(PublisherErrorKind::Config).with_source(e)
            })?;
            toml::from_str(&contents)?
        } else {
            log::debug!("No config file at {}", config_path.display());
            ConfigData::default()
        };
        Ok(PublisherConfig {
            config_path,
            config_data,
            cli_args,
        })
    }

    /// Get the default path to the config file
    /// # Errors
    /// Error if the home directory can't be found
    pub fn get_config_path() -> Result<PathBuf, PublisherError> {
        let home_dir = get_home_dir()?;
        Ok(home_dir
            .join(".config")
            .join(".fork-publisher")
            .join("config.toml"))
    }

    /// Organization whose forks are published
    pub fn source_org(&self) -> String {
        self.cli_args
            .org
            .clone()
            .or_else(|| self.config_data.source_org.clone())
            .unwrap_or_else(|| DEFAULT_SOURCE_ORG.to_string())
    }

    /// Workspace directory for bare clones
    pub fn clone_path(&self) -> PathBuf {
        self.config_data
            .clone_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_CLONE_DIR))
    }

    /// What to do when a public repository can't be created
    pub fn create_failure_policy(&self) -> CreateFailurePolicy {
        if self.cli_args.continue_on_create_failure {
            return CreateFailurePolicy::Skip;
        }
        match self.config_data.abort_on_create_failure {
            Some(false) => CreateFailurePolicy::Skip,
            _ => CreateFailurePolicy::Abort,
        }
    }

    /// How SSH host keys are checked
    pub fn host_key_policy(&self) -> HostKeyPolicy {
        if self.cli_args.accept_any_host_key
            || self.config_data.accept_any_host_key.unwrap_or(false)
        {
            HostKeyPolicy::AcceptAny
        } else {
            HostKeyPolicy::Verify
        }
    }
}
