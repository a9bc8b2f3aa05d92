//! # fork-publisher
//!
//! Publish private assignment forks as public mirror repositories.
//!
//! Lists the repositories you own on GitHub, keeps the forks whose parent
//! belongs to the assignment organization (`learn-co-students` by default),
//! and for each of them creates `<name>-public` and mirror pushes the whole
//! history into it.
//!
//! ## Usage
//!
//! ```txt
//! Usage: fork-publisher [OPTIONS]
//!
//! Options:
//!   -o, --org <ORG>                  Owner of the upstream repositories (default: learn-co-students)
//!       --continue-on-create-failure Skip a repository whose public copy can't be created instead of stopping
//!       --accept-any-host-key        Don't verify the SSH host key of the git server
//!   -c, --config <CONFIG>            Custom configuration file path
//!       --show-config-path           Show the current config path
//!   -v, --verbose...                 Verbose mode (-v, -vv)
//!   -h, --help                       Print help
//!   -V, --version                    Print version
//! ```

#![warn(clippy::all, rust_2018_idioms)]
#![deny(
    missing_docs,
    clippy::all,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![warn(clippy::multiple_crate_versions)]

pub(crate) mod cli;
pub(crate) mod config;
pub(crate) mod credentials;
pub(crate) mod errors;
pub(crate) mod filter;
pub(crate) mod git;
pub(crate) mod mirror;
pub(crate) mod platform;
pub(crate) mod utils;

mod github;

pub use cli::{fork_publisher_main, ForkPublisherCli};
pub use config::{ConfigData, PublisherConfig, DEFAULT_SOURCE_ORG};
pub use credentials::{
    preflight, prompt_access_token, prompt_passphrase, verify_key_pair, Secret, SecretPrompter,
    SshCredentials, SshKeyPair, TerminalPrompter,
};
pub use errors::{PublisherError, PublisherErrorKind};
pub use filter::{filter_forks, filter_student_forks};
pub use git::{Git2Client, HostKeyPolicy, VersionControlClient};
pub use github::config::GithubConfig;
pub use mirror::{
    bare_clone, duplicate_repositories, duplicate_repository, CloneWorkspace,
    CreateFailurePolicy, MirrorOutcome, MirrorReport, MirrorSettings,
};
pub use platform::{public_repository_name, HostFuture, RepositoryHost, PUBLIC_SUFFIX};
pub use utils::{main_publish, publish_forks, RepositoryDetail, RepositorySummary};
