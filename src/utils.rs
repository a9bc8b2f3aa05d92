//! Repository types and the end-to-end publishing run
use crate::{
    config::PublisherConfig,
    credentials::{get_home_dir, preflight, SecretPrompter, SshCredentials},
    errors::PublisherError,
    filter::{filter_forks, filter_student_forks},
    git::{Git2Client, VersionControlClient},
    github::config::GithubConfig,
    mirror::{duplicate_repositories, MirrorReport, MirrorSettings},
    platform::RepositoryHost,
};

/// Repository as returned by the listing
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone)]
pub struct RepositorySummary {
    /// Name of the repository
    pub name: String,

    /// Login of the owning account
    pub owner_login: String,

    /// Whether the repository is a fork
    pub fork: bool,

    /// SSH clone URL
    pub ssh_url: String,
}

impl RepositorySummary {
    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner_login, self.name)
    }
}

/// Repository with its fork parent
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct RepositoryDetail {
    /// Listing fields
    pub summary: RepositorySummary,

    /// Login of the parent's owner, as sent by the platform
    pub parent_owner: Option<String>,
}

impl RepositoryDetail {
    /// Owner of the parent repository; always `None` for a non-fork.
    pub fn parent_owner_login(&self) -> Option<&str> {
        if self.summary.fork {
            self.parent_owner.as_deref()
        } else {
            None
        }
    }
}

/// List, filter and mirror the forks of `source_org` owned by the user
/// # Errors
/// Error if the listing fails, or on a create failure under the abort policy
pub async fn publish_forks(
    host: &dyn RepositoryHost,
    vcs: &dyn VersionControlClient,
    settings: &MirrorSettings,
    credentials: &SshCredentials,
    source_org: &str,
) -> Result<MirrorReport, PublisherError> {
    let all_repos = host.list_owned_repositories().await?;
    let forks = filter_forks(&all_repos);
    let student_forks = filter_student_forks(host, &forks, source_org).await;
    duplicate_repositories(host, vcs, settings, credentials, &student_forks).await
}

/// Main function: preflight, prompts, then publish every student fork
/// # Errors
/// Error if a fatal stage fails
pub async fn main_publish(
    config: &PublisherConfig,
    prompter: &dyn SecretPrompter,
) -> Result<MirrorReport, PublisherError> {
    let home = get_home_dir()?;
    let (credentials, token) = preflight(&home, prompter)?;

    let platform = GithubConfig::get_platform(config, token)?;
    let vcs = Git2Client::new(config.host_key_policy());
    let settings = MirrorSettings::from_config(config);
    let source_org = config.source_org();
    println!(
        "Publishing your {} forks from {}",
        source_org,
        platform.get_remote_url()
    );

    let report = publish_forks(&platform, &vcs, &settings, &credentials, &source_org).await?;
    report.print_summary();
    Ok(report)
}
