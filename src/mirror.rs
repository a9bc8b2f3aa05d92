//! Mirror each fork into a new public repository
use std::{
    fs::remove_dir_all,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{
    config::PublisherConfig,
    credentials::SshCredentials,
    errors::PublisherError,
    git::VersionControlClient,
    platform::{public_repository_name, RepositoryHost},
    utils::RepositorySummary,
};

/// What happens to the batch when a public repository can't be created
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CreateFailurePolicy {
    /// Stop the batch with the error
    #[default]
    Abort,

    /// Skip the repository and go on with the next one
    Skip,
}

/// The single local directory every bare clone goes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneWorkspace {
    /// Directory path
    path: PathBuf,
}

impl CloneWorkspace {
    /// Workspace at `path`
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the directory and everything in it; a missing directory is fine.
    /// # Errors
    /// Error if the directory exists and can't be removed
    pub fn wipe(&self) -> Result<(), PublisherError> {
        match remove_dir_all(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Settings of a mirroring batch
#[derive(Debug, Clone)]
pub struct MirrorSettings {
    /// Where bare clones are made
    pub workspace: CloneWorkspace,

    /// Reaction to a failed repository creation
    pub create_failure_policy: CreateFailurePolicy,
}

impl MirrorSettings {
    /// Settings from their parts
    pub fn new(workspace: CloneWorkspace, create_failure_policy: CreateFailurePolicy) -> Self {
        Self {
            workspace,
            create_failure_policy,
        }
    }

    /// Settings from the configuration
    pub fn from_config(config: &PublisherConfig) -> Self {
        Self::new(
            CloneWorkspace::new(config.clone_path()),
            config.create_failure_policy(),
        )
    }
}

/// Result of mirroring one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// The public repository holds the full history
    Published {
        /// Name of the new repository
        public_name: String,
    },

    /// Mirroring stopped for this repository
    Skipped {
        /// Why
        reason: String,
    },
}

/// What a batch did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    /// Names of the public repositories filled
    pub published: Vec<String>,

    /// Skipped repositories and the reason
    pub skipped: Vec<(String, String)>,
}

impl MirrorReport {
    /// Record the outcome for `name`
    fn record(&mut self, name: &str, outcome: MirrorOutcome) {
        match outcome {
            MirrorOutcome::Published { public_name } => self.published.push(public_name),
            MirrorOutcome::Skipped { reason } => self.skipped.push((name.to_string(), reason)),
        }
    }

    /// Print the summary of the batch
    pub fn print_summary(&self) {
        println!("Published {} repos", self.published.len());
        for name in &self.published {
            println!("- {name}");
        }
        if !self.skipped.is_empty() {
            println!("Skipped {} repos", self.skipped.len());
            for (name, reason) in &self.skipped {
                println!("- {name}: {reason}");
            }
        }
    }
}

/// Wipe the workspace, then bare clone `repo` into it
/// # Errors
/// Error if the workspace can't be wiped or the clone fails
pub fn bare_clone(
    vcs: &dyn VersionControlClient,
    workspace: &CloneWorkspace,
    repo: &RepositorySummary,
    credentials: &SshCredentials,
) -> Result<(), PublisherError> {
    println!("Bare cloning {}", repo.name);
    workspace.wipe()?;
    vcs.clone_bare(&repo.ssh_url, workspace.path(), credentials)
}

/// Clone `repo`, create its public counterpart and mirror push into it.
///
/// Clone and push failures skip the repository. A creation failure is
/// returned as an error under [`CreateFailurePolicy::Abort`].
/// # Errors
/// Error if the public repository can't be created and the policy aborts
pub async fn duplicate_repository(
    host: &dyn RepositoryHost,
    vcs: &dyn VersionControlClient,
    settings: &MirrorSettings,
    credentials: &SshCredentials,
    repo: &RepositorySummary,
) -> Result<MirrorOutcome, PublisherError> {
    if let Err(e) = bare_clone(vcs, &settings.workspace, repo, credentials) {
        log::error!("Error cloning {}: {e}", repo.full_name());
        return Ok(MirrorOutcome::Skipped {
            reason: format!("clone failed: {e}"),
        });
    }

    println!(
        "Creating new public repo {}",
        public_repository_name(&repo.name)
    );
    let public_repo = match host.create_public_repository(&repo.name).await {
        Ok(public_repo) => public_repo,
        Err(e) => match settings.create_failure_policy {
            CreateFailurePolicy::Abort => return Err(e),
            CreateFailurePolicy::Skip => {
                log::error!("Error creating the public repo of {}: {e}", repo.name);
                return Ok(MirrorOutcome::Skipped {
                    reason: format!("create failed: {e}"),
                });
            }
        },
    };

    let public_name = public_repo.summary.name;
    println!("Pushing to {public_name}");
    match vcs.mirror_push(
        settings.workspace.path(),
        &public_repo.summary.ssh_url,
        credentials,
    ) {
        Ok(count) => {
            log::debug!("Pushed {count} refs to {public_name}");
            Ok(MirrorOutcome::Published { public_name })
        }
        Err(e) => {
            log::error!("Error pushing {public_name}: {e}");
            Ok(MirrorOutcome::Skipped {
                reason: format!("push failed: {e}"),
            })
        }
    }
}

/// Mirror every repository one after the other, then remove the workspace.
/// # Errors
/// The first error of [`duplicate_repository`], or a workspace cleanup error
pub async fn duplicate_repositories(
    host: &dyn RepositoryHost,
    vcs: &dyn VersionControlClient,
    settings: &MirrorSettings,
    credentials: &SshCredentials,
    repos: &[RepositorySummary],
) -> Result<MirrorReport, PublisherError> {
    println!("Duplicating {} repos", repos.len());
    let mut report = MirrorReport::default();
    let mut result = Ok(());
    for (idx, repo) in repos.iter().enumerate() {
        println!("[{}/{}] Duplicating {}", idx + 1, repos.len(), repo.name);
        match duplicate_repository(host, vcs, settings, credentials, repo).await {
            Ok(outcome) => report.record(&repo.name, outcome),
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }
    println!("Finished duplicating");

    println!("Cleaning up {}", settings.workspace.path().display());
    let cleanup = settings.workspace.wipe();
    result?;
    cleanup?;
    Ok(report)
}
