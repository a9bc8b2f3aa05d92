//! Github Repo struct and conversion to the platform-neutral types
use crate::utils::{RepositoryDetail, RepositorySummary};
use serde::{Deserialize, Serialize};

/// Github account reference
#[derive(Deserialize, Default, Debug, Clone)]
pub struct OwnerGithub {
    /// Account login
    pub login: String,
}

/// Parent of a forked Github repository
#[derive(Deserialize, Default, Debug, Clone)]
pub struct ParentGithub {
    /// Repository owner
    pub owner: OwnerGithub,
}

/// Github Repo
#[derive(Deserialize, Default, Debug, Clone)]
pub struct RepoGithub {
    /// Repository name
    pub name: String,

    /// Repository owner
    pub owner: OwnerGithub,

    /// Repository fork status
    pub fork: bool,

    /// SSH clone URL
    pub ssh_url: String,

    /// Only returned by the single repository endpoint
    #[serde(default)]
    pub parent: Option<ParentGithub>,
}

/// Body of the repository creation request
#[derive(Serialize, Debug, Clone)]
pub(crate) struct CreateRepoGithub {
    /// Repository name
    pub name: String,

    /// Repository private status
    pub private: bool,
}

impl From<RepoGithub> for RepositorySummary {
    fn from(repo: RepoGithub) -> Self {
        RepositorySummary {
            name: repo.name,
            owner_login: repo.owner.login,
            fork: repo.fork,
            ssh_url: repo.ssh_url,
        }
    }
}

impl From<RepoGithub> for RepositoryDetail {
    fn from(mut repo: RepoGithub) -> Self {
        let parent_owner = repo.parent.take().map(|parent| parent.owner.login);
        RepositoryDetail {
            summary: repo.into(),
            parent_owner,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fork_detail_keeps_parent_owner() {
        let json = r#"{
            "id": 1296269,
            "name": "ruby-lab",
            "full_name": "student/ruby-lab",
            "owner": { "login": "student", "id": 1 },
            "fork": true,
            "ssh_url": "git@github.com:student/ruby-lab.git",
            "parent": {
                "name": "ruby-lab",
                "owner": { "login": "learn-co-students" }
            }
        }"#;
        let repo: RepoGithub = serde_json::from_str(json).unwrap();
        let detail: RepositoryDetail = repo.into();
        assert_eq!(detail.summary.owner_login, "student");
        assert_eq!(detail.parent_owner_login(), Some("learn-co-students"));
    }

    #[test]
    fn listing_entry_has_no_parent() {
        let json = r#"{
            "name": "dotfiles",
            "owner": { "login": "student" },
            "fork": false,
            "ssh_url": "git@github.com:student/dotfiles.git"
        }"#;
        let repo: RepoGithub = serde_json::from_str(json).unwrap();
        assert!(repo.parent.is_none());
        let summary: RepositorySummary = repo.into();
        assert!(!summary.fork);
        assert_eq!(summary.ssh_url, "git@github.com:student/dotfiles.git");
    }
}
