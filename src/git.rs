//! Bare clone and mirror push
use std::{cell::RefCell, path::Path};

use git2::{
    build::RepoBuilder, AutotagOption, CertificateCheckStatus, Cred, FetchOptions, PushOptions,
    ReferenceType, RemoteCallbacks, Repository,
};

use crate::{
    credentials::SshCredentials,
    errors::{PublisherError, PublisherErrorKind},
};

/// Fetch refspec mapping remote branches onto local branches
const MIRROR_FETCH_HEADS: &str = "+refs/heads/*:refs/heads/*";

/// Fetch refspec mapping remote tags onto local tags
const MIRROR_FETCH_TAGS: &str = "+refs/tags/*:refs/tags/*";

/// How the SSH host key of the git server is checked
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Let libgit2 check the host against `known_hosts`
    #[default]
    Verify,

    /// Accept any host key without checking it
    AcceptAny,
}

/// Git operations needed to mirror a repository
pub trait VersionControlClient: Sync + Send {
    /// Bare clone `url` into `destination`, which must not exist or be empty.
    /// # Errors
    /// `Clone` error if the clone fails
    fn clone_bare(
        &self,
        url: &str,
        destination: &Path,
        credentials: &SshCredentials,
    ) -> Result<(), PublisherError>;

    /// Force push every branch and tag of the bare repository at `repository`
    /// to `url`. The destination is expected to be freshly created, so its
    /// refs are never listed and nothing is deleted there.
    /// Returns the number of refs pushed.
    /// # Errors
    /// `MirrorPush` error if the push fails or a ref is rejected
    fn mirror_push(
        &self,
        repository: &Path,
        url: &str,
        credentials: &SshCredentials,
    ) -> Result<usize, PublisherError>;
}

/// [`VersionControlClient`] backed by libgit2
#[derive(Debug, Default, Clone)]
pub struct Git2Client {
    /// Host key check applied to every connection
    host_key_policy: HostKeyPolicy,
}

impl Git2Client {
    /// Create a client using `host_key_policy` for every connection
    pub fn new(host_key_policy: HostKeyPolicy) -> Self {
        if host_key_policy == HostKeyPolicy::AcceptAny {
            log::warn!("SSH host key verification is disabled, any server certificate is accepted");
        }
        Self { host_key_policy }
    }

    /// Callbacks authenticating with the key pair, asked at most once per operation
    fn remote_callbacks<'a>(&self, credentials: &'a SshCredentials) -> RemoteCallbacks<'a> {
        let mut callbacks = RemoteCallbacks::new();
        let mut attempts: u32 = 0;
        callbacks.credentials(move |_url, username_from_url, _allowed| {
            attempts += 1;
            if attempts > 1 {
                return Err(git2::Error::from_str(
                    "SSH authentication failed, check your key pair and passphrase",
                ));
            }
            let username = username_from_url.unwrap_or("git");
            Cred::ssh_key(
                username,
                Some(credentials.key_pair.public_key.as_path()),
                &credentials.key_pair.private_key,
                credentials.passphrase(),
            )
        });
        if self.host_key_policy == HostKeyPolicy::AcceptAny {
            callbacks.certificate_check(|_cert, host| {
                log::trace!("Accepting host key of {host} without verification");
                Ok(CertificateCheckStatus::CertificateOk)
            });
        }
        callbacks
    }
}

impl VersionControlClient for Git2Client {
    fn clone_bare(
        &self,
        url: &str,
        destination: &Path,
        credentials: &SshCredentials,
    ) -> Result<(), PublisherError> {
        let mut fetch_opts = FetchOptions::new();
        fetch_opts.remote_callbacks(self.remote_callbacks(credentials));
        fetch_opts.download_tags(AutotagOption::All);

        let mut builder = RepoBuilder::new();
        builder.bare(true);
        builder.remote_create(|repo, name, url| {
            repo.remote_with_fetch(name, url, MIRROR_FETCH_HEADS)?;
            repo.remote_add_fetch(name, MIRROR_FETCH_TAGS)?;
            repo.find_remote(name)
        });
        builder.fetch_options(fetch_opts);

        log::debug!("Cloning '{}' to '{}'", url, destination.display());
        builder
            .clone(url, destination)
            .map_err(|e| PublisherError::new(PublisherErrorKind::Clone).with_source(e))?;
        Ok(())
    }

    fn mirror_push(
        &self,
        repository: &Path,
        url: &str,
        credentials: &SshCredentials,
    ) -> Result<usize, PublisherError> {
        let push_error =
            |e: git2::Error| PublisherError::new(PublisherErrorKind::MirrorPush).with_source(e);
        let repo = Repository::open_bare(repository).map_err(push_error)?;
        let local_refs = mirrored_refs(&repo).map_err(push_error)?;
        if local_refs.is_empty() {
            log::debug!("Nothing to push to {url}");
            return Ok(0);
        }
        let refspecs = mirror_refspecs(&local_refs);
        let mut remote = repo.remote_anonymous(url).map_err(push_error)?;
        log::debug!("Pushing {} refspecs to {}", refspecs.len(), url);

        let rejected = RefCell::new(Vec::new());
        let mut callbacks = self.remote_callbacks(credentials);
        callbacks.push_update_reference(|refname, status| {
            if let Some(message) = status {
                rejected.borrow_mut().push(format!("{refname}: {message}"));
            }
            Ok(())
        });
        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);
        remote
            .push(&refspecs, Some(&mut push_options))
            .map_err(push_error)?;

        let rejected = rejected.take();
        if !rejected.is_empty() {
            return Err(PublisherError::new(PublisherErrorKind::MirrorPush)
                .with_text(&format!("rejected {}", rejected.join(", "))));
        }
        Ok(local_refs.len())
    }
}

/// Whether a ref is part of a mirror (branches and tags)
fn is_mirrored(name: &str) -> bool {
    name.starts_with("refs/heads/") || name.starts_with("refs/tags/")
}

/// Names of the direct branch and tag refs of `repo`
fn mirrored_refs(repo: &Repository) -> Result<Vec<String>, git2::Error> {
    let mut names = vec![];
    for reference in repo.references()? {
        let reference = reference?;
        if reference.kind() != Some(ReferenceType::Direct) {
            continue;
        }
        if let Some(name) = reference.name() {
            if is_mirrored(name) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Forced `+ref:ref` refspecs for every local ref
fn mirror_refspecs(local_refs: &[String]) -> Vec<String> {
    local_refs
        .iter()
        .map(|name| format!("+{name}:{name}"))
        .collect()
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::credentials::{Secret, SshKeyPair};
    use git2::{Oid, Signature};
    use std::path::PathBuf;

    pub(crate) fn unused_credentials() -> SshCredentials {
        SshCredentials::new(
            SshKeyPair::in_home(&PathBuf::from("/nonexistent")),
            Secret::new(""),
        )
    }

    /// Commit a single file on `branch` of a bare repository
    pub(crate) fn commit_on(repo: &Repository, branch: &str, content: &str) -> Oid {
        let sig = Signature::now("Student", "student@example.com").unwrap();
        let blob = repo.blob(content.as_bytes()).unwrap();
        let mut tree_builder = repo.treebuilder(None).unwrap();
        tree_builder.insert("README.md", blob, 0o100644).unwrap();
        let tree = repo.find_tree(tree_builder.write().unwrap()).unwrap();
        let refname = format!("refs/heads/{branch}");
        repo.commit(Some(refname.as_str()), &sig, &sig, content, &tree, &[])
            .unwrap()
    }

    /// A bare repository with `main`, `feature` and tag `v1`
    pub(crate) fn source_repo(dir: &Path) -> Repository {
        let repo = Repository::init_bare(dir).unwrap();
        let main = commit_on(&repo, "main", "main");
        commit_on(&repo, "feature", "feature");
        let target = repo.find_object(main, None).unwrap();
        repo.tag_lightweight("v1", &target, false).unwrap();
        repo.set_head("refs/heads/main").unwrap();
        drop(target);
        repo
    }

    fn ref_names(path: &Path) -> Vec<String> {
        let repo = Repository::open_bare(path).unwrap();
        let mut names = mirrored_refs(&repo).unwrap();
        names.sort();
        names
    }

    #[test]
    fn refspecs_force_every_ref() {
        let local = vec!["refs/heads/main".to_string(), "refs/tags/v1".to_string()];
        assert_eq!(
            mirror_refspecs(&local),
            ["+refs/heads/main:refs/heads/main", "+refs/tags/v1:refs/tags/v1"]
        );
    }

    #[test]
    fn only_branches_and_tags_are_mirrored() {
        assert!(is_mirrored("refs/heads/main"));
        assert!(is_mirrored("refs/tags/v1"));
        assert!(!is_mirrored("refs/pull/1/head"));
        assert!(!is_mirrored("HEAD"));
    }

    #[test]
    fn clone_bare_copies_branches_and_tags() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.git");
        source_repo(&source);
        let destination = dir.path().join("clone");

        Git2Client::default()
            .clone_bare(source.to_str().unwrap(), &destination, &unused_credentials())
            .unwrap();

        assert!(Repository::open_bare(&destination).unwrap().is_bare());
        assert_eq!(
            ref_names(&destination),
            ["refs/heads/feature", "refs/heads/main", "refs/tags/v1"]
        );
    }

    #[test]
    fn clone_of_missing_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Git2Client::default()
            .clone_bare(
                dir.path().join("absent.git").to_str().unwrap(),
                &dir.path().join("clone"),
                &unused_credentials(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), &PublisherErrorKind::Clone);
    }

    #[test]
    fn mirror_push_into_empty_destination() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.git");
        source_repo(&source);
        let clone = dir.path().join("clone");
        let client = Git2Client::default();
        client
            .clone_bare(source.to_str().unwrap(), &clone, &unused_credentials())
            .unwrap();

        let destination = dir.path().join("public.git");
        Repository::init_bare(&destination).unwrap();

        let pushed = client
            .mirror_push(&clone, destination.to_str().unwrap(), &unused_credentials())
            .unwrap();

        assert_eq!(pushed, 3);
        assert_eq!(
            ref_names(&destination),
            ["refs/heads/feature", "refs/heads/main", "refs/tags/v1"]
        );
    }

    #[test]
    fn mirror_push_overwrites_diverged_branch() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.git");
        let main = source_repo(&source)
            .find_reference("refs/heads/main")
            .unwrap()
            .target()
            .unwrap();
        let clone = dir.path().join("clone");
        let client = Git2Client::default();
        client
            .clone_bare(source.to_str().unwrap(), &clone, &unused_credentials())
            .unwrap();

        let destination = dir.path().join("public.git");
        let public = Repository::init_bare(&destination).unwrap();
        commit_on(&public, "main", "unrelated");

        client
            .mirror_push(&clone, destination.to_str().unwrap(), &unused_credentials())
            .unwrap();

        let public = Repository::open_bare(&destination).unwrap();
        let pushed_main = public.find_reference("refs/heads/main").unwrap().target();
        assert_eq!(pushed_main, Some(main));
    }

    #[test]
    fn empty_clone_pushes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.git");
        Repository::init_bare(&source).unwrap();
        let destination = dir.path().join("public.git");
        Repository::init_bare(&destination).unwrap();

        let pushed = Git2Client::default()
            .mirror_push(&source, destination.to_str().unwrap(), &unused_credentials())
            .unwrap();

        assert_eq!(pushed, 0);
        assert!(ref_names(&destination).is_empty());
    }

    #[test]
    fn mirror_push_to_missing_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.git");
        source_repo(&source);
        let clone = dir.path().join("clone");
        let client = Git2Client::default();
        client
            .clone_bare(source.to_str().unwrap(), &clone, &unused_credentials())
            .unwrap();

        let err = client
            .mirror_push(
                &clone,
                dir.path().join("absent.git").to_str().unwrap(),
                &unused_credentials(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), &PublisherErrorKind::MirrorPush);
    }
}
