//! Hosting platform capability
use std::{future::Future, pin::Pin};

use crate::{
    errors::PublisherError,
    utils::{RepositoryDetail, RepositorySummary},
};

/// Boxed future returned by [`RepositoryHost`] methods
pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PublisherError>> + Send + 'a>>;

/// Suffix appended to the name of every published repository
pub const PUBLIC_SUFFIX: &str = "-public";

/// Name of the public counterpart of `base_name`
pub fn public_repository_name(base_name: &str) -> String {
    format!("{base_name}{PUBLIC_SUFFIX}")
}

/// Repository operations of a hosting platform, authenticated as one user.
pub trait RepositoryHost: Sync + Send {
    /// Every repository owned by the authenticated user, in server order.
    fn list_owned_repositories(&self) -> HostFuture<'_, Vec<RepositorySummary>>;

    /// One repository with its fork parent.
    fn get_repository(&self, owner: &str, name: &str) -> HostFuture<'_, RepositoryDetail>;

    /// Create `<base_name>-public` under the authenticated user.
    fn create_public_repository(&self, base_name: &str) -> HostFuture<'_, RepositoryDetail>;

    /// Host name of the platform, for messages.
    fn get_remote_url(&self) -> &str;
}
