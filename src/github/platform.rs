//! Github Platform
use super::{
    pagination::PageLinks,
    repo::{CreateRepoGithub, RepoGithub},
    GITHUB_API_HEADER, GITHUB_API_VERSION, GITHUB_URL, PER_PAGE,
};
use crate::{
    credentials::Secret,
    errors::{PublisherError, PublisherErrorKind},
    platform::{public_repository_name, HostFuture, RepositoryHost},
    utils::{RepositoryDetail, RepositorySummary},
};
use reqwest::header::{ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use url::Url;
use urlencoding::encode;

/// Github Platform
#[derive(Debug, Clone)]
pub struct GithubPlatform {
    /// Github token
    token: Secret,

    /// Base of the REST API
    api_url: Url,

    /// Reqwest client
    client: reqwest::Client,
}

impl GithubPlatform {
    /// Create a new GithubPlatform
    pub(crate) fn new(token: Secret, api_url: Url) -> Self {
        Self {
            token,
            api_url,
            client: reqwest::Client::new(),
        }
    }

    /// Absolute URL of an API path
    fn endpoint(&self, path: &str) -> Result<Url, PublisherError> {
        let mut base = self.api_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        Ok(base.join(path)?)
    }

    /// Add the authentication and API version headers
    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", self.token.expose()))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, env!("CARGO_PKG_NAME"))
            .header(GITHUB_API_HEADER, GITHUB_API_VERSION)
    }

    /// Turn a non-success response into an error of `kind` carrying the body
    async fn check(
        response: reqwest::Response,
        kind: PublisherErrorKind,
    ) -> Result<reqwest::Response, PublisherError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let text = response.text().await?;
        Err(PublisherError::new(kind).with_text(&format!("{status} - {text}")))
    }

    /// Fetch one page of the owned repositories
    async fn list_page(
        &self,
        url: &Url,
        page: u32,
    ) -> Result<(Vec<RepositorySummary>, PageLinks), PublisherError> {
        let request = self
            .authorized(self.client.get(url.clone()))
            .query(&[
                ("type", "owner".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ])
            .send();
        let response = Self::check(request.await?, PublisherErrorKind::GetAllRepos).await?;
        let links = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .map(PageLinks::parse)
            .unwrap_or_default();
        let text = response.text().await?;
        let repos: Vec<RepoGithub> = serde_json::from_str(&text)?;
        Ok((repos.into_iter().map(RepositorySummary::from).collect(), links))
    }
}

impl RepositoryHost for GithubPlatform {
    fn get_remote_url(&self) -> &str {
        GITHUB_URL
    }

    fn list_owned_repositories(&self) -> HostFuture<'_, Vec<RepositorySummary>> {
        Box::pin(async move {
            let url = self.endpoint("user/repos")?;
            println!("Getting all your repos");
            let mut page: u32 = 1;
            let mut all_repos = vec![];
            loop {
                let (repos, links) = self.list_page(&url, page).await.map_err(|e| {
                    if e.kind() == &PublisherErrorKind::GetAllRepos {
                        e
                    } else {
                        PublisherError::new(PublisherErrorKind::GetAllRepos).with_source(e)
                    }
                })?;
                println!("Downloading page {} of {}", page, links.total(page));
                all_repos.extend(repos);
                match links.next {
                    Some(next) if next > page => page = next,
                    _ => break,
                }
            }
            println!("Finished downloading all your repos ({})", all_repos.len());
            Ok(all_repos)
        })
    }

    fn get_repository(&self, owner: &str, name: &str) -> HostFuture<'_, RepositoryDetail> {
        let path = format!("repos/{}/{}", encode(owner), encode(name));
        Box::pin(async move {
            let url = self.endpoint(&path)?;
            let request = self.authorized(self.client.get(url)).send();
            let response = Self::check(request.await?, PublisherErrorKind::GetRepo).await?;
            let text = response.text().await?;
            let repo: RepoGithub = serde_json::from_str(&text)?;
            Ok(repo.into())
        })
    }

    fn create_public_repository(&self, base_name: &str) -> HostFuture<'_, RepositoryDetail> {
        let body = CreateRepoGithub {
            name: public_repository_name(base_name),
            private: false,
        };
        Box::pin(async move {
            let url = self.endpoint("user/repos")?;
            let request = self.authorized(self.client.post(url)).json(&body).send();
            let response = request
                .await
                .map_err(|e| PublisherError::new(PublisherErrorKind::RepoCreation).with_source(e))?;
            let response = Self::check(response, PublisherErrorKind::RepoCreation).await?;
            let text = response.text().await?;
            let repo: RepoGithub = serde_json::from_str(&text)?;
            Ok(repo.into())
        })
    }
}
