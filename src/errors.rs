//! Error handling for the fork-publisher crate.
use std::{error::Error as StdError, fmt};

/// Error type for the fork-publisher crate.
#[derive(Debug)]
pub struct PublisherError {
    /// Inner error.
    inner: Box<Inner>,
}

impl PublisherError {
    /// Create a new error.
    pub(crate) fn new(kind: PublisherErrorKind) -> Self {
        Self {
            inner: Box::new(Inner { kind, source: None }),
        }
    }

    /// Attach a plain text message as the source.
    pub(crate) fn with_text(mut self, text: &str) -> Self {
        self.inner.source = Some(Box::new(std::io::Error::other(text.to_string())));
        self
    }

    /// Attach an underlying error as the source.
    pub(crate) fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        self.inner.source = Some(source.into());
        self
    }

    /// The stage that failed.
    pub fn kind(&self) -> &PublisherErrorKind {
        &self.inner.kind
    }
}

/// Type alias for a boxed error.
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Inner error type for the fork-publisher crate.
#[derive(Debug)]
struct Inner {
    /// Error kind.
    kind: PublisherErrorKind,

    /// Source error.
    source: Option<BoxError>,
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherErrorKind {
    /// The home directory could not be resolved.
    HomeDir,

    /// An SSH key file is missing.
    MissingKey,

    /// Reading from the terminal failed.
    Prompt,

    /// The configuration file is invalid.
    Config,

    /// An URL could not be parsed or joined.
    Url,

    /// Filesystem error.
    Io,

    /// Error related to the reqwest crate.
    Reqwest,

    /// Error related to serde.
    Serde,

    /// Error related to Git2.
    Git2,

    /// Listing the owned repositories failed.
    GetAllRepos,

    /// Fetching a single repository failed.
    GetRepo,

    /// Creating the public repository failed.
    RepoCreation,

    /// The bare clone failed.
    Clone,

    /// The mirror push failed.
    MirrorPush,
}

impl fmt::Display for PublisherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.inner.kind)?;
        if let Some(source) = &self.inner.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for PublisherError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

impl From<reqwest::Error> for PublisherError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(PublisherErrorKind::Reqwest).with_source(e)
    }
}

impl From<serde_json::Error> for PublisherError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(PublisherErrorKind::Serde).with_source(e)
    }
}

impl From<std::io::Error> for PublisherError {
    fn from(e: std::io::Error) -> Self {
        Self::new(PublisherErrorKind::Io).with_source(e)
    }
}

impl From<git2::Error> for PublisherError {
    fn from(e: git2::Error) -> Self {
        Self::new(PublisherErrorKind::Git2).with_source(e)
    }
}

impl From<url::ParseError> for PublisherError {
    fn from(e: url::ParseError) -> Self {
        Self::new(PublisherErrorKind::Url).with_source(e)
    }
}

impl From<toml::de::Error> for PublisherError {
    fn from(e: toml::de::Error) -> Self {
        Self::new(PublisherErrorKind::Config).with_source(e)
    }
}
