//! Error handling for the git-migrator crate.
use std::{error::Error as StdError, fmt};

/// Error type for the git-migrator crate.
#[derive(Debug)]
pub struct GitMigratorError {
    /// Inner error.
    inner: Box<Inner>,
}

impl GitMigratorError {
    /// Create a new error.
    pub(crate) fn new(kind: GitMigratorErrorKind) -> Self {
        Self {
            inner: Box::new(Inner {
                kind,
                source: None,
                issue: None,
            }),
        }
    }

    /// Create a new error of kind `Config` wrapping a source error.
    pub(crate) fn new_with_source<E>(text: &str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::new(GitMigratorErrorKind::Config)
            .with_text(&format!("{text}: {source}"))
    }

    /// Attach a text as the source of the error.
    pub(crate) fn with_text(mut self, text: &str) -> Self {
        self.inner.source = Some(Box::new(std::io::Error::other(text)));
        self
    }

    /// Attach the issue number the error happened on.
    pub(crate) fn with_issue(mut self, number: u64) -> Self {
        self.inner.issue = Some(number);
        self
    }

    /// Kind of the error.
    pub fn kind(&self) -> &GitMigratorErrorKind {
        &self.inner.kind
    }

    /// Issue number the error is related to, if any.
    pub fn issue(&self) -> Option<u64> {
        self.inner.issue
    }
}

/// Type alias for a boxed error.
pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// Inner error type for the git-migrator crate.
#[derive(Debug)]
struct Inner {
    /// Error kind.
    kind: GitMigratorErrorKind,

    /// Issue the error is about
    issue: Option<u64>,

    /// Source error.
    source: Option<BoxError>,
}

/// Kind of a [`GitMigratorError`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitMigratorErrorKind {
    /// Invalid or missing configuration.
    Config,

    /// Error related to the reqwest crate.
    Reqwest,

    /// Error related to serde.
    Serde,

    /// Error related to io.
    Io,

    /// Error related to Git2.
    Git2,

    /// Error while parsing an url.
    Url,

    /// Error while parsing the toml configuration.
    Toml,

    /// Listing the issues of the source repository failed.
    ListIssues,

    /// Listing the comments of an issue failed.
    ListComments,

    /// Submitting the import job failed.
    ImportSubmission,

    /// Reading the import job status failed.
    ImportStatus,

    /// Updating the labels or state of an issue failed.
    UpdateIssue,

    /// Posting a comment failed.
    AddComment,

    /// Closing a pull request failed.
    ClosePullRequest,

    /// A git command of the merge failed.
    GitStep,
}

impl fmt::Display for GitMigratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.inner.kind)?;
        if let Some(number) = self.inner.issue {
            write!(f, " (issue #{number})")?;
        }
        if let Some(source) = &self.inner.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for GitMigratorError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

impl From<&str> for GitMigratorError {
    fn from(text: &str) -> Self {
        Self::new(GitMigratorErrorKind::Config).with_text(text)
    }
}

impl From<String> for GitMigratorError {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

/// Generate the `From` impl wrapping a library error in the given kind
macro_rules! wrap_error {
    ($error:ty, $kind:ident) => {
        impl From<$error> for GitMigratorError {
            fn from(e: $error) -> Self {
                Self {
                    inner: Box::new(Inner {
                        kind: GitMigratorErrorKind::$kind,
                        source: Some(Box::new(e)),
                        issue: None,
                    }),
                }
            }
        }
    };
}

wrap_error!(reqwest::Error, Reqwest);
wrap_error!(serde_json::Error, Serde);
wrap_error!(std::io::Error, Io);
wrap_error!(git2::Error, Git2);
wrap_error!(url::ParseError, Url);
wrap_error!(toml::de::Error, Toml);
