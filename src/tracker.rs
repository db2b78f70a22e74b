//! Issue trackers the migration reads from and writes to
use std::{fmt, future::Future, pin::Pin, str::FromStr};

use urlencoding::encode;

use crate::{
    errors::GitMigratorError,
    import::{ImportJob, ImportJobStatus, ImportRequest},
    issue::{SourceComment, SourceIssue},
};

/// Future returned by the tracker methods
pub type TrackerFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, GitMigratorError>> + Send + 'a>>;

/// Tracker the issues are migrated from
pub trait SourceTracker: Sync + Send {
    /// Repository the issues are read from
    fn get_repository(&self) -> &RepoId;

    /// One page (starting at 1) of issues and pull requests, in any state.
    /// An empty page means there is nothing left.
    fn list_issues_page(&self, page: usize) -> TrackerFuture<'_, Vec<SourceIssue>>;

    /// All the comments of an issue, in creation order
    fn issue_comments(&self, number: u64) -> TrackerFuture<'_, Vec<SourceComment>>;

    /// Replace the labels of an issue
    fn update_labels(&self, number: u64, labels: Vec<String>) -> TrackerFuture<'_, ()>;

    /// Post a comment on an issue or pull request
    fn add_comment(&self, number: u64, body: String) -> TrackerFuture<'_, ()>;

    /// Close an issue
    fn close_issue(&self, number: u64) -> TrackerFuture<'_, ()>;

    /// Close a pull request
    fn close_pull_request(&self, number: u64) -> TrackerFuture<'_, ()>;
}

/// Tracker the issues are imported into
pub trait DestinationTracker: Sync + Send {
    /// Repository the issues are imported into
    fn get_repository(&self) -> &RepoId;

    /// Start an asynchronous import job
    fn submit_import(&self, request: ImportRequest) -> TrackerFuture<'_, ImportJob>;

    /// Read the status of an import job
    fn import_status(&self, status_url: String) -> TrackerFuture<'_, ImportJobStatus>;
}

/// Repository identifier, `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    /// Owner (user or organization)
    pub owner: String,

    /// Name of the repository
    pub name: String,
}

impl RepoId {
    /// Url-encoded `owner/name` path segment
    pub fn api_path(&self) -> String {
        format!("{}/{}", encode(&self.owner), encode(&self.name))
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = GitMigratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(RepoId {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(format!("Invalid repository '{s}', expected owner/name").into()),
        }
    }
}
