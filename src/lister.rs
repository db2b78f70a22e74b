//! Enumeration of the issues left to migrate
use std::collections::VecDeque;

use log::info;

use crate::{
    errors::GitMigratorError,
    issue::{MigrationOutcome, SourceIssue},
    tracker::SourceTracker,
};

/// Why an issue is not migrated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Pull requests are never imported
    PullRequest,
    /// Only open issues are migrated
    NotOpen,
    /// A previous run already handled it
    AlreadyHandled(MigrationOutcome),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::PullRequest => write!(f, "it's a pull request"),
            SkipReason::NotOpen => write!(f, "it's not an open one"),
            SkipReason::AlreadyHandled(outcome) => write!(f, "it's already labeled {outcome}"),
        }
    }
}

/// Why `issue` must be skipped, `None` when it has to be migrated
pub fn skip_reason(issue: &SourceIssue, open_only: bool) -> Option<SkipReason> {
    if issue.pull_request {
        return Some(SkipReason::PullRequest);
    }
    if open_only && !issue.is_open() {
        return Some(SkipReason::NotOpen);
    }
    issue.outcome().map(SkipReason::AlreadyHandled)
}

/// Item produced by the [`IssueLister`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Issue to migrate
    Issue(SourceIssue),
    /// Open pull request whose author should be told to re-submit
    PullRequest(SourceIssue),
}

/// Lazy, paginated enumeration of the issues to migrate
pub struct IssueLister<'a> {
    /// Tracker the issues are read from
    source: &'a dyn SourceTracker,

    /// Skip issues that are not open
    open_only: bool,

    /// Yield open pull requests instead of dropping them
    pull_requests: bool,

    /// Next page to request
    page: usize,

    /// Issues of the current page not yet looked at
    buffer: VecDeque<SourceIssue>,

    /// No page left
    exhausted: bool,
}

impl<'a> IssueLister<'a> {
    /// Create a lister over the issues of `source`
    pub fn new(source: &'a dyn SourceTracker, open_only: bool) -> Self {
        Self {
            source,
            open_only,
            pull_requests: false,
            page: 1,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Also yield the open pull requests, as [`Candidate::PullRequest`]
    pub fn with_pull_requests(mut self, pull_requests: bool) -> Self {
        self.pull_requests = pull_requests;
        self
    }

    /// Next candidate, fetching the next page when needed.
    ///
    /// After an error the lister is exhausted.
    pub async fn next_candidate(&mut self) -> Option<Result<Candidate, GitMigratorError>> {
        loop {
            while let Some(issue) = self.buffer.pop_front() {
                match skip_reason(&issue, self.open_only) {
                    None => return Some(Ok(Candidate::Issue(issue))),
                    Some(SkipReason::PullRequest)
                        if self.pull_requests && issue.is_open() && issue.outcome().is_none() =>
                    {
                        return Some(Ok(Candidate::PullRequest(issue)));
                    }
                    Some(reason) => info!("Skipping {} as {reason}", issue.number),
                }
            }
            if self.exhausted {
                return None;
            }
            match self.source.list_issues_page(self.page).await {
                Ok(issues) if issues.is_empty() => self.exhausted = true,
                Ok(issues) => {
                    self.buffer.extend(issues);
                    self.page += 1;
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
