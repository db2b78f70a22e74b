//! In-memory trackers for the tests
use std::{collections::HashMap, sync::Mutex};

use crate::{
    errors::{GitMigratorError, GitMigratorErrorKind},
    import::{ImportJob, ImportJobStatus, ImportRequest},
    issue::{IssueState, SourceComment, SourceIssue},
    tracker::{DestinationTracker, RepoId, SourceTracker, TrackerFuture},
};

/// Build an issue for the tests
pub(crate) fn issue(number: u64, state: IssueState, labels: &[&str]) -> SourceIssue {
    SourceIssue {
        number,
        title: format!("Issue {number}"),
        body: format!("Body of {number}"),
        author: "alice".to_string(),
        assignee: None,
        labels: labels.iter().map(|l| l.to_string()).collect(),
        state,
        html_url: format!("https://github.com/src/repo/issues/{number}"),
        created_at: "2016-01-01T00:00:00Z".to_string(),
        closed_at: (state == IssueState::Closed).then(|| "2016-02-01T00:00:00Z".to_string()),
        pull_request: false,
        comments: vec![],
    }
}

/// Build a pull request for the tests
pub(crate) fn pull_request(number: u64, state: IssueState) -> SourceIssue {
    SourceIssue {
        pull_request: true,
        author: "contributor".to_string(),
        ..issue(number, state, &[])
    }
}

/// Writes recorded by a [`FakeSource`]
#[derive(Debug, Default)]
pub(crate) struct SourceWrites {
    /// Current labels, per issue, once updated
    pub(crate) labels: HashMap<u64, Vec<String>>,
    /// Posted comments
    pub(crate) comments: Vec<(u64, String)>,
    /// Closed issues
    pub(crate) closed: Vec<u64>,
    /// Closed pull requests
    pub(crate) closed_pull_requests: Vec<u64>,
    /// Requested pages
    pub(crate) pages: Vec<usize>,
}

/// Source tracker serving fixed pages
pub(crate) struct FakeSource {
    /// Repository name
    repo: RepoId,
    /// Pages of issues, the first one is page 1
    pages: Vec<Vec<SourceIssue>>,
    /// Comments per issue
    comments: HashMap<u64, Vec<SourceComment>>,
    /// Page failing to load
    pub(crate) failing_page: Option<usize>,
    /// Issue whose comments fail to load
    pub(crate) failing_comments: Option<u64>,
    /// Issue failing to close
    pub(crate) failing_close: Option<u64>,
    /// Recorded writes
    pub(crate) writes: Mutex<SourceWrites>,
}

impl FakeSource {
    /// Source serving `pages`
    pub(crate) fn new(pages: Vec<Vec<SourceIssue>>) -> Self {
        Self {
            repo: "src/repo".parse().expect("valid repo"),
            pages,
            comments: HashMap::new(),
            failing_page: None,
            failing_comments: None,
            failing_close: None,
            writes: Mutex::new(SourceWrites::default()),
        }
    }

    /// Attach comments to an issue
    pub(crate) fn with_comments(mut self, number: u64, comments: Vec<SourceComment>) -> Self {
        self.comments.insert(number, comments);
        self
    }

    /// Access the recorded writes
    pub(crate) fn writes(&self) -> std::sync::MutexGuard<'_, SourceWrites> {
        self.writes.lock().expect("lock")
    }
}

impl SourceTracker for FakeSource {
    fn get_repository(&self) -> &RepoId {
        &self.repo
    }

    fn list_issues_page(&self, page: usize) -> TrackerFuture<'_, Vec<SourceIssue>> {
        self.writes().pages.push(page);
        let result = if self.failing_page == Some(page) {
            Err(GitMigratorError::new(GitMigratorErrorKind::ListIssues).with_text("boom"))
        } else {
            Ok(self.pages.get(page - 1).cloned().unwrap_or_default())
        };
        Box::pin(async move { result })
    }

    fn issue_comments(&self, number: u64) -> TrackerFuture<'_, Vec<SourceComment>> {
        let result = if self.failing_comments == Some(number) {
            Err(GitMigratorError::new(GitMigratorErrorKind::ListComments).with_text("boom"))
        } else {
            Ok(self.comments.get(&number).cloned().unwrap_or_default())
        };
        Box::pin(async move { result })
    }

    fn update_labels(&self, number: u64, labels: Vec<String>) -> TrackerFuture<'_, ()> {
        self.writes().labels.insert(number, labels);
        Box::pin(async { Ok(()) })
    }

    fn add_comment(&self, number: u64, body: String) -> TrackerFuture<'_, ()> {
        self.writes().comments.push((number, body));
        Box::pin(async { Ok(()) })
    }

    fn close_issue(&self, number: u64) -> TrackerFuture<'_, ()> {
        if self.failing_close == Some(number) {
            return Box::pin(async {
                Err(GitMigratorError::new(GitMigratorErrorKind::UpdateIssue).with_text("boom"))
            });
        }
        self.writes().closed.push(number);
        Box::pin(async { Ok(()) })
    }

    fn close_pull_request(&self, number: u64) -> TrackerFuture<'_, ()> {
        self.writes().closed_pull_requests.push(number);
        Box::pin(async { Ok(()) })
    }
}

/// Destination importing instantly, or never
pub(crate) struct FakeDestination {
    /// Repository name
    repo: RepoId,
    /// Whether import jobs ever resolve
    resolves: bool,
    /// Titles whose submission is rejected
    rejected_titles: Vec<String>,
    /// Submitted payloads
    pub(crate) submitted: Mutex<Vec<ImportRequest>>,
    /// Number of status requests
    pub(crate) status_requests: Mutex<usize>,
}

impl FakeDestination {
    /// Destination whose jobs resolve (or not)
    pub(crate) fn new(resolves: bool) -> Self {
        Self {
            repo: "dest/org".parse().expect("valid repo"),
            resolves,
            rejected_titles: vec![],
            submitted: Mutex::new(vec![]),
            status_requests: Mutex::new(0),
        }
    }

    /// Reject the submission of the issue titled `title`
    pub(crate) fn rejecting(mut self, title: &str) -> Self {
        self.rejected_titles.push(title.to_string());
        self
    }
}

impl DestinationTracker for FakeDestination {
    fn get_repository(&self) -> &RepoId {
        &self.repo
    }

    fn submit_import(&self, request: ImportRequest) -> TrackerFuture<'_, ImportJob> {
        let result = if self.rejected_titles.contains(&request.issue.title) {
            Err(GitMigratorError::new(GitMigratorErrorKind::ImportSubmission)
                .with_text("Validation Failed"))
        } else {
            let mut submitted = self.submitted.lock().expect("lock");
            submitted.push(request);
            Ok(ImportJob {
                url: format!("status/{}", submitted.len()),
                status: Some("pending".to_string()),
            })
        };
        Box::pin(async move { result })
    }

    fn import_status(&self, status_url: String) -> TrackerFuture<'_, ImportJobStatus> {
        *self.status_requests.lock().expect("lock") += 1;
        let issue_url = if self.resolves {
            let id = 98 + status_url
                .trim_start_matches("status/")
                .parse::<u64>()
                .unwrap_or_default();
            Some(format!("https://api.github.com/repos/dest/org/issues/{id}"))
        } else {
            None
        };
        Box::pin(async move {
            Ok(ImportJobStatus {
                status: Some("pending".to_string()),
                issue_url,
                errors: None,
            })
        })
    }
}
