//! Migration of every issue of the source repository, one at a time
use std::time::Duration;

use log::{error, info};
use tokio::time::sleep;

use crate::{
    errors::GitMigratorError,
    finalizer::finalize,
    import::ImportRequest,
    issue::{MigrationOutcome, SourceIssue},
    lister::{Candidate, IssueLister},
    login::LoginMapping,
    poller::{poll_import, PollPolicy},
    tracker::{DestinationTracker, SourceTracker},
};

/// Pause between two issues.
///
/// The abuse rate limit asks for at least one second between requests and
/// the hourly quota is 5000 requests, about 83 per minute.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(2500);

/// Settings of a migration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSettings {
    /// Only migrate open issues
    pub open_only: bool,

    /// Comment on and close the open pull requests
    pub notify_pull_requests: bool,

    /// Reason of the migration, added to the comments
    pub reason: Option<String>,

    /// Pause between two issues
    pub delay: Duration,

    /// Polling of the import jobs
    pub poll: PollPolicy,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            open_only: false,
            notify_pull_requests: false,
            reason: None,
            delay: DEFAULT_DELAY,
            poll: PollPolicy::default(),
        }
    }
}

/// Counters of a migration run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Issues labeled `migrated`
    pub migrated: usize,

    /// Issues labeled `migration_failed`
    pub failed: usize,

    /// Issues left untouched (or half finalized) because of an error
    pub errored: usize,

    /// Pull requests commented on and closed
    pub pull_requests: usize,
}

/// Issue migration from one repository to another
pub struct Migration<'a> {
    /// Tracker the issues come from
    source: &'a dyn SourceTracker,

    /// Tracker the issues go to
    destination: &'a dyn DestinationTracker,

    /// Login translation
    mapping: &'a LoginMapping,

    /// Settings
    settings: MigrationSettings,
}

impl<'a> Migration<'a> {
    /// Create a new migration
    pub fn new(
        source: &'a dyn SourceTracker,
        destination: &'a dyn DestinationTracker,
        mapping: &'a LoginMapping,
        settings: MigrationSettings,
    ) -> Self {
        Self {
            source,
            destination,
            mapping,
            settings,
        }
    }

    /// Migrate every candidate issue.
    ///
    /// An error on one issue is logged and the run goes on; only a failure
    /// to list the issues stops it.
    /// # Errors
    /// Error if the issues can't be listed
    pub async fn run(&self) -> Result<MigrationReport, GitMigratorError> {
        info!(
            "Fetching issues from '{}'...",
            self.source.get_repository()
        );
        let mut report = MigrationReport::default();
        let mut lister = IssueLister::new(self.source, self.settings.open_only)
            .with_pull_requests(self.settings.notify_pull_requests);
        while let Some(candidate) = lister.next_candidate().await {
            match candidate? {
                Candidate::Issue(issue) => {
                    let number = issue.number;
                    match self.migrate_issue(issue).await {
                        Ok(MigrationOutcome::Migrated) => report.migrated += 1,
                        Ok(MigrationOutcome::Failed) => report.failed += 1,
                        Err(e) => {
                            error!("Unable to migrate {number}: {e}");
                            report.errored += 1;
                        }
                    }
                }
                Candidate::PullRequest(pull_request) => {
                    match self.notify_pull_request(&pull_request).await {
                        Ok(()) => report.pull_requests += 1,
                        Err(e) => {
                            error!("Unable to notify pull request {}: {e}", pull_request.number);
                            report.errored += 1;
                        }
                    }
                }
            }
            sleep(self.settings.delay).await;
        }
        info!(
            "[SUCCESS] Migrated {} issues ({} failed, {} errors, {} pull requests notified)",
            report.migrated, report.failed, report.errored, report.pull_requests
        );
        Ok(report)
    }

    /// Migrate one issue, through submission, polling and finalization
    /// # Errors
    /// Error if the comments can't be read, the import can't be submitted
    /// or the source issue can't be updated
    pub async fn migrate_issue(
        &self,
        mut issue: SourceIssue,
    ) -> Result<MigrationOutcome, GitMigratorError> {
        info!("Migrating {}", issue.number);
        issue.comments = self
            .source
            .issue_comments(issue.number)
            .await
            .map_err(|e| e.with_issue(issue.number))?;
        let status_url = self.post_issue(&issue).await?;
        info!("Import of {} started: {status_url}", issue.number);
        let outcome = poll_import(self.destination, &status_url, &self.settings.poll).await;
        let migration = finalize(
            self.source,
            &issue,
            &outcome,
            self.settings.reason.as_deref(),
            self.settings.delay,
        )
        .await
        .map_err(|e| e.with_issue(issue.number))?;
        if migration == MigrationOutcome::Failed {
            info!("Status URL of {}: {status_url}", issue.number);
        }
        Ok(migration)
    }

    /// Submit the import of `issue`, returning the status url to poll
    /// # Errors
    /// Error if the destination rejects the import
    pub async fn post_issue(&self, issue: &SourceIssue) -> Result<String, GitMigratorError> {
        let request = ImportRequest::build(
            issue,
            &self.source.get_repository().to_string(),
            self.mapping,
        );
        let job = self
            .destination
            .submit_import(request)
            .await
            .map_err(|e| e.with_issue(issue.number))?;
        Ok(job.url)
    }

    /// Ask the author of an open pull request to re-submit it to the new
    /// repository, then close it
    async fn notify_pull_request(&self, pull_request: &SourceIssue) -> Result<(), GitMigratorError> {
        info!("{} is a pull request", pull_request.number);
        let mut body = vec![format!("Hello @{},", pull_request.author)];
        if let Some(reason) = &self.settings.reason {
            body.push(reason.clone());
        }
        body.push(format!(
            "Sorry for the troubles, we'd appreciate if you could re-submit your Pull Request with these changes to the new repository {}",
            self.destination.get_repository()
        ));
        self.source
            .add_comment(pull_request.number, body.join("\n\n"))
            .await?;
        sleep(self.settings.delay).await;
        self.source.close_pull_request(pull_request.number).await
    }
}
