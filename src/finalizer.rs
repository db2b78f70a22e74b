//! Labelling, commenting and closing of the source issue once imported
use std::time::Duration;

use log::{info, warn};
use tokio::time::sleep;

use crate::{
    errors::GitMigratorError,
    github::browsable_url,
    issue::{MigrationOutcome, SourceIssue},
    poller::PollOutcome,
    tracker::SourceTracker,
};

/// Comment left on a migrated issue
pub fn migration_comment(new_issue_url: &str, reason: Option<&str>) -> String {
    let mut body = vec![format!(
        "This issue was migrated to {new_issue_url}. Please post all further comments there."
    )];
    if let Some(reason) = reason {
        body.push(reason.to_string());
    }
    body.join("\n\n")
}

/// Apply the outcome of the import to the source issue.
///
/// Every write is its own request; when one fails the issue keeps the
/// writes already done.
pub async fn finalize(
    source: &dyn SourceTracker,
    issue: &SourceIssue,
    outcome: &PollOutcome,
    reason: Option<&str>,
    pause: Duration,
) -> Result<MigrationOutcome, GitMigratorError> {
    match outcome {
        PollOutcome::Resolved(api_url) => {
            let new_issue_url = browsable_url(api_url);
            let migrated = MigrationOutcome::Migrated;
            source
                .update_labels(issue.number, issue.labels_with(migrated.label()))
                .await?;
            info!("Closing old issue {}, now {new_issue_url}", issue.number);
            source
                .add_comment(issue.number, migration_comment(&new_issue_url, reason))
                .await?;
            sleep(pause).await;
            if issue.is_open() {
                source.close_issue(issue.number).await?;
            }
            Ok(migrated)
        }
        PollOutcome::Exhausted { last_error } => {
            warn!(
                "Unable to find new issue url for {}, not closing or commenting ({})",
                issue.number,
                last_error.as_deref().unwrap_or("no error reported")
            );
            let failed = MigrationOutcome::Failed;
            source
                .update_labels(issue.number, issue.labels_with(failed.label()))
                .await?;
            Ok(failed)
        }
    }
}
