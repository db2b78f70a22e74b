//! Issues as read from the source tracker
use serde::{Deserialize, Serialize};

/// State of an issue
#[derive(Deserialize, Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    /// Still open
    #[default]
    Open,
    /// Closed
    Closed,
}

/// Snapshot of an issue of the source repository
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceIssue {
    /// Issue number
    pub number: u64,

    /// Title
    pub title: String,

    /// Body, empty when the issue has none
    pub body: String,

    /// Login of the author
    pub author: String,

    /// Login of the assignee
    pub assignee: Option<String>,

    /// Label names
    pub labels: Vec<String>,

    /// Open or closed
    pub state: IssueState,

    /// Browsable url of the issue
    pub html_url: String,

    /// ISO 8601 creation date
    pub created_at: String,

    /// ISO 8601 closing date
    pub closed_at: Option<String>,

    /// Whether this issue is in fact a pull request
    pub pull_request: bool,

    /// Comments, in creation order
    pub comments: Vec<SourceComment>,
}

/// Comment of a source issue
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceComment {
    /// Login of the author
    pub author: String,

    /// Body of the comment
    pub body: String,

    /// ISO 8601 creation date
    pub created_at: String,
}

impl SourceIssue {
    /// Whether the issue is still open
    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }

    /// Whether the issue carries the label `name`
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label == name)
    }

    /// Outcome label already applied to the issue by a previous run
    pub fn outcome(&self) -> Option<MigrationOutcome> {
        [MigrationOutcome::Migrated, MigrationOutcome::Failed]
            .into_iter()
            .find(|outcome| self.has_label(outcome.label()))
    }

    /// Labels of the issue with `label` added
    pub fn labels_with(&self, label: &str) -> Vec<String> {
        let mut labels = self.labels.clone();
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
        }
        labels
    }
}

/// Outcome of a migration, written back to the source issue as a label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// The issue now lives in the destination repository
    Migrated,
    /// The import never resolved; remove the label to try again
    Failed,
}

impl MigrationOutcome {
    /// Label marking the outcome
    pub fn label(&self) -> &'static str {
        match self {
            MigrationOutcome::Migrated => "migrated",
            MigrationOutcome::Failed => "migration_failed",
        }
    }
}

impl std::fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
