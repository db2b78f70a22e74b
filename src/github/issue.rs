//! Github issue structs and conversion to the source issue structs
use serde::{Deserialize, Serialize};

use crate::issue::{IssueState, SourceComment, SourceIssue};

/// Github user, only the login is kept
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct UserGithub {
    /// User login
    pub login: String,
}

/// Github label
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct LabelGithub {
    /// Label name
    pub name: String,
}

/// Github issue (or pull request) from the issues endpoint
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct IssueGithub {
    /// Issue number
    pub number: u64,

    /// Issue title
    pub title: String,

    /// Issue body
    pub body: Option<String>,

    /// Author; deleted accounts come back as null
    pub user: Option<UserGithub>,

    /// Assignee
    pub assignee: Option<UserGithub>,

    /// Labels
    #[serde(default)]
    pub labels: Vec<LabelGithub>,

    /// Issue state
    pub state: IssueState,

    /// Web url
    pub html_url: String,

    /// Creation date
    pub created_at: String,

    /// Closing date
    pub closed_at: Option<String>,

    /// Present only for pull requests
    pub pull_request: Option<serde_json::Value>,
}

/// Github issue comment
#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct CommentGithub {
    /// Author
    pub user: Option<UserGithub>,

    /// Comment body
    pub body: Option<String>,

    /// Creation date
    pub created_at: String,
}

/// Login shown for deleted accounts
const GHOST_LOGIN: &str = "ghost";

/// Login of an optional user
fn login_of(user: Option<UserGithub>) -> String {
    user.map(|u| u.login)
        .unwrap_or_else(|| GHOST_LOGIN.to_string())
}

impl From<IssueGithub> for SourceIssue {
    fn from(issue: IssueGithub) -> Self {
        SourceIssue {
            number: issue.number,
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            author: login_of(issue.user),
            assignee: issue.assignee.map(|u| u.login),
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            state: issue.state,
            html_url: issue.html_url,
            created_at: issue.created_at,
            closed_at: issue.closed_at,
            pull_request: issue.pull_request.is_some(),
            comments: vec![],
        }
    }
}

impl From<CommentGithub> for SourceComment {
    fn from(comment: CommentGithub) -> Self {
        SourceComment {
            author: login_of(comment.user),
            body: comment.body.unwrap_or_default(),
            created_at: comment.created_at,
        }
    }
}
