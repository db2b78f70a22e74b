//! Import payload sent to the destination tracker
use serde::{Deserialize, Serialize};

use crate::{
    issue::{SourceComment, SourceIssue},
    login::LoginMapping,
};

/// Body of an import job: the issue and all its comments
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    /// The issue itself
    pub issue: ImportIssue,

    /// Comments, in the order of the source
    pub comments: Vec<ImportComment>,
}

/// Issue part of an [`ImportRequest`]
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ImportIssue {
    /// Title, unchanged
    pub title: String,

    /// Attribution banner followed by the original body
    pub body: String,

    /// Creation date of the original issue
    pub created_at: String,

    /// Mapped assignee
    pub assignee: Option<String>,

    /// Labels of the source issue
    pub labels: Vec<String>,

    /// Whether the imported issue is closed
    pub closed: bool,

    /// Closing date, only sent for closed issues
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub closed_at: Option<String>,
}

/// Comment part of an [`ImportRequest`]
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ImportComment {
    /// Creation date of the original comment
    pub created_at: String,

    /// Attribution banner followed by the original body
    pub body: String,
}

/// Import job as returned on submission
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportJob {
    /// Status url to poll
    pub url: String,

    /// `pending`, `imported` or `failed`
    #[serde(default)]
    pub status: Option<String>,
}

/// Import job as returned when polling its status url
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct ImportJobStatus {
    /// `pending`, `imported` or `failed`
    #[serde(default)]
    pub status: Option<String>,

    /// Api url of the created issue, once imported
    #[serde(default)]
    pub issue_url: Option<String>,

    /// Error details of a failed import
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

impl ImportJobStatus {
    /// Url of the new issue, if the import is done
    pub fn resolved_url(&self) -> Option<&str> {
        self.issue_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Error detail of a failed import
    pub fn error_detail(&self) -> Option<String> {
        match (&self.errors, self.status.as_deref()) {
            (Some(errors), _) => Some(errors.to_string()),
            (None, Some("failed")) => Some("import failed".to_string()),
            _ => None,
        }
    }
}

/// Render the small avatar table identifying the original author
pub fn attribution_banner(login: &str, text: &str) -> String {
    format!(
        "<table>
  <tr>
    <td>
      <img src='https://github.com/{login}.png' width='35'>
    </td>
    <td>
      {text}
    </td>
  </tr>
</table>"
    )
}

impl ImportRequest {
    /// Build the import payload of `issue`, coming from the `source` repository
    pub fn build(issue: &SourceIssue, source: &str, mapping: &LoginMapping) -> Self {
        let author = mapping.map(&issue.author);
        let link = format!(
            "Imported from <a href='{}'>{}#{}</a>",
            issue.html_url, source, issue.number
        );
        let banner = attribution_banner(author, &format!("Original issue by @{author} - {link}"));
        let closed = !issue.is_open();
        ImportRequest {
            issue: ImportIssue {
                title: issue.title.clone(),
                body: [banner.as_str(), issue.body.as_str()].join("\n\n"),
                created_at: issue.created_at.clone(),
                assignee: issue
                    .assignee
                    .as_deref()
                    .map(|login| mapping.map(login).to_string()),
                labels: issue.labels.clone(),
                closed,
                closed_at: if closed {
                    issue.closed_at.clone()
                } else {
                    None
                },
            },
            comments: issue
                .comments
                .iter()
                .map(|comment| ImportComment::build(comment, mapping))
                .collect(),
        }
    }
}

impl ImportComment {
    /// Build the imported version of `comment`
    fn build(comment: &SourceComment, mapping: &LoginMapping) -> Self {
        let author = mapping.map(&comment.author);
        let banner = attribution_banner(author, &format!("@{author} commented"));
        ImportComment {
            created_at: comment.created_at.clone(),
            body: [banner.as_str(), comment.body.as_str()].join("\n\n"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::issue::IssueState;

    fn closed_issue() -> SourceIssue {
        SourceIssue {
            number: 7,
            title: "Crash on start".to_string(),
            body: "It crashes".to_string(),
            author: "carol".to_string(),
            assignee: Some("alice".to_string()),
            labels: vec!["bug".to_string()],
            state: IssueState::Closed,
            html_url: "https://github.com/src/repo/issues/7".to_string(),
            created_at: "2016-01-01T10:00:00Z".to_string(),
            closed_at: Some("2016-02-01T10:00:00Z".to_string()),
            pull_request: false,
            comments: vec![
                SourceComment {
                    author: "alice".to_string(),
                    body: "first".to_string(),
                    created_at: "2016-01-02T10:00:00Z".to_string(),
                },
                SourceComment {
                    author: "dave".to_string(),
                    body: "second".to_string(),
                    created_at: "2016-01-03T10:00:00Z".to_string(),
                },
            ],
        }
    }

    #[test]
    fn closed_issue_payload() {
        let mapping: LoginMapping = [("alice", "alice-dest")].into_iter().collect();
        let request = ImportRequest::build(&closed_issue(), "src/repo", &mapping);
        assert!(request.issue.closed);
        assert_eq!(request.issue.closed_at.as_deref(), Some("2016-02-01T10:00:00Z"));
        assert_eq!(request.issue.assignee.as_deref(), Some("alice-dest"));
        assert_eq!(request.issue.labels, vec!["bug"]);
        assert!(request.issue.body.contains("Original issue by @carol"));
        assert!(request
            .issue
            .body
            .contains("<a href='https://github.com/src/repo/issues/7'>src/repo#7</a>"));
        assert!(request.issue.body.ends_with("</table>\n\nIt crashes"));

        let order: Vec<_> = request.comments.iter().map(|c| c.created_at.as_str()).collect();
        assert_eq!(order, vec!["2016-01-02T10:00:00Z", "2016-01-03T10:00:00Z"]);
        assert!(request.comments[0].body.contains("@alice-dest commented"));
        assert!(request.comments[1].body.ends_with("\n\nsecond"));
    }

    #[test]
    fn open_issue_has_no_closed_at() {
        let mut issue = closed_issue();
        issue.state = IssueState::Open;
        issue.assignee = None;
        let request = ImportRequest::build(&issue, "src/repo", &LoginMapping::default());
        assert!(!request.issue.closed);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["issue"].get("closed_at").is_none());
        assert!(json["issue"]["assignee"].is_null());
        assert_eq!(json["comments"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn job_status_resolution() {
        let pending: ImportJobStatus =
            serde_json::from_str(r#"{"id": 3, "status": "pending"}"#).unwrap();
        assert_eq!(pending.resolved_url(), None);
        assert_eq!(pending.error_detail(), None);

        let empty: ImportJobStatus = serde_json::from_str(r#"{"issue_url": ""}"#).unwrap();
        assert_eq!(empty.resolved_url(), None);

        let failed: ImportJobStatus = serde_json::from_str(
            r#"{"status": "failed", "errors": [{"field": "assignee", "code": "invalid"}]}"#,
        )
        .unwrap();
        assert!(failed.error_detail().is_some_and(|e| e.contains("assignee")));

        let done: ImportJobStatus = serde_json::from_str(
            r#"{"status": "imported", "issue_url": "https://api.github.com/repos/o/r/issues/1"}"#,
        )
        .unwrap();
        assert_eq!(
            done.resolved_url(),
            Some("https://api.github.com/repos/o/r/issues/1")
        );
    }
}
