//! Github repository the issues are migrated from
use log::debug;
use reqwest::Method;
use serde_json::json;
use url::Url;

use super::{
    api_root, http_client,
    issue::{CommentGithub, IssueGithub},
    request, GITHUB_JSON, PER_PAGE,
};
use crate::{
    errors::{GitMigratorError, GitMigratorErrorKind},
    issue::{SourceComment, SourceIssue},
    tracker::{RepoId, SourceTracker, TrackerFuture},
};

/// Github source repository
#[derive(Debug, Clone)]
pub struct GithubSource {
    /// Repository the issues come from
    repo: RepoId,

    /// Github token
    token: String,

    /// Api root, without trailing slash
    api_root: String,

    /// Reqwest client
    client: reqwest::Client,
}

impl GithubSource {
    /// Create a new GithubSource
    pub(crate) fn new(repo: RepoId, token: String, api_url: &Url) -> Self {
        Self {
            repo,
            token,
            api_root: api_root(api_url),
            client: http_client(),
        }
    }

    /// Url of an issue endpoint
    fn issue_url(&self, number: u64) -> String {
        format!(
            "{}/repos/{}/issues/{}",
            self.api_root,
            self.repo.api_path(),
            number
        )
    }

    /// Send an issue update, failing with `kind`
    async fn patch(
        &self,
        url: String,
        body: serde_json::Value,
        kind: GitMigratorErrorKind,
        number: u64,
    ) -> Result<(), GitMigratorError> {
        let response = request(&self.client, Method::PATCH, &url, &self.token, GITHUB_JSON)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            let text = response.text().await?;
            return Err(GitMigratorError::new(kind)
                .with_issue(number)
                .with_text(&text));
        }
        Ok(())
    }
}

impl SourceTracker for GithubSource {
    fn get_repository(&self) -> &RepoId {
        &self.repo
    }

    fn list_issues_page(&self, page: usize) -> TrackerFuture<'_, Vec<SourceIssue>> {
        Box::pin(async move {
            let url = format!("{}/repos/{}/issues", self.api_root, self.repo.api_path());
            let page_str = page.to_string();
            let response = request(&self.client, Method::GET, &url, &self.token, GITHUB_JSON)
                .query(&[
                    ("state", "all"),
                    ("direction", "asc"),
                    ("per_page", PER_PAGE),
                    ("page", page_str.as_str()),
                ])
                .send()
                .await?;
            if !response.status().is_success() {
                let text = response.text().await?;
                return Err(GitMigratorError::new(GitMigratorErrorKind::ListIssues).with_text(&text));
            }
            let text = response.text().await?;
            let issues: Vec<IssueGithub> = serde_json::from_str(&text)?;
            debug!("Requested {} (page {}): {}", self.repo, page, issues.len());
            Ok(issues.into_iter().map(|i| i.into()).collect())
        })
    }

    fn issue_comments(&self, number: u64) -> TrackerFuture<'_, Vec<SourceComment>> {
        Box::pin(async move {
            let url = format!("{}/comments", self.issue_url(number));
            let mut page: usize = 1;
            let mut all_comments = vec![];
            loop {
                let page_str = page.to_string();
                let response = request(&self.client, Method::GET, &url, &self.token, GITHUB_JSON)
                    .query(&[("per_page", PER_PAGE), ("page", page_str.as_str())])
                    .send()
                    .await?;
                if !response.status().is_success() {
                    let text = response.text().await?;
                    return Err(GitMigratorError::new(GitMigratorErrorKind::ListComments)
                        .with_issue(number)
                        .with_text(&text));
                }
                let text = response.text().await?;
                let comments: Vec<CommentGithub> = serde_json::from_str(&text)?;
                if comments.is_empty() {
                    break;
                }
                all_comments.extend(comments.into_iter().map(SourceComment::from));
                page += 1;
            }
            Ok(all_comments)
        })
    }

    fn update_labels(&self, number: u64, labels: Vec<String>) -> TrackerFuture<'_, ()> {
        Box::pin(async move {
            self.patch(
                self.issue_url(number),
                json!({ "labels": labels }),
                GitMigratorErrorKind::UpdateIssue,
                number,
            )
            .await
        })
    }

    fn add_comment(&self, number: u64, body: String) -> TrackerFuture<'_, ()> {
        Box::pin(async move {
            let url = format!("{}/comments", self.issue_url(number));
            let response = request(&self.client, Method::POST, &url, &self.token, GITHUB_JSON)
                .json(&json!({ "body": body }))
                .send()
                .await?;
            if !response.status().is_success() {
                let text = response.text().await?;
                return Err(GitMigratorError::new(GitMigratorErrorKind::AddComment)
                    .with_issue(number)
                    .with_text(&text));
            }
            Ok(())
        })
    }

    fn close_issue(&self, number: u64) -> TrackerFuture<'_, ()> {
        Box::pin(async move {
            self.patch(
                self.issue_url(number),
                json!({ "state": "closed" }),
                GitMigratorErrorKind::UpdateIssue,
                number,
            )
            .await
        })
    }

    fn close_pull_request(&self, number: u64) -> TrackerFuture<'_, ()> {
        Box::pin(async move {
            let url = format!(
                "{}/repos/{}/pulls/{}",
                self.api_root,
                self.repo.api_path(),
                number
            );
            self.patch(
                url,
                json!({ "state": "closed" }),
                GitMigratorErrorKind::ClosePullRequest,
                number,
            )
            .await
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::issue::IssueState;
    use mockito::{Matcher, Server, ServerGuard};

    fn source_for(server: &ServerGuard) -> GithubSource {
        let api_url = Url::parse(&server.url()).unwrap();
        GithubSource::new("src/repo".parse().unwrap(), "secret".to_string(), &api_url)
    }

    #[tokio::test]
    async fn list_one_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/src/repo/issues")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("state".into(), "all".into()),
                Matcher::UrlEncoded("page".into(), "2".into()),
            ]))
            .match_header("authorization", "token secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!([{
                    "number": 3,
                    "title": "t",
                    "body": "b",
                    "user": {"login": "alice"},
                    "assignee": {"login": "bob"},
                    "labels": [{"name": "bug"}],
                    "state": "closed",
                    "html_url": "https://github.com/src/repo/issues/3",
                    "created_at": "2016-01-01T00:00:00Z",
                    "closed_at": "2016-01-02T00:00:00Z"
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let issues = source_for(&server).list_issues_page(2).await.unwrap();
        mock.assert_async().await;
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].number, 3);
        assert_eq!(issues[0].state, IssueState::Closed);
        assert_eq!(issues[0].assignee.as_deref(), Some("bob"));
        assert!(!issues[0].pull_request);
    }

    #[tokio::test]
    async fn list_error_is_reported() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/src/repo/issues")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let err = source_for(&server).list_issues_page(1).await.unwrap_err();
        assert_eq!(err.kind(), &GitMigratorErrorKind::ListIssues);
        assert!(err.to_string().contains("Not Found"));
    }

    #[tokio::test]
    async fn comments_are_paginated() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/repos/src/repo/issues/3/comments")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body(
                r#"[{"user": {"login": "a"}, "body": "one", "created_at": "1"},
                    {"user": {"login": "b"}, "body": "two", "created_at": "2"}]"#,
            )
            .create_async()
            .await;
        let second = server
            .mock("GET", "/repos/src/repo/issues/3/comments")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let comments = source_for(&server).issue_comments(3).await.unwrap();
        first.assert_async().await;
        second.assert_async().await;
        let bodies: Vec<_> = comments.iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn writes_hit_the_right_endpoints() {
        let mut server = Server::new_async().await;
        let labels = server
            .mock("PATCH", "/repos/src/repo/issues/3")
            .match_body(Matcher::Json(serde_json::json!({"labels": ["bug", "migrated"]})))
            .with_status(200)
            .create_async()
            .await;
        let close = server
            .mock("PATCH", "/repos/src/repo/issues/3")
            .match_body(Matcher::Json(serde_json::json!({"state": "closed"})))
            .with_status(200)
            .create_async()
            .await;
        let comment = server
            .mock("POST", "/repos/src/repo/issues/3/comments")
            .match_body(Matcher::Json(serde_json::json!({"body": "moved"})))
            .with_status(201)
            .create_async()
            .await;
        let close_pr = server
            .mock("PATCH", "/repos/src/repo/pulls/4")
            .match_body(Matcher::Json(serde_json::json!({"state": "closed"})))
            .with_status(200)
            .create_async()
            .await;

        let source = source_for(&server);
        source
            .update_labels(3, vec!["bug".to_string(), "migrated".to_string()])
            .await
            .unwrap();
        source.add_comment(3, "moved".to_string()).await.unwrap();
        source.close_issue(3).await.unwrap();
        source.close_pull_request(4).await.unwrap();
        labels.assert_async().await;
        comment.assert_async().await;
        close.assert_async().await;
        close_pr.assert_async().await;
    }
}
