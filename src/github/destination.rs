//! Github repository the issues are imported into
use reqwest::Method;
use url::Url;

use super::{api_root, http_client, request, GITHUB_IMPORT_JSON};
use crate::{
    errors::{GitMigratorError, GitMigratorErrorKind},
    import::{ImportJob, ImportJobStatus, ImportRequest},
    tracker::{DestinationTracker, RepoId, TrackerFuture},
};

/// Github destination repository, using the issue import API.
///
/// The token needs admin permission on the repository, otherwise the
/// status url answers `Not Found`.
#[derive(Debug, Clone)]
pub struct GithubImporter {
    /// Repository the issues go to
    repo: RepoId,

    /// Github token
    token: String,

    /// Api root, without trailing slash
    api_root: String,

    /// Reqwest client
    client: reqwest::Client,
}

impl GithubImporter {
    /// Create a new GithubImporter
    pub(crate) fn new(repo: RepoId, token: String, api_url: &Url) -> Self {
        Self {
            repo,
            token,
            api_root: api_root(api_url),
            client: http_client(),
        }
    }
}

impl DestinationTracker for GithubImporter {
    fn get_repository(&self) -> &RepoId {
        &self.repo
    }

    fn submit_import(&self, import: ImportRequest) -> TrackerFuture<'_, ImportJob> {
        Box::pin(async move {
            let url = format!("{}/repos/{}/import/issues", self.api_root, self.repo.api_path());
            let response = request(&self.client, Method::POST, &url, &self.token, GITHUB_IMPORT_JSON)
                .json(&import)
                .send()
                .await?;
            if !response.status().is_success() {
                let text = response.text().await?;
                return Err(GitMigratorError::new(GitMigratorErrorKind::ImportSubmission)
                    .with_text(&text));
            }
            let text = response.text().await?;
            let job: ImportJob = serde_json::from_str(&text)?;
            Ok(job)
        })
    }

    fn import_status(&self, status_url: String) -> TrackerFuture<'_, ImportJobStatus> {
        Box::pin(async move {
            let response = request(
                &self.client,
                Method::GET,
                &status_url,
                &self.token,
                GITHUB_IMPORT_JSON,
            )
            .send()
            .await?;
            if !response.status().is_success() {
                let text = response.text().await?;
                return Err(GitMigratorError::new(GitMigratorErrorKind::ImportStatus)
                    .with_text(&text));
            }
            let text = response.text().await?;
            let status: ImportJobStatus = serde_json::from_str(&text)?;
            Ok(status)
        })
    }
}
