//! GitHub API module.
use reqwest::{
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
    Method, RequestBuilder,
};
use std::time::Duration;

use url::Url;

pub(crate) mod destination;
pub(crate) mod issue;
pub(crate) mod source;

/// GitHub API URL
pub(crate) const GITHUB_API_URL: &str = "https://api.github.com";

/// GitHub API Header
const GITHUB_API_HEADER: &str = "X-GitHub-Api-Version";

/// GitHub API Version
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Media type of the regular REST API
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Media type of the issue import API
const GITHUB_IMPORT_JSON: &str = "application/vnd.github.golden-comet-preview+json";

/// User agent sent with every request
const GITHUB_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Number of items requested per page
const PER_PAGE: &str = "100";

/// Timeout of a single request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Http client with a per request timeout
fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Build an authenticated request
fn request(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    token: &str,
    accept: &str,
) -> RequestBuilder {
    client
        .request(method, url)
        .header(AUTHORIZATION, format!("token {token}"))
        .header(ACCEPT, accept)
        .header(USER_AGENT, GITHUB_USER_AGENT)
        .header(GITHUB_API_HEADER, GITHUB_API_VERSION)
}

/// Api root without trailing slash
fn api_root(api_url: &Url) -> String {
    api_url.as_str().trim_end_matches('/').to_string()
}

/// Turn the api url of an issue into the url of its web page.
///
/// `https://api.github.com/repos/o/r/issues/1` becomes `https://github.com/o/r/issues/1`,
/// `https://host/api/v3/repos/o/r/issues/1` becomes `https://host/o/r/issues/1`.
/// Anything else is returned as is.
pub(crate) fn browsable_url(api_issue_url: &str) -> String {
    let Ok(mut url) = Url::parse(api_issue_url) else {
        return api_issue_url.to_string();
    };
    let path = url.path().to_string();
    let web_host = url
        .host_str()
        .and_then(|h| h.strip_prefix("api."))
        .map(str::to_string);
    if let Some(host) = web_host {
        let Some(rest) = path.strip_prefix("/repos/") else {
            return api_issue_url.to_string();
        };
        if url.set_host(Some(&host)).is_err() {
            return api_issue_url.to_string();
        }
        url.set_path(rest);
    } else if let Some(rest) = path.strip_prefix("/api/v3/repos/") {
        url.set_path(rest);
    } else {
        return api_issue_url.to_string();
    }
    url.to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn browsable_github_url() {
        assert_eq!(
            browsable_url("https://api.github.com/repos/dest/org/issues/99"),
            "https://github.com/dest/org/issues/99"
        );
    }

    #[test]
    fn browsable_enterprise_url() {
        assert_eq!(
            browsable_url("https://git.example.com/api/v3/repos/o/r/issues/5"),
            "https://git.example.com/o/r/issues/5"
        );
    }

    #[test]
    fn unknown_url_is_kept() {
        assert_eq!(
            browsable_url("https://github.com/o/r/issues/5"),
            "https://github.com/o/r/issues/5"
        );
        assert_eq!(browsable_url("not an url"), "not an url");
    }

    #[tokio::test]
    async fn stalled_requests_time_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let _hold = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(600)).await;
        });
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let result = request(&client, Method::GET, &url, "secret", GITHUB_JSON)
            .send()
            .await;
        assert!(result.unwrap_err().is_timeout());
    }
}
