//! Configuration handling
use std::{
    fs::{create_dir_all, read_to_string, File},
    io::Write,
    path::PathBuf,
    time::Duration,
};

use home::home_dir;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    cli::IssuesArgs,
    errors::GitMigratorError,
    github::{destination::GithubImporter, source::GithubSource, GITHUB_API_URL},
    login::LoginMapping,
    migrate::MigrationSettings,
    poller::PollPolicy,
    tracker::RepoId,
    utils::get_password,
};

/// Configuration of the `issues` subcommand
#[derive(Debug, Clone)]
pub struct MigrateConfig {
    /// Repository the issues come from
    pub source: RepoId,

    /// Repository the issues go to
    pub destination: RepoId,

    /// Token of the source
    source_token: String,

    /// Token of the destination
    destination_token: String,

    /// Api of the source
    pub source_api: Url,

    /// Api of the destination
    pub destination_api: Url,

    /// Path of the login mapping
    pub user_mapping: Option<PathBuf>,

    /// Settings of the run
    settings: MigrationSettings,
}

impl MigrateConfig {
    /// Build the configuration from the command line, asking for the
    /// missing tokens
    /// # Errors
    /// Error if a repository or an endpoint is invalid, or a token can't be read
    pub fn try_new(args: IssuesArgs) -> Result<Self, GitMigratorError> {
        let source_token = match args.source_token.clone() {
            Some(token) => token,
            None => get_password("the token of the source repository")?,
        };
        let destination_token = match args.destination_token.clone() {
            Some(token) => token,
            None => get_password("the token of the destination repository (admin)")?,
        };
        Self::with_tokens(args, source_token, destination_token)
    }

    /// Build the configuration with already known tokens
    /// # Errors
    /// Error if a repository or an endpoint is invalid
    pub fn with_tokens(
        args: IssuesArgs,
        source_token: String,
        destination_token: String,
    ) -> Result<Self, GitMigratorError> {
        let source: RepoId = args.source.parse()?;
        let destination: RepoId = args.destination.parse()?;
        if source == destination {
            return Err("Source and destination can't be the same".into());
        }
        let endpoint = |value: Option<&str>| -> Result<Url, GitMigratorError> {
            let value = value.filter(|v| !v.is_empty()).unwrap_or(GITHUB_API_URL);
            Ok(Url::parse(value)?)
        };
        Ok(MigrateConfig {
            source,
            destination,
            source_token,
            destination_token,
            source_api: endpoint(args.source_endpoint.as_deref())?,
            destination_api: endpoint(args.destination_endpoint.as_deref())?,
            user_mapping: args.user_mapping,
            settings: MigrationSettings {
                open_only: args.open_only,
                notify_pull_requests: args.notify_pull_requests,
                reason: args.reason.filter(|r| !r.trim().is_empty()),
                delay: Duration::from_millis(args.delay_ms),
                poll: PollPolicy::default(),
            },
        })
    }

    /// Clients of the source and the destination
    pub(crate) fn trackers(&self) -> (GithubSource, GithubImporter) {
        (
            GithubSource::new(
                self.source.clone(),
                self.source_token.clone(),
                &self.source_api,
            ),
            GithubImporter::new(
                self.destination.clone(),
                self.destination_token.clone(),
                &self.destination_api,
            ),
        )
    }

    /// Login mapping, empty when not configured or unreadable
    pub fn login_mapping(&self) -> LoginMapping {
        LoginMapping::load(self.user_mapping.as_deref())
    }

    /// Settings of the run
    pub fn settings(&self) -> MigrationSettings {
        self.settings.clone()
    }
}

/// Configuration of the `merge` subcommand
#[derive(Default, Clone, Debug)]
pub struct MergeConfig {
    /// path to the configuration file
    pub config_path: PathBuf,

    /// actual configuration data
    pub config_data: MergeConfigData,
}

/// Content of the merge configuration file
#[derive(Deserialize, Serialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct MergeConfigData {
    /// Repository everything goes to
    pub destination: Option<String>,

    /// Url prefix of the merged repositories
    pub source_base: Option<String>,

    /// Names of the merged repositories
    #[serde(default)]
    pub repositories: Vec<String>,

    /// Folder receiving the current content of the destination
    pub subfolder: Option<String>,

    /// Branch pulled from every merged repository
    pub branch: Option<String>,

    /// Name used for the commits
    pub author_name: Option<String>,

    /// Email used for the commits
    pub author_email: Option<String>,

    /// Extra attempts of a failing git command
    pub step_retries: Option<u32>,

    /// Folder the clones are made in, the system temp dir by default
    pub workspace: Option<PathBuf>,
}

impl MergeConfig {
    /// Load the merge configuration from `path`, or from the default path
    /// # Errors
    /// Error if the config file can't be opened or parsed
    pub fn try_new(path: Option<PathBuf>) -> Result<Self, GitMigratorError> {
        let config_path = match path {
            Some(p) => p,
            None => Self::get_config_path()?,
        };
        let contents = read_to_string(&config_path)
            .map_err(|e| GitMigratorError::new_with_source("Unable to open", e))?;
        let config_data = toml::from_str(&contents)?;
        Ok(MergeConfig {
            config_path,
            config_data,
        })
    }

    /// Get the path to the config file, creating an empty one if needed
    /// # Errors
    /// Error if the home directory can't be found
    pub fn get_config_path() -> Result<PathBuf, GitMigratorError> {
        let home_dir = match home_dir() {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => return Err("Unable to get your home dir! home::home_dir() isn't working".into()),
        };
        let config_directory = home_dir.join(".config").join(".git-migrator");
        let config_path = config_directory.join("merge.toml");
        create_dir_all(config_directory)
            .map_err(|e| GitMigratorError::new_with_source("Unable to create config dir", e))?;
        if !config_path.exists() {
            let mut file = File::create(&config_path)
                .map_err(|e| GitMigratorError::new_with_source("Unable to create config file", e))?;
            file.write_all(b"")
                .map_err(|e| GitMigratorError::new_with_source("Unable to write to config file", e))?;
        }
        Ok(config_path)
    }
}
