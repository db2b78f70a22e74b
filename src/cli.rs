//! Command line options for the git-migrator tool
use std::path::PathBuf;

use clap::{builder::FalseyValueParser, Args, Parser, Subcommand};
use log::info;

use crate::{
    config::{MergeConfig, MigrateConfig},
    errors::GitMigratorError,
    merge::{merge_repositories, MergePlan},
    migrate::Migration,
};

/// git-migrator - Merge repositories into a mono repo and migrate their issues
#[derive(Parser, Clone, Debug)]
#[command(version)]
pub struct GitMigratorCli {
    /// What to migrate
    #[command(subcommand)]
    pub command: GitMigratorCommand,

    /// Verbose mode (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Subcommands
#[derive(Subcommand, Clone, Debug)]
pub enum GitMigratorCommand {
    /// Move the issues of a repository to another one
    Issues(IssuesArgs),

    /// Merge several repositories, with their history, into one
    Merge(MergeArgs),
}

/// Options of the `issues` subcommand
#[derive(Args, Clone, Debug, Default)]
pub struct IssuesArgs {
    /// Repository the issues come from (owner/name)
    pub source: String,

    /// Repository the issues go to (owner/name)
    pub destination: String,

    /// Reason of the migration, posted on every migrated issue
    pub reason: Option<String>,

    /// Only migrate open issues
    #[arg(long, env = "OPEN_ONLY", value_parser = FalseyValueParser::new())]
    pub open_only: bool,

    /// Ask the authors of open pull requests to re-submit them, and close them
    #[arg(long)]
    pub notify_pull_requests: bool,

    /// Token of the source repository
    #[arg(long, env = "SOURCE_GITHUB_API_TOKEN", hide_env_values = true)]
    pub source_token: Option<String>,

    /// Token of the destination repository, with admin permission
    #[arg(long, env = "DESTINATION_GITHUB_API_TOKEN", hide_env_values = true)]
    pub destination_token: Option<String>,

    /// API endpoint of the source (GitHub Enterprise)
    #[arg(long, env = "SOURCE_GITHUB_API_ENDPOINT")]
    pub source_endpoint: Option<String>,

    /// API endpoint of the destination (GitHub Enterprise)
    #[arg(long, env = "DESTINATION_GITHUB_API_ENDPOINT")]
    pub destination_endpoint: Option<String>,

    /// JSON file mapping source logins to destination logins
    #[arg(long, env = "USER_MAPPING_JSON")]
    pub user_mapping: Option<PathBuf>,

    /// Pause between two issues, in milliseconds
    #[arg(long, default_value_t = 2500)]
    pub delay_ms: u64,
}

/// Options of the `merge` subcommand
#[derive(Args, Clone, Debug, Default)]
pub struct MergeArgs {
    /// Custom configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show the current config path
    #[arg(long)]
    pub show_config_path: bool,
}

/// Run the git-migrator tool with the provided command line options
/// # Errors
/// Error if the configuration is invalid or the merge fails
pub async fn git_migrator_main(args: GitMigratorCli) -> Result<(), GitMigratorError> {
    match args.command {
        GitMigratorCommand::Issues(issues_args) => {
            let config = MigrateConfig::try_new(issues_args)?;
            info!("Migrating {} -> {}", config.source, config.destination);
            let (source, destination) = config.trackers();
            let mapping = config.login_mapping();
            if !mapping.is_empty() {
                info!("Mapping {} logins", mapping.len());
            }
            Migration::new(&source, &destination, &mapping, config.settings())
                .run()
                .await?;
            Ok(())
        }
        GitMigratorCommand::Merge(merge_args) => {
            let config = MergeConfig::try_new(merge_args.config)?;
            if merge_args.show_config_path {
                println!("{}", config.config_path.display());
                return Ok(());
            }
            let plan = MergePlan::try_from(&config)?;
            merge_repositories(&plan).await?;
            Ok(())
        }
    }
}
