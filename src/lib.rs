//! # git-migrator
//!
//! Merge git repositories into a mono repo and migrate their issues
//!
//! ## Usage
//!
//! ```txt
//! Usage: git-migrator [OPTIONS] <COMMAND>
//!
//! Commands:
//!   issues  Move the issues of a repository to another one
//!   merge   Merge several repositories, with their history, into one
//!   help    Print this message or the help of the given subcommand(s)
//!
//! Options:
//!   -v, --verbose...  Verbose mode (-v, -vv)
//!   -h, --help        Print help
//!   -V, --version     Print version
//! ```
//!
//! `git-migrator issues <SOURCE> <DESTINATION> [REASON]` reads the tokens from
//! `SOURCE_GITHUB_API_TOKEN` and `DESTINATION_GITHUB_API_TOKEN`, the login
//! mapping from `USER_MAPPING_JSON` and `OPEN_ONLY` to skip closed issues.
//! Handled issues are labeled `migrated` or `migration_failed`, so a run can
//! be restarted at any time.

#![warn(clippy::all, rust_2018_idioms)]
#![deny(
    missing_docs,
    clippy::all,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unwrap_used,
    clippy::expect_used
)]

pub(crate) mod cli;
pub(crate) mod config;
pub(crate) mod errors;
pub(crate) mod finalizer;
pub(crate) mod github;
pub(crate) mod import;
pub(crate) mod issue;
pub(crate) mod lister;
pub(crate) mod login;
pub(crate) mod merge;
pub(crate) mod migrate;
pub(crate) mod poller;
pub(crate) mod tracker;
pub(crate) mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use cli::{git_migrator_main, GitMigratorCli, GitMigratorCommand, IssuesArgs, MergeArgs};
pub use config::{MergeConfig, MergeConfigData, MigrateConfig};
pub use errors::{GitMigratorError, GitMigratorErrorKind};
pub use finalizer::{finalize, migration_comment};
pub use import::{ImportComment, ImportIssue, ImportJob, ImportJobStatus, ImportRequest};
pub use issue::{IssueState, MigrationOutcome, SourceComment, SourceIssue};
pub use lister::{skip_reason, Candidate, IssueLister, SkipReason};
pub use login::LoginMapping;
pub use merge::{merge_repositories, MergePlan};
pub use migrate::{Migration, MigrationReport, MigrationSettings, DEFAULT_DELAY};
pub use poller::{poll_import, PollOutcome, PollPolicy};
pub use tracker::{DestinationTracker, RepoId, SourceTracker, TrackerFuture};
