//! Merge several repositories, keeping their history, into a mono repo
use std::{
    fs::{create_dir, read_dir, remove_dir, rename},
    path::{Path, PathBuf},
    process::Stdio,
};

use log::{debug, info, warn};
use tokio::process::Command;

use crate::{
    config::MergeConfig,
    errors::{GitMigratorError, GitMigratorErrorKind},
    utils::{create_temp_folder, repo_name_from_url},
};

/// Remote name used while pulling a rewritten repository
const LOCAL_REMOTE: &str = "local_ref";

/// Validated merge configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    /// Url of the repository everything goes to
    pub destination: String,

    /// Name of the destination repository
    pub destination_name: String,

    /// Merged repositories, name and url
    pub sources: Vec<(String, String)>,

    /// Folder receiving the current content of the destination
    pub subfolder: String,

    /// Branch pulled from every merged repository
    pub branch: String,

    /// Commit identity, name and email
    pub identity: Option<(String, String)>,

    /// Extra attempts of a failing git command
    pub step_retries: u32,

    /// Folder the clones are made in
    pub workspace: PathBuf,
}

impl TryFrom<&MergeConfig> for MergePlan {
    type Error = GitMigratorError;

    fn try_from(config: &MergeConfig) -> Result<Self, Self::Error> {
        let data = &config.config_data;
        let missing = |field: &str| -> GitMigratorError {
            format!("Missing '{field}' in {}", config.config_path.display()).into()
        };
        let destination = data.destination.clone().ok_or_else(|| missing("destination"))?;
        let destination_name = repo_name_from_url(&destination)
            .ok_or_else(|| missing("destination"))?
            .to_string();
        let source_base = data.source_base.clone().ok_or_else(|| missing("source_base"))?;
        if data.repositories.is_empty() {
            return Err(missing("repositories"));
        }
        let sources = data
            .repositories
            .iter()
            .map(|name| {
                (
                    name.clone(),
                    format!("{}/{}", source_base.trim_end_matches('/'), name),
                )
            })
            .collect();
        let identity = match (&data.author_name, &data.author_email) {
            (Some(name), Some(email)) => Some((name.clone(), email.clone())),
            (None, None) => None,
            _ => return Err("'author_name' and 'author_email' go together".into()),
        };
        Ok(MergePlan {
            destination,
            destination_name,
            sources,
            subfolder: data.subfolder.clone().ok_or_else(|| missing("subfolder"))?,
            branch: data.branch.clone().unwrap_or_else(|| "master".to_string()),
            identity,
            step_retries: data.step_retries.unwrap_or(1),
            workspace: data.workspace.clone().unwrap_or_else(std::env::temp_dir),
        })
    }
}

/// Runs git commands, logging them and their output
#[derive(Debug, Clone)]
struct GitRunner {
    /// Commit identity passed with `-c`
    identity: Option<(String, String)>,

    /// Extra attempts of a failing command
    retries: u32,
}

impl GitRunner {
    /// Run `git <args>` in `cwd`, retrying on failure
    async fn run(&self, cwd: &Path, args: &[&str]) -> Result<String, GitMigratorError> {
        let line = format!("$ git {}", args.join(" "));
        let mut last_error = String::new();
        for attempt in 0..=self.retries {
            if attempt > 0 {
                warn!("Retrying ({attempt}/{}) {line}", self.retries);
            }
            info!("{line}");
            let mut command = Command::new("git");
            if let Some((name, email)) = &self.identity {
                command
                    .arg("-c")
                    .arg(format!("user.name={name}"))
                    .arg("-c")
                    .arg(format!("user.email={email}"));
            }
            let output = command
                .args(args)
                .current_dir(cwd)
                .stdin(Stdio::null())
                .output()
                .await?;
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            if !stdout.trim().is_empty() {
                debug!("{}", stdout.trim_end());
            }
            if output.status.success() {
                return Ok(stdout);
            }
            last_error = format!("{line} ({}): {}", output.status, stderr.trim_end());
            warn!("{last_error}");
        }
        Err(GitMigratorError::new(GitMigratorErrorKind::GitStep).with_text(&last_error))
    }

    /// Stage everything and commit, if anything changed
    async fn commit_all(&self, cwd: &Path, message: &str) -> Result<bool, GitMigratorError> {
        self.run(cwd, &["add", "-A"]).await?;
        let status = self.run(cwd, &["status", "--porcelain"]).await?;
        if status.trim().is_empty() {
            info!("Nothing to commit in {}", cwd.display());
            return Ok(false);
        }
        self.run(cwd, &["commit", "-m", message]).await?;
        Ok(true)
    }
}

/// Top-level entries of a work tree, `.git` and `keep` excluded
fn work_tree_entries(path: &Path, keep: &str) -> Result<Vec<String>, GitMigratorError> {
    let mut entries = vec![];
    for entry in read_dir(path)? {
        let name = entry?.file_name().to_string_lossy().to_string();
        if name != ".git" && name != keep {
            entries.push(name);
        }
    }
    entries.sort();
    Ok(entries)
}

/// Clone `url` into `path`
fn clone_repo(url: &str, path: &Path) -> Result<git2::Repository, GitMigratorError> {
    info!("Cloning from '{}' to '{}'...", url, path.display());
    let repo = git2::build::RepoBuilder::new().clone(url, path)?;
    Ok(repo)
}

/// Move the current content of the destination into its subfolder
async fn move_destination(
    git: &GitRunner,
    plan: &MergePlan,
    destination: &Path,
    staging: &Path,
) -> Result<(), GitMigratorError> {
    info!(
        "Moving '{}' into '{}'",
        plan.destination_name, plan.subfolder
    );
    create_dir(staging)?;
    for name in work_tree_entries(destination, "")? {
        rename(destination.join(&name), staging.join(&name))?;
    }
    let subfolder = destination.join(&plan.subfolder);
    create_dir(&subfolder)?;
    for name in work_tree_entries(staging, "")? {
        rename(staging.join(&name), subfolder.join(&name))?;
    }
    remove_dir(staging)?;
    git.commit_all(
        destination,
        &format!("Move {} into {}", plan.destination_name, plan.subfolder),
    )
    .await?;
    Ok(())
}

/// Rewrite the history of a cloned repository so everything lives in `<name>/`
async fn rewrite_into_folder(
    git: &GitRunner,
    plan: &MergePlan,
    name: &str,
    path: &Path,
) -> Result<(), GitMigratorError> {
    info!("Rewriting history of '{name}'");
    let staging = format!("{name}.migrating");
    let entries = work_tree_entries(path, &staging)?;
    if entries.is_empty() {
        warn!("'{name}' is empty, nothing to move");
        return Ok(());
    }
    create_dir(path.join(&staging))?;
    let target = format!("{staging}/");
    for entry in &entries {
        git.run(path, &["mv", entry.as_str(), target.as_str()])
            .await?;
    }
    git.run(path, &["mv", staging.as_str(), name]).await?;
    git.commit_all(
        path,
        &format!("Migrate {name} to {} mono repo", plan.destination_name),
    )
    .await?;
    Ok(())
}

/// Pull a rewritten repository into the destination
async fn merge_into_destination(
    git: &GitRunner,
    plan: &MergePlan,
    name: &str,
    path: &Path,
    destination: &Path,
) -> Result<(), GitMigratorError> {
    info!("Going to '{}' (to merge '{name}')", destination.display());
    let path = path.to_string_lossy().to_string();
    git.run(destination, &["remote", "add", LOCAL_REMOTE, path.as_str()])
        .await?;
    git.run(
        destination,
        &[
            "pull",
            "--no-rebase",
            "--no-edit",
            "--allow-unrelated-histories",
            LOCAL_REMOTE,
            plan.branch.as_str(),
        ],
    )
    .await?;
    git.run(destination, &["remote", "remove", LOCAL_REMOTE])
        .await?;
    git.commit_all(
        destination,
        &format!("Migrate {name} to {} mono repo", plan.destination_name),
    )
    .await?;
    Ok(())
}

/// Merge every repository of the plan into the destination.
///
/// Nothing is pushed: the merged destination is left on disk and its path
/// is returned.
/// # Errors
/// Error if a clone or a git command fails
pub async fn merge_repositories(plan: &MergePlan) -> Result<PathBuf, GitMigratorError> {
    let git = GitRunner {
        identity: plan.identity.clone(),
        retries: plan.step_retries,
    };
    let workspace = create_temp_folder(&plan.workspace)?;
    let sources_dir = workspace.join("sources");
    create_dir(&sources_dir)?;

    let destination = workspace.join(&plan.destination_name);
    clone_repo(&plan.destination, &destination)?;
    move_destination(&git, plan, &destination, &workspace.join("staging")).await?;

    let mut clones = vec![];
    for (name, url) in &plan.sources {
        let path = sources_dir.join(name);
        let repo = clone_repo(url, &path)?;
        repo.remote_delete("origin")?;
        clones.push((name.as_str(), path));
    }

    for (name, path) in &clones {
        rewrite_into_folder(&git, plan, name, path).await?;
        merge_into_destination(&git, plan, name, path, &destination).await?;
    }

    info!("Cloned repositories are in {}", sources_dir.display());
    info!("Merged repository is in {}", destination.display());
    info!("To push the changes run this:");
    info!("cd '{}' && git push", destination.display());
    Ok(destination)
}
