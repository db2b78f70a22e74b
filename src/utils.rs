//! Utility functions
use std::path::{Path, PathBuf};

use rand::{distr::Alphanumeric, rng, Rng};

use crate::errors::GitMigratorError;

/// Get a secret from the user, without echo
pub(crate) fn get_password(prompt: &str) -> Result<String, GitMigratorError> {
    rpassword::prompt_password(format!("Please enter {prompt}: "))
        .map_err(|e| GitMigratorError::new_with_source("Error reading password", e))
}

/// Create a new `tmp-<random>` folder inside `parent`
pub(crate) fn create_temp_folder(parent: &Path) -> Result<PathBuf, GitMigratorError> {
    let rand_string: String = rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    let temp_folder = parent.join(format!("tmp-{rand_string}"));
    std::fs::create_dir_all(&temp_folder)?;
    Ok(temp_folder)
}

/// Last path segment of a repository url, without `.git`
pub(crate) fn repo_name_from_url(url: &str) -> Option<&str> {
    url.trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .map(|name| name.trim_end_matches(".git"))
        .filter(|name| !name.is_empty())
}
