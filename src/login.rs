//! Mapping of source logins to destination logins
use std::{collections::HashMap, fs::read_to_string, path::Path};

use log::warn;

/// Static lookup table from source login to destination login
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoginMapping {
    /// source login -> destination login
    logins: HashMap<String, String>,
}

impl LoginMapping {
    /// Load the mapping from a JSON object file.
    ///
    /// A missing path, an unreadable file or invalid JSON all give an empty
    /// mapping, so every login maps to itself.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        let contents = match read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Unable to read user mapping {}: {e}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str::<HashMap<String, String>>(&contents) {
            Ok(logins) => Self { logins },
            Err(e) => {
                warn!("Invalid user mapping {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Destination login for `login`, `login` itself when not mapped
    pub fn map<'a>(&'a self, login: &'a str) -> &'a str {
        self.logins.get(login).map(String::as_str).unwrap_or(login)
    }

    /// Number of mapped logins
    pub fn len(&self) -> usize {
        self.logins.len()
    }

    /// Whether no login is mapped
    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LoginMapping {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            logins: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
