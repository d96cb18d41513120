use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Output file written when no configuration says otherwise.
pub const DEFAULT_DB_PATH: &str = "test.db";
/// Relation replaced on every run.
pub const DEFAULT_RELATION: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub path: PathBuf,
    pub table: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            table: DEFAULT_RELATION.to_string(),
        }
    }
}

impl Config {
    /// Defaults when `file` is `None`, otherwise the YAML file merged over the defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        match file {
            None => Ok(Self::default()),
            Some(path) => {
                let data = fs::read(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Self::from_yaml(&data)
                    .with_context(|| format!("failed to parse YAML at {}", path.display()))
            }
        }
    }

    fn from_yaml(data: &[u8]) -> Result<Self> {
        let config: Config = serde_yaml::from_slice(data)?;
        if config.table.is_empty() {
            anyhow::bail!("table name must not be empty");
        }
        Ok(config)
    }

    /// The output path with `~` and `$VAR` components expanded.
    pub fn db_path(&self) -> Result<PathBuf> {
        expand_path(&self.path)
            .ok_or_else(|| anyhow::anyhow!("cannot expand file path {}", self.path.display()))
    }
}

/// Expand a leading `~` and any `$VAR` (`%VAR%` on Windows) component.
/// `None` when the home directory or a referenced variable is unavailable.
fn expand_path(path: &Path) -> Option<PathBuf> {
    let mut parts = path.components().peekable();
    let mut expanded = match parts.peek() {
        Some(Component::Normal(first)) if *first == "~" => {
            parts.next();
            dirs_next::home_dir()?
        }
        _ => PathBuf::new(),
    };
    for part in parts {
        match part {
            Component::Normal(name) => expanded.push(expand_var(name.to_str()?)?),
            other => expanded.push(other),
        }
    }
    Some(expanded)
}

fn expand_var(part: &str) -> Option<String> {
    let var = if cfg!(windows) {
        part.strip_prefix('%').and_then(|p| p.strip_suffix('%'))
    } else {
        part.strip_prefix('$')
    };
    match var {
        Some(name) => std::env::var(name).ok(),
        None => Some(part.to_string()),
    }
}
