//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use vitrine_commerce::CompanyId;

use crate::config::VitrineConfig;
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: VitrineConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            VitrineConfig::load(path)?
        } else {
            // Try to find config in current directory or parent directories
            Self::find_config(&cwd).unwrap_or_default()
        };

        Ok(Self {
            config: config.with_env_overrides(),
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<VitrineConfig> {
        let config_names = ["vitrine.toml", ".vitrine.toml", "vitrine.json"];

        let mut current = start.to_path_buf();
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = VitrineConfig::load(config_path.to_str()?) {
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Company from the command line, else from config.
    pub fn company_id(&self, arg: Option<&str>) -> Result<CompanyId> {
        match arg.or(self.config.store.company_id.as_deref()) {
            Some(id) if !id.trim().is_empty() => Ok(CompanyId::new(id.trim())),
            _ => bail!(
                "No company selected. Pass --company or set store.company_id in vitrine.toml"
            ),
        }
    }

    /// Where the saved profile is stored.
    pub fn profile_path(&self) -> PathBuf {
        match &self.config.profile.path {
            Some(path) => self.resolve_path(path),
            None => dirs_path().join("vitrine").join("profile.json"),
        }
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}

/// Get the platform-specific data directory.
fn dirs_path() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        PathBuf::from("/tmp")
    }
}
