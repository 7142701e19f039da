// ==============================================================================
// rankjit.toml Configuration
// ==============================================================================
//
// Discovers and loads `rankjit.toml`, which tunes the specializer's limits.
// Every key is optional; missing keys keep the library defaults.
//
// Example rankjit.toml:
//
// ```toml
// max_loop_iterations = 64
// max_depth = 128
// ```

use std::path::{Path, PathBuf};

use lang_check::Config;
use miette::{IntoDiagnostic, WrapErr};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "rankjit.toml";

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct RankjitConfig {
    /// Passes over a loop body before giving up.
    #[serde(default)]
    pub max_loop_iterations: Option<usize>,

    /// Deepest chain of nested specializations.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

impl RankjitConfig {
    /// Overlay the configured limits on the defaults. A zero limit would fail
    /// every request, so it is ignored with a warning.
    pub fn to_config(&self) -> Config {
        let mut config = Config::default();
        if let Some(limit) = non_zero("max_loop_iterations", self.max_loop_iterations) {
            config.max_loop_iterations = limit;
        }
        if let Some(limit) = non_zero("max_depth", self.max_depth) {
            config.max_depth = limit;
        }
        config
    }
}

fn non_zero(key: &str, value: Option<usize>) -> Option<usize> {
    match value {
        Some(0) => {
            log::warn!("ignoring {key} = 0 in {CONFIG_FILE}");
            None
        }
        other => other,
    }
}

/// Walk up from `start_dir` looking for `rankjit.toml`. Returns the first match.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir;
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

pub fn load_config(path: &Path) -> miette::Result<RankjitConfig> {
    let contents = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&contents)
        .into_diagnostic()
        .wrap_err_with(|| format!("invalid {}", path.display()))
}

/// The explicit `--config` path if given, otherwise the nearest
/// `rankjit.toml` above the working directory, otherwise the defaults.
pub fn resolve(explicit: Option<&Path>) -> miette::Result<Config> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().into_diagnostic()?;
            find_config(&cwd)
        }
    };

    match path {
        Some(path) => {
            log::debug!("loading config from {}", path.display());
            Ok(load_config(&path)?.to_config())
        }
        None => Ok(Config::default()),
    }
}
