//! File commands and masking understood by the GitHub Actions runner.

use crate::env::ExecutionEnv;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Handle on the runner's file-command channel.
///
/// When a file variable is unset (local runs) the matching command is skipped.
#[derive(Debug, Clone, Default)]
pub struct ActionsRuntime {
    path_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    in_actions: bool,
}

impl ActionsRuntime {
    pub fn from_env(env: &ExecutionEnv) -> Self {
        Self {
            path_file: env.path_file.clone(),
            output_file: env.output_file.clone(),
            in_actions: env.in_actions,
        }
    }

    /// Prepend `dir` to the search path of later steps.
    pub fn add_path(&self, dir: &Path) -> io::Result<()> {
        let Some(file) = &self.path_file else {
            tracing::debug!("GITHUB_PATH not set, not exporting {}", dir.display());
            return Ok(());
        };
        append(file, &format!("{}\n", dir.display()))
    }

    /// Set a step output.
    pub fn set_output(&self, name: &str, value: &str) -> io::Result<()> {
        let Some(file) = &self.output_file else {
            tracing::debug!("GITHUB_OUTPUT not set, skipping output {name}");
            return Ok(());
        };
        let delimiter = format!("ghadelimiter_{:016x}", rand::random::<u64>());
        append(file, &format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
    }

    /// Ask the runner to hide `secret` in all later log lines.
    pub fn mask(&self, secret: &str) {
        if self.in_actions && !secret.trim().is_empty() {
            println!("::add-mask::{}", secret.trim());
        }
    }
}

fn append(file: &Path, text: &str) -> io::Result<()> {
    let mut handle = OpenOptions::new().create(true).append(true).open(file)?;
    handle.write_all(text.as_bytes())
}

/// Pull request number from the event payload, if the run was triggered by one.
pub fn pull_request_number(event_path: &Path) -> Option<u64> {
    let content = std::fs::read_to_string(event_path).ok()?;
    let payload: serde_json::Value = serde_json::from_str(&content).ok()?;
    payload.pointer("/pull_request/number")?.as_u64()
}
