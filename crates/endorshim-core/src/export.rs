//! Publishing scan results as a named job artifact.

use crate::actions::ActionsRuntime;
use crate::inputs::ActionInputs;
use crate::options::{Diagnostic, DiagnosticSeverity};
use anyhow::Context;
use rand::Rng;
use std::path::{Path, PathBuf};

pub const BASE_ARTIFACT_NAME: &str = "endor-scan";
pub const MAX_NAME_CHECKS: usize = 8;

/// Identifier and size of a stored artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub id: String,
    pub size: u64,
}

/// Where artifacts are kept.
pub trait ArtifactStore {
    fn exists(&self, name: &str) -> anyhow::Result<bool>;

    /// Store `files`, named relative to `root`, under the artifact `name`.
    fn upload(&self, name: &str, files: &[PathBuf], root: &Path) -> anyhow::Result<UploadReceipt>;
}

/// Artifacts as directories under a root: `{root}/{name}/...`.
#[derive(Debug, Clone)]
pub struct DirectoryArtifactStore {
    root: PathBuf,
}

impl DirectoryArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn artifact_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl ArtifactStore for DirectoryArtifactStore {
    fn exists(&self, name: &str) -> anyhow::Result<bool> {
        Ok(self.artifact_dir(name).is_dir())
    }

    fn upload(&self, name: &str, files: &[PathBuf], root: &Path) -> anyhow::Result<UploadReceipt> {
        let target = self.artifact_dir(name);
        let mut size = 0;
        for file in files {
            let relative = file.strip_prefix(root).with_context(|| {
                format!("{} is not under {}", file.display(), root.display())
            })?;
            let dest = target.join(relative);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            size += std::fs::copy(file, &dest)
                .with_context(|| format!("Failed to copy {}", file.display()))?;
        }
        Ok(UploadReceipt {
            id: target.display().to_string(),
            size,
        })
    }
}

/// What became of an export attempt. Never an error: failures are recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Exported {
        name: String,
        file: PathBuf,
        receipt: UploadReceipt,
    },
    Skipped(Diagnostic),
}

/// Where a successful scan's stdout goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRoutes {
    /// `output_file`, written even when the scan printed nothing.
    pub output_file: Option<PathBuf>,
    /// Publish as an artifact. Needs JSON output and something to publish.
    pub artifact: bool,
}

pub fn scan_routes(inputs: &ActionInputs, stdout: &str) -> ScanRoutes {
    let output_file = Some(inputs.output_file.as_str())
        .filter(|path| !path.is_empty())
        .map(PathBuf::from);
    let artifact = inputs.export_scan_result_artifact
        && inputs.scan_summary_output_type == "json"
        && !stdout.trim().is_empty();
    ScanRoutes {
        output_file,
        artifact,
    }
}

/// Copy scan stdout to `path` verbatim. A failure comes back as a warning.
pub fn write_output_file(path: &Path, stdout: &str) -> Option<Diagnostic> {
    let e = std::fs::write(path, stdout).err()?;
    let message = format!("Unable to write scan output to {}: {e}", path.display());
    tracing::warn!("{message}");
    Some(Diagnostic {
        severity: DiagnosticSeverity::Warning,
        rule: "output_file".to_string(),
        message,
    })
}

pub fn result_file_name(run_id: &str) -> String {
    format!("result-{run_id}.json")
}

/// Writes scan output to the temp dir and uploads it under a free name.
pub struct ArtifactExporter<S> {
    store: S,
    temp_dir: PathBuf,
    run_id: String,
    runtime: ActionsRuntime,
}

impl<S: ArtifactStore> ArtifactExporter<S> {
    pub fn new(
        store: S,
        temp_dir: impl Into<PathBuf>,
        run_id: impl Into<String>,
        runtime: ActionsRuntime,
    ) -> Self {
        Self {
            store,
            temp_dir: temp_dir.into(),
            run_id: run_id.into(),
            runtime,
        }
    }

    pub fn export<R: Rng>(&self, result_text: &str, rng: &mut R) -> ExportOutcome {
        let name = match self.free_name(rng) {
            Ok(name) => name,
            Err(message) => return skipped(message),
        };

        let file = self.temp_dir.join(result_file_name(&self.run_id));
        if let Err(e) = std::fs::write(&file, result_text) {
            return skipped(format!(
                "Unable to write JSON document for scan result to file: {e}"
            ));
        }

        tracing::info!("Writing artifact {name}");
        let receipt = match self
            .store
            .upload(&name, std::slice::from_ref(&file), &self.temp_dir)
        {
            Ok(receipt) => receipt,
            Err(e) => return skipped(format!("Some items failed to export: {e:#}")),
        };
        tracing::info!(
            "Scan result exported to artifact {}, size {}",
            receipt.id,
            receipt.size
        );

        if let Err(e) = self.runtime.set_output("scan_result", &name) {
            tracing::warn!("Failed to set output scan_result: {e}");
        }
        ExportOutcome::Exported {
            name,
            file,
            receipt,
        }
    }

    /// First name not already taken, growing by one random letter per clash.
    fn free_name<R: Rng>(&self, rng: &mut R) -> Result<String, String> {
        let mut name = BASE_ARTIFACT_NAME.to_string();
        for _ in 0..MAX_NAME_CHECKS {
            let taken = self
                .store
                .exists(&name)
                .map_err(|e| format!("Unable to check artifact '{name}': {e:#}"))?;
            if !taken {
                return Ok(name);
            }
            tracing::info!("Found existing artifact '{name}'");
            name.push(rng.gen_range(b'a'..=b'z') as char);
        }
        Err(format!(
            "Can't find a unique artifact name for scan results after {MAX_NAME_CHECKS} tries"
        ))
    }
}

fn skipped(message: String) -> ExportOutcome {
    tracing::warn!("{message}");
    ExportOutcome::Skipped(Diagnostic {
        severity: DiagnosticSeverity::Warning,
        rule: "export_scan_result_artifact".to_string(),
        message,
    })
}
