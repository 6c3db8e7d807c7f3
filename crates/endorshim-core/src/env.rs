use crate::platform::{self, Platform, PlatformError, RunnerArch, RunnerOs};
use std::path::PathBuf;

/// Everything the shim reads from the job's process environment.
///
/// Built once by the CLI; tests construct it by hand.
#[derive(Debug, Clone, Default)]
pub struct ExecutionEnv {
    /// `RUNNER_OS`, e.g. `Linux`.
    pub runner_os: String,
    /// `RUNNER_ARCH`, e.g. `X64`.
    pub runner_arch: String,
    /// `GITHUB_RUN_ID`, used to name result files.
    pub run_id: String,
    /// `RUNNER_TEMP`, scratch space for downloads and result files.
    pub temp_dir: PathBuf,
    pub home: Option<PathBuf>,
    /// Directory endorctl is installed into.
    pub work_dir: PathBuf,
    /// `GITHUB_REPOSITORY`, `owner/name`.
    pub repository: Option<String>,
    /// `GITHUB_EVENT_PATH`, the webhook payload that triggered the run.
    pub event_path: Option<PathBuf>,
    /// `GITHUB_PATH` file command.
    pub path_file: Option<PathBuf>,
    /// `GITHUB_OUTPUT` file command.
    pub output_file: Option<PathBuf>,
    /// Root of the local artifact store, `ENDORSHIM_ARTIFACT_DIR`.
    pub artifact_dir: PathBuf,
    /// `GITHUB_ACTIONS=true`.
    pub in_actions: bool,
}

impl ExecutionEnv {
    /// An environment rooted at `work_dir` with no runner file commands.
    pub fn new(runner_os: &str, runner_arch: &str, work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        Self {
            runner_os: runner_os.to_string(),
            runner_arch: runner_arch.to_string(),
            run_id: "local".to_string(),
            temp_dir: work_dir.clone(),
            artifact_dir: work_dir.join("artifacts"),
            work_dir,
            ..Self::default()
        }
    }

    /// Read the environment of the current process.
    ///
    /// Outside a runner, OS and architecture fall back to the compile target so
    /// local runs resolve the same way a hosted runner would.
    pub fn from_process() -> std::io::Result<Self> {
        let runner_os = var("RUNNER_OS")
            .or_else(|| RunnerOs::host().map(|os| os.label().to_string()))
            .unwrap_or_default();
        let runner_arch = var("RUNNER_ARCH")
            .or_else(|| RunnerArch::host().map(|arch| arch.label().to_string()))
            .unwrap_or_default();

        let home = var("HOME")
            .or_else(|| var("USERPROFILE"))
            .map(PathBuf::from);

        let temp_dir = var("RUNNER_TEMP")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        let artifact_dir = var("ENDORSHIM_ARTIFACT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| temp_dir.join("endorshim-artifacts"));

        Ok(Self {
            runner_os,
            runner_arch,
            run_id: var("GITHUB_RUN_ID").unwrap_or_else(|| "local".to_string()),
            temp_dir,
            home,
            work_dir: std::env::current_dir()?,
            repository: var("GITHUB_REPOSITORY"),
            event_path: var("GITHUB_EVENT_PATH").map(PathBuf::from),
            path_file: var("GITHUB_PATH").map(PathBuf::from),
            output_file: var("GITHUB_OUTPUT").map(PathBuf::from),
            artifact_dir,
            in_actions: var("GITHUB_ACTIONS").as_deref() == Some("true"),
        })
    }

    pub fn platform(&self) -> Result<Platform, PlatformError> {
        platform::resolve(&self.runner_os, &self.runner_arch)
    }
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_work_dir_for_temp() {
        let env = ExecutionEnv::new("Linux", "X64", "/tmp/job");
        assert_eq!(env.temp_dir, PathBuf::from("/tmp/job"));
        assert_eq!(env.artifact_dir, PathBuf::from("/tmp/job/artifacts"));
        assert_eq!(env.run_id, "local");
        assert!(env.path_file.is_none());
        assert!(!env.in_actions);
    }

    #[test]
    fn test_platform_delegates_to_resolver() {
        let env = ExecutionEnv::new("Windows", "ARM64", ".");
        assert!(env.platform().is_err());

        let env = ExecutionEnv::new("macOS", "ARM64", ".");
        assert_eq!(env.platform().unwrap().to_string(), "macos_arm64");
    }
}
