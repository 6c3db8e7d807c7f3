use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to spawn '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read output of '{program}'")]
    Output {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Install directory {} cannot be placed on PATH", dir.display())]
    SearchPath { dir: PathBuf },
}

/// Exit status and captured stdout of a finished process.
#[derive(Debug)]
pub struct CapturedRun {
    pub status: ExitStatus,
    pub stdout: String,
}

impl CapturedRun {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// `PATH` with `dir` in front of the current entries.
pub fn prefixed_path(dir: &Path) -> Result<OsString, RunError> {
    let current = std::env::var_os("PATH").unwrap_or_default();
    let entries = std::iter::once(dir.to_path_buf()).chain(std::env::split_paths(&current));
    std::env::join_paths(entries).map_err(|_| RunError::SearchPath {
        dir: dir.to_path_buf(),
    })
}

/// Run `program`, echoing its stdout to ours while capturing it.
///
/// Stderr is inherited. With `path_prefix`, the child sees that directory
/// first on its `PATH`.
pub fn run_captured(
    program: &str,
    args: &[String],
    path_prefix: Option<&Path>,
) -> Result<CapturedRun, RunError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());
    if let Some(dir) = path_prefix {
        command.env("PATH", prefixed_path(dir)?);
    }

    let mut child = command.spawn().map_err(|source| RunError::Spawn {
        program: program.to_string(),
        source,
    })?;
    let output_error = |source| RunError::Output {
        program: program.to_string(),
        source,
    };

    let mut captured = Vec::new();
    if let Some(mut stdout) = child.stdout.take() {
        let mut echo = io::stdout();
        let mut buf = [0u8; 8192];
        loop {
            let n = match stdout.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(output_error(e)),
            };
            captured.extend_from_slice(&buf[..n]);
            // the job log is best effort; the capture is what matters
            let _ = echo.write_all(&buf[..n]);
        }
        let _ = echo.flush();
    }

    let status = child.wait().map_err(output_error)?;
    Ok(CapturedRun {
        status,
        stdout: String::from_utf8_lossy(&captured).into_owned(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let run = run_captured("sh", &["-c".to_string(), "printf 'a\\nb'".to_string()], None)
            .unwrap();
        assert!(run.success());
        assert_eq!(run.stdout, "a\nb");
    }

    #[test]
    fn test_non_zero_exit_is_reported_not_raised() {
        let run = run_captured("sh", &["-c".to_string(), "exit 3".to_string()], None).unwrap();
        assert!(!run.success());
        assert_eq!(run.status.code(), Some(3));
    }

    #[test]
    fn test_missing_program() {
        let err = run_captured("__endorshim_missing__", &[], None).unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
    }

    #[test]
    fn test_path_prefix_reaches_child() {
        let dir = tempfile::tempdir().unwrap();
        let run = run_captured(
            "sh",
            &["-c".to_string(), "printf %s \"$PATH\"".to_string()],
            Some(dir.path()),
        )
        .unwrap();
        assert!(run.stdout.starts_with(&dir.path().display().to_string()));
    }
}
