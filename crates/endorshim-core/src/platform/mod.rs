pub mod checksum;

use std::fmt;
use thiserror::Error;

/// Operating system as reported by the CI runner (`RUNNER_OS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunnerOs {
    Linux,
    Windows,
    Macos,
}

impl RunnerOs {
    pub fn label(&self) -> &'static str {
        match self {
            RunnerOs::Linux => "Linux",
            RunnerOs::Windows => "Windows",
            RunnerOs::Macos => "macOS",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "Linux" => Some(RunnerOs::Linux),
            "Windows" => Some(RunnerOs::Windows),
            "macOS" => Some(RunnerOs::Macos),
            _ => None,
        }
    }

    /// Runner label for the OS this binary was compiled for.
    pub fn host() -> Option<Self> {
        match std::env::consts::OS {
            "linux" => Some(RunnerOs::Linux),
            "windows" => Some(RunnerOs::Windows),
            "macos" => Some(RunnerOs::Macos),
            _ => None,
        }
    }

    fn endorctl(&self) -> EndorctlOs {
        match self {
            RunnerOs::Linux => EndorctlOs::Linux,
            RunnerOs::Windows => EndorctlOs::Windows,
            RunnerOs::Macos => EndorctlOs::Macos,
        }
    }
}

/// Architecture as reported by the CI runner (`RUNNER_ARCH`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunnerArch {
    Amd64,
    Arm64,
}

impl RunnerArch {
    pub fn label(&self) -> &'static str {
        match self {
            RunnerArch::Amd64 => "X64",
            RunnerArch::Arm64 => "ARM64",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "X64" => Some(RunnerArch::Amd64),
            "ARM64" => Some(RunnerArch::Arm64),
            _ => None,
        }
    }

    /// Runner label for the architecture this binary was compiled for.
    pub fn host() -> Option<Self> {
        match std::env::consts::ARCH {
            "x86_64" => Some(RunnerArch::Amd64),
            "aarch64" => Some(RunnerArch::Arm64),
            _ => None,
        }
    }

    fn endorctl(&self) -> EndorctlArch {
        match self {
            RunnerArch::Amd64 => EndorctlArch::Amd64,
            RunnerArch::Arm64 => EndorctlArch::Arm64,
        }
    }
}

/// OS identifier used in endorctl download URLs and checksum keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndorctlOs {
    Linux,
    Windows,
    Macos,
}

impl EndorctlOs {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndorctlOs::Linux => "linux",
            EndorctlOs::Windows => "windows",
            EndorctlOs::Macos => "macos",
        }
    }
}

/// Architecture identifier used in endorctl download URLs and checksum keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndorctlArch {
    Amd64,
    Arm64,
}

impl EndorctlArch {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndorctlArch::Amd64 => "amd64",
            EndorctlArch::Arm64 => "arm64",
        }
    }
}

/// A normalized platform that endorctl ships a binary for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: EndorctlOs,
    pub arch: EndorctlArch,
}

impl Platform {
    pub fn new(os: EndorctlOs, arch: EndorctlArch) -> Self {
        Self { os, arch }
    }

    pub fn is_windows(&self) -> bool {
        self.os == EndorctlOs::Windows
    }

    /// `.exe` on windows, empty elsewhere.
    pub fn executable_suffix(&self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else {
            ""
        }
    }

    /// File name of the installed binary, e.g. `endorctl.exe`.
    pub fn binary_name(&self) -> String {
        format!("endorctl{}", self.executable_suffix())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os.as_str(), self.arch.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("Unsupported OS! This actions requires one of [Linux, macOS, Windows].")]
    UnsupportedOs { os: String },

    #[error("Unsupported Architecture! This actions requires one of [AMD64(X64), ARM64].")]
    UnsupportedArch { arch: String },

    #[error("Architecture {arch} not supported for {os}!")]
    UnsupportedCombination { os: String, arch: String },
}

/// Map the runner's OS and architecture labels to the endorctl platform.
///
/// Only macOS ships an ARM64 build; ARM64 on Linux or Windows is rejected.
pub fn resolve(host_os: &str, host_arch: &str) -> Result<Platform, PlatformError> {
    let os = RunnerOs::from_label(host_os).ok_or_else(|| PlatformError::UnsupportedOs {
        os: host_os.to_string(),
    })?;
    let arch = RunnerArch::from_label(host_arch).ok_or_else(|| PlatformError::UnsupportedArch {
        arch: host_arch.to_string(),
    })?;

    if arch == RunnerArch::Arm64 && os != RunnerOs::Macos {
        return Err(PlatformError::UnsupportedCombination {
            os: host_os.to_string(),
            arch: host_arch.to_string(),
        });
    }

    Ok(Platform::new(os.endorctl(), arch.endorctl()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_supported_pairs() {
        let cases = [
            ("Linux", "X64", EndorctlOs::Linux, EndorctlArch::Amd64),
            ("macOS", "X64", EndorctlOs::Macos, EndorctlArch::Amd64),
            ("macOS", "ARM64", EndorctlOs::Macos, EndorctlArch::Arm64),
            ("Windows", "X64", EndorctlOs::Windows, EndorctlArch::Amd64),
        ];

        for (os, arch, expected_os, expected_arch) in cases {
            let platform = resolve(os, arch).unwrap();
            assert_eq!(platform.os, expected_os, "os for {os}/{arch}");
            assert_eq!(platform.arch, expected_arch, "arch for {os}/{arch}");
        }
    }

    #[test]
    fn test_resolve_rejects_arm64_outside_macos() {
        for os in ["Linux", "Windows"] {
            let err = resolve(os, "ARM64").unwrap_err();
            assert_eq!(
                err,
                PlatformError::UnsupportedCombination {
                    os: os.to_string(),
                    arch: "ARM64".to_string(),
                }
            );
            assert_eq!(err.to_string(), format!("Architecture ARM64 not supported for {os}!"));
        }
    }

    #[test]
    fn test_resolve_rejects_unknown_arch() {
        for os in ["Linux", "macOS", "Windows"] {
            assert!(matches!(
                resolve(os, "X86"),
                Err(PlatformError::UnsupportedArch { .. })
            ));
        }
        assert!(matches!(resolve("Linux", ""), Err(PlatformError::UnsupportedArch { .. })));
    }

    #[test]
    fn test_resolve_rejects_unknown_os() {
        assert!(matches!(resolve("Plan9", "X64"), Err(PlatformError::UnsupportedOs { .. })));
        assert!(matches!(resolve("", "X64"), Err(PlatformError::UnsupportedOs { .. })));
        // labels are case sensitive, as the runner reports them
        assert!(matches!(resolve("linux", "X64"), Err(PlatformError::UnsupportedOs { .. })));
    }

    #[test]
    fn test_os_is_checked_before_arch() {
        assert!(matches!(resolve("Plan9", "X86"), Err(PlatformError::UnsupportedOs { .. })));
    }

    #[test]
    fn test_binary_name() {
        assert_eq!(resolve("Windows", "X64").unwrap().binary_name(), "endorctl.exe");
        assert_eq!(resolve("Linux", "X64").unwrap().binary_name(), "endorctl");
        assert_eq!(resolve("macOS", "ARM64").unwrap().to_string(), "macos_arm64");
    }
}
