use super::{Assembly, Diagnostic, DiagnosticSeverity};
use crate::platform::{EndorctlOs, Platform};

/// Whether `program` resolves on the current search path.
pub fn on_search_path(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Timing utility and its stats flag for `os`, if timing is supported there.
pub fn timing_utility(os: EndorctlOs) -> Option<(&'static str, &'static str)> {
    match os {
        EndorctlOs::Linux => Some(("time", "-v")),
        EndorctlOs::Macos => Some(("/usr/bin/time", "-l")),
        EndorctlOs::Windows => None,
    }
}

/// Run the assembled command under the platform's timing utility.
///
/// Falls back to the bare command, with a warning, when timing is not
/// supported or the utility is missing.
pub fn apply_timing(
    assembly: &mut Assembly,
    platform: Platform,
    tool_available: fn(&str) -> bool,
) {
    let Some((utility, flag)) = timing_utility(platform.os) else {
        warn(assembly, "Timing is not supported on Windows runners".to_string());
        return;
    };
    if !tool_available(utility) {
        warn(
            assembly,
            format!("Timing utility `{utility}` not found, running endorctl without stats"),
        );
        return;
    }

    let program = std::mem::replace(&mut assembly.program, utility.to_string());
    assembly.args.splice(0..0, [flag.to_string(), program]);
}

fn warn(assembly: &mut Assembly, message: String) {
    tracing::warn!("{message}");
    assembly.diagnostics.push(Diagnostic {
        severity: DiagnosticSeverity::Warning,
        rule: "run_stats".to_string(),
        message,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::EndorctlArch;

    fn bare() -> Assembly {
        Assembly {
            program: "endorctl".to_string(),
            args: vec!["scan".to_string(), "--path=.".to_string()],
            diagnostics: Vec::new(),
        }
    }

    #[test]
    fn test_linux_wraps_with_time_v() {
        let mut assembly = bare();
        apply_timing(
            &mut assembly,
            Platform::new(EndorctlOs::Linux, EndorctlArch::Amd64),
            |_| true,
        );
        assert_eq!(assembly.program, "time");
        assert_eq!(assembly.args, vec!["-v", "endorctl", "scan", "--path=."]);
        assert!(assembly.diagnostics.is_empty());
    }

    #[test]
    fn test_macos_wraps_with_usr_bin_time() {
        let mut assembly = bare();
        apply_timing(
            &mut assembly,
            Platform::new(EndorctlOs::Macos, EndorctlArch::Arm64),
            |_| true,
        );
        assert_eq!(assembly.program, "/usr/bin/time");
        assert_eq!(assembly.args[..2], ["-l", "endorctl"]);
    }

    #[test]
    fn test_windows_is_left_unwrapped() {
        let mut assembly = bare();
        apply_timing(
            &mut assembly,
            Platform::new(EndorctlOs::Windows, EndorctlArch::Amd64),
            |_| true,
        );
        assert_eq!(assembly.program, "endorctl");
        assert_eq!(assembly.diagnostics[0].severity, DiagnosticSeverity::Warning);
    }

    #[test]
    fn test_missing_utility_falls_back() {
        let mut assembly = bare();
        apply_timing(
            &mut assembly,
            Platform::new(EndorctlOs::Linux, EndorctlArch::Amd64),
            |_| false,
        );
        assert_eq!(assembly.program, "endorctl");
        assert_eq!(assembly.args, vec!["scan", "--path=."]);
        assert!(assembly.diagnostics[0].message.contains("`time` not found"));
    }
}
