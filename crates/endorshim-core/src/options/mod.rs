pub mod artifact;
pub mod rules;
pub mod scan;
pub mod setup;
pub mod timing;

use crate::inputs::{ActionInputs, Auth};
use crate::platform::Platform;
use rules::{evaluate, RuleView};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const ENDORCTL: &str = "endorctl";

/// The endorctl operations the shim knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subcommand {
    Scan,
    Sign,
    Verify,
    Setup,
}

impl Subcommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subcommand::Scan => "scan",
            Subcommand::Sign => "sign",
            Subcommand::Verify => "verify",
            Subcommand::Setup => "setup",
        }
    }

    /// Leading endorctl words.
    fn words(&self) -> &'static [&'static str] {
        match self {
            Subcommand::Scan => &["scan"],
            Subcommand::Sign => &["artifact", "sign"],
            Subcommand::Verify => &["artifact", "verify"],
            Subcommand::Setup => &["api", "get"],
        }
    }
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl DiagnosticSeverity {
    pub fn symbol(&self) -> &str {
        match self {
            DiagnosticSeverity::Error => "ERROR",
            DiagnosticSeverity::Warning => "WARN",
        }
    }
}

/// A non-fatal problem found while preparing the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub rule: String,
    pub message: String,
}

/// Facts assembly needs beyond the inputs.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyContext {
    pub platform: Platform,
    /// Pull request number of the triggering event.
    pub pull_request: Option<u64>,
    /// Probe for the timing utility.
    pub tool_available: fn(&str) -> bool,
}

impl AssemblyContext {
    pub fn new(platform: Platform, pull_request: Option<u64>) -> Self {
        Self {
            platform,
            pull_request,
            tool_available: timing::on_search_path,
        }
    }
}

/// A ready-to-run command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub program: String,
    pub args: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Assembly {
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }
}

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("namespace is required and must be passed as an input from the workflow")]
    MissingNamespace,

    #[error("Authentication info not found. Either set enable_github_action_token: true or provide one of gcp_service_account or api_key and api_secret combination")]
    MissingAuth,

    #[error("{message}")]
    Requirement { rule: String, message: String },
}

/// Namespace and authentication, checked before anything else runs.
pub fn check_prerequisites(inputs: &ActionInputs) -> Result<Auth, AssemblyError> {
    if inputs.namespace.is_empty() {
        return Err(AssemblyError::MissingNamespace);
    }
    inputs.auth().ok_or(AssemblyError::MissingAuth)
}

/// Build the endorctl command line for `subcommand`.
///
/// Sub-command words and options come first, then the options every command
/// shares. Recorded problems are returned in `diagnostics`.
pub fn assemble(
    subcommand: Subcommand,
    inputs: &ActionInputs,
    ctx: &AssemblyContext,
) -> Result<Assembly, AssemblyError> {
    let auth = check_prerequisites(inputs)?;
    let view = RuleView {
        inputs,
        pull_request: ctx.pull_request,
    };

    let mut args: Vec<String> = subcommand.words().iter().map(|w| w.to_string()).collect();
    let mut diagnostics = Vec::new();

    match subcommand {
        Subcommand::Scan => evaluate(scan::SCAN_RULES, &view, &mut args, &mut diagnostics)?,
        Subcommand::Sign => evaluate(artifact::SIGN_RULES, &view, &mut args, &mut diagnostics)?,
        Subcommand::Verify => {
            evaluate(artifact::VERIFY_RULES, &view, &mut args, &mut diagnostics)?
        }
        Subcommand::Setup => {}
    }

    if subcommand == Subcommand::Setup {
        // tenant lookup that proves the stored credentials work
        args.extend([
            format!("--verbose={}", inputs.log_verbose),
            format!("--log-level={}", inputs.log_level),
            "--resource=tenant".to_string(),
            "--name=oss".to_string(),
        ]);
    } else {
        args.extend(common_options(subcommand, inputs, &auth));
    }

    let mut assembly = Assembly {
        program: ENDORCTL.to_string(),
        args,
        diagnostics,
    };
    if inputs.run_stats {
        timing::apply_timing(&mut assembly, ctx.platform, ctx.tool_available);
    }
    Ok(assembly)
}

fn common_options(subcommand: Subcommand, inputs: &ActionInputs, auth: &Auth) -> Vec<String> {
    let mut options = vec![
        format!("--namespace={}", inputs.namespace),
        format!("--verbose={}", inputs.log_verbose),
    ];
    if subcommand == Subcommand::Scan {
        options.push(format!(
            "--output-type={}",
            inputs.scan_summary_output_type
        ));
    }
    options.push(format!("--log-level={}", inputs.log_level));
    if !inputs.api.is_empty() {
        options.push(format!("--api={}", inputs.api));
    }
    options.extend(auth.flags());
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{EndorctlArch, EndorctlOs};

    fn ctx() -> AssemblyContext {
        AssemblyContext {
            platform: Platform::new(EndorctlOs::Linux, EndorctlArch::Amd64),
            pull_request: None,
            tool_available: |_| true,
        }
    }

    fn inputs() -> ActionInputs {
        ActionInputs {
            namespace: "acme".to_string(),
            api_key: "k".to_string(),
            api_secret: "s".to_string(),
            run_stats: false,
            ..ActionInputs::default()
        }
    }

    #[test]
    fn test_missing_namespace_is_fatal() {
        let inputs = ActionInputs {
            namespace: String::new(),
            ..inputs()
        };
        for subcommand in [
            Subcommand::Scan,
            Subcommand::Sign,
            Subcommand::Verify,
            Subcommand::Setup,
        ] {
            assert!(matches!(
                assemble(subcommand, &inputs, &ctx()),
                Err(AssemblyError::MissingNamespace)
            ));
        }
    }

    #[test]
    fn test_missing_auth_is_fatal() {
        let inputs = ActionInputs {
            api_secret: String::new(),
            ..inputs()
        };
        let err = assemble(Subcommand::Scan, &inputs, &ctx()).unwrap_err();
        assert!(matches!(err, AssemblyError::MissingAuth));
        assert!(err.to_string().starts_with("Authentication info not found."));
    }

    #[test]
    fn test_scan_argv() {
        let assembly = assemble(Subcommand::Scan, &inputs(), &ctx()).unwrap();
        assert_eq!(assembly.program, "endorctl");
        assert_eq!(
            assembly.args,
            vec![
                "scan",
                "--dependencies=true",
                "--pr=true",
                "--path=.",
                "--namespace=acme",
                "--verbose=false",
                "--output-type=table",
                "--log-level=info",
                "--api=https://api.endorlabs.com",
                "--api-key=k",
                "--api-secret=s",
            ]
        );
        assert!(!assembly.has_errors());
    }

    #[test]
    fn test_sign_argv_has_no_output_type() {
        let inputs = ActionInputs {
            artifact_name: "app".to_string(),
            enable_github_action_token: true,
            api: String::new(),
            ..inputs()
        };
        let assembly = assemble(Subcommand::Sign, &inputs, &ctx()).unwrap();
        assert_eq!(
            assembly.args,
            vec![
                "artifact",
                "sign",
                "--name=app",
                "--namespace=acme",
                "--verbose=false",
                "--log-level=info",
                "--enable-github-action-token=true",
            ]
        );
    }

    #[test]
    fn test_setup_argv() {
        let inputs = ActionInputs {
            log_verbose: true,
            log_level: "debug".to_string(),
            ..inputs()
        };
        let assembly = assemble(Subcommand::Setup, &inputs, &ctx()).unwrap();
        assert_eq!(
            assembly.args,
            vec![
                "api",
                "get",
                "--verbose=true",
                "--log-level=debug",
                "--resource=tenant",
                "--name=oss",
            ]
        );
    }

    #[test]
    fn test_run_stats_wraps_command() {
        let inputs = ActionInputs {
            run_stats: true,
            ..inputs()
        };
        let assembly = assemble(Subcommand::Scan, &inputs, &ctx()).unwrap();
        assert_eq!(assembly.program, "time");
        assert_eq!(assembly.args[..3], ["-v", "endorctl", "scan"]);
    }

    #[test]
    fn test_recorded_errors_do_not_abort() {
        let inputs = ActionInputs {
            pr: false,
            pr_baseline: "main".to_string(),
            ..inputs()
        };
        let assembly = assemble(Subcommand::Scan, &inputs, &ctx()).unwrap();
        assert!(assembly.has_errors());
        assert!(!assembly.args.iter().any(|a| a.starts_with("--pr-baseline")));
    }
}
