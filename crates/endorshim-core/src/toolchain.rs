//! `tsserver`, which endorctl needs for JavaScript call graphs.

use crate::options::{Diagnostic, DiagnosticSeverity};
use std::path::PathBuf;
use std::process::{Command, Stdio};

const MIN_NODE: (u32, u32) = (4, 2);

/// What to do about a missing `tsserver` for a given node version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypescriptPlan {
    /// Node is too old for any supported TypeScript.
    Unsupported,
    Install { package: String },
}

/// `(major, minor)` out of `node --version` output such as `v18.17.1`.
pub fn parse_node_version(text: &str) -> Option<(u32, u32)> {
    let text = text.trim().trim_start_matches('v');
    let mut parts = text.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = match parts.next() {
        Some(minor) => minor.parse().ok()?,
        None => 0,
    };
    Some((major, minor))
}

/// Newest TypeScript line that still runs on `node`.
pub fn plan_typescript(node: (u32, u32)) -> TypescriptPlan {
    let package = if node < MIN_NODE {
        return TypescriptPlan::Unsupported;
    } else if node < (12, 2) {
        "typescript@4.9"
    } else if node < (14, 17) {
        "typescript@5.0"
    } else {
        "typescript"
    };
    TypescriptPlan::Install {
        package: package.to_string(),
    }
}

/// Install TypeScript globally when `tsserver` is not on the search path.
///
/// Every failure is a recorded warning.
pub fn ensure_tsserver() -> Vec<Diagnostic> {
    ensure_tsserver_with(|program| which::which(program).ok())
}

/// [`ensure_tsserver`] with programs looked up through `locate`.
pub fn ensure_tsserver_with(locate: fn(&str) -> Option<PathBuf>) -> Vec<Diagnostic> {
    tracing::info!("Checking for tsserver");
    if locate("tsserver").is_some() {
        return Vec::new();
    }

    let Some(node) = locate("node").and_then(node_version) else {
        return vec![warning(
            "Unable to determine the node version. JavaScript call graphs will not be generated"
                .to_string(),
        )];
    };

    let package = match plan_typescript(node) {
        TypescriptPlan::Unsupported => {
            return vec![warning(format!(
                "Unable to install >=typescript@4.7 (node >= {}.{} is required). JavaScript call graphs will not be generated.",
                MIN_NODE.0, MIN_NODE.1
            ))]
        }
        TypescriptPlan::Install { package } => package,
    };

    tracing::info!("Installing tsserver");
    let installed = locate("npm").and_then(|npm| {
        Command::new(npm)
            .args(["install", "-g", package.as_str()])
            .stdin(Stdio::null())
            .status()
            .ok()
    });
    match installed {
        Some(status) if status.success() => Vec::new(),
        _ => vec![warning(format!(
            "Unable to install {package}. JavaScript call graphs will not be generated"
        ))],
    }
}

fn node_version(node: PathBuf) -> Option<(u32, u32)> {
    let output = Command::new(node).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    parse_node_version(&String::from_utf8_lossy(&output.stdout))
}

fn warning(message: String) -> Diagnostic {
    tracing::warn!("{message}");
    Diagnostic {
        severity: DiagnosticSeverity::Warning,
        rule: "tsserver".to_string(),
        message,
    }
}
