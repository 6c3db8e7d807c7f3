use super::{AssemblyError, Diagnostic, DiagnosticSeverity};
use crate::inputs::ActionInputs;

/// What the rules look at: the inputs plus facts from the triggering event.
#[derive(Debug, Clone, Copy)]
pub struct RuleView<'a> {
    pub inputs: &'a ActionInputs,
    pub pull_request: Option<u64>,
}

/// How a failed requirement is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforcement {
    /// Abort assembly.
    Fatal,
    /// Log an error, skip the rule's tokens, keep going.
    Recorded,
}

/// A precondition of a rule and the message reported when it fails.
pub struct Requirement {
    pub holds: fn(&RuleView) -> bool,
    pub message: &'static str,
}

/// One entry of an option table.
///
/// When `when` holds, the requirements are checked in order. The first one
/// that fails is reported and nothing is emitted. Otherwise `emit` produces
/// the rule's tokens.
pub struct Rule {
    pub name: &'static str,
    pub when: fn(&RuleView) -> bool,
    pub requires: &'static [Requirement],
    pub emit: fn(&RuleView) -> Vec<String>,
    pub enforcement: Enforcement,
}

pub fn always(_: &RuleView) -> bool {
    true
}

pub fn nothing(_: &RuleView) -> Vec<String> {
    Vec::new()
}

/// `--{flag}={value}` when `value` is non-empty.
pub fn flag_if_set(flag: &str, value: &str) -> Option<String> {
    (!value.is_empty()).then(|| format!("--{flag}={value}"))
}

/// Evaluate `rules` in table order, appending tokens to `args`.
pub fn evaluate(
    rules: &[Rule],
    view: &RuleView,
    args: &mut Vec<String>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(), AssemblyError> {
    for rule in rules {
        if !(rule.when)(view) {
            continue;
        }

        match rule.requires.iter().find(|req| !(req.holds)(view)) {
            Some(failed) => match rule.enforcement {
                Enforcement::Fatal => {
                    return Err(AssemblyError::Requirement {
                        rule: rule.name.to_string(),
                        message: failed.message.to_string(),
                    })
                }
                Enforcement::Recorded => {
                    tracing::error!("{}", failed.message);
                    diagnostics.push(Diagnostic {
                        severity: DiagnosticSeverity::Error,
                        rule: rule.name.to_string(),
                        message: failed.message.to_string(),
                    });
                }
            },
            None => args.extend((rule.emit)(view)),
        }
    }
    Ok(())
}
