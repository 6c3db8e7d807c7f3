use super::rules::{always, flag_if_set, nothing, Enforcement, Requirement, Rule, RuleView};

fn enabled(flag: &str) -> Vec<String> {
    vec![format!("--{flag}=true")]
}

fn some(token: Option<String>) -> Vec<String> {
    token.into_iter().collect()
}

const PR_ENABLED: fn(&RuleView) -> bool = |v| v.inputs.pr;
const CI_RUN_ENABLED: fn(&RuleView) -> bool = |v| v.inputs.ci_run;

/// Options for `endorctl scan`, in argv order.
pub static SCAN_RULES: &[Rule] = &[
    Rule {
        name: "scan-targets",
        when: always,
        requires: &[Requirement {
            holds: |v| v.inputs.scan_dependencies || v.inputs.scan_secrets || v.inputs.scan_tools,
            message: "At least one of `scan_dependencies`, `scan_secrets` or `scan_tools` must be enabled",
        }],
        emit: nothing,
        enforcement: Enforcement::Recorded,
    },
    Rule {
        name: "scan_dependencies",
        when: |v| v.inputs.scan_dependencies,
        requires: &[],
        emit: |_| enabled("dependencies"),
        enforcement: Enforcement::Recorded,
    },
    Rule {
        name: "scan_secrets",
        when: |v| v.inputs.scan_secrets,
        requires: &[],
        emit: |_| enabled("secrets"),
        enforcement: Enforcement::Recorded,
    },
    Rule {
        name: "scan_tools",
        when: |v| v.inputs.scan_tools,
        requires: &[],
        emit: |_| enabled("tools"),
        enforcement: Enforcement::Recorded,
    },
    Rule {
        name: "phantom_dependencies",
        when: |v| v.inputs.phantom_dependencies,
        requires: &[],
        emit: |_| enabled("phantom-dependencies"),
        enforcement: Enforcement::Recorded,
    },
    Rule {
        name: "use_bazel",
        when: |v| v.inputs.use_bazel,
        requires: &[],
        emit: |v| {
            let mut tokens = enabled("use-bazel");
            tokens.extend(flag_if_set("bazel-exclude-targets", &v.inputs.bazel_exclude_targets));
            tokens.extend(flag_if_set("bazel-include-targets", &v.inputs.bazel_include_targets));
            tokens.extend(flag_if_set("bazel-targets-query", &v.inputs.bazel_targets_query));
            tokens
        },
        enforcement: Enforcement::Recorded,
    },
    Rule {
        name: "scan_git_logs",
        when: |v| v.inputs.scan_git_logs,
        requires: &[Requirement {
            holds: |v| v.inputs.scan_secrets,
            message: "Please also enable `scan_secrets` to scan Git logs for secrets",
        }],
        emit: |_| enabled("git-logs"),
        enforcement: Enforcement::Recorded,
    },
    // Only meaningful for runs triggered by a pull request.
    Rule {
        name: "enable_pr_comments",
        when: |v| v.inputs.enable_pr_comments && v.pull_request.is_some(),
        requires: &[
            Requirement {
                holds: PR_ENABLED,
                message: "The `pr` option must be enabled for PR comments. Either set `pr: true` or disable PR comments",
            },
            Requirement {
                holds: CI_RUN_ENABLED,
                message: "The `ci-run` option has been renamed to `pr` and must be enabled for PR comments. Remove the `ci-run` configuration or disable PR comments",
            },
            Requirement {
                holds: |v| !v.inputs.github_token.is_empty(),
                message: "`github_token` is required to enable PR comments",
            },
        ],
        emit: |v| {
            let mut tokens = enabled("enable-pr-comments");
            tokens.extend(v.pull_request.map(|id| format!("--github-pr-id={id}")));
            tokens.push(format!("--github-token={}", v.inputs.github_token));
            tokens
        },
        enforcement: Enforcement::Recorded,
    },
    // Both default to true, so the flag is only dropped when one was disabled.
    Rule {
        name: "pr",
        when: |v| v.inputs.ci_run && v.inputs.pr,
        requires: &[],
        emit: |_| enabled("pr"),
        enforcement: Enforcement::Recorded,
    },
    Rule {
        name: "pr_baseline",
        when: |v| !v.inputs.pr_baseline.is_empty(),
        requires: &[
            Requirement {
                holds: PR_ENABLED,
                message: "The `pr` option must also be enabled if `pr_baseline` is set. Either set `pr: true` or remove the PR baseline",
            },
            Requirement {
                holds: CI_RUN_ENABLED,
                message: "The `ci-run` option has been renamed to `pr` and must be enabled if `pr_baseline` is set. Remove the `ci-run` configuration or the PR baseline",
            },
        ],
        emit: |v| some(flag_if_set("pr-baseline", &v.inputs.pr_baseline)),
        enforcement: Enforcement::Recorded,
    },
    Rule {
        name: "ci_run_tags",
        when: always,
        requires: &[],
        emit: |v| some(flag_if_set("ci-run-tags", &v.inputs.ci_run_tags)),
        enforcement: Enforcement::Recorded,
    },
    Rule {
        name: "tags",
        when: always,
        requires: &[],
        emit: |v| some(flag_if_set("tags", &v.inputs.tags)),
        enforcement: Enforcement::Recorded,
    },
    Rule {
        name: "scan_path",
        when: always,
        requires: &[],
        emit: |v| some(flag_if_set("path", &v.inputs.scan_path)),
        enforcement: Enforcement::Recorded,
    },
    Rule {
        name: "additional_args",
        when: always,
        requires: &[],
        emit: |v| {
            v.inputs
                .additional_args
                .split_whitespace()
                .map(str::to_string)
                .collect()
        },
        enforcement: Enforcement::Recorded,
    },
    Rule {
        name: "sarif_file",
        when: always,
        requires: &[],
        emit: |v| some(flag_if_set("sarif-file", &v.inputs.sarif_file)),
        enforcement: Enforcement::Recorded,
    },
];
