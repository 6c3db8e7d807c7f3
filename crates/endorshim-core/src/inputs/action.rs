use super::{parse_bool, read, InputError, InputSource};

pub const DEFAULT_API: &str = "https://api.endorlabs.com";

/// Typed view of every input the action accepts. Each key is read once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInputs {
    pub api: String,
    pub api_key: String,
    pub api_secret: String,
    pub gcp_service_account: String,
    pub enable_github_action_token: bool,
    pub namespace: String,
    pub endorctl_version: String,
    pub endorctl_checksum: String,
    pub log_verbose: bool,
    pub log_level: String,

    pub scan_dependencies: bool,
    pub scan_secrets: bool,
    pub scan_tools: bool,
    pub scan_git_logs: bool,
    pub phantom_dependencies: bool,
    /// Deprecated, kept for older workflows.
    pub ci_run: bool,
    /// Deprecated in favour of `tags`.
    pub ci_run_tags: String,
    pub pr: bool,
    pub pr_baseline: String,
    pub tags: String,
    pub scan_path: String,
    pub additional_args: String,
    pub sarif_file: String,
    pub enable_pr_comments: bool,
    pub github_token: String,
    pub use_bazel: bool,
    pub bazel_exclude_targets: String,
    pub bazel_include_targets: String,
    pub bazel_targets_query: String,
    pub run_stats: bool,
    pub export_scan_result_artifact: bool,
    pub scan_summary_output_type: String,
    pub output_file: String,

    pub artifact_name: String,
    pub certificate_oidc_issuer: String,
    pub source_repository_ref: String,
}

impl Default for ActionInputs {
    fn default() -> Self {
        Self {
            api: DEFAULT_API.to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            gcp_service_account: String::new(),
            enable_github_action_token: false,
            namespace: String::new(),
            endorctl_version: String::new(),
            endorctl_checksum: String::new(),
            log_verbose: false,
            log_level: "info".to_string(),
            scan_dependencies: true,
            scan_secrets: false,
            scan_tools: false,
            scan_git_logs: false,
            phantom_dependencies: false,
            ci_run: true,
            ci_run_tags: String::new(),
            pr: true,
            pr_baseline: String::new(),
            tags: String::new(),
            scan_path: ".".to_string(),
            additional_args: String::new(),
            sarif_file: String::new(),
            enable_pr_comments: false,
            github_token: String::new(),
            use_bazel: false,
            bazel_exclude_targets: String::new(),
            bazel_include_targets: String::new(),
            bazel_targets_query: String::new(),
            run_stats: true,
            export_scan_result_artifact: true,
            scan_summary_output_type: "table".to_string(),
            output_file: String::new(),
            artifact_name: String::new(),
            certificate_oidc_issuer: String::new(),
            source_repository_ref: String::new(),
        }
    }
}

/// Reads keys out of a source, falling back to the defaults.
struct Reader<'a> {
    source: &'a dyn InputSource,
}

impl Reader<'_> {
    fn string(&self, key: &str, default: &str) -> String {
        read(self.source, key).unwrap_or_else(|| default.to_string())
    }

    fn boolean(&self, key: &str, default: bool) -> Result<bool, InputError> {
        match read(self.source, key) {
            None => Ok(default),
            Some(value) => parse_bool(&value).ok_or(InputError::InvalidBoolean {
                key: key.to_string(),
                value,
            }),
        }
    }
}

impl ActionInputs {
    pub fn load(source: &dyn InputSource) -> Result<Self, InputError> {
        let d = Self::default();
        let r = Reader { source };

        Ok(Self {
            api: r.string("api", &d.api),
            api_key: r.string("api_key", &d.api_key),
            api_secret: r.string("api_secret", &d.api_secret),
            gcp_service_account: r.string("gcp_service_account", &d.gcp_service_account),
            enable_github_action_token: r
                .boolean("enable_github_action_token", d.enable_github_action_token)?,
            namespace: r.string("namespace", &d.namespace),
            endorctl_version: r.string("endorctl_version", &d.endorctl_version),
            endorctl_checksum: r.string("endorctl_checksum", &d.endorctl_checksum),
            log_verbose: r.boolean("log_verbose", d.log_verbose)?,
            log_level: r.string("log_level", &d.log_level),
            scan_dependencies: r.boolean("scan_dependencies", d.scan_dependencies)?,
            scan_secrets: r.boolean("scan_secrets", d.scan_secrets)?,
            scan_tools: r.boolean("scan_tools", d.scan_tools)?,
            scan_git_logs: r.boolean("scan_git_logs", d.scan_git_logs)?,
            phantom_dependencies: r.boolean("phantom_dependencies", d.phantom_dependencies)?,
            ci_run: r.boolean("ci_run", d.ci_run)?,
            ci_run_tags: r.string("ci_run_tags", &d.ci_run_tags),
            pr: r.boolean("pr", d.pr)?,
            pr_baseline: r.string("pr_baseline", &d.pr_baseline),
            tags: r.string("tags", &d.tags),
            scan_path: r.string("scan_path", &d.scan_path),
            additional_args: r.string("additional_args", &d.additional_args),
            sarif_file: r.string("sarif_file", &d.sarif_file),
            enable_pr_comments: r.boolean("enable_pr_comments", d.enable_pr_comments)?,
            github_token: r.string("github_token", &d.github_token),
            use_bazel: r.boolean("use_bazel", d.use_bazel)?,
            bazel_exclude_targets: r.string("bazel_exclude_targets", &d.bazel_exclude_targets),
            bazel_include_targets: r.string("bazel_include_targets", &d.bazel_include_targets),
            bazel_targets_query: r.string("bazel_targets_query", &d.bazel_targets_query),
            run_stats: r.boolean("run_stats", d.run_stats)?,
            export_scan_result_artifact: r
                .boolean("export_scan_result_artifact", d.export_scan_result_artifact)?,
            scan_summary_output_type: r
                .string("scan_summary_output_type", &d.scan_summary_output_type),
            output_file: r.string("output_file", &d.output_file),
            artifact_name: r.string("artifact_name", &d.artifact_name),
            certificate_oidc_issuer: r
                .string("certificate_oidc_issuer", &d.certificate_oidc_issuer),
            source_repository_ref: r.string("source_repository_ref", &d.source_repository_ref),
        })
    }

    /// The authentication method in effect, if any is configured.
    pub fn auth(&self) -> Option<Auth> {
        if self.enable_github_action_token {
            Some(Auth::GithubActionToken)
        } else if !self.api_key.is_empty() && !self.api_secret.is_empty() {
            Some(Auth::ApiKey {
                key: self.api_key.clone(),
                secret: self.api_secret.clone(),
            })
        } else if !self.gcp_service_account.is_empty() {
            Some(Auth::GcpServiceAccount(self.gcp_service_account.clone()))
        } else {
            None
        }
    }

    /// Values that must never appear in job logs.
    pub fn secrets(&self) -> Vec<&str> {
        [
            self.api_key.as_str(),
            self.api_secret.as_str(),
            self.gcp_service_account.as_str(),
            self.github_token.as_str(),
        ]
        .into_iter()
        .filter(|value| !value.is_empty())
        .collect()
    }
}

/// How endorctl authenticates, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    GithubActionToken,
    ApiKey { key: String, secret: String },
    GcpServiceAccount(String),
}

impl Auth {
    pub fn flags(&self) -> Vec<String> {
        match self {
            Auth::GithubActionToken => vec!["--enable-github-action-token=true".to_string()],
            Auth::ApiKey { key, secret } => {
                vec![format!("--api-key={key}"), format!("--api-secret={secret}")]
            }
            Auth::GcpServiceAccount(account) => {
                vec![format!("--gcp-service-account={account}")]
            }
        }
    }
}
