use regex::Regex;
use std::sync::LazyLock;

const MASK: &str = "***";

/// endorctl flags whose value is a credential.
const SECRET_FLAGS: &[&str] = &[
    "--api-key=",
    "--api-secret=",
    "--gcp-service-account=",
    "--github-token=",
];

static CREDENTIAL_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(https?://)[^\s/@]+@").unwrap());
static TOKEN_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(token|key|secret|password)(\s*[:=]\s*)\S+").unwrap()
});

/// Copy of `args` safe to print: credential flags and known secret values
/// are masked.
pub fn redact_args(args: &[String], secrets: &[&str]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            if let Some(flag) = SECRET_FLAGS.iter().find(|flag| arg.starts_with(**flag)) {
                return format!("{flag}{MASK}");
            }
            mask_values(arg, secrets)
        })
        .collect()
}

/// Mask credentials embedded in free text, such as URLs with user info or
/// `token=...` pairs, plus any of the given secret values.
pub fn redact_text(text: &str, secrets: &[&str]) -> String {
    let result = mask_values(text, secrets);
    let result = CREDENTIAL_URL.replace_all(&result, format!("${{1}}{MASK}@").as_str());
    TOKEN_ASSIGNMENT
        .replace_all(&result, format!("${{1}}${{2}}{MASK}").as_str())
        .into_owned()
}

fn mask_values(text: &str, secrets: &[&str]) -> String {
    secrets
        .iter()
        .filter(|secret| !secret.is_empty())
        .fold(text.to_string(), |acc, secret| acc.replace(secret, MASK))
}
