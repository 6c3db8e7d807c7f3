//! The endorctl configuration persisted by `setup`.

use crate::inputs::{ActionInputs, Auth};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("HOME not found in process environment")]
    MissingHome,

    #[error("Failed to render endorctl configuration")]
    Render(#[from] serde_yaml::Error),

    #[error("Failed to write endorctl configuration to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize)]
struct EndorctlConfig<'a> {
    #[serde(rename = "ENDOR_NAMESPACE")]
    namespace: &'a str,
    #[serde(rename = "ENDOR_API", skip_serializing_if = "Option::is_none")]
    api: Option<&'a str>,
    #[serde(
        rename = "ENDOR_GITHUB_ACTION_TOKEN_ENABLE",
        skip_serializing_if = "Option::is_none"
    )]
    action_token: Option<bool>,
    #[serde(
        rename = "ENDOR_API_CREDENTIALS_KEY",
        skip_serializing_if = "Option::is_none"
    )]
    api_key: Option<&'a str>,
    #[serde(
        rename = "ENDOR_API_CREDENTIALS_SECRET",
        skip_serializing_if = "Option::is_none"
    )]
    api_secret: Option<&'a str>,
    #[serde(
        rename = "ENDOR_GCP_CREDENTIALS_SERVICE_ACCOUNT",
        skip_serializing_if = "Option::is_none"
    )]
    gcp_service_account: Option<&'a str>,
}

/// Render `config.yaml` for `inputs` authenticated with `auth`.
pub fn render_setup_config(inputs: &ActionInputs, auth: &Auth) -> Result<String, SetupError> {
    let mut config = EndorctlConfig {
        namespace: &inputs.namespace,
        api: (!inputs.api.is_empty()).then_some(inputs.api.as_str()),
        action_token: None,
        api_key: None,
        api_secret: None,
        gcp_service_account: None,
    };
    match auth {
        Auth::GithubActionToken => config.action_token = Some(true),
        Auth::ApiKey { key, secret } => {
            config.api_key = Some(key.as_str());
            config.api_secret = Some(secret.as_str());
        }
        Auth::GcpServiceAccount(account) => config.gcp_service_account = Some(account.as_str()),
    }
    Ok(serde_yaml::to_string(&config)?)
}

/// Path of the endorctl configuration under `home`.
pub fn config_path(home: &Path) -> PathBuf {
    home.join(".endorctl").join("config.yaml")
}

/// Write `content` to `${home}/.endorctl/config.yaml`, creating the directory.
pub fn write_setup_config(home: Option<&Path>, content: &str) -> Result<PathBuf, SetupError> {
    let home = home.ok_or(SetupError::MissingHome)?;
    let path = config_path(home);
    let write_error = |source| SetupError::Write {
        path: path.clone(),
        source,
    };

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(write_error)?;
    }
    std::fs::write(&path, content).map_err(write_error)?;
    Ok(path)
}
