pub mod download;
pub mod install;

use crate::actions::ActionsRuntime;
use crate::env::ExecutionEnv;
use crate::integrity;
use crate::metadata::{MetadataClient, MetadataError};
use crate::platform::checksum::{checksum_key, select_checksum};
use crate::platform::{Platform, PlatformError};
use download::{DownloadError, Downloader};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Which endorctl to install and where to get it.
///
/// An empty `version` means "latest": the checksum is then ignored and both
/// are taken from the version endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupSpec {
    pub version: String,
    pub checksum: String,
    pub api_base: String,
}

/// A verified endorctl placed in the job's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBinary {
    pub path: PathBuf,
    /// Directory registered on the search path.
    pub dir: PathBuf,
    pub version: String,
    pub platform: Platform,
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("No endorctl checksum is published for platform {platform} ({})", key.unwrap_or("no checksum key"))]
    MissingChecksum {
        platform: Platform,
        key: Option<&'static str>,
    },

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("Failed to hash downloaded binary {}", path.display())]
    Hash {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("The checksum of the downloaded binary does not match the expected value!")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Failed to make {} executable", path.display())]
    Permissions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to install endorctl to {}", path.display())]
    Install {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to add {} to the search path", path.display())]
    SearchPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Bit-exact download location of an endorctl release binary.
pub fn download_url(api_base: &str, version: &str, platform: Platform) -> String {
    format!(
        "{api_base}/download/endorlabs/{version}/binaries/endorctl_{version}_{}_{}{}",
        platform.os.as_str(),
        platform.arch.as_str(),
        platform.executable_suffix()
    )
}

/// Downloads, verifies and installs endorctl.
pub struct BinaryProvisioner<D> {
    metadata: MetadataClient,
    downloader: D,
    runtime: ActionsRuntime,
}

impl<D: Downloader> BinaryProvisioner<D> {
    pub fn new(metadata: MetadataClient, downloader: D, runtime: ActionsRuntime) -> Self {
        Self {
            metadata,
            downloader,
            runtime,
        }
    }

    /// Run the provisioning steps in order, stopping at the first failure.
    ///
    /// Nothing is written to `env.work_dir` unless the checksum matched.
    pub async fn provision(
        &self,
        spec: &SetupSpec,
        env: &ExecutionEnv,
    ) -> Result<InstalledBinary, ProvisionError> {
        let platform = env.platform()?;
        let (version, checksum) = self.resolve_release(spec, platform).await?;

        tracing::info!("Downloading endorctl version {version}");
        let url = download_url(&spec.api_base, &version, platform);
        let downloaded = self.downloader.download(&url).await?;

        let installed = self.install_verified(&downloaded, &checksum, platform, env);
        if installed.is_err() {
            discard(&downloaded);
        }
        let (path, dir) = installed?;

        tracing::info!("Endorctl downloaded and added to the path");
        Ok(InstalledBinary {
            path,
            dir,
            version,
            platform,
        })
    }

    /// Check the download against `checksum` and move it into the work dir.
    fn install_verified(
        &self,
        downloaded: &Path,
        checksum: &str,
        platform: Platform,
        env: &ExecutionEnv,
    ) -> Result<(PathBuf, PathBuf), ProvisionError> {
        let actual = integrity::sha256_file(downloaded).map_err(|source| ProvisionError::Hash {
            path: downloaded.to_path_buf(),
            source,
        })?;
        if actual != checksum {
            return Err(ProvisionError::ChecksumMismatch {
                expected: checksum.to_string(),
                actual,
            });
        }
        tracing::info!("Binary checksum: {checksum}");

        install::mark_executable(downloaded).map_err(|source| ProvisionError::Permissions {
            path: downloaded.to_path_buf(),
            source,
        })?;

        let dir = env.work_dir.clone();
        let path = dir.join(platform.binary_name());
        install::install_binary(downloaded, &path).map_err(|source| ProvisionError::Install {
            path: path.clone(),
            source,
        })?;
        self.runtime
            .add_path(&dir)
            .map_err(|source| ProvisionError::SearchPath {
                path: dir.clone(),
                source,
            })?;
        Ok((path, dir))
    }

    async fn resolve_release(
        &self,
        spec: &SetupSpec,
        platform: Platform,
    ) -> Result<(String, String), ProvisionError> {
        if !spec.version.is_empty() {
            return Ok((spec.version.clone(), spec.checksum.clone()));
        }

        tracing::info!("Endorctl version not provided, using latest version");
        let metadata = self.metadata.fetch_latest(&spec.api_base).await?;
        let checksum = select_checksum(&metadata.client_checksums, platform)
            .filter(|digest| !digest.is_empty())
            .ok_or(ProvisionError::MissingChecksum {
                platform,
                key: checksum_key(platform),
            })?;

        Ok((metadata.client_version.clone(), checksum.to_string()))
    }
}

/// Remove a download that will not be installed. Already-moved files are fine.
fn discard(downloaded: &Path) {
    match std::fs::remove_file(downloaded) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::debug!("Failed to remove {}: {e}", downloaded.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::http_client;
    use crate::platform::{EndorctlArch, EndorctlOs};

    /// Writes fixed bytes to a file instead of touching the network.
    struct StaticDownloader {
        dir: PathBuf,
        content: Vec<u8>,
    }

    impl Downloader for StaticDownloader {
        async fn download(&self, _url: &str) -> Result<PathBuf, DownloadError> {
            let path = self.dir.join("endorctl-download");
            std::fs::write(&path, &self.content).map_err(|source| DownloadError::Io {
                dir: self.dir.clone(),
                source,
            })?;
            Ok(path)
        }
    }

    fn provisioner(scratch: &Path, content: &[u8]) -> BinaryProvisioner<StaticDownloader> {
        BinaryProvisioner::new(
            MetadataClient::new(http_client().unwrap()),
            StaticDownloader {
                dir: scratch.to_path_buf(),
                content: content.to_vec(),
            },
            ActionsRuntime::default(),
        )
    }

    fn digest(content: &[u8]) -> String {
        integrity::sha256_reader(content).unwrap()
    }

    #[test]
    fn test_download_url_template() {
        let linux = Platform::new(EndorctlOs::Linux, EndorctlArch::Amd64);
        let windows = Platform::new(EndorctlOs::Windows, EndorctlArch::Amd64);

        assert_eq!(
            download_url("https://api.endorlabs.com", "v1.2.3", linux),
            "https://api.endorlabs.com/download/endorlabs/v1.2.3/binaries/endorctl_v1.2.3_linux_amd64"
        );
        assert_eq!(
            download_url("https://api.endorlabs.com", "v1.2.3", windows),
            "https://api.endorlabs.com/download/endorlabs/v1.2.3/binaries/endorctl_v1.2.3_windows_amd64.exe"
        );
    }

    #[tokio::test]
    async fn test_provision_pinned_version() {
        let work = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let content = b"endorctl pinned build";
        let env = ExecutionEnv::new("Linux", "X64", work.path());
        let spec = SetupSpec {
            version: "v1.2.3".to_string(),
            checksum: digest(content),
            api_base: "http://unused.invalid".to_string(),
        };

        let installed = provisioner(scratch.path(), content)
            .provision(&spec, &env)
            .await
            .unwrap();

        assert_eq!(installed.path, work.path().join("endorctl"));
        assert_eq!(installed.dir, work.path());
        assert_eq!(installed.version, "v1.2.3");
        assert_eq!(std::fs::read(&installed.path).unwrap(), content);
        assert!(!scratch.path().join("endorctl-download").exists());
    }

    #[tokio::test]
    async fn test_checksum_mismatch_installs_nothing() {
        let work = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let env = ExecutionEnv::new("Linux", "X64", work.path());
        let spec = SetupSpec {
            version: "v1.2.3".to_string(),
            checksum: digest(b"the real binary"),
            api_base: "http://unused.invalid".to_string(),
        };

        let err = provisioner(scratch.path(), b"a tampered binary")
            .provision(&spec, &env)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::ChecksumMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "The checksum of the downloaded binary does not match the expected value!"
        );
        assert!(!work.path().join("endorctl").exists());
        assert!(!scratch.path().join("endorctl-download").exists());
    }

    #[tokio::test]
    async fn test_install_failure_removes_download() {
        let work = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let content = b"endorctl build";
        let env = ExecutionEnv::new("Linux", "X64", work.path().join("not/created"));
        let spec = SetupSpec {
            version: "v1.2.3".to_string(),
            checksum: digest(content),
            api_base: "http://unused.invalid".to_string(),
        };

        let err = provisioner(scratch.path(), content)
            .provision(&spec, &env)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::Install { .. }));
        assert!(!scratch.path().join("endorctl-download").exists());
    }

    #[test]
    fn test_discard_tolerates_missing_file() {
        let scratch = tempfile::tempdir().unwrap();
        let path = scratch.path().join("endorctl-download");
        std::fs::write(&path, b"bin").unwrap();

        discard(&path);
        assert!(!path.exists());
        discard(&path);
    }

    #[tokio::test]
    async fn test_unsupported_platform_fails_before_download() {
        let work = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let env = ExecutionEnv::new("Linux", "ARM64", work.path());
        let spec = SetupSpec {
            version: "v1.2.3".to_string(),
            checksum: String::new(),
            api_base: "http://unused.invalid".to_string(),
        };

        let err = provisioner(scratch.path(), b"bin")
            .provision(&spec, &env)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::Platform(_)));
        assert!(!scratch.path().join("endorctl-download").exists());
    }

    #[tokio::test]
    async fn test_windows_binary_name() {
        let work = tempfile::tempdir().unwrap();
        let scratch = tempfile::tempdir().unwrap();
        let content = b"MZ";
        let env = ExecutionEnv::new("Windows", "X64", work.path());
        let spec = SetupSpec {
            version: "v1.2.3".to_string(),
            checksum: digest(content),
            api_base: "http://unused.invalid".to_string(),
        };

        let installed = provisioner(scratch.path(), content)
            .provision(&spec, &env)
            .await
            .unwrap();

        assert_eq!(installed.path, work.path().join("endorctl.exe"));
    }
}
