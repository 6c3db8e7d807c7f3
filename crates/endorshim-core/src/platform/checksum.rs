use super::{EndorctlArch, EndorctlOs, Platform};
use std::collections::BTreeMap;

/// Per-platform digests as published in `ClientChecksums`.
pub type ClientChecksums = BTreeMap<String, String>;

/// Checksum map key for a platform, if endorctl publishes one for it.
pub fn checksum_key(platform: Platform) -> Option<&'static str> {
    match (platform.os, platform.arch) {
        (EndorctlOs::Linux, EndorctlArch::Amd64) => Some("ARCH_TYPE_LINUX_AMD64"),
        (EndorctlOs::Macos, EndorctlArch::Amd64) => Some("ARCH_TYPE_MACOS_AMD64"),
        (EndorctlOs::Macos, EndorctlArch::Arm64) => Some("ARCH_TYPE_MACOS_ARM64"),
        (EndorctlOs::Windows, EndorctlArch::Amd64) => Some("ARCH_TYPE_WINDOWS_AMD64"),
        _ => None,
    }
}

/// Select the expected digest for `platform`.
///
/// `None` means no checksum is available; the caller decides what that means.
pub fn select_checksum(checksums: &ClientChecksums, platform: Platform) -> Option<&str> {
    let key = checksum_key(platform)?;
    checksums.get(key).map(String::as_str)
}
