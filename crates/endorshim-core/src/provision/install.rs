use std::fs;
use std::io;
use std::path::Path;

/// Set the executable bits. No-op on platforms without them.
pub fn mark_executable(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

/// Move `source` to `dest`, replacing whatever is there.
///
/// A rename is tried first. Across file systems the file is copied next to
/// `dest` and renamed into place, so `dest` never holds a partial binary.
pub fn install_binary(source: &Path, dest: &Path) -> io::Result<()> {
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }

    let file_name = dest
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "endorctl".to_string());
    let staging = dest.with_file_name(format!(".{file_name}.partial"));

    fs::copy(source, &staging)?;
    if let Err(e) = fs::rename(&staging, dest) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    fs::remove_file(source)?;
    Ok(())
}
