//! Prerequisite discovery: static audit script, PHPUnit, PHPUnit config.

use std::path::{Path, PathBuf};

/// Candidate static-audit scripts, relative to the project root.
pub const STATIC_SCRIPT_CANDIDATES: [&str; 2] = ["qa-static-audit.sh", "tests/qa-static-audit.sh"];

/// PHPUnit configuration expected at the project root.
pub const PHPUNIT_CONFIG: &str = "phpunit.xml.dist";

/// Resolve a user-supplied path against the project root.
pub fn resolve_against(root: &Path, raw: &Path) -> PathBuf {
    if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        root.join(raw)
    }
}

/// Locate the static shell audit script.
///
/// An explicit path is returned as given (resolved against the root) even if
/// it does not exist; running it then fails visibly instead of being skipped.
pub fn discover_static_script(root: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(raw) = explicit {
        return Some(resolve_against(root, raw));
    }
    STATIC_SCRIPT_CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.is_file())
}

/// Locate the PHPUnit executable: explicit path, then `vendor/bin/phpunit`,
/// then `phpunit` on `PATH`.
pub fn discover_phpunit(root: &Path, explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(raw) = explicit {
        return Some(resolve_against(root, raw));
    }
    let local = root.join("vendor").join("bin").join("phpunit");
    if local.is_file() {
        return Some(local);
    }
    find_on_path("phpunit")
}

/// Path to `phpunit.xml.dist` if it exists.
pub fn phpunit_config(root: &Path) -> Option<PathBuf> {
    let path = root.join(PHPUNIT_CONFIG);
    path.exists().then_some(path)
}

/// Search `PATH` for an executable.
pub fn find_on_path(tool: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(tool))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        std::fs::metadata(path)
            .ok()
            .is_some_and(|metadata| metadata.permissions().mode() & 0o111 != 0)
    }

    #[cfg(not(unix))]
    {
        true
    }
}
