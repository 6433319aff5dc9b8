use std::env;
use std::path::{Path, PathBuf};

/// Locate an executable on `PATH`
pub fn find_program(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        executable_names(name)
            .map(|file| dir.join(file))
            .find(|path| is_executable(path))
    })
}

#[cfg(windows)]
fn executable_names(name: &str) -> impl Iterator<Item = String> {
    [name.to_string(), format!("{name}.exe")].into_iter()
}

#[cfg(not(windows))]
fn executable_names(name: &str) -> impl Iterator<Item = String> {
    std::iter::once(name.to_string())
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_finds_shell() {
        assert!(find_program("sh").is_some());
        assert_eq!(find_program("/bin/sh"), Some(PathBuf::from("/bin/sh")));
    }

    #[test]
    fn test_missing_program() {
        assert!(find_program("ocrclip-definitely-missing-tool").is_none());
        assert!(find_program("/nonexistent/dir/tool").is_none());
    }
}
