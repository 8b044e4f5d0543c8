use std::path::Path;
use std::process::Command;

use super::errors::ReclaimError;

/// Show a path in the system file browser, selecting it where the platform allows.
pub fn reveal_in_file_browser(path: &Path) -> Result<(), ReclaimError> {
    let abs = path
        .canonicalize()
        .map_err(|e| ReclaimError::io(path, e))?;

    let mut cmd = browser_command(&abs);
    cmd.spawn().map_err(|e| ReclaimError::io(&abs, e))?;
    Ok(())
}

#[cfg(target_os = "macos")]
fn browser_command(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg("-R").arg(path);
    cmd
}

#[cfg(windows)]
fn browser_command(path: &Path) -> Command {
    let mut cmd = Command::new("explorer");
    cmd.arg(format!("/select,\"{}\"", path.display()));
    cmd
}

#[cfg(not(any(target_os = "macos", windows)))]
fn browser_command(path: &Path) -> Command {
    let dir = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(path)
    };
    let mut cmd = Command::new("xdg-open");
    cmd.arg(dir);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_fails_without_spawning() {
        let result = reveal_in_file_browser(Path::new("/nonexistent/reclaim/xyz"));
        assert!(result.is_err());
    }
}
