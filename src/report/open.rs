use crate::errors::{AppError, AppResult};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Platform "open with default application" collaborator.
pub trait DocumentOpener {
    fn open(&mut self, path: &Path) -> AppResult<()>;
}

/// Hands the file to the desktop's default viewer.
#[derive(Debug, Default)]
pub struct SystemOpener;

impl DocumentOpener for SystemOpener {
    fn open(&mut self, path: &Path) -> AppResult<()> {
        let mut cmd = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else {
            Command::new("xdg-open")
        };

        debug!(path = %path.display(), "opening document");
        let status = cmd
            .arg(path)
            .status()
            .map_err(|e| AppError::Report(format!("cannot launch viewer: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            Err(AppError::Report(format!(
                "viewer exited with {status} for {}",
                path.display()
            )))
        }
    }
}
