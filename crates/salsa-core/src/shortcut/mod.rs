//! Desktop shortcut creation.
//!
//! Shortcuts are a platform capability. [`platform_shortcuts`] picks the
//! implementation for the running platform once at startup; platforms
//! without one get [`UnsupportedShortcuts`], which fails every creation
//! with [`SalsaError::UnsupportedOperation`].

mod desktop_entry;

use std::path::{Path, PathBuf};

use crate::{Result, SalsaError};

pub use desktop_entry::DesktopEntryShortcuts;

/// Creates launcher shortcuts on the host desktop
pub trait ShortcutService: Send + Sync {
    /// Create a shortcut at `shortcut_path` launching `target`
    fn create_shortcut(
        &self,
        target: &Path,
        shortcut_path: &Path,
        working_dir: Option<&Path>,
        arguments: Option<&str>,
    ) -> Result<()>;

    fn shortcut_exists(&self, shortcut_path: &Path) -> bool {
        shortcut_path.is_file()
    }

    /// File name for a shortcut displayed as `name`
    fn shortcut_file_name(&self, name: &str) -> String;
}

/// Shortcut service for platforms without an implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedShortcuts;

impl ShortcutService for UnsupportedShortcuts {
    fn create_shortcut(
        &self,
        _target: &Path,
        _shortcut_path: &Path,
        _working_dir: Option<&Path>,
        _arguments: Option<&str>,
    ) -> Result<()> {
        Err(SalsaError::UnsupportedOperation(format!(
            "desktop shortcuts are not supported on {}",
            std::env::consts::OS
        )))
    }

    fn shortcut_exists(&self, _shortcut_path: &Path) -> bool {
        false
    }

    fn shortcut_file_name(&self, name: &str) -> String {
        name.to_string()
    }
}

/// The shortcut service for the running platform
pub fn platform_shortcuts() -> Box<dyn ShortcutService> {
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        Box::new(DesktopEntryShortcuts)
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    {
        Box::new(UnsupportedShortcuts)
    }
}

/// The user's desktop directory
pub fn desktop_dir() -> Option<PathBuf> {
    let dirs = directories::UserDirs::new()?;
    dirs.desktop_dir()
        .map(Path::to_path_buf)
        .or_else(|| Some(dirs.home_dir().join("Desktop")))
}

/// First launcher candidate that exists as a file in `mod_dir`
pub fn find_launcher<S: AsRef<str>>(mod_dir: &Path, candidates: &[S]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|name| mod_dir.join(name.as_ref()))
        .find(|path| path.is_file())
}
