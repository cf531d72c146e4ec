use std::fmt;
use std::path::{Path, PathBuf};

/// Caller-supplied installation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    /// Parent directory; each mod gets its own subdirectory
    pub target_directory: PathBuf,
    pub overwrite_existing: bool,
    pub create_shortcut: bool,
}

impl InstallOptions {
    pub fn new(target_directory: impl Into<PathBuf>) -> Self {
        Self {
            target_directory: target_directory.into(),
            overwrite_existing: true,
            create_shortcut: false,
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    pub fn with_shortcut(mut self, create_shortcut: bool) -> Self {
        self.create_shortcut = create_shortcut;
        self
    }
}

/// Outcome of one installation attempt
///
/// Only constructible through [`InstallResult::succeeded`] and
/// [`InstallResult::failed`], so a result is successful exactly when it has
/// no errors and carries an installed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    installed_path: Option<PathBuf>,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl InstallResult {
    pub fn succeeded(installed_path: PathBuf, warnings: Vec<String>) -> Self {
        Self {
            installed_path: Some(installed_path),
            errors: Vec::new(),
            warnings,
        }
    }

    pub fn failed(error: impl Into<String>, warnings: Vec<String>) -> Self {
        Self {
            installed_path: None,
            errors: vec![error.into()],
            warnings,
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn installed_path(&self) -> Option<&Path> {
        self.installed_path.as_deref()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Installation pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    ResolvingFile,
    ResolvingLink,
    PreparingDirectory,
    Downloading,
    Extracting,
    Done,
    Failed,
}

impl InstallPhase {
    pub fn label(&self) -> &'static str {
        match self {
            InstallPhase::ResolvingFile => "Finding mod file",
            InstallPhase::ResolvingLink => "Resolving download link",
            InstallPhase::PreparingDirectory => "Preparing install directory",
            InstallPhase::Downloading => "Downloading",
            InstallPhase::Extracting => "Extracting",
            InstallPhase::Done => "Done",
            InstallPhase::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InstallPhase::Done | InstallPhase::Failed)
    }
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_succeeded_result() {
        let result = InstallResult::succeeded(PathBuf::from("/mods/err"), vec![]);
        assert!(result.is_success());
        assert_eq!(result.installed_path(), Some(Path::new("/mods/err")));
        assert!(result.errors().is_empty());
    }

    #[test]
    fn test_failed_result() {
        let result = InstallResult::failed("No download links available", vec!["w".to_string()]);
        assert!(!result.is_success());
        assert!(result.installed_path().is_none());
        assert_eq!(result.errors(), ["No download links available".to_string()]);
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_options_defaults() {
        let options = InstallOptions::new("/mods").with_shortcut(true);
        assert!(options.overwrite_existing);
        assert!(options.create_shortcut);
        assert_eq!(options.target_directory, PathBuf::from("/mods"));
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(InstallPhase::Extracting.to_string(), "Extracting");
        assert!(InstallPhase::Failed.is_terminal());
        assert!(!InstallPhase::Downloading.is_terminal());
    }
}
