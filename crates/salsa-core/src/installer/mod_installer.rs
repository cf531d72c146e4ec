use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::downloader::{ArchiveType, Downloader};
use crate::http::ProgressFn;
use crate::manifest::ModDefinition;
use crate::nexus::{select_file, ModHost};
use crate::SalsaError;

use super::result::{InstallOptions, InstallPhase, InstallResult};

/// Receives every phase transition of an installation
pub type PhaseListener = dyn Fn(InstallPhase) + Send + Sync;

/// Why an installation stopped
enum InstallFailure {
    NoMatchingFile(String),
    NoDownloadLinks,
    Error(SalsaError),
}

impl From<SalsaError> for InstallFailure {
    fn from(err: SalsaError) -> Self {
        InstallFailure::Error(err)
    }
}

impl fmt::Display for InstallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallFailure::NoMatchingFile(pattern) => {
                write!(f, "No file found matching pattern: {}", pattern)
            }
            InstallFailure::NoDownloadLinks => f.write_str("No download links available"),
            InstallFailure::Error(err) => write!(f, "Installation failed: {}", err),
        }
    }
}

/// Installs mods from a mod host into per-mod directories
///
/// The pipeline runs strictly in order: pick a file, resolve a link, create
/// the directory, download, then extract when the file is an archive. It
/// never retries and never removes partial output.
pub struct ModInstaller {
    host: Arc<dyn ModHost>,
    downloader: Arc<dyn Downloader>,
    phase_listener: Option<Arc<PhaseListener>>,
}

impl ModInstaller {
    pub fn new(host: Arc<dyn ModHost>, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            host,
            downloader,
            phase_listener: None,
        }
    }

    pub fn with_phase_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(InstallPhase) + Send + Sync + 'static,
    {
        self.phase_listener = Some(Arc::new(listener));
        self
    }

    /// `<target_directory>/<mod id>`
    pub fn get_install_directory(definition: &ModDefinition, options: &InstallOptions) -> PathBuf {
        options.target_directory.join(&definition.id)
    }

    /// Install a mod
    ///
    /// Every failure, including cancellation, is reported through the
    /// returned [`InstallResult`].
    pub async fn install(
        &self,
        definition: &ModDefinition,
        options: &InstallOptions,
        progress: Option<&ProgressFn>,
        cancel: &CancellationToken,
    ) -> InstallResult {
        log::info!("Installing mod: {}", definition.name);

        match self.run(definition, options, progress, cancel).await {
            Ok(install_dir) => {
                self.notify(InstallPhase::Done);
                log::info!("Installation complete: {}", install_dir.display());

                let mut warnings = Vec::new();
                if !definition.strategy.is_launcher_based() {
                    warnings.push(format!(
                        "{} was installed, but launching through {} is not supported",
                        definition.name,
                        definition.strategy.label()
                    ));
                }
                InstallResult::succeeded(install_dir, warnings)
            }
            Err(failure) => {
                self.notify(InstallPhase::Failed);
                log::error!("Installation of {} failed: {}", definition.name, failure);
                InstallResult::failed(failure.to_string(), Vec::new())
            }
        }
    }

    async fn run(
        &self,
        definition: &ModDefinition,
        options: &InstallOptions,
        progress: Option<&ProgressFn>,
        cancel: &CancellationToken,
    ) -> Result<PathBuf, InstallFailure> {
        let nexus = &definition.nexus;

        self.notify(InstallPhase::ResolvingFile);
        let files = self
            .host
            .list_files(&nexus.game_domain, nexus.mod_id, cancel)
            .await?;
        let file = select_file(&files, &nexus.file_pattern)
            .ok_or_else(|| InstallFailure::NoMatchingFile(nexus.file_pattern.clone()))?;

        log::info!("Selected file: {} ({} bytes)", file.file_name, file.size_bytes);

        self.notify(InstallPhase::ResolvingLink);
        let links = self
            .host
            .resolve_download_links(&nexus.game_domain, nexus.mod_id, file.file_id, cancel)
            .await?;
        let link = links.first().ok_or(InstallFailure::NoDownloadLinks)?;

        self.notify(InstallPhase::PreparingDirectory);
        let install_dir = Self::get_install_directory(definition, options);
        tokio::fs::create_dir_all(&install_dir)
            .await
            .map_err(|e| SalsaError::filesystem(&install_dir, e))?;

        let file_name = Path::new(&file.file_name).file_name().ok_or_else(|| {
            SalsaError::HostApi(format!("Invalid file name from host: {}", file.file_name))
        })?;
        let download_path = install_dir.join(file_name);

        self.notify(InstallPhase::Downloading);
        log::info!("Downloading to: {}", download_path.display());
        self.downloader
            .download(&link.url, &download_path, progress, cancel)
            .await?;

        if ArchiveType::from_path(&download_path).is_some() {
            self.notify(InstallPhase::Extracting);
            log::info!("Extracting archive...");
            self.downloader
                .extract(&download_path, &install_dir, cancel)
                .await?;
        }

        Ok(install_dir)
    }

    /// Check that a mod is installed at `install_path`
    ///
    /// Only the directory's existence is checked, not its contents.
    pub async fn verify_installation(
        &self,
        definition: &ModDefinition,
        install_path: &Path,
    ) -> bool {
        let installed = tokio::fs::metadata(install_path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        log::debug!(
            "Verified {} at {}: {}",
            definition.id,
            install_path.display(),
            installed
        );
        installed
    }

    fn notify(&self, phase: InstallPhase) {
        log::debug!("Install phase: {}", phase);
        if let Some(listener) = &self.phase_listener {
            listener(phase);
        }
    }
}
