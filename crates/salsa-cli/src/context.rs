//! Shared state for every command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use salsa_core::config::{AppConfig, ConfigLoader};
use salsa_core::downloader::{Downloader, HttpDownloader};
use salsa_core::game::GameInstaller;
use salsa_core::http::{HttpClient, HttpClientConfig};
use salsa_core::manifest::{Manifest, ManifestLoader, RemoteManifestLoader};
use salsa_core::nexus::NexusClient;

use crate::interrupt::Interrupts;
use crate::output::{Output, Verbosity};
use crate::progress::ProgressManager;

pub struct AppContext {
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub output: Output,
    pub progress: ProgressManager,
    pub interrupts: Interrupts,
    http_client: Arc<HttpClient>,
}

impl AppContext {
    /// Resolve configuration and build shared clients. Must run inside a tokio runtime.
    pub fn new(config_file: Option<&Path>, verbosity: Verbosity, show_progress: bool) -> Result<Self> {
        let loader = ConfigLoader::new(true);
        let config_path = loader.config_file_path(config_file);
        let config =
            AppConfig::build(Some(&config_path), true).context("Failed to load configuration")?;

        log::debug!("Using config file {}", config_path.display());

        let http_client = HttpClient::with_config(HttpClientConfig::from(&config.http))
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config,
            config_path,
            output: Output::new(verbosity),
            progress: ProgressManager::new(show_progress),
            interrupts: Interrupts::install(),
            http_client: Arc::new(http_client),
        })
    }

    pub fn downloader(&self) -> Arc<dyn Downloader> {
        Arc::new(HttpDownloader::new(self.http_client.clone()))
    }

    pub fn nexus_client(&self) -> Result<Arc<NexusClient>> {
        let client = NexusClient::new(&self.config.nexus, &self.config.http)
            .context("Failed to create Nexus Mods client")?;
        Ok(Arc::new(client))
    }

    pub fn game_installer(&self) -> GameInstaller {
        GameInstaller::new(self.config.game.clone(), self.config.paths.tools_path())
    }

    /// Fetch the remote manifest behind a spinner
    pub async fn load_manifest(&self, cancel: &CancellationToken) -> Result<Manifest> {
        let base_url = self.config.manifest_url()?;
        let spinner = self.progress.create_spinner("Loading manifest...");

        let loader = RemoteManifestLoader::new(self.http_client.clone());
        let manifest = loader.load_manifest(base_url, cancel).await;
        spinner.finish_and_clear();

        manifest.with_context(|| format!("Failed to load manifest from {}", base_url))
    }

    /// Persist a new API key to the config file, leaving other file values untouched
    pub fn save_api_key(&mut self, api_key: &str) -> Result<()> {
        let loader = ConfigLoader::new(false);
        let mut file_config = loader.load_file(&self.config_path)?;
        file_config.nexus.api_key = api_key.to_string();
        loader
            .save(&file_config, &self.config_path)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))?;

        self.config.nexus.api_key = api_key.to_string();
        Ok(())
    }
}
