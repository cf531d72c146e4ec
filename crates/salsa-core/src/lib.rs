pub mod config;
pub mod downloader;
pub mod error;
pub mod game;
pub mod http;
pub mod installer;
pub mod manifest;
pub mod nexus;
pub mod shortcut;

pub use config::{AppConfig, ConfigLoader};
pub use downloader::{ArchiveExtractor, ArchiveType, Downloader, HttpDownloader};
pub use error::{Result, SalsaError};
pub use game::{GameInstaller, SteamCredentials, ToolInstaller};
pub use http::{HttpClient, HttpClientConfig, ProgressFn};
pub use installer::{InstallOptions, InstallPhase, InstallResult, ModInstaller};
pub use manifest::{
    InstallStrategy, Manifest, ManifestLoader, ModDefinition, RemoteManifestLoader, ToolDefinition,
};
pub use nexus::{select_file, DownloadLink, ModFile, ModHost, NexusClient};
pub use shortcut::{platform_shortcuts, ShortcutService};
