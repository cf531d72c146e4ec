use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SalsaError};

const DEFAULT_USER_AGENT: &str = concat!("salsa/", env!("CARGO_PKG_VERSION"));
const DEFAULT_NEXUS_API_URL: &str = "https://api.nexusmods.com/v1";

/// Remote manifest location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestSettings {
    /// Base URL that directory.json, mods.json and tools.json live under
    pub base_url: String,
}

/// Nexus Mods API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NexusSettings {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    pub api_url: String,

    pub application_name: String,

    pub application_version: String,
}

impl Default for NexusSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_NEXUS_API_URL.to_string(),
            application_name: "salsa".to_string(),
            application_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl NexusSettings {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Local directory layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub install_root: PathBuf,
    pub game_directory: PathBuf,
    pub mods_directory: PathBuf,
    pub tools_directory: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            install_root: default_install_root(),
            game_directory: PathBuf::from("ELDENRING"),
            mods_directory: PathBuf::from("Mods"),
            tools_directory: PathBuf::from("Tools"),
        }
    }
}

fn default_install_root() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "salsa") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        PathBuf::from("salsa")
    }
}

impl PathSettings {
    pub fn game_path(&self) -> PathBuf {
        self.install_root.join(&self.game_directory)
    }

    pub fn mods_path(&self) -> PathBuf {
        self.install_root.join(&self.mods_directory)
    }

    pub fn tools_path(&self) -> PathBuf {
        self.install_root.join(&self.tools_directory)
    }
}

/// HTTP transport settings shared by every client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Total deadline for manifest and API requests
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Idle limit between reads; the only timeout applied to downloads
    pub read_timeout_secs: u64,
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            connect_timeout_secs: 10,
            read_timeout_secs: 60,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// The base game managed by the installer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub name: String,
    /// Steam app id passed to DepotDownloader and written to steam_appid.txt
    pub app_id: u32,
    /// Executable path relative to the game directory
    pub executable: PathBuf,
    /// Target OS for the depot download
    pub depot_os: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            name: "Elden Ring".to_string(),
            app_id: 1245620,
            executable: PathBuf::from("Game").join("eldenring.exe"),
            depot_os: "windows".to_string(),
        }
    }
}

/// Desktop shortcut for an installed mod's launcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutSettings {
    /// Mod whose install directory holds the launcher
    pub mod_id: String,
    /// Shortcut display name
    pub name: String,
    /// Launcher file names, first existing wins
    pub launcher_candidates: Vec<String>,
}

impl Default for ShortcutSettings {
    fn default() -> Self {
        Self {
            mod_id: "elden-ring-reforged".to_string(),
            name: "Elden Ring Reforged".to_string(),
            launcher_candidates: vec![
                "Launch ELDEN RING Reforged.bat".to_string(),
                "!! Launch ELDEN RING Reforged.BAT".to_string(),
                "launch.bat".to_string(),
            ],
        }
    }
}

/// Main application configuration
///
/// Built once at startup by [`AppConfig::build`] and handed to every
/// component constructor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub manifest: ManifestSettings,
    pub nexus: NexusSettings,
    pub paths: PathSettings,
    pub http: HttpSettings,
    pub game: GameSettings,
    pub shortcut: ShortcutSettings,
}

impl AppConfig {
    /// Build the configuration: defaults, then the config file, then `SALSA_*` variables
    pub fn build(explicit_file: Option<&Path>, use_environment: bool) -> Result<Self> {
        let loader = super::ConfigLoader::new(use_environment);
        let path = loader.config_file_path(explicit_file);
        let mut config = loader.load_file(&path)?;
        loader.apply_environment(&mut config);
        Ok(config)
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| SalsaError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SalsaError::Config(e.to_string()))
    }

    /// The manifest base URL, failing when none was configured
    pub fn manifest_url(&self) -> Result<&str> {
        let url = self.manifest.base_url.trim();
        if url.is_empty() {
            return Err(SalsaError::Config(
                "manifest URL is not configured (set manifest.base_url or SALSA_MANIFEST_URL)"
                    .to_string(),
            ));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_no_credentials() {
        let config = AppConfig::default();
        assert!(config.manifest.base_url.is_empty());
        assert!(!config.nexus.has_api_key());
        assert_eq!(config.nexus.api_url, "https://api.nexusmods.com/v1");
        assert_eq!(config.game.app_id, 1245620);
        assert_eq!(config.http.read_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_derived_paths() {
        let paths = PathSettings {
            install_root: PathBuf::from("/games"),
            game_directory: PathBuf::from("ELDENRING"),
            mods_directory: PathBuf::from("Mods"),
            tools_directory: PathBuf::from("Tools"),
        };
        assert_eq!(paths.game_path(), PathBuf::from("/games/ELDENRING"));
        assert_eq!(paths.mods_path(), PathBuf::from("/games/Mods"));
        assert_eq!(paths.tools_path(), PathBuf::from("/games/Tools"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
[manifest]
base_url = "https://example.com/manifests/"

[paths]
install_root = "/srv/games"
"#,
        )
        .unwrap();

        assert_eq!(config.manifest.base_url, "https://example.com/manifests/");
        assert_eq!(config.paths.install_root, PathBuf::from("/srv/games"));
        assert_eq!(config.paths.mods_directory, PathBuf::from("Mods"));
        assert_eq!(config.http.timeout_secs, 300);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[manifest\nbase_url = 1").unwrap_err();
        assert!(matches!(err, SalsaError::Config(_)));
    }

    #[test]
    fn test_manifest_url_required() {
        let mut config = AppConfig::default();
        assert!(config.manifest_url().is_err());

        config.manifest.base_url = "https://example.com/m".to_string();
        assert_eq!(config.manifest_url().unwrap(), "https://example.com/m");
    }

    #[test]
    fn test_empty_api_key_not_serialized() {
        let config = AppConfig::default();
        let toml = config.to_toml().unwrap();
        assert!(!toml.contains("api_key"));
    }
}
