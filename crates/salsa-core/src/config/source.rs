use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SalsaError};

use super::config::AppConfig;

/// Represents where a configuration layer came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in default value
    Default,
    /// From the TOML config file
    File(PathBuf),
    /// From environment variable
    Environment(String),
}

impl ConfigSource {
    pub fn describe(&self) -> String {
        match self {
            ConfigSource::Default => "default".to_string(),
            ConfigSource::File(path) => path.display().to_string(),
            ConfigSource::Environment(var) => var.clone(),
        }
    }
}

/// Loads configuration layers from disk and the environment
#[derive(Debug)]
pub struct ConfigLoader {
    use_environment: bool,
}

impl ConfigLoader {
    pub fn new(use_environment: bool) -> Self {
        Self { use_environment }
    }

    /// Get a SALSA_* environment variable, ignoring empty values
    pub fn get_env(&self, var: &str) -> Option<String> {
        if !self.use_environment {
            return None;
        }

        env::var(var).ok().filter(|s| !s.trim().is_empty())
    }

    /// Directory holding the user config file
    pub fn config_dir(&self) -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "salsa") {
            proj_dirs.config_dir().to_path_buf()
        } else if let Some(base) = directories::BaseDirs::new() {
            base.home_dir().join(".salsa")
        } else {
            PathBuf::from(".salsa")
        }
    }

    /// Resolve the config file: explicit path, then SALSA_CONFIG, then the user config dir
    pub fn config_file_path(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        if let Some(path) = self.get_env("SALSA_CONFIG") {
            return PathBuf::from(path);
        }

        self.config_dir().join("config.toml")
    }

    /// Load a config file on top of the defaults. A missing file yields the defaults.
    pub fn load_file(&self, path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| SalsaError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let config = AppConfig::from_toml(&contents)
            .map_err(|e| SalsaError::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overlay SALSA_* environment variables. Returns the sources that were applied.
    pub fn apply_environment(&self, config: &mut AppConfig) -> Vec<ConfigSource> {
        let mut applied = Vec::new();

        let mut string_var = |var: &str, target: &mut String| {
            if let Some(value) = self.get_env(var) {
                *target = value;
                applied.push(ConfigSource::Environment(var.to_string()));
            }
        };
        string_var("SALSA_MANIFEST_URL", &mut config.manifest.base_url);
        string_var("SALSA_NEXUS_API_KEY", &mut config.nexus.api_key);
        string_var("SALSA_NEXUS_API_URL", &mut config.nexus.api_url);

        let mut path_var = |var: &str, target: &mut PathBuf| {
            if let Some(value) = self.get_env(var) {
                *target = PathBuf::from(value);
                applied.push(ConfigSource::Environment(var.to_string()));
            }
        };
        path_var("SALSA_INSTALL_ROOT", &mut config.paths.install_root);
        path_var("SALSA_GAME_DIRECTORY", &mut config.paths.game_directory);
        path_var("SALSA_MODS_DIRECTORY", &mut config.paths.mods_directory);
        path_var("SALSA_TOOLS_DIRECTORY", &mut config.paths.tools_directory);

        if let Some(timeout) = self.get_env_u64("SALSA_HTTP_TIMEOUT") {
            config.http.timeout_secs = timeout;
            applied.push(ConfigSource::Environment("SALSA_HTTP_TIMEOUT".to_string()));
        }

        applied
    }

    /// Get unsigned integer value from environment variable
    pub fn get_env_u64(&self, var: &str) -> Option<u64> {
        self.get_env(var).and_then(|val| val.trim().parse().ok())
    }

    /// Write the config as TOML, creating parent directories
    pub fn save(&self, config: &AppConfig, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SalsaError::filesystem(parent, e))?;
        }

        let contents = config.to_toml()?;
        fs::write(path, contents).map_err(|e| SalsaError::filesystem(path, e))?;
        log::info!("Saved configuration to {}", path.display());
        Ok(())
    }
}
