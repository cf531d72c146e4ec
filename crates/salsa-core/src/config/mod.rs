//! Configuration management
//!
//! Configuration is resolved once at startup and then passed explicitly to
//! every component. Layers are merged in this order (later wins):
//!
//! 1. Built-in defaults
//! 2. The TOML config file (`--config`, `SALSA_CONFIG`, or the platform config dir)
//! 3. Environment variables (`SALSA_*`)
//!
//! # Example
//!
//! ```rust,no_run
//! use salsa_core::config::AppConfig;
//!
//! let config = AppConfig::build(None, true).unwrap();
//! println!("Mods dir: {:?}", config.paths.mods_path());
//! ```

mod config;
mod source;

pub use config::{
    AppConfig, GameSettings, HttpSettings, ManifestSettings, NexusSettings, PathSettings,
    ShortcutSettings,
};
pub use source::{ConfigLoader, ConfigSource};
