//! Remote manifest module.
//!
//! The manifest is three JSON documents published under one base URL:
//! `directory.json` (directory layout), `mods.json` (installable mods) and
//! `tools.json` (helper tools). It is fetched fresh on every load.

mod loader;
mod model;

pub use loader::{
    manifest_url, DocumentSource, ManifestLoader, RemoteManifestLoader, DIRECTORY_DOCUMENT,
    MODS_DOCUMENT, TOOLS_DOCUMENT,
};
pub use model::{
    DirectoryConfig, InstallStrategy, Manifest, ModDefinition, NexusInfo, ToolDefinition,
};
