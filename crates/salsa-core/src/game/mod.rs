//! Base game installation, verification and launch.
//!
//! The game is downloaded by the external DepotDownloader tool, which is
//! itself fetched from the manifest's tool list by [`ToolInstaller`].

mod installer;
mod process;
mod tools;

pub use installer::{GameInstaller, SteamCredentials, DEPOT_DOWNLOADER_ID};
pub use process::{run_process, OutputObserver, OutputStream};
pub use tools::ToolInstaller;
