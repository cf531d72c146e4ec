//! Nexus Mods integration.
//!
//! [`ModHost`] is what the installer depends on; [`NexusClient`] implements
//! it against the public REST API. File selection is a pure function so it
//! can be used and tested without a client.

mod client;
mod model;

pub use client::{mask_api_key, ModHost, NexusClient};
pub use model::{select_file, DownloadLink, ModFile};
