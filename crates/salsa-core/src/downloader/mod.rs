//! Artifact downloading and extraction module.
//!
//! This module streams mod and tool archives from HTTP URLs to disk and
//! unpacks the archive formats we recognize (zip and 7z).

mod archive;
mod file;

pub use archive::{ArchiveExtractor, ArchiveType};
pub use file::{redact_query, Downloader, HttpDownloader};
