use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::downloader::{ArchiveType, Downloader};
use crate::http::ProgressFn;
use crate::manifest::ToolDefinition;
use crate::{Result, SalsaError};

/// Written into a tool directory after a successful install
const VERSION_MARKER: &str = ".salsa-version";

/// Installs helper tools listed in the manifest
pub struct ToolInstaller {
    downloader: Arc<dyn Downloader>,
}

impl ToolInstaller {
    pub fn new(downloader: Arc<dyn Downloader>) -> Self {
        Self { downloader }
    }

    /// `<tools_dir>/<tool id>`, for tools nothing else looks up by path
    pub fn tool_directory(tool: &ToolDefinition, tools_dir: &Path) -> PathBuf {
        tools_dir.join(&tool.id)
    }

    /// Version recorded by the last successful install into `tool_dir`
    pub fn installed_version(tool_dir: &Path) -> Option<String> {
        std::fs::read_to_string(tool_dir.join(VERSION_MARKER))
            .ok()
            .map(|v| v.trim().to_string())
    }

    /// Download a tool into `tool_dir`
    ///
    /// Archives are extracted in place and then deleted. The tool's version
    /// is recorded last, so a marker only exists after a complete install.
    pub async fn install_tool(
        &self,
        tool: &ToolDefinition,
        tool_dir: &Path,
        progress: Option<&ProgressFn>,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(tool_dir)
            .await
            .map_err(|e| SalsaError::filesystem(tool_dir, e))?;

        let download_path = tool_dir.join(file_name_from_url(&tool.url, &tool.id));
        log::info!("Downloading {} {} to {}", tool.name, tool.version, download_path.display());

        self.downloader
            .download(&tool.url, &download_path, progress, cancel)
            .await?;

        if ArchiveType::from_path(&download_path).is_some() {
            self.downloader
                .extract(&download_path, tool_dir, cancel)
                .await?;
            tokio::fs::remove_file(&download_path)
                .await
                .map_err(|e| SalsaError::filesystem(&download_path, e))?;
        }

        let marker = tool_dir.join(VERSION_MARKER);
        tokio::fs::write(&marker, &tool.version)
            .await
            .map_err(|e| SalsaError::filesystem(&marker, e))?;

        Ok(tool_dir.to_path_buf())
    }
}

/// Last path segment of a URL, ignoring query and fragment
fn file_name_from_url(url: &str, fallback: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}
