use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalsaError {
    // Remote document errors
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Failed to parse {document}: {reason}")]
    Parse { document: String, reason: String },

    // Mod host errors
    #[error("Mod host API error: {0}")]
    HostApi(String),

    // Download errors
    #[error("Download failed for {url}: {reason}")]
    Transfer { url: String, reason: String },

    // Archive errors
    #[error("Failed to extract {}: {reason}", archive.display())]
    Extraction { archive: PathBuf, reason: String },

    // Filesystem errors
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Child process errors
    #[error("Process failed: {0}")]
    Process(String),
}

impl SalsaError {
    /// Wrap an IO error with the path it happened at
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SalsaError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SalsaError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, SalsaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SalsaError::Fetch {
            url: "https://example.com/mods.json".to_string(),
            reason: "HTTP 404".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to fetch https://example.com/mods.json: HTTP 404");

        let err = SalsaError::Extraction {
            archive: PathBuf::from("/tmp/mod.7z"),
            reason: "bad header".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to extract /tmp/mod.7z: bad header");

        assert_eq!(SalsaError::Cancelled.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_filesystem_helper() {
        let err = SalsaError::filesystem(
            "/mods/err",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, SalsaError::Filesystem { .. }));
        assert!(err.to_string().starts_with("Filesystem error at /mods/err"));
        assert!(!err.is_cancelled());
    }
}
