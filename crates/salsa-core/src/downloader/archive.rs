//! Archive extraction (zip, 7z).

use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::{Result, SalsaError};

/// Supported archive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    Zip,
    SevenZip,
}

impl ArchiveType {
    /// Detect archive type from file extension, case-insensitively
    pub fn from_path(path: &Path) -> Option<Self> {
        let path_str = path.to_string_lossy().to_lowercase();

        if path_str.ends_with(".zip") {
            Some(ArchiveType::Zip)
        } else if path_str.ends_with(".7z") {
            Some(ArchiveType::SevenZip)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveType::Zip => "zip",
            ArchiveType::SevenZip => "7z",
        }
    }
}

/// Archive extractor
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    /// Extract an archive into `dest_dir` on the blocking pool
    ///
    /// Existing files at the destination are overwritten. Entries keep their
    /// paths from the archive.
    pub async fn extract(
        archive_path: &Path,
        dest_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let archive_type = ArchiveType::from_path(archive_path).ok_or_else(|| {
            SalsaError::Extraction {
                archive: archive_path.to_path_buf(),
                reason: "unknown archive type".to_string(),
            }
        })?;

        if cancel.is_cancelled() {
            return Err(SalsaError::Cancelled);
        }

        let archive = archive_path.to_path_buf();
        let dest = dest_dir.to_path_buf();
        let cancel = cancel.clone();

        tokio::task::spawn_blocking(move || {
            Self::extract_with_type(&archive, &dest, archive_type, &cancel)
        })
        .await
        .map_err(|e| SalsaError::Extraction {
            archive: archive_path.to_path_buf(),
            reason: format!("extraction task failed: {}", e),
        })?
    }

    /// Extract an archive with explicit type, blocking the current thread
    pub fn extract_with_type(
        archive_path: &Path,
        dest_dir: &Path,
        archive_type: ArchiveType,
        cancel: &CancellationToken,
    ) -> Result<()> {
        std::fs::create_dir_all(dest_dir).map_err(|e| SalsaError::filesystem(dest_dir, e))?;

        log::debug!(
            "Extracting {} ({}) to {}",
            archive_path.display(),
            archive_type.extension(),
            dest_dir.display()
        );

        match archive_type {
            ArchiveType::Zip => Self::extract_zip(archive_path, dest_dir, cancel),
            ArchiveType::SevenZip => Self::extract_7z(archive_path, dest_dir, cancel),
        }
    }

    /// Extract a zip archive, checking for cancellation between entries
    fn extract_zip(archive_path: &Path, dest_dir: &Path, cancel: &CancellationToken) -> Result<()> {
        let failed = |reason: String| SalsaError::Extraction {
            archive: archive_path.to_path_buf(),
            reason,
        };

        let file = File::open(archive_path).map_err(|e| SalsaError::filesystem(archive_path, e))?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file))
            .map_err(|e| failed(format!("failed to open zip: {}", e)))?;

        for i in 0..archive.len() {
            if cancel.is_cancelled() {
                return Err(SalsaError::Cancelled);
            }

            let mut entry = archive
                .by_index(i)
                .map_err(|e| failed(format!("failed to read zip entry: {}", e)))?;

            // Rejects absolute paths and `..` components
            let relative: PathBuf = entry.enclosed_name().ok_or_else(|| {
                failed(format!("path traversal detected in archive: {}", entry.name()))
            })?;

            if relative.as_os_str().is_empty() {
                continue;
            }

            let outpath = dest_dir.join(&relative);

            if entry.is_dir() {
                std::fs::create_dir_all(&outpath).map_err(|e| SalsaError::filesystem(&outpath, e))?;
                continue;
            }

            if let Some(parent) = outpath.parent() {
                std::fs::create_dir_all(parent).map_err(|e| SalsaError::filesystem(parent, e))?;
            }

            // A read-only file from an earlier install cannot be opened for writing
            remove_existing(&outpath)?;
            let mut outfile =
                File::create(&outpath).map_err(|e| SalsaError::filesystem(&outpath, e))?;
            std::io::copy(&mut entry, &mut outfile)
                .map_err(|e| failed(format!("failed to write {}: {}", relative.display(), e)))?;

            // Set permissions on Unix
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                        .map_err(|e| SalsaError::filesystem(&outpath, e))?;
                }
            }
        }

        Ok(())
    }

    /// Extract a 7z archive, checking for cancellation between entries
    fn extract_7z(archive_path: &Path, dest_dir: &Path, cancel: &CancellationToken) -> Result<()> {
        let mut stopped: Option<SalsaError> = None;

        let result = sevenz_rust::decompress_file_with_extract_fn(
            archive_path,
            dest_dir,
            |entry, reader, _| {
                if cancel.is_cancelled() {
                    stopped = Some(SalsaError::Cancelled);
                    return Err(sevenz_rust::Error::other("cancelled"));
                }

                let Some(relative) = enclosed_path(entry.name()) else {
                    stopped = Some(SalsaError::Extraction {
                        archive: archive_path.to_path_buf(),
                        reason: format!("path traversal detected in archive: {}", entry.name()),
                    });
                    return Err(sevenz_rust::Error::other("unsafe entry path"));
                };

                if relative.as_os_str().is_empty() {
                    std::io::copy(reader, &mut std::io::sink())?;
                    return Ok(true);
                }

                let outpath = dest_dir.join(&relative);
                if !entry.is_directory() {
                    if let Err(e) = remove_existing(&outpath) {
                        stopped = Some(e);
                        return Err(sevenz_rust::Error::other("cannot replace existing file"));
                    }
                }
                sevenz_rust::default_entry_extract_fn(entry, reader, &outpath)
            },
        );

        if let Some(err) = stopped {
            return Err(err);
        }

        result.map_err(|e| SalsaError::Extraction {
            archive: archive_path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// List the entry names of a zip archive
    pub fn list_entries(archive_path: &Path) -> Result<Vec<String>> {
        let file = File::open(archive_path).map_err(|e| SalsaError::filesystem(archive_path, e))?;
        let archive = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| {
            SalsaError::Extraction {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to open zip: {}", e),
            }
        })?;

        Ok(archive.file_names().map(str::to_string).collect())
    }
}

/// Entry name as a relative path, or `None` if it would leave the destination
fn enclosed_path(name: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(path)
}

fn remove_existing(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SalsaError::filesystem(path, e)),
    }
}
