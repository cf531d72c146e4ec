use chrono::{DateTime, Utc};

/// A file hosted for a mod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModFile {
    pub file_id: u64,
    pub file_name: String,
    pub version: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// A resolved CDN URL for one file
///
/// `expires_at` is an estimate made when the link was resolved, not a value
/// returned by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

impl DownloadLink {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Pick the file a mod's `file_pattern` refers to
///
/// - `"main"`: first file whose name contains `MAIN`, ignoring case
/// - `"latest"`: newest upload, earliest position wins a tie
/// - anything else: the first file
///
/// The pattern itself is matched case-insensitively.
pub fn select_file<'a>(files: &'a [ModFile], pattern: &str) -> Option<&'a ModFile> {
    log::debug!("Selecting file with pattern: {}", pattern);

    match pattern.to_lowercase().as_str() {
        "main" => files
            .iter()
            .find(|f| f.file_name.to_uppercase().contains("MAIN")),
        "latest" => files.iter().reduce(|best, candidate| {
            if candidate.uploaded_at > best.uploaded_at {
                candidate
            } else {
                best
            }
        }),
        _ => files.first(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn file(id: u64, name: &str, uploaded: i64) -> ModFile {
        ModFile {
            file_id: id,
            file_name: name.to_string(),
            version: "1.0".to_string(),
            size_bytes: 1024,
            uploaded_at: Utc.timestamp_opt(uploaded, 0).unwrap(),
        }
    }

    #[test]
    fn test_select_main() {
        let files = vec![
            file(1, "ERR-optional-patch.zip", 100),
            file(2, "ERR-Main-File.zip", 50),
            file(3, "err_main_v2.zip", 200),
        ];

        assert_eq!(select_file(&files, "main").unwrap().file_id, 2);
        assert_eq!(select_file(&files, "MAIN").unwrap().file_id, 2);
    }

    #[test]
    fn test_select_main_no_match() {
        let files = vec![file(1, "patch.zip", 100), file(2, "extras.7z", 50)];
        assert!(select_file(&files, "main").is_none());
    }

    #[test]
    fn test_select_latest() {
        let files = vec![
            file(1, "a.zip", 100),
            file(2, "b.zip", 300),
            file(3, "c.zip", 200),
        ];
        assert_eq!(select_file(&files, "latest").unwrap().file_id, 2);
        assert_eq!(select_file(&files, "Latest").unwrap().file_id, 2);
    }

    #[test]
    fn test_select_latest_tie_keeps_first() {
        let files = vec![
            file(1, "a.zip", 100),
            file(2, "b.zip", 300),
            file(3, "c.zip", 300),
        ];
        assert_eq!(select_file(&files, "latest").unwrap().file_id, 2);
    }

    #[test]
    fn test_select_unknown_pattern_is_first() {
        let files = vec![file(7, "z.zip", 1), file(8, "main.zip", 500)];
        assert_eq!(select_file(&files, "optional").unwrap().file_id, 7);
        assert_eq!(select_file(&files, "").unwrap().file_id, 7);
    }

    #[test]
    fn test_select_empty_input() {
        for pattern in ["main", "latest", "anything", ""] {
            assert!(select_file(&[], pattern).is_none());
        }
    }

    #[test]
    fn test_download_link_expiry() {
        let link = DownloadLink {
            url: "https://cdn.example.com/a.zip".to_string(),
            expires_at: Utc::now() - chrono::Duration::minutes(1),
        };
        assert!(link.is_expired());
    }
}
