//! Nexus Mods API client.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::{HttpSettings, NexusSettings};
use crate::http::{cancellable, HttpClient, HttpClientConfig, HttpError};
use crate::{Result, SalsaError};

use super::model::{DownloadLink, ModFile};

/// How long a resolved CDN link is assumed to stay valid
const LINK_LIFETIME_HOURS: i64 = 1;

/// A mod hosting service
#[async_trait]
pub trait ModHost: Send + Sync {
    /// List the files of a mod in the order the host returns them
    async fn list_files(
        &self,
        game_domain: &str,
        mod_id: u64,
        cancel: &CancellationToken,
    ) -> Result<Vec<ModFile>>;

    /// Resolve download links for one file
    ///
    /// An empty list means there is nothing to download; it is not an error.
    async fn resolve_download_links(
        &self,
        game_domain: &str,
        mod_id: u64,
        file_id: u64,
        cancel: &CancellationToken,
    ) -> Result<Vec<DownloadLink>>;
}

#[derive(Debug, Deserialize)]
struct FilesResponse {
    files: Vec<ApiModFile>,
}

#[derive(Debug, Deserialize)]
struct ApiModFile {
    file_id: u64,
    file_name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    size_in_bytes: Option<u64>,
    #[serde(with = "chrono::serde::ts_seconds")]
    uploaded_timestamp: DateTime<Utc>,
}

impl From<ApiModFile> for ModFile {
    fn from(file: ApiModFile) -> Self {
        ModFile {
            file_id: file.file_id,
            file_name: file.file_name,
            version: file
                .version
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            size_bytes: file.size_in_bytes.unwrap_or(0),
            uploaded_at: file.uploaded_timestamp,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiDownloadLink {
    #[serde(rename = "URI")]
    uri: String,
}

/// Client for the Nexus Mods v1 REST API
pub struct NexusClient {
    http_client: HttpClient,
    api_url: String,
    masked_key: Option<String>,
}

impl NexusClient {
    /// Create a client from settings
    ///
    /// An empty API key is accepted here; every request will then fail with
    /// [`SalsaError::HostApi`] without touching the network.
    pub fn new(settings: &NexusSettings, http: &HttpSettings) -> Result<Self> {
        let mut config = HttpClientConfig::from(http)
            .with_header("Application-Name", &settings.application_name)
            .with_header("Application-Version", &settings.application_version);

        let masked_key = if settings.has_api_key() {
            config = config.with_sensitive_header("apikey", settings.api_key.trim());
            Some(mask_api_key(settings.api_key.trim()))
        } else {
            None
        };

        let http_client = HttpClient::with_config(config).map_err(|e| match e {
            HttpError::InvalidHeader(name) if name == "apikey" => {
                SalsaError::HostApi("API key contains invalid characters".to_string())
            }
            other => SalsaError::Config(other.to_string()),
        })?;

        Ok(Self {
            http_client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            masked_key,
        })
    }

    pub fn files_url(&self, game_domain: &str, mod_id: u64) -> String {
        format!("{}/games/{}/mods/{}/files.json", self.api_url, game_domain, mod_id)
    }

    pub fn download_link_url(&self, game_domain: &str, mod_id: u64, file_id: u64) -> String {
        format!(
            "{}/games/{}/mods/{}/files/{}/download_link.json",
            self.api_url, game_domain, mod_id, file_id
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let Some(masked_key) = &self.masked_key else {
            return Err(SalsaError::HostApi("No Nexus API key configured".to_string()));
        };

        let text = cancellable(cancel, self.http_client.get_text(url))
            .await
            .map_err(|e| host_error(e, url, masked_key))?;

        serde_json::from_str(&text).map_err(|e| {
            SalsaError::HostApi(format!("Unexpected response from {}: {}", url, e))
        })
    }
}

#[async_trait]
impl ModHost for NexusClient {
    async fn list_files(
        &self,
        game_domain: &str,
        mod_id: u64,
        cancel: &CancellationToken,
    ) -> Result<Vec<ModFile>> {
        log::info!("Fetching files for mod {} in game {}", mod_id, game_domain);

        let url = self.files_url(game_domain, mod_id);
        let response: FilesResponse = self.get_json(&url, cancel).await?;

        Ok(response.files.into_iter().map(ModFile::from).collect())
    }

    async fn resolve_download_links(
        &self,
        game_domain: &str,
        mod_id: u64,
        file_id: u64,
        cancel: &CancellationToken,
    ) -> Result<Vec<DownloadLink>> {
        log::info!("Generating download links for file {}", file_id);

        let url = self.download_link_url(game_domain, mod_id, file_id);
        let links: Vec<ApiDownloadLink> = self.get_json(&url, cancel).await?;

        let expires_at = Utc::now() + Duration::hours(LINK_LIFETIME_HOURS);
        Ok(links
            .into_iter()
            .map(|link| DownloadLink {
                url: link.uri,
                expires_at,
            })
            .collect())
    }
}

fn host_error(err: HttpError, url: &str, masked_key: &str) -> SalsaError {
    match err {
        HttpError::Cancelled => SalsaError::Cancelled,
        ref e if matches!(e.status(), Some(401) | Some(403)) => SalsaError::HostApi(format!(
            "API key {} was rejected (HTTP {})",
            masked_key,
            e.status().unwrap_or_default()
        )),
        other => SalsaError::HostApi(format!("Request to {} failed: {}", url, other)),
    }
}

/// Mask an API key for display: `abcd...wxyz`, or `****` for short keys
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: &str) -> NexusSettings {
        NexusSettings {
            api_key: api_key.to_string(),
            ..NexusSettings::default()
        }
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key(""), "****");
        assert_eq!(mask_api_key("abcdefgh"), "****");
        assert_eq!(mask_api_key("abcdefghi"), "abcd...fghi");
        assert_eq!(
            mask_api_key("0123456789abcdefghijklmnopqrstuvwxyz"),
            "0123...wxyz"
        );
    }

    #[test]
    fn test_urls() {
        let client =
            NexusClient::new(&settings("secret-key-123"), &HttpSettings::default()).unwrap();
        assert_eq!(
            client.files_url("eldenring", 541),
            "https://api.nexusmods.com/v1/games/eldenring/mods/541/files.json"
        );
        assert_eq!(
            client.download_link_url("eldenring", 541, 9001),
            "https://api.nexusmods.com/v1/games/eldenring/mods/541/files/9001/download_link.json"
        );
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_request() {
        let client = NexusClient::new(&settings("  "), &HttpSettings::default()).unwrap();
        let err = client
            .list_files("eldenring", 541, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            SalsaError::HostApi(msg) => assert!(msg.contains("No Nexus API key")),
            other => panic!("expected host API error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_api_key_characters() {
        let result = NexusClient::new(&settings("bad\nkey-value"), &HttpSettings::default());
        assert!(matches!(result, Err(SalsaError::HostApi(_))));
    }

    #[test]
    fn test_rejected_key_is_masked() {
        let err = host_error(
            HttpError::HttpStatus {
                status: 401,
                url: "https://api.nexusmods.com/v1/x".to_string(),
            },
            "https://api.nexusmods.com/v1/x",
            &mask_api_key("supersecretapikey"),
        );

        let msg = err.to_string();
        assert!(msg.contains("supe...ikey"));
        assert!(msg.contains("401"));
        assert!(!msg.contains("supersecretapikey"));
    }

    #[test]
    fn test_other_failures_are_host_errors() {
        let err = host_error(
            HttpError::HttpStatus {
                status: 500,
                url: "u".to_string(),
            },
            "u",
            "****",
        );
        assert!(matches!(err, SalsaError::HostApi(_)));
        assert!(host_error(HttpError::Cancelled, "u", "****").is_cancelled());
    }

    #[test]
    fn test_parse_files_response() {
        let json = r#"{
            "files": [
                { "file_id": 10, "name": "Main", "file_name": "ERR-Main.zip",
                  "version": "2.1.0", "size_in_bytes": 4096, "uploaded_timestamp": 1700000000 },
                { "file_id": 11, "name": "Old", "file_name": "ERR-old.7z",
                  "version": null, "size_in_bytes": null, "uploaded_timestamp": 1600000000 }
            ],
            "file_updates": []
        }"#;

        let response: FilesResponse = serde_json::from_str(json).unwrap();
        let files: Vec<ModFile> = response.files.into_iter().map(ModFile::from).collect();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_id, 10);
        assert_eq!(files[0].version, "2.1.0");
        assert_eq!(files[0].size_bytes, 4096);
        assert_eq!(files[0].uploaded_at.timestamp(), 1700000000);
        assert_eq!(files[1].version, "unknown");
        assert_eq!(files[1].size_bytes, 0);
    }

    #[test]
    fn test_parse_download_links() {
        let json = r#"[
            { "name": "Nexus Global Content Delivery Network", "short_name": "Nexus CDN",
              "URI": "https://cf-files.nexusmods.com/a.zip?md5=x&expires=1" }
        ]"#;

        let links: Vec<ApiDownloadLink> = serde_json::from_str(json).unwrap();
        assert_eq!(links.len(), 1);
        assert!(links[0].uri.starts_with("https://cf-files.nexusmods.com/"));
    }
}
