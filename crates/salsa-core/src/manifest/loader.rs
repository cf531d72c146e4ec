use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::http::{cancellable, HttpClient, HttpError};
use crate::{Result, SalsaError};

use super::model::{DirectoryConfig, Manifest, ModDefinition, ToolDefinition};

pub const DIRECTORY_DOCUMENT: &str = "directory.json";
pub const MODS_DOCUMENT: &str = "mods.json";
pub const TOOLS_DOCUMENT: &str = "tools.json";

/// Something that can fetch a text document by URL
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_text(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<String, HttpError>;
}

#[async_trait]
impl DocumentSource for HttpClient {
    async fn fetch_text(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> std::result::Result<String, HttpError> {
        cancellable(cancel, self.get_text(url)).await
    }
}

/// Loads the remote manifest
#[async_trait]
pub trait ManifestLoader: Send + Sync {
    /// Fetch and parse `directory.json`, `mods.json` and `tools.json` under `base_url`
    async fn load_manifest(&self, base_url: &str, cancel: &CancellationToken) -> Result<Manifest>;
}

/// Manifest loader reading JSON documents from a base URL
pub struct RemoteManifestLoader<S: DocumentSource = HttpClient> {
    source: Arc<S>,
}

impl<S: DocumentSource> RemoteManifestLoader<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Fetch `<base_url>/<file_name>` and deserialize it
    pub async fn load_document<T: DeserializeOwned>(
        &self,
        base_url: &str,
        file_name: &str,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let url = manifest_url(base_url, file_name);
        log::debug!("Fetching manifest document {}", url);

        let text = self
            .source
            .fetch_text(&url, cancel)
            .await
            .map_err(|e| match e {
                HttpError::Cancelled => SalsaError::Cancelled,
                other => SalsaError::Fetch {
                    url: url.clone(),
                    reason: other.to_string(),
                },
            })?;

        serde_json::from_str(&text).map_err(|e| SalsaError::Parse {
            document: file_name.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl<S: DocumentSource> ManifestLoader for RemoteManifestLoader<S> {
    async fn load_manifest(&self, base_url: &str, cancel: &CancellationToken) -> Result<Manifest> {
        let directory: DirectoryConfig = self
            .load_document(base_url, DIRECTORY_DOCUMENT, cancel)
            .await?;
        let mods: Vec<ModDefinition> = self.load_document(base_url, MODS_DOCUMENT, cancel).await?;
        let tools: Vec<ToolDefinition> = self.load_document(base_url, TOOLS_DOCUMENT, cancel).await?;

        log::debug!("Loaded manifest with {} mods and {} tools", mods.len(), tools.len());

        Ok(Manifest {
            directory,
            mods,
            tools,
        })
    }
}

/// Join a base URL and a document name, dropping one trailing slash from the base
pub fn manifest_url(base_url: &str, file_name: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    format!("{}/{}", base, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::InstallStrategy;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: &str = "https://raw.example.com/salsa/main";

    struct StubSource {
        documents: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn new(documents: &[(&str, &str)]) -> Self {
            Self {
                documents: documents
                    .iter()
                    .map(|(name, body)| (manifest_url(BASE, name), body.to_string()))
                    .collect(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DocumentSource for StubSource {
        async fn fetch_text(
            &self,
            url: &str,
            _cancel: &CancellationToken,
        ) -> std::result::Result<String, HttpError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.documents.get(url).cloned().ok_or(HttpError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
        }
    }

    const DIRECTORY: &str =
        r#"{ "InstallRoot": "I:\\", "GameDirectory": "ELDENRING", "ModsDirectory": "Mods" }"#;

    const MODS: &str = r#"[
        { "Id": "b-mod", "Name": "B", "Description": "second letter",
          "Nexus": { "GameDomain": "eldenring", "ModId": 2, "FilePattern": "latest" },
          "Strategy": "ModEngine2" },
        { "Id": "a-mod", "Name": "A", "Description": "first letter",
          "Nexus": { "GameDomain": "eldenring", "ModId": 1, "FilePattern": "main" },
          "Strategy": "ErrLauncher" }
    ]"#;

    const TOOLS: &str = r#"[
        { "Id": "DepotDownloader", "Name": "DepotDownloader",
          "Url": "https://example.com/dd.zip", "Version": "3.0.0" }
    ]"#;

    #[tokio::test]
    async fn test_load_manifest_preserves_order() {
        let source = Arc::new(StubSource::new(&[
            (DIRECTORY_DOCUMENT, DIRECTORY),
            (MODS_DOCUMENT, MODS),
            (TOOLS_DOCUMENT, TOOLS),
        ]));
        let loader = RemoteManifestLoader::new(source);

        let manifest = loader
            .load_manifest(BASE, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(manifest.directory.game_directory, "ELDENRING");
        assert_eq!(manifest.mods.len(), 2);
        assert_eq!(manifest.mods[0].id, "b-mod");
        assert_eq!(manifest.mods[1].id, "a-mod");
        assert_eq!(manifest.mods[1].strategy, InstallStrategy::ErrLauncher);
        assert_eq!(manifest.tools.len(), 1);
        assert_eq!(manifest.tools[0].version, "3.0.0");
    }

    #[tokio::test]
    async fn test_trailing_slash_is_trimmed() {
        let source = Arc::new(StubSource::new(&[
            (DIRECTORY_DOCUMENT, DIRECTORY),
            (MODS_DOCUMENT, "[]"),
            (TOOLS_DOCUMENT, "[]"),
        ]));
        let loader = RemoteManifestLoader::new(source.clone());

        let manifest = loader
            .load_manifest(&format!("{}/", BASE), &CancellationToken::new())
            .await
            .unwrap();
        assert!(manifest.mods.is_empty());
        assert!(manifest.tools.is_empty());

        let requested = source.requested.lock().unwrap();
        assert_eq!(requested[0], format!("{}/directory.json", BASE));
        assert_eq!(requested[1], format!("{}/mods.json", BASE));
        assert_eq!(requested[2], format!("{}/tools.json", BASE));
    }

    #[tokio::test]
    async fn test_missing_document_is_fetch_error() {
        let source = Arc::new(StubSource::new(&[
            (DIRECTORY_DOCUMENT, DIRECTORY),
            (MODS_DOCUMENT, MODS),
        ]));
        let loader = RemoteManifestLoader::new(source);

        let err = loader
            .load_manifest(BASE, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            SalsaError::Fetch { url, reason } => {
                assert!(url.ends_with("/tools.json"));
                assert!(reason.contains("404"));
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_document_is_parse_error() {
        let source = Arc::new(StubSource::new(&[
            (DIRECTORY_DOCUMENT, DIRECTORY),
            (MODS_DOCUMENT, "{ not json"),
            (TOOLS_DOCUMENT, TOOLS),
        ]));
        let loader = RemoteManifestLoader::new(source);

        let err = loader
            .load_manifest(BASE, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            SalsaError::Parse { document, .. } => assert_eq!(document, "mods.json"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_strategy_is_parse_error() {
        let mods = r#"[{ "Id": "x", "Name": "X",
            "Nexus": { "GameDomain": "eldenring", "ModId": 9, "FilePattern": "main" },
            "Strategy": "Vortex" }]"#;
        let source = Arc::new(StubSource::new(&[(MODS_DOCUMENT, mods)]));
        let loader = RemoteManifestLoader::new(source);

        let result: Result<Vec<ModDefinition>> = loader
            .load_document(BASE, MODS_DOCUMENT, &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(SalsaError::Parse { .. })));
    }

    #[test]
    fn test_manifest_url() {
        assert_eq!(manifest_url("https://a/b", "mods.json"), "https://a/b/mods.json");
        assert_eq!(manifest_url("https://a/b/", "mods.json"), "https://a/b/mods.json");
        assert_eq!(manifest_url("https://a/b//", "mods.json"), "https://a/b//mods.json");
    }
}
