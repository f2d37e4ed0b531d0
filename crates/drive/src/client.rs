//! Drive API client — folder listing and text extraction.
//!
//! Authentication is a pre-issued OAuth bearer token from configuration.
//! Plain-text files are downloaded raw; workspace documents (docs, sheets,
//! slides) and PDFs are exported as `text/plain`. Formats the API cannot
//! export are skipped, not failed.

use async_trait::async_trait;
use homie_core::error::DriveError;
use serde::Deserialize;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// A file entry in a Drive folder.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(default)]
    pub modified_time: Option<String>,
}

impl DriveFile {
    /// Whether the file needs an export call rather than a raw download.
    pub fn needs_export(&self) -> bool {
        self.mime_type.contains("google-apps") || self.mime_type == "application/pdf"
    }
}

/// The seam to the external Drive API.
#[async_trait]
pub trait DriveClient: Send + Sync {
    /// List the non-trashed files in a folder, newest first.
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<DriveFile>, DriveError>;

    /// Fetch a file's text content.
    ///
    /// Returns `Ok(None)` when the format has no text rendition; that is a
    /// skip, not a failure.
    async fn fetch_text(&self, file: &DriveFile) -> Result<Option<String>, DriveError>;
}

/// Bearer-token Drive client over reqwest.
pub struct HttpDriveClient {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl HttpDriveClient {
    pub fn new(access_token: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: DEFAULT_BASE_URL.into(),
            access_token: access_token.into(),
            client,
        }
    }

    /// Use a custom API base URL (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Classify a failed best-effort export: a 4xx refusal means the format
    /// has no text rendition and the file is skipped; server-side failures
    /// stay errors so the sync report shows them.
    fn triage_export_error(
        file: &DriveFile,
        err: DriveError,
    ) -> Result<Option<String>, DriveError> {
        match err {
            DriveError::ApiError { status_code, .. } if status_code < 500 => {
                debug!(file = %file.name, mime = %file.mime_type, "No text rendition, skipping");
                Ok(None)
            }
            other => Err(other),
        }
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, DriveError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DriveError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            return Err(DriveError::ApiError {
                status_code: status,
                message,
            });
        }

        response
            .text()
            .await
            .map_err(|e| DriveError::Network(e.to_string()))
    }
}

#[async_trait]
impl DriveClient for HttpDriveClient {
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<DriveFile>, DriveError> {
        let url = format!("{}/files", self.base_url);
        let query = format!("'{folder_id}' in parents and trashed=false");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name,mimeType,modifiedTime)"),
                ("orderBy", "modifiedTime desc"),
            ])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DriveError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            warn!(status, "Drive folder listing failed");
            return Err(DriveError::ApiError {
                status_code: status,
                message,
            });
        }

        let listing: FileListing = response
            .json()
            .await
            .map_err(|e| DriveError::Network(e.to_string()))?;

        debug!(folder_id, count = listing.files.len(), "Listed Drive folder");
        Ok(listing.files)
    }

    async fn fetch_text(&self, file: &DriveFile) -> Result<Option<String>, DriveError> {
        if file.mime_type == "text/plain" {
            let url = format!("{}/files/{}", self.base_url, file.id);
            return self.get_text(&url, &[("alt", "media")]).await.map(Some);
        }

        if file.needs_export() {
            let url = format!("{}/files/{}/export", self.base_url, file.id);
            return self.get_text(&url, &[("mimeType", "text/plain")]).await.map(Some);
        }

        // Best effort for everything else: try the export endpoint and let
        // the triage decide between "no text rendition" and a real fault.
        let url = format!("{}/files/{}/export", self.base_url, file.id);
        match self.get_text(&url, &[("mimeType", "text/plain")]).await {
            Ok(text) => Ok(Some(text)),
            Err(e) => Self::triage_export_error(file, e),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FileListing {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_documents_need_export() {
        let doc = DriveFile {
            id: "1".into(),
            name: "Policies".into(),
            mime_type: "application/vnd.google-apps.document".into(),
            modified_time: None,
        };
        assert!(doc.needs_export());

        let pdf = DriveFile {
            id: "2".into(),
            name: "costs.pdf".into(),
            mime_type: "application/pdf".into(),
            modified_time: None,
        };
        assert!(pdf.needs_export());

        let txt = DriveFile {
            id: "3".into(),
            name: "notes.txt".into(),
            mime_type: "text/plain".into(),
            modified_time: None,
        };
        assert!(!txt.needs_export());
    }

    fn opaque_file() -> DriveFile {
        DriveFile {
            id: "4".into(),
            name: "photo.png".into(),
            mime_type: "image/png".into(),
            modified_time: None,
        }
    }

    #[test]
    fn export_refusal_skips_the_file() {
        let refusal = DriveError::ApiError {
            status_code: 400,
            message: "Export only supports Docs Editors files".into(),
        };
        assert!(matches!(
            HttpDriveClient::triage_export_error(&opaque_file(), refusal),
            Ok(None)
        ));
    }

    #[test]
    fn export_server_failure_stays_an_error() {
        let fault = DriveError::ApiError {
            status_code: 503,
            message: "Backend unavailable".into(),
        };
        assert!(HttpDriveClient::triage_export_error(&opaque_file(), fault).is_err());

        let network = DriveError::Network("connection reset".into());
        assert!(HttpDriveClient::triage_export_error(&opaque_file(), network).is_err());
    }

    #[test]
    fn listing_deserializes_camel_case() {
        let data = r#"{"files":[{"id":"abc","name":"Buybox Policy","mimeType":"text/plain","modifiedTime":"2024-01-01T00:00:00Z"}]}"#;
        let listing: FileListing = serde_json::from_str(data).unwrap();
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].mime_type, "text/plain");
        assert!(listing.files[0].modified_time.is_some());
    }

    #[test]
    fn empty_listing_tolerated() {
        let listing: FileListing = serde_json::from_str("{}").unwrap();
        assert!(listing.files.is_empty());
    }
}
