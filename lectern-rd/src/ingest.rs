//! Document ingestion and one-shot text extraction
//!
//! A document is fetched from a client-supplied URL (possibly wrapped in a
//! Google-Docs-viewer style link), persisted under the root folder, and
//! later consumed exactly once by text extraction, which deletes the stored
//! file after reading it.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use url::Url;

const DOCUMENTS_DIR: &str = "documents";
const DOCUMENT_FILE: &str = "current.txt";

/// Pull the direct document URL out of a viewer-style link.
///
/// Viewer links carry the real document location percent-encoded in a `url`
/// query parameter. Returns `None` if the link has no such parameter.
pub fn extract_viewer_url(viewer_url: &str) -> Option<String> {
    let parsed = Url::parse(viewer_url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
}

/// Stores the current document under the root folder
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path where the current document is kept
    pub fn document_path(&self) -> PathBuf {
        self.root.join(DOCUMENTS_DIR).join(DOCUMENT_FILE)
    }

    /// Write document contents to the store, replacing any previous document
    pub fn store(&self, contents: &[u8]) -> Result<PathBuf> {
        let dir = self.root.join(DOCUMENTS_DIR);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(DOCUMENT_FILE);
        std::fs::write(&path, contents)?;
        info!(path = %path.display(), bytes = contents.len(), "Document stored");
        Ok(path)
    }

    /// Download a document and persist it to the store
    pub async fn fetch(&self, client: &reqwest::Client, document_url: &str) -> Result<PathBuf> {
        // Unwrap viewer links; direct URLs pass through unchanged
        let direct_url =
            extract_viewer_url(document_url).unwrap_or_else(|| document_url.to_string());

        let response = client
            .get(&direct_url)
            .send()
            .await
            .map_err(|e| Error::Ingest(format!("failed to fetch document: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Ingest(format!(
                "failed to fetch document: status {}",
                status.as_u16()
            )));
        }

        let contents = response
            .bytes()
            .await
            .map_err(|e| Error::Ingest(format!("failed to read document body: {}", e)))?;

        self.store(&contents)
    }

    /// One-shot text extraction: read the stored document and delete it.
    ///
    /// Any failure is recovered locally as an empty string, which the
    /// playback engine reports as an immediately-stopped session.
    pub fn extract_text(&self) -> String {
        let path = self.document_path();
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                remove_consumed(&path);
                text
            }
            Err(e) => {
                error!(path = %path.display(), "Error extracting document text: {}", e);
                String::new()
            }
        }
    }
}

fn remove_consumed(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!(path = %path.display(), "Failed to delete consumed document: {}", e);
    }
}
