//! Small helper for downloading a linked PDF to a temp path and splicing
//! the original's `[PDF_DOWNLOADED: <path>]` / `[PDF_DOWNLOAD_FAILED]`
//! markers into filing text. This exact marker format is an external
//! observable contract other components may grep for — preserved
//! verbatim from `original_source`.

use std::path::PathBuf;

pub struct PdfFetcher {
    client: reqwest::Client,
}

impl PdfFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Download `url` into a fresh temp file and return its path, or
    /// `None` if anything goes wrong — failures here are never fatal to
    /// the adapter call, matching the original's try/except.
    pub async fn download(&self, url: &str) -> Option<PathBuf> {
        let response = self.client.get(url).send().await.ok()?;
        let bytes = response.bytes().await.ok()?;

        let dir = std::env::temp_dir().join("filingwatch-pdfs");
        tokio::fs::create_dir_all(&dir).await.ok()?;

        let file_name = url
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("filing.pdf");
        let path = dir.join(file_name);

        tokio::fs::write(&path, &bytes).await.ok()?;
        Some(path)
    }

    /// Render the marker text to append to a filing's body.
    pub fn marker(path: Option<&PathBuf>) -> String {
        match path {
            Some(p) => format!("[PDF_DOWNLOADED: {}]", p.display()),
            None => "[PDF_DOWNLOAD_FAILED]".to_string(),
        }
    }
}
