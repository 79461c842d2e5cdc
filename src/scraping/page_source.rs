use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use url::Url;

use super::browser_manager::{self, RenderOptions};
use crate::core::config::ScoutConfig;

/// Where the results-page HTML comes from.
#[async_trait]
pub trait PageSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Renders the page in headless Chromium. This is the only source that sees
/// client-side rendered listings.
pub struct BrowserSource {
    options: RenderOptions,
}

impl BrowserSource {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn from_config(config: &ScoutConfig) -> Self {
        Self::new(RenderOptions {
            chrome_executable: config.chrome_executable.clone(),
            page_load_timeout: Duration::from_secs(config.page_load_timeout_secs),
            settle: Duration::from_millis(config.settle_ms),
        })
    }
}

#[async_trait]
impl PageSource for BrowserSource {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        browser_manager::render_page(url.as_str(), &self.options).await
    }
}

/// Plain HTTP GET. Only useful when the listings are server-rendered.
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        info!("HTTP fetch: {}", url);
        let resp = self
            .client
            .get(url.clone())
            .header("User-Agent", browser_manager::random_user_agent())
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("{} returned HTTP {}", url, status));
        }
        Ok(resp.text().await?)
    }
}

/// Replays a saved page (e.g. a previous debug dump) instead of going online.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self, _url: &Url) -> Result<String> {
        info!("Reading saved page from {}", self.path.display());
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))
    }
}
