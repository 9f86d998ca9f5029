use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use thirtyfour::prelude::*;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

/// Status line and content type of a page, as learned from the header
/// probe. HTTP error statuses are values here, not errors; only
/// transport failures surface as `Err`.
#[derive(Debug, Clone)]
pub struct HeadProbe {
    pub status_code: u16,
    pub status_text: String,
    pub content_type: Option<String>,
}

/// How pages are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchBackend {
    /// Plain HTTP client. Fast, no JavaScript.
    Http,
    /// A WebDriver-controlled browser at the given endpoint. Pages are
    /// rendered before their source is read.
    WebDriver { endpoint: String },
}

/// Construction-time configuration for a fetch adapter.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub backend: FetchBackend,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            backend: FetchBackend::Http,
            timeout_secs: 10,
            user_agent: "Gridmap/0.1 (https://github.com/trapdoorsec/gridmap)".to_string(),
        }
    }
}

/// The seam between the traversal and the network. The scheduler only
/// ever probes headers and downloads bodies; which backend does the
/// work is fixed at construction.
#[async_trait]
pub trait FetchAdapter: Send + Sync {
    async fn fetch_headers(&self, url: &Url) -> Result<HeadProbe>;

    async fn fetch_page(&self, url: &Url) -> Result<String>;

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

pub fn build_adapter(config: &FetchConfig) -> Result<Arc<dyn FetchAdapter>> {
    match &config.backend {
        FetchBackend::Http => Ok(Arc::new(HttpFetcher::new(config)?)),
        FetchBackend::WebDriver { endpoint } => {
            Ok(Arc::new(WebDriverFetcher::new(endpoint.clone(), config)?))
        }
    }
}

fn build_client(config: &FetchConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs((config.timeout_secs / 2).max(1)))
        .pool_max_idle_per_host(50)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}

async fn probe_with_client(client: &Client, url: &Url) -> Result<HeadProbe> {
    let response = client.head(url.as_str()).send().await?;
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    Ok(HeadProbe {
        status_code: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("").to_string(),
        content_type,
    })
}

/// Fetch pages over plain HTTP with a pooled client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

#[async_trait]
impl FetchAdapter for HttpFetcher {
    async fn fetch_headers(&self, url: &Url) -> Result<HeadProbe> {
        debug!("Probing {}", url);
        probe_with_client(&self.client, url).await
    }

    async fn fetch_page(&self, url: &Url) -> Result<String> {
        debug!("Fetching {}", url);
        let response = self.client.get(url.as_str()).send().await?;
        Ok(response.text().await?)
    }
}

/// Fetch pages through a WebDriver-controlled headless browser.
///
/// The browser renders each page before its source is read, so
/// script-generated links and metadata are visible. Header probes
/// still go through a paired HTTP client: a WebDriver session exposes
/// no status line. The session is opened on first use and quit on
/// close.
pub struct WebDriverFetcher {
    endpoint: String,
    client: Client,
    timeout_secs: u64,
    driver: Mutex<Option<WebDriver>>,
}

impl WebDriverFetcher {
    pub fn new(endpoint: String, config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            endpoint,
            client: build_client(config)?,
            timeout_secs: config.timeout_secs,
            driver: Mutex::new(None),
        })
    }

    async fn session(&self) -> Result<WebDriver> {
        let mut guard = self.driver.lock().await;
        if let Some(driver) = guard.as_ref() {
            return Ok(driver.clone());
        }

        let mut caps = DesiredCapabilities::chrome();
        caps.set_headless()?;
        caps.add_chrome_arg("--disable-gpu")?;
        caps.add_chrome_arg("--disable-dev-shm-usage")?;

        let driver = WebDriver::new(&self.endpoint, caps).await?;
        driver
            .set_page_load_timeout(Duration::from_secs(self.timeout_secs))
            .await?;
        debug!("WebDriver session opened at {}", self.endpoint);

        *guard = Some(driver.clone());
        Ok(driver)
    }
}

#[async_trait]
impl FetchAdapter for WebDriverFetcher {
    async fn fetch_headers(&self, url: &Url) -> Result<HeadProbe> {
        debug!("Probing {}", url);
        probe_with_client(&self.client, url).await
    }

    async fn fetch_page(&self, url: &Url) -> Result<String> {
        let driver = self.session().await?;
        debug!("Navigating to {}", url);
        driver.goto(url.as_str()).await?;
        Ok(driver.source().await?)
    }

    async fn close(&self) -> Result<()> {
        let driver = self.driver.lock().await.take();
        if let Some(driver) = driver
            && let Err(e) = driver.quit().await
        {
            warn!("Error closing WebDriver session: {}", e);
        }
        Ok(())
    }
}
