//! WebDriver-backed chain source
//!
//! All page structure knowledge (selectors, the title attribute carrying the
//! expiration label, the table layout) is confined to this module.

use crate::api::source::{ChainSource, RawTable};
use crate::api::wait::wait_until;
use crate::config::{BrowserConfig, ScrapeConfig};
use crate::error::{ChainError, Result};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use tracing::{debug, info, warn};

/// An open WebDriver session.
///
/// Always end with [`BrowserSession::close`]; the session lives in the
/// WebDriver server, not in this process.
pub struct BrowserSession {
    client: Client,
}

impl BrowserSession {
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        let client = ClientBuilder::native()
            .capabilities(config.capabilities())
            .connect(&config.webdriver_url)
            .await?;
        info!("Opened WebDriver session at {}", config.webdriver_url);
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Release the session. Failures are logged, never raised, so the
    /// caller's own outcome is what gets reported.
    pub async fn close(self) {
        match self.client.close().await {
            Ok(()) => info!("Closed WebDriver session"),
            Err(e) => warn!("Failed to close WebDriver session: {}", e),
        }
    }
}

/// Chain source driving a live page through WebDriver
pub struct WebDriverSource {
    client: Client,
    config: ScrapeConfig,
}

impl WebDriverSource {
    pub fn new(session: &BrowserSession, config: ScrapeConfig) -> Self {
        Self {
            client: session.client().clone(),
            config,
        }
    }

    async fn first(&self, selector: &str) -> Result<Option<Element>> {
        let found = self.client.find_all(Locator::Css(selector)).await?;
        Ok(found.into_iter().next())
    }

    async fn container(&self) -> Result<Element> {
        let selector = &self.config.selectors.container;
        self.first(selector)
            .await?
            .ok_or_else(|| ChainError::PageError(format!("root container '{}' is gone", selector)))
    }

    async fn controls(&self) -> Result<Vec<Element>> {
        let container = self.container().await?;
        let controls = container
            .find_all(Locator::Css(&self.config.selectors.expiration_control))
            .await?;
        Ok(controls)
    }

    /// Text of the table currently shown, used to notice a refresh
    async fn fingerprint(&self) -> Result<Option<String>> {
        match self.first(&self.config.selectors.table).await? {
            Some(table) => Ok(Some(table.text().await?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ChainSource for WebDriverSource {
    async fn open(&mut self, symbol: &str) -> Result<()> {
        let url = self.config.chain_url(symbol)?;
        self.client.goto(url.as_str()).await?;
        info!("Fetched option chain from {}", url);

        let selector = self.config.selectors.container.as_str();
        let source = &*self;
        wait_until(
            &format!("root container '{}'", selector),
            self.config.container_timeout,
            self.config.poll_interval,
            || async move { source.first(selector).await },
        )
        .await?;
        info!("Found root container");
        Ok(())
    }

    async fn expiration_labels(&mut self) -> Result<Vec<Option<String>>> {
        let controls = self.controls().await?;
        info!("Found {} expiration controls", controls.len());

        let mut labels = Vec::with_capacity(controls.len());
        for control in &controls {
            let title = control.attr("title").await?;
            labels.push(title.filter(|t| !t.trim().is_empty()));
        }
        Ok(labels)
    }

    async fn select_expiration(&mut self, index: usize) -> Result<()> {
        let controls = self.controls().await?;
        let control = controls.get(index).ok_or_else(|| {
            ChainError::PageError(format!(
                "expiration control {} disappeared ({} present)",
                index,
                controls.len()
            ))
        })?;

        let before = self.fingerprint().await?;
        control.click().await?;

        let source = &*self;
        let refreshed = wait_until(
            "table refresh",
            self.config.settle_timeout,
            self.config.poll_interval,
            || {
                let before = before.clone();
                async move {
                    let now = source.fingerprint().await?;
                    Ok::<_, ChainError>(match now {
                        Some(text) if Some(&text) != before.as_ref() => Some(()),
                        _ => None,
                    })
                }
            },
        )
        .await;

        match refreshed {
            Ok(()) => debug!("Table refreshed after selecting expiration {}", index),
            Err(ChainError::Timeout { .. }) => debug!(
                "No visible table change within {:?} after selecting expiration {}",
                self.config.settle_timeout, index
            ),
            Err(e) => return Err(e),
        }
        Ok(())
    }

    async fn read_table(&mut self) -> Result<RawTable> {
        let selectors = &self.config.selectors;
        let source = &*self;
        let table = wait_until(
            &format!("data table '{}'", selectors.table),
            self.config.table_timeout,
            self.config.poll_interval,
            || async move { source.first(&selectors.table).await },
        )
        .await?;

        let mut header = Vec::new();
        for cell in table.find_all(Locator::Css(&selectors.header_cell)).await? {
            header.push(cell.text().await?);
        }

        let mut rows = Vec::new();
        for row in table.find_all(Locator::Css(&selectors.body_row)).await? {
            let mut cells = Vec::new();
            for cell in row.find_all(Locator::Css(&selectors.body_cell)).await? {
                cells.push(cell.text().await?);
            }
            rows.push(cells);
        }

        debug!("Read table with {} header cells and {} rows", header.len(), rows.len());
        Ok(RawTable { header, rows })
    }
}
