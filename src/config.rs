use crate::error::{ChainError, Result};
use dotenv::dotenv;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Trading days used to turn a day count into a year fraction
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Configuration for the WebDriver session
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// WebDriver endpoint (chromedriver, geckodriver, selenium)
    pub webdriver_url: String,
    /// Run the browser without a window
    pub headless: bool,
    /// Extra command line arguments handed to the browser
    pub args: Vec<String>,
}

impl BrowserConfig {
    /// WebDriver capabilities for a Chrome session built from this config
    pub fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut args = self.args.clone();
        if self.headless && !args.iter().any(|a| a.starts_with("--headless")) {
            args.insert(0, "--headless".to_string());
        }

        let mut caps = serde_json::Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({ "args": args }),
        );
        caps
    }
}

/// CSS selectors describing the upstream chain page
#[derive(Debug, Clone, Deserialize)]
pub struct Selectors {
    pub container: String,
    pub expiration_control: String,
    pub table: String,
    pub header_cell: String,
    pub body_row: String,
    pub body_cell: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            container: "div.root-jBbUvk85".to_string(),
            expiration_control: "button.item-XO65o9RZ".to_string(),
            table: "div.root-jBbUvk85 table".to_string(),
            header_cell: "thead th".to_string(),
            body_row: "tbody tr".to_string(),
            body_cell: "td".to_string(),
        }
    }
}

/// Configuration for chain extraction
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    /// Text placed before the symbol in the chain URL
    pub url_prefix: String,
    /// Text placed after the symbol in the chain URL
    pub url_suffix: String,
    pub selectors: Selectors,
    /// Bound on the wait for the root container
    pub container_timeout: Duration,
    /// Bound on the wait for the data table after selecting an expiration
    pub table_timeout: Duration,
    /// Bound on the wait for the table to refresh after a selection
    pub settle_timeout: Duration,
    /// Delay between two probes of a condition wait
    pub poll_interval: Duration,
    pub trading_days_per_year: u32,
}

impl ScrapeConfig {
    /// Chain URL for an underlying
    pub fn chain_url(&self, symbol: &str) -> Result<url::Url> {
        let url = url::Url::parse(&format!("{}{}{}", self.url_prefix, symbol, self.url_suffix))?;
        Ok(url)
    }
}

/// Output locations and plot modes
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub data_dir: PathBuf,
    pub img_dir: PathBuf,
    /// Metric columns rendered as surfaces, one image each
    pub modes: Vec<String>,
}

impl OutputConfig {
    /// `data/<SYMBOL>chain.csv`
    pub fn chain_path(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}chain.csv", symbol))
    }

    /// `img/<SYMBOL><mode>.png`
    pub fn image_path(&self, symbol: &str, mode: &str) -> PathBuf {
        self.img_dir.join(format!("{}{}.png", symbol, mode))
    }

    /// Create the output directories if they are missing
    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [&self.data_dir, &self.img_dir] {
            if !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        Ok(())
    }
}

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub browser: BrowserConfig,
    pub scrape: ScrapeConfig,
    pub output: OutputConfig,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Selectors::default();
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let browser = BrowserConfig {
            webdriver_url: text("WEBDRIVER_URL", "http://localhost:4444"),
            headless: lookup("BROWSER_HEADLESS")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
            args: vec!["--disable-gpu".to_string(), "--no-sandbox".to_string()],
        };

        let selectors = Selectors {
            container: text("SELECTOR_CONTAINER", &defaults.container),
            expiration_control: text("SELECTOR_EXPIRATION", &defaults.expiration_control),
            table: text("SELECTOR_TABLE", &defaults.table),
            header_cell: text("SELECTOR_HEADER_CELL", &defaults.header_cell),
            body_row: text("SELECTOR_BODY_ROW", &defaults.body_row),
            body_cell: text("SELECTOR_BODY_CELL", &defaults.body_cell),
        };

        let millis = |key: &str, default: u64| -> Result<Duration> {
            Ok(Duration::from_millis(parse_or(&lookup, key, default)?))
        };
        let scrape = ScrapeConfig {
            url_prefix: text(
                "CHAIN_URL_PREFIX",
                "https://www.tradingview.com/options/?symbol=DERIBIT%3A",
            ),
            url_suffix: text("CHAIN_URL_SUFFIX", "USD"),
            selectors,
            container_timeout: millis("CONTAINER_TIMEOUT_MS", 10_000)?,
            table_timeout: millis("TABLE_TIMEOUT_MS", 10_000)?,
            settle_timeout: millis("SETTLE_TIMEOUT_MS", 3_000)?,
            poll_interval: millis("POLL_INTERVAL_MS", 250)?,
            trading_days_per_year: parse_or(&lookup, "TRADING_DAYS", TRADING_DAYS_PER_YEAR)?,
        };
        if scrape.trading_days_per_year == 0 {
            return Err(ChainError::ConfigError(
                "TRADING_DAYS must be greater than zero".to_string(),
            ));
        }

        let modes = text("PLOT_MODES", "IV,Delta,Gamma,Theta,Vega,Price")
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();

        let output = OutputConfig {
            data_dir: PathBuf::from(text("DATA_DIR", "data")),
            img_dir: PathBuf::from(text("IMG_DIR", "img")),
            modes,
        };

        Ok(Config {
            browser,
            scrape,
            output,
            log_level: text("LOG_LEVEL", "info"),
        })
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        fmt().with_env_filter(filter).with_target(true).init();

        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            ChainError::ConfigError(format!("{} is not a valid number: {}", key, raw))
        }),
        None => Ok(default),
    }
}
