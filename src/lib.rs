//! # chainsurf
//!
//! Scrapes the full option chain of an underlying from a browser-rendered
//! charting page, normalizes it into one CSV table and renders 3D surfaces of
//! chain metrics over strike and time to expiration.
//!
//! ## Features
//!
//! - WebDriver chain source with condition waits instead of fixed sleeps
//! - Expiration label parsing and cell sanitizing into a fixed column schema
//! - CSV persistence through Polars
//! - Dense strike x YTE grids with explicit gaps, rendered with plotters
//! - Environment-based configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use chainsurf::assembler::scrape_chain;
//! use chainsurf::config::Config;
//! use chainsurf::utils::{plot_chain_surface, polars_utils::load_chain_csv, PlottersRenderer};
//!
//! #[tokio::main]
//! async fn main() -> chainsurf::error::Result<()> {
//!     let config = Config::from_env()?;
//!     config.init_logging()?;
//!     config.output.ensure_directories()?;
//!
//!     let csv_path = config.output.chain_path("BTC");
//!     scrape_chain(&config, "BTC", &csv_path).await?;
//!
//!     let chain = load_chain_csv(&csv_path)?;
//!     let renderer = PlottersRenderer::default();
//!     plot_chain_surface(&renderer, "BTC", &chain, "IV", &config.output.image_path("BTC", "IV"))?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod assembler;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use assembler::{scrape_chain, ChainAssembler};
pub use config::Config;
pub use error::{ChainError, Result};
