use std::time::Duration;
use thiserror::Error;

/// Error types for the chainsurf library
#[derive(Error, Debug)]
pub enum ChainError {

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("WebDriver command failed: {0}")]
    WebDriverError(#[from] fantoccini::error::CmdError),

    #[error("WebDriver session could not be created: {0}")]
    SessionError(#[from] fantoccini::error::NewSessionError),

    #[error("Unexpected page structure: {0}")]
    PageError(String),

    #[error("Chain table header is missing column '{0}'")]
    MissingColumn(String),

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("No observed cells for metric '{0}'")]
    EmptyGrid(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Interrupted before the chain was assembled")]
    Interrupted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    PolarsError(#[from] polars::prelude::PolarsError),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ChainError>;
