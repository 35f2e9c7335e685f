//! Browser access to the chain page
//!
//! This module holds the capability interface the assembler depends on, the
//! WebDriver implementation of it and the condition wait both use.

pub mod browser;
pub mod source;
pub mod wait;

pub use browser::{BrowserSession, WebDriverSource};
pub use source::{ChainSource, RawTable};
