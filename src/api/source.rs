use crate::error::Result;
use async_trait::async_trait;

/// Raw text of the chain table currently on display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Header cell text, structural cells included
    pub header: Vec<String>,
    /// Body rows, one `Vec` of cell text per row
    pub rows: Vec<Vec<String>>,
}

/// Everything the assembler needs from the page showing a chain.
///
/// Implementations own the page-specific selectors; calls are made strictly
/// one after another since the page has a single selected expiration.
#[async_trait]
pub trait ChainSource: Send {
    /// Load the chain view for `symbol` and wait for its root container
    async fn open(&mut self, symbol: &str) -> Result<()>;

    /// Label of every expiration control in page order, `None` when a
    /// control has no readable label
    async fn expiration_labels(&mut self) -> Result<Vec<Option<String>>>;

    /// Activate the control at `index` and wait for the table to refresh
    async fn select_expiration(&mut self, index: usize) -> Result<()>;

    /// Wait for the data table and read its text
    async fn read_table(&mut self) -> Result<RawTable>;
}
