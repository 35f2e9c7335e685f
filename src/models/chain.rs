//! Chain rows, the fixed output schema and header alignment

use crate::error::{ChainError, Result};
use crate::models::expiration::ExpirationDescriptor;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Leading cells of every chain table row that carry layout, not data
pub const STRUCTURAL_COLUMNS: usize = 3;

/// Numeric market columns of the output schema, in output order
pub const MARKET_COLUMNS: [&str; 12] = [
    "Strike", "Bid", "Ask", "Price", "IV", "Delta", "Gamma", "Theta", "Vega", "Rho", "Volume",
    "OI",
];

pub const STRIKE_COLUMN: &str = "Strike";
pub const EXPIRATION_COLUMN: &str = "Expiration";
pub const DTE_COLUMN: &str = "DTE";
pub const YTE_COLUMN: &str = "YTE";

const MARKET_WIDTH: usize = MARKET_COLUMNS.len();

static HEADER_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut aliases = HashMap::new();
    aliases.insert("impliedvolatility", "IV");
    aliases.insert("openinterest", "OI");
    aliases.insert("last", "Price");
    aliases.insert("vol", "Volume");
    aliases
});

/// Full output column order: market columns, then the expiration fields
pub fn output_columns() -> Vec<&'static str> {
    let mut columns = MARKET_COLUMNS.to_vec();
    columns.extend([EXPIRATION_COLUMN, DTE_COLUMN, YTE_COLUMN]);
    columns
}

/// Lowercased alphanumerics of a header cell, e.g. `"IV, %"` -> `"iv"`
pub fn normalize_header(cell: &str) -> String {
    cell.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn schema_column(cell: &str) -> Option<&'static str> {
    let normalized = normalize_header(cell);
    if let Some(column) = HEADER_ALIASES.get(normalized.as_str()) {
        return Some(*column);
    }
    MARKET_COLUMNS
        .iter()
        .copied()
        .find(|column| normalize_header(column) == normalized)
}

/// Position of every schema column inside a page's data header
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderProjection {
    positions: [usize; MARKET_WIDTH],
    width: usize,
}

impl HeaderProjection {
    /// Align a data header (structural cells already removed) to the schema.
    /// When a name repeats, the first occurrence is used.
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Result<Self> {
        let mut found: [Option<usize>; MARKET_WIDTH] = [None; MARKET_WIDTH];
        for (index, cell) in header.iter().enumerate() {
            if let Some(column) = schema_column(cell.as_ref()) {
                if let Some(slot) = MARKET_COLUMNS.iter().position(|c| *c == column) {
                    found[slot].get_or_insert(index);
                }
            }
        }

        let mut positions = [0usize; MARKET_WIDTH];
        for (slot, position) in found.iter().enumerate() {
            positions[slot] = position
                .ok_or_else(|| ChainError::MissingColumn(MARKET_COLUMNS[slot].to_string()))?;
        }

        Ok(Self {
            positions,
            width: header.len(),
        })
    }

    /// Number of data cells a row is expected to carry
    pub fn width(&self) -> usize {
        self.width
    }

    /// Reorder header-aligned values into schema order
    pub fn project(&self, values: &[f64]) -> [f64; MARKET_WIDTH] {
        let mut market = [0.0; MARKET_WIDTH];
        for (slot, &position) in self.positions.iter().enumerate() {
            market[slot] = values.get(position).copied().unwrap_or(0.0);
        }
        market
    }
}

/// One contract row of the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRow {
    /// Values in `MARKET_COLUMNS` order
    pub market: [f64; MARKET_WIDTH],
    pub expiration: ExpirationDescriptor,
}

impl ChainRow {
    pub fn new(market: [f64; MARKET_WIDTH], expiration: ExpirationDescriptor) -> Self {
        Self { market, expiration }
    }

    pub fn strike(&self) -> f64 {
        self.market[0]
    }

    /// Market value by schema column name
    pub fn value(&self, column: &str) -> Option<f64> {
        MARKET_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|slot| self.market[slot])
    }
}

/// All rows of one scrape, in expiration discovery order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainTable {
    pub symbol: String,
    rows: Vec<ChainRow>,
}

impl ChainTable {
    /// Concatenate per-expiration batches, keeping batch order
    pub fn from_batches(symbol: impl Into<String>, batches: Vec<Vec<ChainRow>>) -> Self {
        Self {
            symbol: symbol.into(),
            rows: batches.into_iter().flatten().collect(),
        }
    }

    pub fn rows(&self) -> &[ChainRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn row_serializes_expiration_as_iso_date() {
        let expiration =
            ExpirationDescriptor::new(NaiveDate::from_ymd_opt(2025, 9, 29).unwrap(), 12, 252);
        let json = serde_json::to_value(ChainRow::new([0.0; 12], expiration)).unwrap();
        assert_eq!(json["expiration"]["date"], "2025-09-29");
        assert_eq!(json["expiration"]["days_to_expiration"], 12);
        assert_eq!(json["market"].as_array().map(Vec::len), Some(12));
    }

    #[test]
    fn output_columns_end_with_expiration_fields() {
        let columns = output_columns();
        assert_eq!(columns.len(), MARKET_COLUMNS.len() + 3);
        assert_eq!(columns[0], "Strike");
        assert_eq!(&columns[columns.len() - 3..], &["Expiration", "DTE", "YTE"]);
    }

    #[test]
    fn projection_reorders_page_columns() {
        let page = header(&[
            "Rho", "Vega", "Theta", "Gamma", "Delta", "Price", "Ask", "Bid", "Strike", "IV, %",
            "Volume", "Open interest",
        ]);
        let projection = HeaderProjection::from_header(&page).unwrap();
        assert_eq!(projection.width(), 12);

        let values: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let market = projection.project(&values);
        assert_eq!(market[0], 8.0); // Strike
        assert_eq!(market[1], 7.0); // Bid
        assert_eq!(market[4], 9.0); // IV
        assert_eq!(market[11], 11.0); // OI
    }

    #[test]
    fn projection_requires_every_schema_column() {
        let page = header(&["Strike", "Bid", "Ask"]);
        match HeaderProjection::from_header(&page) {
            Err(ChainError::MissingColumn(column)) => assert_eq!(column, "Price"),
            other => panic!("expected missing column, got {:?}", other),
        }
    }

    #[test]
    fn repeated_header_uses_first_occurrence() {
        let mut page = header(&MARKET_COLUMNS);
        page.push("Bid".to_string());
        let projection = HeaderProjection::from_header(&page).unwrap();
        let mut values = vec![0.0; 13];
        values[1] = 1.5;
        values[12] = 9.9;
        assert_eq!(projection.project(&values)[1], 1.5);
    }

    #[test]
    fn table_keeps_batch_order() {
        let date = |m, d| NaiveDate::from_ymd_opt(2025, m, d).unwrap();
        let near = ExpirationDescriptor::new(date(10, 3), 5, 252);
        let far = ExpirationDescriptor::new(date(12, 26), 89, 252);
        let mut a = [0.0; 12];
        a[0] = 100.0;
        let mut b = [0.0; 12];
        b[0] = 110.0;
        let table = ChainTable::from_batches(
            "BTC",
            vec![vec![ChainRow::new(a, near)], vec![ChainRow::new(b, far)]],
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].strike(), 100.0);
        assert_eq!(table.rows()[1].expiration, far);
        assert_eq!(table.rows()[1].value("Strike"), Some(110.0));
        assert_eq!(table.rows()[1].value("Nope"), None);
    }
}
