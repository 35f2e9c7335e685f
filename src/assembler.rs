//! Chain assembly: every expiration of one underlying merged into one table

use crate::api::browser::{BrowserSession, WebDriverSource};
use crate::api::source::{ChainSource, RawTable};
use crate::config::Config;
use crate::error::{ChainError, Result};
use crate::models::chain::{ChainRow, ChainTable, HeaderProjection, STRUCTURAL_COLUMNS};
use crate::models::expiration::ExpirationDescriptor;
use crate::utils::polars_utils::write_chain_csv;
use crate::utils::sanitize::sanitize_row;
use std::path::Path;
use tracing::{debug, info, warn};

/// Walks the expirations offered by a [`ChainSource`] one at a time
pub struct ChainAssembler<S> {
    source: S,
    trading_days_per_year: u32,
}

impl<S: ChainSource> ChainAssembler<S> {
    pub fn new(source: S, trading_days_per_year: u32) -> Self {
        Self {
            source,
            trading_days_per_year,
        }
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Collect the full chain for `symbol`.
    ///
    /// Unlabelled controls and labels that do not parse are skipped. Missing
    /// container or table, a header without the schema columns, and any
    /// cell read failure abort the whole run.
    pub async fn assemble(&mut self, symbol: &str) -> Result<ChainTable> {
        self.source.open(symbol).await?;

        let labels = self.source.expiration_labels().await?;
        let mut batches = Vec::with_capacity(labels.len());

        for (index, label) in labels.iter().enumerate() {
            let Some(label) = label else {
                warn!("Expiration control {} has no label, skipping", index);
                continue;
            };

            let descriptor = match ExpirationDescriptor::parse(label, self.trading_days_per_year) {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    warn!("Skipping expiration control {} ('{}'): {}", index, label, e);
                    continue;
                }
            };
            info!("Expiration {}", descriptor);

            self.source.select_expiration(index).await?;
            let table = self.source.read_table().await?;
            let batch = rows_for_expiration(&table, &descriptor)?;
            info!("{}: {} rows", descriptor.iso_date(), batch.len());
            batches.push(batch);
        }

        let table = ChainTable::from_batches(symbol, batches);
        info!(
            "Assembled {} rows for {} across {} expiration controls",
            table.len(),
            symbol,
            labels.len()
        );
        Ok(table)
    }
}

/// Sanitize every body row of one expiration's table and tag it with the
/// expiration fields
pub fn rows_for_expiration(
    table: &RawTable,
    descriptor: &ExpirationDescriptor,
) -> Result<Vec<ChainRow>> {
    let data_header: &[String] = table.header.get(STRUCTURAL_COLUMNS..).unwrap_or(&[]);
    let projection = HeaderProjection::from_header(data_header)?;

    let mut rows = Vec::with_capacity(table.rows.len());
    for (index, raw) in table.rows.iter().enumerate() {
        let cells: &[String] = raw.get(STRUCTURAL_COLUMNS..).unwrap_or(&[]);
        match sanitize_row(cells, projection.width()) {
            Some(values) => rows.push(ChainRow::new(projection.project(&values), *descriptor)),
            None => debug!("Row {} of {} is not a data row", index, descriptor.iso_date()),
        }
    }
    Ok(rows)
}

/// Scrape the chain of `symbol` through a WebDriver session and write it to
/// `csv_path`. The session is closed on every path, including Ctrl-C; the
/// file is only written when assembly succeeds.
pub async fn scrape_chain<P: AsRef<Path>>(
    config: &Config,
    symbol: &str,
    csv_path: P,
) -> Result<ChainTable> {
    let session = BrowserSession::connect(&config.browser).await?;
    let source = WebDriverSource::new(&session, config.scrape.clone());
    let mut assembler = ChainAssembler::new(source, config.scrape.trading_days_per_year);

    let outcome = tokio::select! {
        result = assembler.assemble(symbol) => result,
        _ = tokio::signal::ctrl_c() => Err(ChainError::Interrupted),
    };
    session.close().await;

    let table = outcome?;
    write_chain_csv(&table, csv_path)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn descriptor() -> ExpirationDescriptor {
        ExpirationDescriptor::new(NaiveDate::from_ymd_opt(2025, 9, 29).unwrap(), 12, 252)
    }

    fn header() -> Vec<String> {
        let mut cells = strings(&["#", "Side", ""]);
        cells.extend(strings(&[
            "Strike", "Bid", "Ask", "Price", "IV", "Delta", "Gamma", "Theta", "Vega", "Rho",
            "Volume", "OI",
        ]));
        cells
    }

    #[test]
    fn structural_cells_are_dropped_before_sanitizing() {
        let table = RawTable {
            header: header(),
            rows: vec![strings(&[
                "1", "C", "", "100", "1.5", "1.7", "1.6", "45.2", "0.55", "0.01", "-0.2", "0.3",
                "0.05", "1,200", "3,400",
            ])],
        };
        let rows = rows_for_expiration(&table, &descriptor()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].strike(), 100.0);
        assert_eq!(rows[0].value("Volume"), Some(1200.0));
        assert_eq!(rows[0].value("OI"), Some(3400.0));
        assert_eq!(rows[0].expiration, descriptor());
    }

    #[test]
    fn section_rows_are_skipped() {
        let table = RawTable {
            header: header(),
            rows: vec![
                strings(&["", "", "", "Calls", "-", "-", "-"]),
                vec![],
                strings(&[
                    "2", "P", "", "110", "-", "2", "2.1", "50", "-0.4", "0.01", "-0.3", "0.2",
                    "0.04", "10", "20",
                ]),
            ],
        };
        let rows = rows_for_expiration(&table, &descriptor()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].strike(), 110.0);
        assert_eq!(rows[0].value("Bid"), Some(0.0));
    }

    #[test]
    fn header_without_schema_columns_is_fatal() {
        let table = RawTable {
            header: strings(&["#", "Side", "", "Strike", "Bid"]),
            rows: vec![],
        };
        assert!(matches!(
            rows_for_expiration(&table, &descriptor()),
            Err(ChainError::MissingColumn(_))
        ));
    }
}
