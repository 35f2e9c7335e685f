use crate::error::{ChainError, Result};
use crate::models::chain::{
    ChainTable, DTE_COLUMN, EXPIRATION_COLUMN, MARKET_COLUMNS, YTE_COLUMN,
};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Convert a chain table to a Polars DataFrame in output schema order
pub fn chain_to_dataframe(table: &ChainTable) -> Result<DataFrame> {
    let rows = table.rows();

    let mut columns: Vec<Series> = MARKET_COLUMNS
        .iter()
        .enumerate()
        .map(|(slot, name)| {
            let values: Vec<f64> = rows.iter().map(|row| row.market[slot]).collect();
            Series::new(name, values)
        })
        .collect();

    let expirations: Vec<String> = rows.iter().map(|row| row.expiration.iso_date()).collect();
    let dtes: Vec<i64> = rows
        .iter()
        .map(|row| row.expiration.days_to_expiration as i64)
        .collect();
    let ytes: Vec<f64> = rows.iter().map(|row| row.expiration.year_fraction).collect();

    columns.push(Series::new(EXPIRATION_COLUMN, expirations));
    columns.push(Series::new(DTE_COLUMN, dtes));
    columns.push(Series::new(YTE_COLUMN, ytes));

    let df = DataFrame::new(columns)?;
    Ok(df)
}

/// Write a chain table as CSV, replacing any existing file
pub fn write_chain_csv<P: AsRef<Path>>(table: &ChainTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut df = chain_to_dataframe(table)?;

    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut df)?;

    info!(
        "Wrote {} rows for {} to {}",
        table.len(),
        table.symbol,
        path.display()
    );
    Ok(())
}

/// Load a persisted chain table
pub fn load_chain_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ChainError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Chain file not found: {}", path.display()),
        )));
    }

    let df = CsvReader::from_path(path)?.has_header(true).finish()?;
    Ok(df)
}

/// A numeric column as floats, whatever numeric type the reader inferred
pub fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)
        .map_err(|_| ChainError::UnknownColumn(name.to_string()))?
        .cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chain::{output_columns, ChainRow};
    use crate::models::expiration::ExpirationDescriptor;
    use chrono::NaiveDate;

    fn table() -> ChainTable {
        let expiration =
            ExpirationDescriptor::new(NaiveDate::from_ymd_opt(2025, 9, 29).unwrap(), 12, 252);
        let mut market = [0.0; 12];
        market[0] = 105000.0;
        market[4] = 48.5;
        ChainTable::from_batches("BTC", vec![vec![ChainRow::new(market, expiration)]])
    }

    #[test]
    fn dataframe_follows_output_schema() {
        let df = chain_to_dataframe(&table()).unwrap();
        assert_eq!(df.get_column_names(), output_columns());
        assert_eq!(df.height(), 1);
        assert_eq!(
            df.column("Expiration").unwrap().utf8().unwrap().get(0),
            Some("2025-09-29")
        );
        assert_eq!(df.column("DTE").unwrap().i64().unwrap().get(0), Some(12));
    }

    #[test]
    fn float_column_casts_integers() {
        let df = chain_to_dataframe(&table()).unwrap();
        assert_eq!(float_column(&df, "DTE").unwrap(), vec![Some(12.0)]);
        assert!(matches!(
            float_column(&df, "Charm"),
            Err(ChainError::UnknownColumn(_))
        ));
    }

    #[test]
    fn empty_table_still_has_schema() {
        let df = chain_to_dataframe(&ChainTable::default()).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), output_columns().len());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_chain_csv("does/not/exist.csv"),
            Err(ChainError::IoError(_))
        ));
    }
}
