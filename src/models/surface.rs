//! Dense strike x YTE grids of one chain metric
//!
//! The grid is built from the samples actually present in a persisted chain
//! table. No interpolation happens: a (YTE, strike) pair that was never
//! observed stays `None` and renders as a gap.

use crate::error::{ChainError, Result};
use crate::models::chain::{STRIKE_COLUMN, YTE_COLUMN};
use crate::utils::polars_utils::float_column;
use ndarray::Array2;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// One observed metric value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSample {
    pub year_fraction: f64,
    pub strike: f64,
    pub value: f64,
}

impl SurfaceSample {
    pub fn is_finite(&self) -> bool {
        self.year_fraction.is_finite() && self.strike.is_finite() && self.value.is_finite()
    }
}

/// Metric values on the unique (YTE, strike) axes of a chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceGrid {
    /// Name of the metric column
    pub metric: String,
    /// Unique year fractions, ascending
    pub year_fractions: Vec<f64>,
    /// Unique strikes, ascending
    pub strikes: Vec<f64>,
    /// Values indexed `[yte, strike]`, `None` where nothing was observed
    pub values: Array2<Option<f64>>,
}

impl SurfaceGrid {
    /// Build the grid for `metric` from a chain table read back from storage
    pub fn from_dataframe(df: &DataFrame, metric: &str) -> Result<Self> {
        let names = df.get_column_names();
        for column in [metric, STRIKE_COLUMN, YTE_COLUMN] {
            if !names.iter().any(|name| *name == column) {
                return Err(ChainError::UnknownColumn(column.to_string()));
            }
        }

        let year_fractions = float_column(df, YTE_COLUMN)?;
        let strikes = float_column(df, STRIKE_COLUMN)?;
        let values = float_column(df, metric)?;

        let samples: Vec<SurfaceSample> = year_fractions
            .into_iter()
            .zip(strikes)
            .zip(values)
            .filter_map(|((yte, strike), value)| match (yte, strike, value) {
                (Some(year_fraction), Some(strike), Some(value)) => Some(SurfaceSample {
                    year_fraction,
                    strike,
                    value,
                }),
                _ => None,
            })
            .collect();

        Ok(Self::from_samples(metric, &samples))
    }

    /// Build the grid from samples in table order. When two samples share a
    /// (YTE, strike) cell the later one wins. Samples with a non-finite
    /// coordinate or value are ignored.
    pub fn from_samples(metric: impl Into<String>, samples: &[SurfaceSample]) -> Self {
        let samples: Vec<&SurfaceSample> = samples.iter().filter(|s| s.is_finite()).collect();
        let year_fractions = sorted_unique(samples.iter().map(|s| s.year_fraction));
        let strikes = sorted_unique(samples.iter().map(|s| s.strike));

        let mut values = Array2::from_elem((year_fractions.len(), strikes.len()), None);
        for sample in samples {
            if let (Some(i), Some(j)) = (
                locate(&year_fractions, sample.year_fraction),
                locate(&strikes, sample.strike),
            ) {
                values[[i, j]] = Some(sample.value);
            }
        }

        Self {
            metric: metric.into(),
            year_fractions,
            strikes,
            values,
        }
    }

    pub fn get(&self, yte_index: usize, strike_index: usize) -> Option<f64> {
        self.values.get((yte_index, strike_index)).copied().flatten()
    }

    /// Observed cells as (year fraction, strike, value)
    pub fn observed(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.values
            .indexed_iter()
            .filter_map(move |((i, j), value)| {
                value.map(|v| (self.year_fractions[i], self.strikes[j], v))
            })
    }

    pub fn observed_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Smallest and largest observed value
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.iter().flatten().fold(None, |range, &v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.observed_count() == 0
    }
}

fn sorted_unique(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut axis: Vec<f64> = values.collect();
    axis.sort_by(f64::total_cmp);
    axis.dedup();
    axis
}

fn locate(axis: &[f64], value: f64) -> Option<usize> {
    axis.binary_search_by(|probe| probe.total_cmp(&value)).ok()
}
