mod plotting;
pub mod polars_utils;
pub mod sanitize;

pub use plotting::*;
