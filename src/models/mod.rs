//! Data models for option chains and metric surfaces
//!
//! This module contains the expiration descriptor, chain rows and tables with
//! their fixed output schema, and the strike x YTE surface grid.

pub mod chain;
pub mod expiration;
pub mod surface;
mod symbol;

pub use chain::{ChainRow, ChainTable};
pub use expiration::ExpirationDescriptor;
pub use surface::{SurfaceGrid, SurfaceSample};
pub use symbol::Symbol;
