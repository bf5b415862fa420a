//! Analysis modules.
//!
//! Reading summary files and merging them into the report table.

pub mod aggregator;

pub use aggregator::*;
