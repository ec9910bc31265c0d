//! Analysis modules.
//!
//! The engine turns a dataset and a request into a result bundle; the
//! aggregator holds the filtering and grouping helpers it is built from.

pub mod aggregator;
pub mod engine;

pub use aggregator::*;
pub use engine::compute;
