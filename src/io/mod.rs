//! Result export for downstream aggregation.

pub mod export;
