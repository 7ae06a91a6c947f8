//! Flexibility extraction pipeline: feasibility scanning, opportunity-cost
//! valuation, and the uniform per-device record schema.

pub mod pipeline;
pub mod record;
pub mod scanner;
pub mod valuator;

pub use pipeline::{FlexInputs, extract_flexibility};
pub use record::{FlexRecord, FlexTable};
pub use scanner::MIN_FLEX_POWER_KW;
