//! Device families contributing flexibility offers.

/// Stationary battery storage.
pub mod battery;
/// Combined heat and power unit.
pub mod chp;
/// Electric vehicle charging session.
pub mod ev;
/// Heat pump with thermal buffer.
pub mod heat_pump;
/// Solar photovoltaic array.
pub mod pv;
pub mod types;

// Re-export the main types for convenience
pub use battery::BatteryStorage;
pub use chp::CombinedHeatPower;
pub use ev::EvCharger;
pub use heat_pump::HeatPump;
pub use pv::PvArray;
pub use types::FeasibilityEnvelope;
