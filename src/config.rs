//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from TOML
/// with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default. A device section
/// with zero rated capacity disables that device entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Scenario-wide parameters.
    #[serde(default)]
    pub scenario: ScenarioSection,
    /// Time grid of the dispatch plan.
    #[serde(default)]
    pub grid: GridConfig,
    /// Forecast price curve parameters.
    #[serde(default)]
    pub prices: PriceConfig,
    /// Solar PV parameters.
    #[serde(default)]
    pub pv: PvConfig,
    /// Battery storage parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// EV charging session parameters.
    #[serde(default)]
    pub ev: EvConfig,
    /// Heat pump parameters.
    #[serde(default)]
    pub heat_pump: HeatPumpConfig,
    /// CHP parameters.
    #[serde(default)]
    pub chp: ChpConfig,
}

/// Scenario-wide parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioSection {
    /// Master random seed for synthetic plan generation.
    pub seed: u64,
}

impl Default for ScenarioSection {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// Time grid of the dispatch plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Number of time steps in the horizon (must be > 0).
    pub nsteps: usize,
    /// Sub-periods per step relating power to energy (must be > 0);
    /// 15-minute steps over an hourly energy unit give 4.
    pub ntsteps: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nsteps: 96,
            ntsteps: 4,
        }
    }
}

/// Forecast price curve parameters (currency per kW per step).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PriceConfig {
    /// Mean export price.
    pub export_base: f32,
    /// Daily sinusoidal amplitude of the export price.
    pub export_amp: f32,
    /// Constant spread added on top of export to form the import price.
    pub import_spread: f32,
    /// Gaussian noise standard deviation on the export price.
    pub noise_std: f32,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            export_base: 0.08,
            export_amp: 0.04,
            import_spread: 0.22,
            noise_std: 0.005,
        }
    }
}

/// Solar PV parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PvConfig {
    /// Installed peak power (kW). Zero disables the device.
    pub kw_peak: f32,
    /// Sunrise step index (inclusive).
    pub sunrise_idx: usize,
    /// Sunset step index (exclusive).
    pub sunset_idx: usize,
    /// Fraction of potential generation committed to grid export (0.0–1.0).
    pub export_share: f32,
    /// Gaussian noise standard deviation as a fraction of output.
    pub noise_std: f32,
}

impl Default for PvConfig {
    fn default() -> Self {
        Self {
            kw_peak: 8.0,
            sunrise_idx: 24,
            sunset_idx: 72,
            export_share: 0.7,
            noise_std: 0.05,
        }
    }
}

/// Battery storage parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Usable capacity (kWh). Zero disables the device.
    pub capacity_kwh: f32,
    /// Maximum discharge power (kW).
    pub max_discharge_kw: f32,
    /// Initial state of charge (0.0–1.0).
    pub initial_soc: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 10.0,
            max_discharge_kw: 5.0,
            initial_soc: 0.6,
        }
    }
}

/// EV charging session parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvConfig {
    /// Rated charging power (kW). Zero disables the device.
    pub max_charge_kw: f32,
    /// Plug-in step index (inclusive).
    pub arrival_idx: usize,
    /// Unplug step index (exclusive).
    pub departure_idx: usize,
    /// Session energy demand (kWh).
    pub demand_kwh: f32,
}

impl Default for EvConfig {
    fn default() -> Self {
        Self {
            max_charge_kw: 0.0,
            arrival_idx: 70,
            departure_idx: 96,
            demand_kwh: 14.0,
        }
    }
}

/// Heat pump parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatPumpConfig {
    /// Rated electrical power (kW). Zero disables the device.
    pub rated_el_kw: f32,
    /// Thermal buffer size (kWh thermal).
    pub buffer_kwh: f32,
}

impl Default for HeatPumpConfig {
    fn default() -> Self {
        Self {
            rated_el_kw: 0.0,
            buffer_kwh: 12.0,
        }
    }
}

/// CHP parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChpConfig {
    /// Rated electrical power (kW). Zero disables the device.
    pub rated_el_kw: f32,
    /// Commitment window start step (inclusive).
    pub on_idx: usize,
    /// Commitment window end step (exclusive).
    pub off_idx: usize,
}

impl Default for ChpConfig {
    fn default() -> Self {
        Self {
            rated_el_kw: 0.0,
            on_idx: 60,
            off_idx: 90,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"grid.nsteps"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: PV plus battery, hourly-energy grid.
    pub fn baseline() -> Self {
        Self {
            scenario: ScenarioSection::default(),
            grid: GridConfig::default(),
            prices: PriceConfig::default(),
            pv: PvConfig::default(),
            battery: BatteryConfig::default(),
            ev: EvConfig::default(),
            heat_pump: HeatPumpConfig::default(),
            chp: ChpConfig::default(),
        }
    }

    /// Returns the all-devices preset: every family installed.
    pub fn all_devices() -> Self {
        Self {
            ev: EvConfig {
                max_charge_kw: 11.0,
                ..EvConfig::default()
            },
            heat_pump: HeatPumpConfig {
                rated_el_kw: 3.0,
                ..HeatPumpConfig::default()
            },
            chp: ChpConfig {
                rated_el_kw: 4.0,
                ..ChpConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the winter preset: no PV, heat-led devices carry the offer.
    pub fn winter() -> Self {
        Self {
            pv: PvConfig {
                kw_peak: 0.0,
                ..PvConfig::default()
            },
            heat_pump: HeatPumpConfig {
                rated_el_kw: 4.0,
                buffer_kwh: 18.0,
            },
            chp: ChpConfig {
                rated_el_kw: 5.0,
                on_idx: 20,
                off_idx: 90,
            },
            battery: BatteryConfig {
                initial_soc: 0.8,
                ..BatteryConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "all_devices", "winter"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "all_devices" => Ok(Self::all_devices()),
            "winter" => Ok(Self::winter()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let g = &self.grid;

        if g.nsteps == 0 {
            errors.push(ConfigError {
                field: "grid.nsteps".into(),
                message: "must be > 0".into(),
            });
        }
        if g.ntsteps == 0 {
            errors.push(ConfigError {
                field: "grid.ntsteps".into(),
                message: "must be > 0".into(),
            });
        }

        let pv = &self.pv;
        if pv.kw_peak > 0.0 {
            if pv.sunrise_idx >= pv.sunset_idx {
                errors.push(ConfigError {
                    field: "pv.sunrise_idx".into(),
                    message: "must be < pv.sunset_idx".into(),
                });
            }
            if g.nsteps > 0 && pv.sunset_idx > g.nsteps {
                errors.push(ConfigError {
                    field: "pv.sunset_idx".into(),
                    message: "must be <= grid.nsteps".into(),
                });
            }
            if !(0.0..=1.0).contains(&pv.export_share) {
                errors.push(ConfigError {
                    field: "pv.export_share".into(),
                    message: "must be in [0.0, 1.0]".into(),
                });
            }
        }

        let bat = &self.battery;
        if bat.capacity_kwh > 0.0 && !(0.0..=1.0).contains(&bat.initial_soc) {
            errors.push(ConfigError {
                field: "battery.initial_soc".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        let ev = &self.ev;
        if ev.max_charge_kw > 0.0 {
            if ev.arrival_idx >= ev.departure_idx {
                errors.push(ConfigError {
                    field: "ev.arrival_idx".into(),
                    message: "must be < ev.departure_idx".into(),
                });
            }
            if g.nsteps > 0 && ev.departure_idx > g.nsteps {
                errors.push(ConfigError {
                    field: "ev.departure_idx".into(),
                    message: "must be <= grid.nsteps".into(),
                });
            }
            if ev.demand_kwh < 0.0 {
                errors.push(ConfigError {
                    field: "ev.demand_kwh".into(),
                    message: "must be >= 0".into(),
                });
            }
        }

        if self.heat_pump.rated_el_kw > 0.0 && self.heat_pump.buffer_kwh <= 0.0 {
            errors.push(ConfigError {
                field: "heat_pump.buffer_kwh".into(),
                message: "must be > 0 when the heat pump is installed".into(),
            });
        }

        let chp = &self.chp;
        if chp.rated_el_kw > 0.0 {
            if chp.on_idx >= chp.off_idx {
                errors.push(ConfigError {
                    field: "chp.on_idx".into(),
                    message: "must be < chp.off_idx".into(),
                });
            }
            if g.nsteps > 0 && chp.off_idx > g.nsteps {
                errors.push(ConfigError {
                    field: "chp.off_idx".into(),
                    message: "must be <= grid.nsteps".into(),
                });
            }
        }

        errors
    }
}
