//! Battery telemetry and process-energy sampling for surge.
//!
//! This crate provides the sampling core: reading power-source telemetry
//! (charging flag, voltage, current, adapter wattage), deriving charging
//! power, and estimating per-process energy draw from CPU-time deltas.
//!
//! # Features
//!
//! - `macos` - Enable the macOS readers (IOPowerSources, AppleSmartBattery,
//!   libproc)
//!
//! # Example
//!
//! ```ignore
//! use surge_platform::{EnergyEstimator, PowerProvider};
//!
//! #[cfg(target_os = "macos")]
//! use surge_platform::macos::MacPowerSource;
//!
//! let source = MacPowerSource::new()?;
//! let snapshot = source.collect_snapshot();
//! println!("Charging at {:?} W", snapshot.charging_power_watts);
//!
//! let mut estimator = EnergyEstimator::new();
//! for sample in estimator.refresh() {
//!     println!("{}: {:.0} mW", sample.name, sample.estimated_power_mw);
//! }
//! ```

mod power;
mod process;
mod types;

pub use power::{
    assemble_snapshot, AdapterReading, BatterySourceReading, PowerProvider, PowerSnapshot,
    SmartBatteryReading, UnavailablePowerSource,
};
pub use process::{
    terminate_process, CpuObservation, CpuTimeCache, EnergyEstimator, ProcessEnergySample,
    ProcessError, DEFAULT_MILLIWATTS_PER_CPU_PERCENT, DEFAULT_USAGE_THRESHOLD_PERCENT,
};
pub use types::ChargeDirection;

#[cfg(target_os = "macos")]
#[cfg(feature = "macos")]
pub mod macos;
