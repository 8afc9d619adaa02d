//! macOS readers: IOPowerSources / AppleSmartBattery telemetry and
//! libproc CPU times.

pub mod power;
pub mod process;

pub use power::MacPowerSource;
