use chrono::{DateTime, Local};
use color_eyre::eyre::Result;
use surge_platform::{ChargeDirection, PowerProvider, PowerSnapshot};

#[cfg(all(target_os = "macos", feature = "macos"))]
type PlatformPower = surge_platform::macos::MacPowerSource;

#[cfg(not(all(target_os = "macos", feature = "macos")))]
type PlatformPower = surge_platform::UnavailablePowerSource;

/// Holds the power provider and the most recent snapshot.
pub struct PowerData {
    provider: PlatformPower,
    snapshot: PowerSnapshot,
}

impl PowerData {
    pub fn new() -> Result<Self> {
        let provider = PlatformPower::new()?;
        let snapshot = provider.collect_snapshot();
        Ok(Self { provider, snapshot })
    }

    pub fn refresh(&mut self) {
        self.snapshot = self.provider.collect_snapshot();
    }

    pub fn snapshot(&self) -> &PowerSnapshot {
        &self.snapshot
    }

    pub fn is_charging(&self) -> Option<bool> {
        self.snapshot.is_charging
    }

    pub fn charging_power_watts(&self) -> Option<f64> {
        self.snapshot.charging_power_watts
    }

    pub fn battery_voltage_volts(&self) -> Option<f64> {
        self.snapshot.battery_voltage_volts
    }

    pub fn battery_current_amps(&self) -> Option<f64> {
        self.snapshot.battery_current_amps
    }

    pub fn adapter_rated_power_watts(&self) -> Option<f64> {
        self.snapshot.adapter_rated_power_watts
    }

    pub fn timestamp(&self) -> &DateTime<Local> {
        &self.snapshot.timestamp
    }

    pub fn charge_direction(&self) -> ChargeDirection {
        self.snapshot.charge_direction()
    }
}
