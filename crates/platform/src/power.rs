//! Power-source sampling: raw readings, first-wins merging, and the
//! derived charging-power snapshot.

use chrono::{DateTime, Local};
use color_eyre::eyre::Result;

use crate::types::ChargeDirection;

/// Telemetry snapshot taken once per sampling tick.
///
/// Every field other than the timestamp is optional: absence means the
/// underlying source did not report the value, and is data in its own
/// right rather than an error.
#[derive(Debug, Clone)]
pub struct PowerSnapshot {
    /// Whether the battery reports itself as charging.
    pub is_charging: Option<bool>,

    /// Instantaneous charging power in watts, negative while discharging.
    /// Derived from voltage and current; present iff both are present.
    pub charging_power_watts: Option<f64>,

    /// Battery voltage in volts.
    pub battery_voltage_volts: Option<f64>,

    /// Battery current in amps. Negative when discharging.
    pub battery_current_amps: Option<f64>,

    /// Rated wattage advertised by the external power adapter.
    pub adapter_rated_power_watts: Option<f64>,

    /// Moment the sample was taken.
    pub timestamp: DateTime<Local>,
}

impl PowerSnapshot {
    /// A snapshot with every telemetry field absent, stamped now.
    pub fn empty() -> Self {
        Self {
            is_charging: None,
            charging_power_watts: None,
            battery_voltage_volts: None,
            battery_current_amps: None,
            adapter_rated_power_watts: None,
            timestamp: Local::now(),
        }
    }

    /// Direction of power flow implied by the signed charging power.
    pub fn charge_direction(&self) -> ChargeDirection {
        ChargeDirection::from_watts(self.charging_power_watts)
    }
}

/// Fields extracted from one enumerated power source.
///
/// Voltage and currents are kept in the raw milli-units (mV / mA) the OS
/// reports them in; [`assemble_snapshot`] performs the base-unit conversion.
#[derive(Debug, Clone, Default)]
pub struct BatterySourceReading {
    /// True when the source's type marker identifies an internal battery.
    pub internal_battery: bool,
    pub is_charging: Option<bool>,
    pub voltage_mv: Option<f64>,
    /// Vendor-specific raw current, preferred over the generic field.
    pub raw_current_ma: Option<f64>,
    pub current_ma: Option<f64>,
}

/// Fields extracted from the lower-level smart-battery service, used to
/// backfill whatever the power-source enumeration left absent.
#[derive(Debug, Clone, Default)]
pub struct SmartBatteryReading {
    pub voltage_mv: Option<f64>,
    /// Instantaneous amperage, preferred over the generic field.
    pub instant_amperage_ma: Option<f64>,
    pub amperage_ma: Option<f64>,
}

/// External adapter details.
#[derive(Debug, Clone, Default)]
pub struct AdapterReading {
    pub rated_watts: Option<f64>,
}

/// Convert a raw milli-unit value (mV, mA) to its base unit.
fn milli_to_base(raw: f64) -> f64 {
    raw / 1000.0
}

/// Round to `places` decimal places, half away from zero.
fn round_to_places(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Merge adapter, power-source, and smart-battery readings into a snapshot.
///
/// Fields are filled first-wins: once populated, a later source never
/// overwrites a value. Within a source the raw/instant current variant is
/// preferred over the generic one. Charging power is the rounded product of
/// voltage and current and exists only when both inputs do.
pub fn assemble_snapshot(
    adapter: &AdapterReading,
    sources: &[BatterySourceReading],
    smart_battery: Option<&SmartBatteryReading>,
    timestamp: DateTime<Local>,
) -> PowerSnapshot {
    let mut is_charging = None;
    let mut voltage = None;
    let mut current = None;

    for source in sources.iter().filter(|s| s.internal_battery) {
        if is_charging.is_none() {
            is_charging = source.is_charging;
        }
        if voltage.is_none() {
            voltage = source.voltage_mv.map(milli_to_base);
        }
        if current.is_none() {
            current = source
                .raw_current_ma
                .or(source.current_ma)
                .map(milli_to_base);
        }
    }

    if let Some(smart) = smart_battery {
        if voltage.is_none() {
            voltage = smart.voltage_mv.map(milli_to_base);
        }
        if current.is_none() {
            current = smart
                .instant_amperage_ma
                .or(smart.amperage_ma)
                .map(milli_to_base);
        }
    }

    let charging_power_watts = match (voltage, current) {
        (Some(v), Some(i)) => Some(round_to_places(v * i, 2)),
        _ => None,
    };

    PowerSnapshot {
        is_charging,
        charging_power_watts,
        battery_voltage_volts: voltage,
        battery_current_amps: current,
        adapter_rated_power_watts: adapter.rated_watts,
        timestamp,
    }
}

/// Trait for platform power-source samplers.
pub trait PowerProvider {
    /// Create a new provider instance.
    fn new() -> Result<Self>
    where
        Self: Sized;

    /// Take a fresh telemetry snapshot.
    ///
    /// Never fails: fields a backend cannot supply come back absent.
    fn collect_snapshot(&self) -> PowerSnapshot;
}

/// Provider for targets with no power-source backend.
///
/// Reports every telemetry field as unavailable, which the display layer
/// renders as placeholders.
pub struct UnavailablePowerSource;

impl PowerProvider for UnavailablePowerSource {
    fn new() -> Result<Self> {
        Ok(Self)
    }

    fn collect_snapshot(&self) -> PowerSnapshot {
        PowerSnapshot::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battery(voltage_mv: Option<f64>, raw_ma: Option<f64>, generic_ma: Option<f64>) -> BatterySourceReading {
        BatterySourceReading {
            internal_battery: true,
            is_charging: Some(false),
            voltage_mv,
            raw_current_ma: raw_ma,
            current_ma: generic_ma,
        }
    }

    #[test]
    fn test_milli_conversion_is_exact() {
        assert_eq!(milli_to_base(3700.0), 3.7);
        assert_eq!(milli_to_base(-3200.0), -3.2);
    }

    #[test]
    fn test_power_present_iff_voltage_and_current() {
        let ts = Local::now();
        let adapter = AdapterReading::default();

        let both = assemble_snapshot(&adapter, &[battery(Some(8900.0), Some(-3200.0), None)], None, ts);
        assert!(both.charging_power_watts.is_some());

        let no_current = assemble_snapshot(&adapter, &[battery(Some(8900.0), None, None)], None, ts);
        assert_eq!(no_current.battery_voltage_volts, Some(8.9));
        assert!(no_current.charging_power_watts.is_none());

        let no_voltage = assemble_snapshot(&adapter, &[battery(None, Some(-3200.0), None)], None, ts);
        assert_eq!(no_voltage.battery_current_amps, Some(-3.2));
        assert!(no_voltage.charging_power_watts.is_none());
    }

    #[test]
    fn test_power_is_rounded_product() {
        let snapshot = assemble_snapshot(
            &AdapterReading { rated_watts: Some(65.0) },
            &[battery(Some(8900.0), Some(-3200.0), None)],
            None,
            Local::now(),
        );

        assert_eq!(snapshot.adapter_rated_power_watts, Some(65.0));
        assert_eq!(snapshot.battery_voltage_volts, Some(8.9));
        assert_eq!(snapshot.battery_current_amps, Some(-3.2));
        let power = snapshot.charging_power_watts.unwrap();
        assert!((power - (-28.48)).abs() < 1e-9, "got {power}");
        assert_eq!(snapshot.charge_direction(), ChargeDirection::Discharging);
    }

    #[test]
    fn test_rounding_applies_only_to_the_product() {
        // 3.3335 V stays unrounded; only the product is clamped to 2 places.
        let snapshot = assemble_snapshot(
            &AdapterReading::default(),
            &[battery(Some(3333.5), Some(1000.0), None)],
            None,
            Local::now(),
        );
        assert_eq!(snapshot.battery_voltage_volts, Some(3.3335));
        assert_eq!(snapshot.charging_power_watts, Some(3.33));
    }

    #[test]
    fn test_first_source_wins() {
        let first = battery(Some(8900.0), None, None);
        let second = battery(Some(7000.0), Some(1500.0), None);
        let snapshot = assemble_snapshot(
            &AdapterReading::default(),
            &[first, second],
            None,
            Local::now(),
        );

        // Voltage keeps the first source's value; current fills from the second.
        assert_eq!(snapshot.battery_voltage_volts, Some(8.9));
        assert_eq!(snapshot.battery_current_amps, Some(1.5));
    }

    #[test]
    fn test_raw_current_preferred_over_generic() {
        let snapshot = assemble_snapshot(
            &AdapterReading::default(),
            &[battery(Some(8000.0), Some(-1000.0), Some(2000.0))],
            None,
            Local::now(),
        );
        assert_eq!(snapshot.battery_current_amps, Some(-1.0));
    }

    #[test]
    fn test_non_battery_sources_are_ignored() {
        let ups = BatterySourceReading {
            internal_battery: false,
            is_charging: Some(true),
            voltage_mv: Some(12000.0),
            raw_current_ma: Some(500.0),
            current_ma: None,
        };
        let snapshot = assemble_snapshot(&AdapterReading::default(), &[ups], None, Local::now());
        assert!(snapshot.is_charging.is_none());
        assert!(snapshot.battery_voltage_volts.is_none());
        assert!(snapshot.charging_power_watts.is_none());
    }

    #[test]
    fn test_smart_battery_backfills_missing_fields() {
        let smart = SmartBatteryReading {
            voltage_mv: Some(11400.0),
            instant_amperage_ma: Some(-1087.0),
            amperage_ma: Some(-900.0),
        };

        // Nothing from the enumeration: smart battery fills both, preferring
        // the instant amperage variant.
        let snapshot =
            assemble_snapshot(&AdapterReading::default(), &[], Some(&smart), Local::now());
        assert_eq!(snapshot.battery_voltage_volts, Some(11.4));
        assert_eq!(snapshot.battery_current_amps, Some(-1.087));

        // A value found during enumeration is not overwritten.
        let snapshot = assemble_snapshot(
            &AdapterReading::default(),
            &[battery(Some(8900.0), None, None)],
            Some(&smart),
            Local::now(),
        );
        assert_eq!(snapshot.battery_voltage_volts, Some(8.9));
        assert_eq!(snapshot.battery_current_amps, Some(-1.087));
    }

    #[test]
    fn test_empty_inputs_yield_empty_snapshot() {
        let snapshot =
            assemble_snapshot(&AdapterReading::default(), &[], None, Local::now());
        assert!(snapshot.is_charging.is_none());
        assert!(snapshot.battery_voltage_volts.is_none());
        assert!(snapshot.battery_current_amps.is_none());
        assert!(snapshot.charging_power_watts.is_none());
        assert!(snapshot.adapter_rated_power_watts.is_none());
        assert_eq!(snapshot.charge_direction(), ChargeDirection::Neutral);
    }

    #[test]
    fn test_unavailable_provider_reports_nothing() {
        let provider = UnavailablePowerSource::new().unwrap();
        let snapshot = provider.collect_snapshot();
        assert!(snapshot.charging_power_watts.is_none());
        assert!(snapshot.adapter_rated_power_watts.is_none());
    }
}
