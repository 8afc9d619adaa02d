use std::time::Duration;

use chrono::Local;
use surge_platform::{
    assemble_snapshot, AdapterReading, BatterySourceReading, ChargeDirection, EnergyEstimator,
    PowerProvider, ProcessError, SmartBatteryReading, UnavailablePowerSource,
    DEFAULT_USAGE_THRESHOLD_PERCENT,
};

#[test]
fn discharging_scenario_produces_signed_power_and_direction() {
    let adapter = AdapterReading {
        rated_watts: Some(65.0),
    };
    let battery = BatterySourceReading {
        internal_battery: true,
        is_charging: Some(false),
        voltage_mv: Some(8900.0),
        raw_current_ma: Some(-3200.0),
        current_ma: None,
    };

    let snapshot = assemble_snapshot(&adapter, &[battery], None, Local::now());

    assert_eq!(snapshot.adapter_rated_power_watts, Some(65.0));
    assert_eq!(snapshot.is_charging, Some(false));
    let power = snapshot.charging_power_watts.expect("power derivable");
    assert!((power - (-28.48)).abs() < 1e-9);
    assert_eq!(snapshot.charge_direction(), ChargeDirection::Discharging);
}

#[test]
fn smart_battery_fills_gaps_without_overwriting() {
    let battery = BatterySourceReading {
        internal_battery: true,
        is_charging: Some(true),
        voltage_mv: Some(12300.0),
        raw_current_ma: None,
        current_ma: None,
    };
    let smart = SmartBatteryReading {
        voltage_mv: Some(11000.0),
        instant_amperage_ma: Some(2500.0),
        amperage_ma: Some(2400.0),
    };

    let snapshot = assemble_snapshot(
        &AdapterReading::default(),
        &[battery],
        Some(&smart),
        Local::now(),
    );

    assert_eq!(snapshot.battery_voltage_volts, Some(12.3));
    assert_eq!(snapshot.battery_current_amps, Some(2.5));
    assert_eq!(snapshot.charging_power_watts, Some(30.75));
    assert_eq!(snapshot.charge_direction(), ChargeDirection::Charging);
}

#[test]
fn unavailable_source_is_all_absent() {
    let source = UnavailablePowerSource::new().unwrap();
    let snapshot = source.collect_snapshot();
    assert!(snapshot.is_charging.is_none());
    assert!(snapshot.battery_voltage_volts.is_none());
    assert!(snapshot.battery_current_amps.is_none());
    assert!(snapshot.charging_power_watts.is_none());
    assert_eq!(snapshot.charge_direction(), ChargeDirection::Neutral);
}

#[test]
fn first_refresh_emits_nothing() {
    // Every process is a cold start on the first tick, and cold starts
    // report zero usage, which sits below the emission threshold.
    let mut estimator = EnergyEstimator::new();
    let samples = estimator.refresh();
    assert!(samples.is_empty());
    assert!(estimator.tracked_pids() > 0);
}

#[test]
fn later_refreshes_are_filtered_and_ordered() {
    let mut estimator = EnergyEstimator::new();
    estimator.refresh();
    std::thread::sleep(Duration::from_millis(200));
    let samples = estimator.refresh();

    for sample in &samples {
        assert!(sample.cpu_usage_percent >= DEFAULT_USAGE_THRESHOLD_PERCENT);
        assert!(sample.estimated_power_mw >= sample.cpu_usage_percent * 49.0);
    }

    for pair in samples.windows(2) {
        assert!(pair[0].estimated_power_mw >= pair[1].estimated_power_mw);
    }
}

#[test]
fn terminate_guard_blocks_self_and_init() {
    let estimator = EnergyEstimator::new();

    let own = estimator.terminate(std::process::id());
    assert!(matches!(own, Err(ProcessError::TerminationFailed { .. })));

    let init = estimator.terminate(1);
    assert!(matches!(
        init,
        Err(ProcessError::TerminationFailed { pid: 1, .. })
    ));
}
