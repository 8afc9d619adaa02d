//! Fixed-precision formatting for telemetry fields.
//!
//! Absent values render as a placeholder rather than zero, so the display
//! never invents telemetry the OS did not report.

use chrono::{DateTime, Local};
use surge_platform::ChargeDirection;

pub const PLACEHOLDER: &str = "--";

/// Charging power in watts, 2 decimals.
pub fn watts(value: Option<f64>) -> String {
    match value {
        Some(w) => format!("{:.2} W", w),
        None => PLACEHOLDER.to_string(),
    }
}

/// Battery voltage in volts, 2 decimals.
pub fn volts(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2} V", v),
        None => PLACEHOLDER.to_string(),
    }
}

/// Battery current in amps, 2 decimals.
pub fn amps(value: Option<f64>) -> String {
    match value {
        Some(a) => format!("{:.2} A", a),
        None => PLACEHOLDER.to_string(),
    }
}

/// Adapter rating in watts, no decimals.
pub fn adapter_watts(value: Option<f64>) -> String {
    match value {
        Some(w) => format!("{:.0} W", w),
        None => PLACEHOLDER.to_string(),
    }
}

/// CPU utilization, 1 decimal.
pub fn cpu_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Estimated process power: milliwatts below one watt, watts above.
pub fn process_power(milliwatts: f64) -> String {
    if milliwatts < 1000.0 {
        format!("{:.0} mW", milliwatts)
    } else {
        format!("{:.2} W", milliwatts / 1000.0)
    }
}

/// Compact watts for the header readout, mirroring the status-item title.
pub fn watts_compact(value: Option<f64>) -> String {
    match value {
        Some(w) => format!("{:.0}W", w),
        None => PLACEHOLDER.to_string(),
    }
}

/// Sample time as `HH:mm:ss`.
pub fn clock_time(timestamp: &DateTime<Local>) -> String {
    timestamp.format("%H:%M:%S").to_string()
}

/// Status glyph for the power-flow direction.
pub fn direction_glyph(direction: ChargeDirection) -> &'static str {
    match direction {
        ChargeDirection::Charging => "⚡",
        ChargeDirection::Discharging => "▽",
        ChargeDirection::Neutral => "·",
    }
}

/// Menu-item label for the raw charging flag.
pub fn charging_state_label(is_charging: Option<bool>) -> &'static str {
    match is_charging {
        Some(true) => "Charging",
        Some(false) => "Not charging",
        None => "Unknown",
    }
}
