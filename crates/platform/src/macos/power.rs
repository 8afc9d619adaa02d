use std::ffi::{c_void, CString};

use chrono::Local;
use color_eyre::eyre::Result;
use core_foundation_sys::array::{CFArrayGetCount, CFArrayGetValueAtIndex, CFArrayRef};
use core_foundation_sys::base::{
    kCFAllocatorDefault, kCFAllocatorNull, CFAllocatorRef, CFGetTypeID, CFRelease, CFTypeRef,
};
use core_foundation_sys::dictionary::{
    CFDictionaryGetValue, CFDictionaryRef, CFMutableDictionaryRef,
};
use core_foundation_sys::number::{
    kCFNumberFloat64Type, CFBooleanGetTypeID, CFBooleanGetValue, CFBooleanRef, CFNumberGetTypeID,
    CFNumberGetValue, CFNumberRef,
};
use core_foundation_sys::string::{
    kCFStringEncodingUTF8, CFStringCreateWithBytesNoCopy, CFStringGetCString, CFStringGetTypeID,
    CFStringRef,
};

use crate::power::{
    assemble_snapshot, AdapterReading, BatterySourceReading, PowerProvider, PowerSnapshot,
    SmartBatteryReading,
};

#[link(name = "IOKit", kind = "framework")]
extern "C" {
    fn IOPSCopyPowerSourcesInfo() -> CFTypeRef;
    fn IOPSCopyPowerSourcesList(blob: CFTypeRef) -> CFArrayRef;
    fn IOPSGetPowerSourceDescription(blob: CFTypeRef, source: CFTypeRef) -> CFDictionaryRef;
    fn IOPSCopyExternalPowerAdapterDetails() -> CFDictionaryRef;

    fn IOServiceMatching(name: *const i8) -> CFMutableDictionaryRef;
    fn IOServiceGetMatchingService(main_port: u32, matching: CFDictionaryRef) -> u32;
    fn IORegistryEntryCreateCFProperties(
        entry: u32,
        properties: *mut CFMutableDictionaryRef,
        allocator: CFAllocatorRef,
        options: u32,
    ) -> i32;
    fn IOObjectRelease(object: u32) -> u32;
}

// Dictionary keys, as published by IOPSKeys.h and the AppleSmartBattery
// registry entry.
const ADAPTER_WATTS_KEY: &str = "Watts";
const POWER_SOURCE_TYPE_KEY: &str = "Type";
const INTERNAL_BATTERY_TYPE: &str = "InternalBattery";
const IS_CHARGING_KEY: &str = "Is Charging";
const VOLTAGE_KEY: &str = "Voltage";
const CURRENT_KEY: &str = "Current";
const APPLE_RAW_CURRENT_KEY: &str = "AppleRawCurrent";
const AMPERAGE_KEY: &str = "Amperage";
const INSTANT_AMPERAGE_KEY: &str = "InstantAmperage";
const SMART_BATTERY_SERVICE: &str = "AppleSmartBattery";

/// Power-source sampler backed by IOPowerSources, with the
/// AppleSmartBattery registry entry as the secondary source for voltage
/// and current.
pub struct MacPowerSource;

impl PowerProvider for MacPowerSource {
    fn new() -> Result<Self> {
        Ok(Self)
    }

    fn collect_snapshot(&self) -> PowerSnapshot {
        let adapter = read_adapter_details();
        let sources = read_power_sources();

        // The registry read is only consulted for fields the enumeration
        // left absent; assemble_snapshot enforces that.
        let smart = read_smart_battery();

        assemble_snapshot(&adapter, &sources, smart.as_ref(), Local::now())
    }
}

fn read_adapter_details() -> AdapterReading {
    unsafe {
        let details = IOPSCopyExternalPowerAdapterDetails();
        if details.is_null() {
            return AdapterReading::default();
        }

        let rated_watts = dict_f64(details, ADAPTER_WATTS_KEY);
        CFRelease(details as _);
        AdapterReading { rated_watts }
    }
}

fn read_power_sources() -> Vec<BatterySourceReading> {
    let mut readings = Vec::new();

    unsafe {
        let blob = IOPSCopyPowerSourcesInfo();
        if blob.is_null() {
            return readings;
        }

        let list = IOPSCopyPowerSourcesList(blob);
        if !list.is_null() {
            let count = CFArrayGetCount(list);
            for index in 0..count {
                let source = CFArrayGetValueAtIndex(list, index) as CFTypeRef;
                if source.is_null() {
                    continue;
                }

                // Not a copy: the description belongs to the blob.
                let description = IOPSGetPowerSourceDescription(blob, source);
                if description.is_null() {
                    continue;
                }

                let internal_battery = dict_string(description, POWER_SOURCE_TYPE_KEY).as_deref()
                    == Some(INTERNAL_BATTERY_TYPE);

                readings.push(BatterySourceReading {
                    internal_battery,
                    is_charging: dict_bool(description, IS_CHARGING_KEY),
                    voltage_mv: dict_f64(description, VOLTAGE_KEY),
                    raw_current_ma: dict_f64(description, APPLE_RAW_CURRENT_KEY),
                    current_ma: dict_f64(description, CURRENT_KEY),
                });
            }
            CFRelease(list as _);
        }

        CFRelease(blob as _);
    }

    readings
}

fn read_smart_battery() -> Option<SmartBatteryReading> {
    let service_name = CString::new(SMART_BATTERY_SERVICE).ok()?;

    unsafe {
        let matching = IOServiceMatching(service_name.as_ptr());
        if matching.is_null() {
            return None;
        }

        // IOServiceGetMatchingService consumes the matching dictionary.
        let service = IOServiceGetMatchingService(0, matching as CFDictionaryRef);
        if service == 0 {
            return None;
        }

        let mut properties: CFMutableDictionaryRef = std::ptr::null_mut();
        let status =
            IORegistryEntryCreateCFProperties(service, &mut properties, kCFAllocatorDefault, 0);
        IOObjectRelease(service);

        if status != 0 || properties.is_null() {
            return None;
        }

        let dict = properties as CFDictionaryRef;
        let reading = SmartBatteryReading {
            voltage_mv: dict_f64(dict, VOLTAGE_KEY),
            instant_amperage_ma: dict_f64(dict, INSTANT_AMPERAGE_KEY),
            amperage_ma: dict_f64(dict, AMPERAGE_KEY),
        };

        CFRelease(properties as _);
        Some(reading)
    }
}

fn cfstr(val: &str) -> CFStringRef {
    unsafe {
        CFStringCreateWithBytesNoCopy(
            kCFAllocatorDefault,
            val.as_ptr(),
            val.len() as isize,
            kCFStringEncodingUTF8,
            0,
            kCFAllocatorNull,
        )
    }
}

fn from_cfstr(val: CFStringRef) -> String {
    if val.is_null() {
        return String::new();
    }
    unsafe {
        let mut buf = [0i8; 128];
        if CFStringGetCString(val, buf.as_mut_ptr(), 128, kCFStringEncodingUTF8) == 0 {
            return String::new();
        }
        std::ffi::CStr::from_ptr(buf.as_ptr())
            .to_string_lossy()
            .to_string()
    }
}

fn dict_value(dict: CFDictionaryRef, key: &str) -> Option<CFTypeRef> {
    unsafe {
        let key = cfstr(key);
        let val = CFDictionaryGetValue(dict, key as _);
        CFRelease(key as _);
        if val.is_null() {
            None
        } else {
            Some(val)
        }
    }
}

/// Numeric dictionary field. Values occasionally arrive as strings, so
/// those are parsed too.
fn dict_f64(dict: CFDictionaryRef, key: &str) -> Option<f64> {
    let value = dict_value(dict, key)?;
    unsafe {
        let type_id = CFGetTypeID(value);
        if type_id == CFNumberGetTypeID() {
            let mut out: f64 = 0.0;
            let ok = CFNumberGetValue(
                value as CFNumberRef,
                kCFNumberFloat64Type,
                &mut out as *mut f64 as *mut c_void,
            );
            if ok != 0 {
                return Some(out);
            }
            None
        } else if type_id == CFStringGetTypeID() {
            from_cfstr(value as CFStringRef).trim().parse::<f64>().ok()
        } else {
            None
        }
    }
}

fn dict_bool(dict: CFDictionaryRef, key: &str) -> Option<bool> {
    let value = dict_value(dict, key)?;
    unsafe {
        if CFGetTypeID(value) == CFBooleanGetTypeID() {
            Some(CFBooleanGetValue(value as CFBooleanRef) != 0)
        } else {
            None
        }
    }
}

fn dict_string(dict: CFDictionaryRef, key: &str) -> Option<String> {
    let value = dict_value(dict, key)?;
    unsafe {
        if CFGetTypeID(value) == CFStringGetTypeID() {
            Some(from_cfstr(value as CFStringRef))
        } else {
            None
        }
    }
}
