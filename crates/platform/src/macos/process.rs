use std::sync::OnceLock;

use libproc::libproc::pid_rusage::{pidrusage, RUsageInfoV2};

/// Cumulative CPU time (user + system) for `pid`, in nanoseconds.
///
/// Returns `None` when the process has exited or the rusage query is not
/// permitted; callers skip the process for the current tick.
pub fn cpu_time_ns(pid: u32) -> Option<u64> {
    let usage = pidrusage::<RUsageInfoV2>(pid as i32).ok()?;
    let ticks = usage.ri_user_time.saturating_add(usage.ri_system_time);
    Some(mach_ticks_to_ns(ticks))
}

// rusage times are reported in mach absolute time units, which only equal
// nanoseconds when the timebase ratio is 1/1 (Intel). Apple Silicon uses
// 125/3.
fn mach_ticks_to_ns(ticks: u64) -> u64 {
    let (numer, denom) = *timebase();
    if denom == 0 {
        return ticks;
    }
    ((ticks as u128 * numer as u128) / denom as u128) as u64
}

fn timebase() -> &'static (u64, u64) {
    static TIMEBASE: OnceLock<(u64, u64)> = OnceLock::new();
    TIMEBASE.get_or_init(|| {
        let mut info = libc::mach_timebase_info { numer: 0, denom: 0 };
        if unsafe { libc::mach_timebase_info(&mut info) } == libc::KERN_SUCCESS {
            (u64::from(info.numer), u64::from(info.denom))
        } else {
            (1, 1)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_process_reports_cpu_time() {
        // The monitor itself must always be measurable.
        let time = cpu_time_ns(std::process::id());
        assert!(time.is_some());
    }

    #[test]
    fn test_missing_process_reports_none() {
        // PIDs are well below this on macOS (PID_MAX is 99999).
        assert!(cpu_time_ns(4_000_000).is_none());
    }
}
