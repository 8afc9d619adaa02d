//! Per-process energy estimation from CPU-time deltas, plus process
//! termination.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;

use sysinfo::{Pid, ProcessesToUpdate, Signal, System};
use thiserror::Error;

/// Default linear coefficient mapping CPU utilization to power:
/// 50 mW per 1% CPU, i.e. 5 W at full utilization of one core-second.
pub const DEFAULT_MILLIWATTS_PER_CPU_PERCENT: f64 = 50.0;

/// Samples below this utilization are dropped from the emitted list.
pub const DEFAULT_USAGE_THRESHOLD_PERCENT: f64 = 0.5;

/// Errors surfaced by process operations.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to terminate pid {pid}: {reason}")]
    TerminationFailed { pid: u32, reason: String },
}

/// Energy estimate for one process on one tick.
#[derive(Debug, Clone)]
pub struct ProcessEnergySample {
    pub pid: u32,
    /// Binary name as enumerated; consumers may resolve a friendlier name.
    pub name: String,
    /// Executable path, when the process exposes one.
    pub exe: Option<PathBuf>,
    /// CPU utilization since the previous tick, in percent.
    pub cpu_usage_percent: f64,
    /// Estimated draw in milliwatts: utilization times the coefficient.
    pub estimated_power_mw: f64,
}

/// Outcome of feeding one CPU-time reading into the cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CpuObservation {
    /// First time this pid has been seen; usage reads as zero.
    FirstSeen,
    /// Utilization percentage derived from the delta.
    Usage(f64),
    /// No wall-clock time elapsed since the prior stamp; nothing to rate.
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct CpuStamp {
    total_cpu_ns: u64,
    sampled_at: Instant,
}

/// Last-seen cumulative CPU time per pid.
///
/// Owned exclusively by the estimator and touched once per tick; entries
/// for pids missing from the current enumeration are swept afterwards so
/// the map tracks only live processes.
#[derive(Debug, Default)]
pub struct CpuTimeCache {
    entries: HashMap<u32, CpuStamp>,
}

impl CpuTimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reading and rate it against the prior stamp.
    ///
    /// The cache stamp is overwritten in every case, including
    /// [`CpuObservation::Stale`], so later deltas stay well-formed.
    pub fn observe(&mut self, pid: u32, total_cpu_ns: u64, now: Instant) -> CpuObservation {
        let prior = self.entries.insert(
            pid,
            CpuStamp {
                total_cpu_ns,
                sampled_at: now,
            },
        );

        let Some(prior) = prior else {
            return CpuObservation::FirstSeen;
        };

        let elapsed = now.saturating_duration_since(prior.sampled_at);
        if elapsed.is_zero() {
            return CpuObservation::Stale;
        }

        let delta_ns = total_cpu_ns.saturating_sub(prior.total_cpu_ns);
        let usage = delta_ns as f64 / 1e9 / elapsed.as_secs_f64() * 100.0;
        CpuObservation::Usage(usage)
    }

    /// Drop entries whose pid is not in the live set.
    pub fn retain_live(&mut self, live: &HashSet<u32>) {
        self.entries.retain(|pid, _| live.contains(pid));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.entries.contains_key(&pid)
    }
}

/// Estimates per-process power draw by rating CPU-time deltas between
/// ticks.
pub struct EnergyEstimator {
    system: System,
    cache: CpuTimeCache,
    milliwatts_per_cpu_percent: f64,
    usage_threshold_percent: f64,
}

impl EnergyEstimator {
    pub fn new() -> Self {
        Self::with_tuning(
            DEFAULT_MILLIWATTS_PER_CPU_PERCENT,
            DEFAULT_USAGE_THRESHOLD_PERCENT,
        )
    }

    /// The CPU%-to-milliwatt coefficient is a heuristic, not a measured
    /// quantity, so both knobs are injectable.
    pub fn with_tuning(milliwatts_per_cpu_percent: f64, usage_threshold_percent: f64) -> Self {
        Self {
            system: System::new_all(),
            cache: CpuTimeCache::new(),
            milliwatts_per_cpu_percent,
            usage_threshold_percent,
        }
    }

    /// Re-enumerate processes and produce this tick's samples, ordered by
    /// descending estimated power (ties by ascending pid).
    ///
    /// A process whose CPU time cannot be read is skipped for the tick;
    /// nothing aborts the refresh as a whole.
    pub fn refresh(&mut self) -> Vec<ProcessEnergySample> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);
        let now = Instant::now();

        let mut live = HashSet::new();
        let mut samples = Vec::new();

        for (pid, process) in self.system.processes() {
            let pid = pid.as_u32();
            live.insert(pid);

            let Some(cpu_ns) = cumulative_cpu_time_ns(pid, process) else {
                continue;
            };

            let usage = match self.cache.observe(pid, cpu_ns, now) {
                CpuObservation::Usage(usage) => usage,
                CpuObservation::FirstSeen => 0.0,
                CpuObservation::Stale => continue,
            };

            if usage < self.usage_threshold_percent {
                continue;
            }

            samples.push(ProcessEnergySample {
                pid,
                name: process.name().to_string_lossy().to_string(),
                exe: process.exe().map(|p| p.to_path_buf()),
                cpu_usage_percent: usage,
                estimated_power_mw: usage * self.milliwatts_per_cpu_percent,
            });
        }

        self.cache.retain_live(&live);
        sort_by_power(&mut samples);
        samples
    }

    /// Number of pids currently tracked in the CPU-time cache.
    pub fn tracked_pids(&self) -> usize {
        self.cache.len()
    }

    /// Best-effort termination of `pid`. See [`terminate_process`].
    pub fn terminate(&self, pid: u32) -> Result<(), ProcessError> {
        terminate_process(&self.system, pid)
    }
}

impl Default for EnergyEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Descending by estimated power; equal estimates order by pid so the
/// output is deterministic.
fn sort_by_power(samples: &mut [ProcessEnergySample]) {
    samples.sort_by(|a, b| {
        b.estimated_power_mw
            .partial_cmp(&a.estimated_power_mw)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.pid.cmp(&b.pid))
    });
}

#[cfg(all(target_os = "macos", feature = "macos"))]
fn cumulative_cpu_time_ns(pid: u32, _process: &sysinfo::Process) -> Option<u64> {
    crate::macos::process::cpu_time_ns(pid)
}

#[cfg(not(all(target_os = "macos", feature = "macos")))]
fn cumulative_cpu_time_ns(_pid: u32, process: &sysinfo::Process) -> Option<u64> {
    // sysinfo reports accumulated CPU time in milliseconds.
    process.accumulated_cpu_time().checked_mul(1_000_000)
}

/// Attempt to terminate `pid`: a cooperative terminate first, then the
/// signal delivered directly. One attempt, reported synchronously.
///
/// Refuses outright, without touching the OS, when `pid` is this process
/// or the primordial process.
pub fn terminate_process(system: &System, pid: u32) -> Result<(), ProcessError> {
    if pid == std::process::id() || pid == 1 {
        return Err(ProcessError::TerminationFailed {
            pid,
            reason: "refusing to terminate the monitor or the init process".to_string(),
        });
    }

    if let Some(process) = system.process(Pid::from_u32(pid)) {
        if process.kill_with(Signal::Term) == Some(true) {
            return Ok(());
        }
    }

    signal_terminate(pid)
}

#[cfg(unix)]
fn signal_terminate(pid: u32) -> Result<(), ProcessError> {
    let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(ProcessError::TerminationFailed {
            pid,
            reason: std::io::Error::last_os_error().to_string(),
        })
    }
}

#[cfg(not(unix))]
fn signal_terminate(pid: u32) -> Result<(), ProcessError> {
    Err(ProcessError::TerminationFailed {
        pid,
        reason: "no terminate signal on this platform".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_observation_reports_first_seen() {
        let mut cache = CpuTimeCache::new();
        let now = Instant::now();
        // Non-zero cumulative time still rates as a cold start.
        assert_eq!(
            cache.observe(100, 7_000_000_000, now),
            CpuObservation::FirstSeen
        );
        assert!(cache.contains(100));
    }

    #[test]
    fn test_delta_over_five_seconds() {
        let mut cache = CpuTimeCache::new();
        let t0 = Instant::now();
        cache.observe(100, 2_000_000_000, t0);

        let t1 = t0 + Duration::from_secs(5);
        match cache.observe(100, 2_500_000_000, t1) {
            CpuObservation::Usage(usage) => assert!((usage - 10.0).abs() < 1e-9, "got {usage}"),
            other => panic!("expected usage, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_elapsed_is_stale_but_stamps_cache() {
        let mut cache = CpuTimeCache::new();
        let t0 = Instant::now();
        cache.observe(42, 1_000_000_000, t0);
        assert_eq!(cache.observe(42, 9_000_000_000, t0), CpuObservation::Stale);

        // The stale reading still replaced the stamp: a later delta rates
        // against the newest cumulative time, not the original one.
        let t1 = t0 + Duration::from_secs(2);
        match cache.observe(42, 9_000_000_000, t1) {
            CpuObservation::Usage(usage) => assert!(usage.abs() < 1e-9, "got {usage}"),
            other => panic!("expected usage, got {other:?}"),
        }
    }

    #[test]
    fn test_backwards_counter_clamps_to_zero() {
        let mut cache = CpuTimeCache::new();
        let t0 = Instant::now();
        cache.observe(7, 5_000_000_000, t0);
        match cache.observe(7, 4_000_000_000, t0 + Duration::from_secs(5)) {
            CpuObservation::Usage(usage) => assert_eq!(usage, 0.0),
            other => panic!("expected usage, got {other:?}"),
        }
    }

    #[test]
    fn test_retain_live_sweeps_exited_pids() {
        let mut cache = CpuTimeCache::new();
        let now = Instant::now();
        cache.observe(1, 1, now);
        cache.observe(2, 1, now);
        cache.observe(3, 1, now);

        let live: HashSet<u32> = [1, 3].into_iter().collect();
        cache.retain_live(&live);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(1));
        assert!(!cache.contains(2));
        assert!(cache.contains(3));
    }

    fn sample(pid: u32, usage: f64) -> ProcessEnergySample {
        ProcessEnergySample {
            pid,
            name: format!("proc-{pid}"),
            exe: None,
            cpu_usage_percent: usage,
            estimated_power_mw: usage * DEFAULT_MILLIWATTS_PER_CPU_PERCENT,
        }
    }

    #[test]
    fn test_power_coefficient() {
        let s = sample(100, 10.0);
        assert!((s.estimated_power_mw - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_sort_descending_with_pid_tiebreak() {
        let mut samples = vec![sample(30, 1.0), sample(10, 4.0), sample(20, 1.0)];
        sort_by_power(&mut samples);

        let order: Vec<u32> = samples.iter().map(|s| s.pid).collect();
        assert_eq!(order, vec![10, 20, 30]);
    }

    #[test]
    fn test_terminate_refuses_own_pid_and_init() {
        let system = System::new();

        let own = terminate_process(&system, std::process::id());
        assert!(matches!(
            own,
            Err(ProcessError::TerminationFailed { pid, .. }) if pid == std::process::id()
        ));

        let init = terminate_process(&system, 1);
        assert!(matches!(
            init,
            Err(ProcessError::TerminationFailed { pid: 1, .. })
        ));
    }

    #[test]
    fn test_termination_error_mentions_pid() {
        let err = ProcessError::TerminationFailed {
            pid: 99,
            reason: "Operation not permitted".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("99"));
        assert!(text.contains("Operation not permitted"));
    }
}
