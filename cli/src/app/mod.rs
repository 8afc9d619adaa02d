//! Application state and tick scheduling.

mod actions;

pub use actions::Action;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use tracing::{debug, info};

use crate::config::UserConfig;
use crate::data::{PowerData, ProcessData, ProcessRow};

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppView {
    #[default]
    Main,
    Help,
    ConfirmTerminate,
}

/// Inline message for the footer; errors render in the alert color.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Main application state for the TUI.
///
/// Both samplers run from the one event loop, each on its own cadence;
/// there is no background thread, so the estimator's cache has a single
/// owner.
pub struct App {
    pub config: UserConfig,
    pub view: AppView,
    pub power: PowerData,
    pub processes: ProcessData,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub pending_terminate: Option<ProcessRow>,
    pub status_message: Option<StatusMessage>,
    power_interval: Duration,
    process_interval: Duration,
    last_power_refresh: Instant,
    last_process_refresh: Instant,
}

impl App {
    pub fn new(config: UserConfig) -> Result<Self> {
        info!(
            power_secs = config.power_refresh_secs,
            process_secs = config.process_refresh_secs,
            "initializing app"
        );

        let power = PowerData::new()?;
        let mut processes = ProcessData::new(&config);
        // Prime the CPU-time cache so the second tick can rate deltas.
        processes.refresh();

        let power_interval = Duration::from_secs(config.power_refresh_secs.max(1));
        let process_interval = Duration::from_secs(config.process_refresh_secs.max(1));

        Ok(Self {
            config,
            view: AppView::Main,
            power,
            processes,
            selected_index: 0,
            scroll_offset: 0,
            pending_terminate: None,
            status_message: None,
            power_interval,
            process_interval,
            last_power_refresh: Instant::now(),
            last_process_refresh: Instant::now(),
        })
    }

    /// Advance whichever samplers are due. Returns true when data changed.
    pub fn tick(&mut self) -> bool {
        let mut updated = false;

        if self.last_power_refresh.elapsed() >= self.power_interval {
            self.power.refresh();
            self.last_power_refresh = Instant::now();
            updated = true;
        }

        if self.last_process_refresh.elapsed() >= self.process_interval {
            self.processes.refresh();
            self.last_process_refresh = Instant::now();
            self.clamp_selection();
            updated = true;
        }

        if updated {
            debug!(
                charging_watts = ?self.power.charging_power_watts(),
                process_rows = self.processes.processes.len(),
                "tick refreshed data"
            );
        }

        updated
    }

    pub fn selected_process(&self) -> Option<&ProcessRow> {
        self.processes.processes.get(self.selected_index)
    }

    pub fn select_next(&mut self) {
        let count = self.processes.processes.len();
        if count > 0 && self.selected_index + 1 < count {
            self.selected_index += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Keep the selection visible within `visible_rows` table lines.
    pub fn adjust_scroll(&mut self, visible_rows: usize) {
        if visible_rows == 0 {
            return;
        }
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        } else if self.selected_index >= self.scroll_offset + visible_rows {
            self.scroll_offset = self.selected_index - visible_rows + 1;
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.processes.processes.len();
        if count == 0 {
            self.selected_index = 0;
            self.scroll_offset = 0;
        } else if self.selected_index >= count {
            self.selected_index = count - 1;
        }
    }
}
