mod app;
mod config;
mod data;
mod input;
mod logging;
mod ui;

use std::io;
use std::time::Duration;

use app::App;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use config::{cache_dir, config_path, ensure_dirs, LogLevel, UserConfig};
use logging::LogMode;

/// How often the event loop wakes to check sampler cadences.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Subcommand)]
enum Commands {
    /// Launch the TUI interface (default)
    #[command(alias = "tui")]
    Ui {
        /// Refresh interval in seconds for both samplers
        #[arg(short, long)]
        refresh_secs: Option<u64>,

        /// Hide processes below this CPU percentage
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Output samples in JSON format (suitable for piping)
    #[command(alias = "raw")]
    Pipe {
        /// Number of samples to output (0 = infinite)
        #[arg(short, long, default_value_t = 0)]
        samples: u32,

        /// Interval between samples in seconds
        #[arg(short, long, default_value_t = 5)]
        interval: u64,

        /// Compact JSON output (one line per sample)
        #[arg(short, long)]
        compact: bool,

        /// Number of processes to include per sample
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,
    },

    /// Print debug information about power sources and processes
    Debug,

    /// Show or edit configuration
    Config {
        /// Print config file path
        #[arg(long)]
        path: bool,

        /// Reset config to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(short, long)]
        edit: bool,
    },
}

/// Charging-power and process-energy monitor for the terminal
#[derive(Debug, Parser)]
#[command(name = "surge", version, verbatim_doc_comment)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = ensure_dirs();

    let cli = Cli::parse();
    let config = UserConfig::load();
    let log_level_override = cli.log_level.as_deref().map(LogLevel::from_str);

    match cli.command {
        Some(Commands::Pipe {
            samples,
            interval,
            compact,
            top,
        }) => {
            let _guard = logging::init(config.log_level, LogMode::Stderr, log_level_override);
            run_pipe(&config, samples, interval, compact, top)
        }
        Some(Commands::Debug) => {
            let _guard = logging::init(config.log_level, LogMode::Stderr, log_level_override);
            run_debug(&config)
        }
        Some(Commands::Config { path, reset, edit }) => {
            let _guard = logging::init(config.log_level, LogMode::Stderr, log_level_override);
            run_config(path, reset, edit)
        }
        Some(Commands::Ui {
            refresh_secs,
            threshold,
        }) => {
            let _guard = logging::init(config.log_level, LogMode::File, log_level_override);
            let mut config = config;
            config.merge_with_args(refresh_secs, threshold);
            run_tui(config)
        }
        None => {
            let _guard = logging::init(config.log_level, LogMode::File, log_level_override);
            run_tui(config)
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_tui(user_config: UserConfig) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_tui_loop(&mut terminal, user_config);
    restore_terminal(&mut terminal)?;
    result
}

fn run_tui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    user_config: UserConfig,
) -> Result<()> {
    let mut app = App::new(user_config)?;

    loop {
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        let should_tick = if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let action = input::handle_key(&app, key);
                    if !app.handle_action(action) {
                        break;
                    }
                    false
                }
                _ => false,
            }
        } else {
            true
        };

        if should_tick {
            app.tick();
        }
    }

    Ok(())
}

fn run_pipe(
    config: &UserConfig,
    samples: u32,
    interval: u64,
    compact: bool,
    top: usize,
) -> Result<()> {
    use data::{PowerData, ProcessData};
    use serde_json::json;

    let mut power = PowerData::new()?;
    let mut processes = ProcessData::new(config);
    let mut counter = 0u32;

    loop {
        power.refresh();
        processes.refresh();

        let snapshot = power.snapshot();
        let top_processes: Vec<_> = processes
            .processes
            .iter()
            .take(top)
            .map(|p| {
                json!({
                    "pid": p.pid,
                    "name": p.name,
                    "bundle_id": p.bundle_id,
                    "cpu_percent": p.cpu_usage_percent,
                    "power_mw": p.estimated_power_mw,
                })
            })
            .collect();

        let doc = json!({
            "timestamp": snapshot.timestamp.to_rfc3339(),
            "power": {
                "is_charging": snapshot.is_charging,
                "charging_watts": snapshot.charging_power_watts,
                "battery_voltage_v": snapshot.battery_voltage_volts,
                "battery_current_a": snapshot.battery_current_amps,
                "adapter_rated_w": snapshot.adapter_rated_power_watts,
                "direction": snapshot.charge_direction().label(),
            },
            "processes": top_processes,
        });

        if compact {
            println!("{}", serde_json::to_string(&doc)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }

        counter += 1;
        if samples > 0 && counter >= samples {
            break;
        }

        std::thread::sleep(Duration::from_secs(interval.max(1)));
    }

    Ok(())
}

fn run_debug(config: &UserConfig) -> Result<()> {
    use data::{PowerData, ProcessData};

    println!("surge debug information");
    println!("{}", "=".repeat(60));

    println!("\n--- Power Snapshot ---");
    let power = PowerData::new()?;
    println!(
        "State:          {}",
        ui::charging_state_label(power.is_charging())
    );
    println!(
        "Charging power: {}",
        ui::watts(power.charging_power_watts())
    );
    println!(
        "Voltage:        {}",
        ui::volts(power.battery_voltage_volts())
    );
    println!(
        "Current:        {}",
        ui::amps(power.battery_current_amps())
    );
    println!(
        "Adapter:        {}",
        ui::adapter_watts(power.adapter_rated_power_watts())
    );
    println!("Direction:      {}", power.charge_direction());
    println!("Sampled at:     {}", ui::clock_time(power.timestamp()));

    println!("\n--- Top Processes ---");
    let mut processes = ProcessData::new(config);
    processes.refresh();
    std::thread::sleep(Duration::from_secs(1));
    processes.refresh();

    if processes.processes.is_empty() {
        println!("(no processes above {:.1}%)", config.usage_threshold_percent);
    }
    for row in processes.processes.iter().take(10) {
        println!(
            "{:>7}  {:<32} {:>7} {:>10}",
            row.pid,
            row.name,
            ui::cpu_percent(row.cpu_usage_percent),
            ui::process_power(row.estimated_power_mw)
        );
    }

    println!("\n--- Config Paths ---");
    println!("Config: {}", config_path().display());
    println!("Cache:  {}", cache_dir().display());

    println!("\n--- Current Config ---");
    println!("{}", toml::to_string_pretty(config)?);

    Ok(())
}

fn run_config(path: bool, reset: bool, edit: bool) -> Result<()> {
    let config_file = config_path();

    if path {
        println!("{}", config_file.display());
        return Ok(());
    }

    if reset {
        let config = UserConfig::default();
        config.save()?;
        println!("Config reset to defaults at: {}", config_file.display());
        return Ok(());
    }

    if edit {
        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "nano".to_string());

        if !config_file.exists() {
            let config = UserConfig::default();
            config.save()?;
        }

        std::process::Command::new(editor)
            .arg(&config_file)
            .status()?;

        return Ok(());
    }

    let config = UserConfig::load();
    println!("Config file: {}", config_file.display());
    println!();
    println!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}
