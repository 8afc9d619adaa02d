use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

use super::{adapter_watts, amps, charging_state_label, clock_time, volts, watts};

/// The telemetry panel, mirroring the original status-menu items.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let power = &app.power;

    let rows = [
        ("State", charging_state_label(power.is_charging()).to_string()),
        ("Charging power", watts(power.charging_power_watts())),
        ("Battery voltage", volts(power.battery_voltage_volts())),
        ("Battery current", amps(power.battery_current_amps())),
        ("Adapter rating", adapter_watts(power.adapter_rated_power_watts())),
        ("Last updated", clock_time(power.timestamp())),
    ];

    let lines: Vec<Line> = rows
        .iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(
                    format!("{:<16}", label),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(value.clone()),
            ])
        })
        .collect();

    let block = Block::default()
        .title(" Power ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
