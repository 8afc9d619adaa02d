use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table},
    Frame,
};

use crate::app::App;

use super::{cpu_percent, process_power};

const COL_PID: u16 = 7;
const COL_CPU: u16 = 7;
const COL_POWER: u16 = 10;

pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .title(" Processes ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    let visible_rows = inner.height.saturating_sub(1) as usize;
    app.adjust_scroll(visible_rows);

    let header = Row::new(["PID", "Name", "CPU%", "Power"])
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let offset = app.scroll_offset;
    let selected = app.selected_index;

    let rows: Vec<Row> = app
        .processes
        .processes
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_rows)
        .map(|(index, process)| {
            let style = if index == selected {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };

            Row::new([
                process.pid.to_string(),
                process.name.clone(),
                cpu_percent(process.cpu_usage_percent),
                process_power(process.estimated_power_mw),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(COL_PID),
        Constraint::Min(12),
        Constraint::Length(COL_CPU),
        Constraint::Length(COL_POWER),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}
