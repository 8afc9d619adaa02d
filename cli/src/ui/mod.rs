mod format;
mod help;
mod power;
mod processes;
mod status_bar;

pub use format::*;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, AppView};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const POWER_PANEL_HEIGHT: u16 = 8;

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(POWER_PANEL_HEIGHT),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(area);

    render_title_bar(frame, chunks[0], app);
    power::render(frame, chunks[1], app);
    processes::render(frame, chunks[2], app);
    status_bar::render(frame, chunks[3], app);

    match app.view {
        AppView::Help => help::render(frame, area),
        AppView::ConfirmTerminate => render_confirm_overlay(frame, area, app),
        AppView::Main => {}
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect, app: &App) {
    let glyph = direction_glyph(app.power.charge_direction());
    let readout = format!(
        "{} {} · {}",
        glyph,
        watts_compact(app.power.charging_power_watts()),
        app.power.charge_direction().label()
    );

    let left_spans = vec![
        Span::styled("⚡surge ", Style::default().fg(Color::Cyan)),
        Span::styled(format!("v{}", VERSION), Style::default().fg(Color::DarkGray)),
    ];

    let left_width: usize = left_spans.iter().map(|s| s.width()).sum();
    let right_width = readout.chars().count() + 1;
    let padding = (area.width as usize).saturating_sub(left_width + right_width);

    let mut spans = left_spans;
    spans.push(Span::raw(" ".repeat(padding)));
    spans.push(Span::styled(readout, Style::default().fg(Color::DarkGray)));
    spans.push(Span::raw(" "));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_confirm_overlay(frame: &mut Frame, area: Rect, app: &App) {
    use ratatui::widgets::{Block, Borders, Clear};

    let Some(ref process) = app.pending_terminate else {
        return;
    };

    let text = format!("Terminate {} (pid {})?", process.name, process.pid);
    let width = (text.chars().count() as u16 + 6).min(area.width);
    let popup = centered_rect(width, 5, area);

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let body = Paragraph::new(vec![
        Line::from(text),
        Line::from(Span::styled(
            "y: terminate · any other key: cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(block);

    frame.render_widget(Clear, popup);
    frame.render_widget(body, popup);
}

pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
