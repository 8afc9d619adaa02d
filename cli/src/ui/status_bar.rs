use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::input::keys;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let hints: [(&str, &str); 4] = [
        (keys::HELP, "help"),
        (keys::UP_DOWN, "select"),
        (keys::TERMINATE, "terminate"),
        (keys::QUIT, "quit"),
    ];

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, desc)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(*key, Style::default().fg(Color::Cyan)));
        spans.push(Span::styled(
            format!(" {}", desc),
            Style::default().fg(Color::DarkGray),
        ));
    }

    if let Some(ref status) = app.status_message {
        let color = if status.is_error {
            Color::Red
        } else {
            Color::Green
        };
        let text = format!("{} ", status.text);

        let left_width: usize = spans.iter().map(|s| s.width()).sum();
        let right_width = text.chars().count();
        let padding = (area.width as usize).saturating_sub(left_width + right_width);

        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(text, Style::default().fg(color)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
