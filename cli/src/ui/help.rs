use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;

const BINDINGS: [(&str, &str); 6] = [
    ("↑/k", "select previous process"),
    ("↓/j", "select next process"),
    ("K", "terminate selected process"),
    ("?", "toggle this help"),
    ("q", "quit"),
    ("Esc", "quit / dismiss"),
];

pub fn render(frame: &mut Frame, area: Rect) {
    let height = BINDINGS.len() as u16 + 2;
    let popup = centered_rect(44, height, area);

    let lines: Vec<Line> = BINDINGS
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("  {:<6}", key), Style::default().fg(Color::Cyan)),
                Span::raw(*desc),
            ])
        })
        .collect();

    let block = Block::default()
        .title(" Keys ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}
