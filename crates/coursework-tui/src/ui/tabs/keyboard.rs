use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use coursework_core::exercises::LAYOUT;

use crate::app::{App, AppState};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(LAYOUT.len() as u16 * 2 + 3), Constraint::Min(4)])
        .split(area);

    render_keys(frame, app, chunks[0]);
    render_text(frame, app, chunks[1]);
}

/// Label drawn on a key cap
fn key_label(key: &str) -> String {
    match key {
        "Space" => format!(" {:^30} ", "Space"),
        "Backspace" => " ⌫ Back ".to_string(),
        "Enter" => " ⏎ Enter ".to_string(),
        _ => format!(" {} ", key),
    }
}

fn render_keys(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from("")];
    for row in LAYOUT.iter() {
        let mut spans = Vec::with_capacity(row.len() * 2);
        for key in row.iter() {
            spans.push(Span::styled(
                key_label(key),
                styles::key_style(app.keyboard.is_pressed(key)),
            ));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    let typing = app.state == AppState::Typing;
    let title = if typing {
        " Keyboard (typing, Esc to stop) "
    } else {
        " Keyboard "
    };
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(typing));

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn render_text(frame: &mut Frame, app: &App, area: Rect) {
    let typing = app.state == AppState::Typing;
    let text = app.keyboard.text();

    let mut lines: Vec<Line> = if text.is_empty() && !typing {
        vec![Line::from(vec![
            Span::styled("Press ", styles::muted_style()),
            Span::styled("[Enter]", styles::help_key_style()),
            Span::styled(" to start typing", styles::muted_style()),
        ])]
    } else {
        text.split('\n')
            .map(|line| Line::from(Span::styled(line.to_string(), styles::list_item_style())))
            .collect()
    };
    if typing {
        if let Some(last) = lines.last_mut() {
            last.spans.push(Span::styled("█", styles::highlight_style()));
        }
    }

    let block = Block::default()
        .title(format!(" Text ({} chars) ", text.chars().count()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(typing));

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_label() {
        assert_eq!(key_label("Q"), " Q ");
        assert!(key_label("Space").contains("Space"));
        assert!(key_label("Enter").contains("Enter"));
    }
}
