use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use coursework_core::exercises::CardState;

use crate::app::{App, FLIP_COLUMNS};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8)])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_board(frame, app, chunks[1]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let total = app.flip.len() / 2;
    let mut spans = vec![
        Span::styled(" Category: ", styles::muted_style()),
        Span::styled(app.flip.category().label, styles::highlight_style()),
        Span::styled("   Moves: ", styles::muted_style()),
        Span::styled(app.flip.moves().to_string(), styles::list_item_style()),
        Span::styled("   Pairs: ", styles::muted_style()),
        Span::styled(
            format!("{}/{}", app.flip.matched_pairs(), total),
            styles::list_item_style(),
        ),
    ];
    if app.flip.is_complete() {
        spans.push(Span::styled("   Well done!", styles::success_style()));
    }

    let block = Block::default()
        .title(" Flip Match ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn card_style(state: CardState, selected: bool) -> Style {
    match state {
        CardState::Matched => styles::correct_style(),
        _ if selected => styles::border_style(true),
        CardState::Flipped => styles::highlight_style(),
        CardState::Hidden => styles::border_style(false),
    }
}

fn render_board(frame: &mut Frame, app: &App, area: Rect) {
    let len = app.flip.len();
    if len == 0 {
        return;
    }
    let rows = len.div_ceil(FLIP_COLUMNS);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    for (row, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, FLIP_COLUMNS as u32); FLIP_COLUMNS])
            .split(*row_area);

        for (col, cell) in cells.iter().enumerate() {
            let index = row * FLIP_COLUMNS + col;
            let Some(state) = app.flip.state(index) else {
                continue;
            };
            let selected = index == app.flip_selection;
            let symbol = app.flip.visible_symbol(index).unwrap_or("?");

            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(card_style(state, selected));

            // Vertically centre the symbol inside the card
            let padding = cell.height.saturating_sub(3) / 2;
            let mut lines = vec![Line::from(""); padding as usize];
            let text_style = match state {
                CardState::Hidden => styles::muted_style(),
                _ => styles::list_item_style(),
            };
            lines.push(Line::from(Span::styled(symbol, text_style)));

            let paragraph = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, *cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matched_card_style_wins_over_selection() {
        assert_eq!(card_style(CardState::Matched, true), styles::correct_style());
        assert_eq!(card_style(CardState::Hidden, true), styles::border_style(true));
        assert_eq!(card_style(CardState::Flipped, false), styles::highlight_style());
    }
}
