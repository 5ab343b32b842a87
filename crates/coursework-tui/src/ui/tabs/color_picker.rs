use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use coursework_core::exercises::Rgb;
use coursework_core::utils::truncate_string;

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(36)])
        .split(area);

    render_image(frame, app, chunks[0]);
    render_info(frame, app, chunks[1]);
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}

/// Map an image pixel to the preview cell that shows it. Each cell covers
/// two preview pixel rows.
fn pixel_to_cell(pixel: (u32, u32), image: (u32, u32), preview: (u32, u32)) -> (u32, u32) {
    let (w, h) = (image.0.max(1) as u64, image.1.max(1) as u64);
    let x = pixel.0 as u64 * preview.0 as u64 / w;
    let y = pixel.1 as u64 * preview.1 as u64 / h;
    (x as u32, (y / 2) as u32)
}

/// Draws the cached preview; the picker rebuilds it only when the area resizes
fn render_image(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(" Image ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (Some(dims), Some(preview)) = (
        app.picker.dimensions(),
        app.picker.preview(inner.width as u32, inner.height as u32 * 2),
    ) else {
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Press ", styles::muted_style()),
                Span::styled("[o]", styles::help_key_style()),
                Span::styled(" to open an image", styles::muted_style()),
            ]),
        ]);
        frame.render_widget(hint, inner);
        return;
    };

    let (pw, ph) = preview.dimensions();
    let cursor = pixel_to_cell(app.picker_cursor, dims, (pw, ph));

    let mut lines = Vec::with_capacity(ph.div_ceil(2) as usize);
    for row in 0..ph.div_ceil(2) {
        let mut spans = Vec::with_capacity(pw as usize);
        for col in 0..pw {
            let [r, g, b, _] = preview.get_pixel(col, row * 2).0;
            let top = Color::Rgb(r, g, b);
            let bottom = if row * 2 + 1 < ph {
                let [r, g, b, _] = preview.get_pixel(col, row * 2 + 1).0;
                Color::Rgb(r, g, b)
            } else {
                Color::Reset
            };
            if (col, row) == cursor {
                spans.push(Span::styled(
                    "+",
                    Style::default().fg(Color::White).bg(Color::Black),
                ));
            } else {
                spans.push(Span::styled("▀", Style::default().fg(top).bg(bottom)));
            }
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, app: &App, area: Rect) {
    let color = app.picker.selected();
    let width = area.width.saturating_sub(4) as usize;

    let swatch = " ".repeat(width.max(4));
    let mut lines = vec![
        Line::from(Span::styled(swatch.clone(), Style::default().bg(to_color(color)))),
        Line::from(Span::styled(swatch, Style::default().bg(to_color(color)))),
        Line::from(""),
        Line::from(vec![
            Span::styled(" HEX  ", styles::muted_style()),
            Span::styled(color.hex(), styles::highlight_style()),
        ]),
        Line::from(vec![
            Span::styled(" RGB  ", styles::muted_style()),
            Span::styled(color.css(), styles::highlight_style()),
        ]),
        Line::from(""),
    ];

    match app.picker.source() {
        Some(path) => {
            let path = path.display().to_string();
            lines.push(Line::from(vec![
                Span::styled(" File ", styles::muted_style()),
                Span::styled(
                    truncate_string(&path, width.saturating_sub(6).max(8)),
                    styles::list_item_style(),
                ),
            ]));
        }
        None => lines.push(Line::from(Span::styled(
            " No image loaded",
            styles::muted_style(),
        ))),
    }

    if let Some((w, h)) = app.picker.dimensions() {
        lines.push(Line::from(vec![
            Span::styled(" Size ", styles::muted_style()),
            Span::styled(format!("{} x {}", w, h), styles::list_item_style()),
        ]));
        lines.push(Line::from(vec![
            Span::styled(" At   ", styles::muted_style()),
            Span::styled(
                format!("{}, {}", app.picker_cursor.0, app.picker_cursor.1),
                styles::list_item_style(),
            ),
        ]));
    }

    if let Some(ref error) = app.picker_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(" Colour ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

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
    fn test_pixel_to_cell() {
        // 100x100 image shown as a 20x20 pixel preview (20x10 cells)
        assert_eq!(pixel_to_cell((0, 0), (100, 100), (20, 20)), (0, 0));
        assert_eq!(pixel_to_cell((50, 50), (100, 100), (20, 20)), (10, 5));
        assert_eq!(pixel_to_cell((99, 99), (100, 100), (20, 20)), (19, 9));
    }
}
