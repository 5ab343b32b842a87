use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use coursework_core::utils::{format_age, mask_token, truncate_string};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.profile.is_none() {
        render_signed_out(frame, app, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_profile(frame, app, chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(6)])
        .split(chunks[1]);

    render_other_fields(frame, app, right[0]);
    render_session(frame, app, right[1]);
}

fn render_signed_out(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![Line::from("")];
    if app.is_authenticated() {
        lines.push(Line::from(Span::styled(
            "  Your session is active but the profile could not be loaded.",
            styles::highlight_style(),
        )));
        if let Some(ref error) = app.profile_error {
            lines.push(Line::from(Span::styled(
                format!("  {}", error),
                styles::error_style(),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[r]", styles::help_key_style()),
            Span::styled(" to retry or ", styles::muted_style()),
            Span::styled("[x]", styles::help_key_style()),
            Span::styled(" to log out.", styles::muted_style()),
        ]));
    } else {
        lines.push(Line::from(Span::styled(
            "  You are not logged in.",
            styles::highlight_style(),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[l]", styles::help_key_style()),
            Span::styled(" to log in. The exercises work without an account.", styles::muted_style()),
        ]));
    }

    let block = Block::default()
        .title(" Account ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_profile(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref profile) = app.profile else {
        return;
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  Welcome, {}!", profile.display_name()),
            styles::title_style(),
        )),
        Line::from(""),
    ];

    let mut row = |label: &str, value: Option<&str>| {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<10}", label), styles::muted_style()),
            Span::styled(
                value.unwrap_or("-").to_string(),
                styles::list_item_style(),
            ),
        ]));
    };
    row("Name", profile.name());
    row("Email", profile.email());
    row("Bio", profile.bio());
    row("Picture", profile.picture_url());

    if let Some(ref error) = app.profile_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(" Profile ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_other_fields(frame: &mut Frame, app: &App, area: Rect) {
    let fields = app
        .profile
        .as_ref()
        .map(|p| p.other_fields())
        .unwrap_or_default();

    let value_width = (area.width as usize).saturating_sub(20).max(8);
    let items: Vec<ListItem> = fields
        .iter()
        .map(|(key, value)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:<16}", truncate_string(key, 16)), styles::muted_style()),
                Span::styled(truncate_string(value, value_width), styles::list_item_style()),
            ]))
        })
        .collect();

    let block = Block::default()
        .title(format!(" Details ({}) ", fields.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(List::new(items).block(block), area);
}

fn render_session(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match app.session_info {
        Some(ref active) => {
            let age = active
                .stored_at
                .map(|at| format_age(at, Utc::now()))
                .unwrap_or_else(|| "this session".to_string());
            vec![
                Line::from(vec![
                    Span::styled(" Stored in  ", styles::muted_style()),
                    Span::styled(active.kind.label(), styles::list_item_style()),
                ]),
                Line::from(vec![
                    Span::styled(" Token      ", styles::muted_style()),
                    Span::styled(mask_token(&active.token), styles::list_item_style()),
                ]),
                Line::from(vec![
                    Span::styled(" Saved      ", styles::muted_style()),
                    Span::styled(age, styles::list_item_style()),
                ]),
            ]
        }
        None => vec![Line::from(Span::styled(" No session", styles::muted_style()))],
    };

    let block = Block::default()
        .title(" Session ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
