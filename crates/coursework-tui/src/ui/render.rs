use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use coursework_core::utils::truncate_string;

use crate::app::{App, AppState, LoginFocus, ProfileFocus, Tab};

use super::styles;
use super::tabs::{account, color_picker, flip_match, keyboard, quiz};

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::EditingProfile => render_profile_overlay(frame, app),
        AppState::EnteringPath => render_path_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Typing | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Coursework";
    let user = match app.profile {
        Some(ref profile) => format!("{}  ", profile.display_name()),
        None if app.is_authenticated() => "Logged in  ".to_string(),
        None => String::new(),
    };
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize)
                .saturating_sub(title.len() + user.chars().count() + help_hint.len() + 4),
        )),
        Span::styled(user, styles::highlight_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &mut App, area: Rect) {
    match app.current_tab {
        Tab::Account => account::render(frame, app, area),
        Tab::Quiz => quiz::render(frame, app, area),
        Tab::FlipMatch => flip_match::render(frame, app, area),
        Tab::Keyboard => keyboard::render(frame, app, area),
        Tab::ColorPicker => color_picker::render(frame, app, area),
    }
}

fn shortcuts(app: &App) -> &'static str {
    if app.state == AppState::Typing {
        return "[Esc] stop typing";
    }
    match app.current_tab {
        Tab::Account if app.profile.is_some() => "[e]dit | [r]eload | [x] logout | [q]uit",
        Tab::Account if app.is_authenticated() => "[r]etry | [x] logout | [q]uit",
        Tab::Account => "[l]ogin | [q]uit",
        Tab::Quiz => "↑/↓ choose | Enter answer | [n]ew | [q]uit",
        Tab::FlipMatch => "arrows move | Enter flip | [n]ew | [c]ategory | [q]uit",
        Tab::Keyboard => "[i] type | [c]lear | [q]uit",
        Tab::ColorPicker => "[o]pen | arrows move | Enter pick | [r]eset | [q]uit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None if app.is_authenticated() => " Logged in ".to_string(),
        None => " Not logged in ".to_string(),
    };
    let right_text = format!(" {} ", shortcuts(app));

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc.to_string(), styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 26, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(" Coursework", styles::title_style())),
        Line::from(Span::styled(format!(" version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-5", "Switch tabs"),
        help_line("Tab", "Next / previous tab"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Account", styles::highlight_style())),
        help_line("l", "Log in"),
        help_line("e / r / x", "Edit profile / reload / log out"),
        Line::from(""),
        Line::from(Span::styled(" Exercises", styles::highlight_style())),
        help_line("↑/↓ Enter", "Quiz: choose and answer"),
        help_line("r / n", "Quiz: review answers / new quiz"),
        help_line("Enter", "Flip match: turn a card"),
        help_line("c", "Flip match: change category"),
        help_line("i", "Keyboard: start typing (Esc stops)"),
        help_line("o", "Colour picker: open an image"),
        help_line("Enter", "Colour picker: pick colour"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// One `Label: [value▌]` form row
fn field_line(label: &str, value: &str, focused: bool, width: usize) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let shown = if value.chars().count() > width {
        // Keep the end visible while typing
        let skip = value.chars().count() - width;
        value.chars().skip(skip).collect()
    } else {
        value.to_string()
    };
    let cursor = if focused { "▌" } else { " " };
    Line::from(vec![
        Span::styled(format!("  {:<10}[", label), styles::muted_style()),
        Span::styled(format!("{:<width$}{}", shown, cursor, width = width), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let (text, style) = if focused {
        (format!(" ▶ {} ◀ ", label), styles::selected_style())
    } else {
        (format!("   {}   ", label), styles::list_item_style())
    };
    Line::from(vec![
        Span::raw("              ["),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let remember_me = app.auth.features().remember_me;
    let mut height = 10;
    if remember_me {
        height += 1;
    }
    if app.login_error.is_some() {
        height += 2;
    }
    let area = centered_rect_fixed(50, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    lines.push(field_line(
        "Email:",
        &app.login_email,
        app.login_focus == LoginFocus::Email,
        26,
    ));
    let masked = "*".repeat(app.login_password.chars().count());
    lines.push(field_line(
        "Password:",
        &masked,
        app.login_focus == LoginFocus::Password,
        26,
    ));

    if remember_me {
        let focused = app.login_focus == LoginFocus::KeepLoggedIn;
        let mark = if app.keep_logged_in { "x" } else { " " };
        let style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("[{}] Keep me logged in", mark), style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(button_line("Login", app.login_focus == LoginFocus::Button));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(" Login ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_profile_overlay(frame: &mut Frame, app: &App) {
    let height = if app.profile_form_error.is_some() { 11 } else { 9 };
    let area = centered_rect_fixed(56, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        field_line(
            "Name:",
            &app.profile_name,
            app.profile_focus == ProfileFocus::Name,
            32,
        ),
        field_line(
            "Bio:",
            &app.profile_bio,
            app.profile_focus == ProfileFocus::Bio,
            32,
        ),
        Line::from(""),
        button_line("Save", app.profile_focus == ProfileFocus::Button),
    ];

    if let Some(ref error) = app.profile_form_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(" Edit Profile ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_path_overlay(frame: &mut Frame, app: &App) {
    let height = if app.picker_error.is_some() { 8 } else { 6 };
    let area = centered_rect_fixed(64, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        field_line("Path:", &app.picker_path, true, 46),
        Line::from(Span::styled(
            "  Enter to open, Esc to cancel",
            styles::muted_style(),
        )),
    ];
    if let Some(ref error) = app.picker_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", truncate_string(error, 60)),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(" Open Image ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect_fixed(50, 10, outer), Rect::new(25, 15, 50, 10));
        // Clamped to the outer area
        let small = Rect::new(0, 0, 20, 5);
        assert_eq!(centered_rect_fixed(50, 10, small), Rect::new(0, 0, 20, 5));
    }

    #[test]
    fn test_field_line_keeps_end_visible() {
        let line = field_line("Email:", "abcdefghij", false, 4);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("ghij"));
        assert!(!text.contains("abc"));
    }
}
