//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use coursework_core::exercises::QuizPhase;

use crate::app::{
    can_add_bio_char, can_add_email_char, can_add_name_char, can_add_password_char,
    can_add_path_char, App, AppState, LoginFocus, ProfileFocus, Tab,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    if key.kind == KeyEventKind::Release {
        handle_key_release(app, key);
        return Ok(false);
    }

    match app.state {
        AppState::LoggingIn => {
            handle_login_input(app, key).await;
            return Ok(false);
        }
        AppState::EditingProfile => {
            handle_profile_input(app, key).await;
            return Ok(false);
        }
        AppState::Typing => {
            handle_typing_input(app, key);
            return Ok(false);
        }
        AppState::EnteringPath => {
            handle_path_input(app, key);
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Quitting => return Ok(true),
        AppState::Normal => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            switch_tab(app, Tab::ALL[index]);
            return Ok(false);
        }
        KeyCode::Tab => {
            switch_tab(app, app.current_tab.next());
            return Ok(false);
        }
        KeyCode::BackTab => {
            switch_tab(app, app.current_tab.prev());
            return Ok(false);
        }
        _ => {}
    }

    // Tab-specific keys
    match app.current_tab {
        Tab::Account => handle_account_input(app, key).await,
        Tab::Quiz => handle_quiz_input(app, key),
        Tab::FlipMatch => handle_flip_input(app, key),
        Tab::Keyboard => handle_keyboard_tab_input(app, key),
        Tab::ColorPicker => handle_picker_input(app, key),
    }

    Ok(false)
}

fn switch_tab(app: &mut App, tab: Tab) {
    app.current_tab = tab;
    if tab == Tab::Quiz {
        app.ensure_quiz_loaded();
    }
}

/// Name of a key as the on-screen keyboard labels it
fn key_name(code: KeyCode) -> Option<String> {
    match code {
        KeyCode::Char(c) => Some(c.to_string()),
        KeyCode::Backspace => Some("Backspace".to_string()),
        KeyCode::Enter => Some("Enter".to_string()),
        _ => None,
    }
}

fn handle_key_release(app: &mut App, key: KeyEvent) {
    if app.state == AppState::Typing {
        if let Some(name) = key_name(key.code) {
            app.keyboard.release(&name);
        }
    }
}

// ============================================================================
// Forms
// ============================================================================

fn next_login_focus(app: &App, focus: LoginFocus) -> LoginFocus {
    let remember_me = app.auth.features().remember_me;
    match focus {
        LoginFocus::Email => LoginFocus::Password,
        LoginFocus::Password if remember_me => LoginFocus::KeepLoggedIn,
        LoginFocus::Password | LoginFocus::KeepLoggedIn => LoginFocus::Button,
        LoginFocus::Button => LoginFocus::Email,
    }
}

fn prev_login_focus(app: &App, focus: LoginFocus) -> LoginFocus {
    let remember_me = app.auth.features().remember_me;
    match focus {
        LoginFocus::Email => LoginFocus::Button,
        LoginFocus::Password => LoginFocus::Email,
        LoginFocus::KeepLoggedIn => LoginFocus::Password,
        LoginFocus::Button if remember_me => LoginFocus::KeepLoggedIn,
        LoginFocus::Button => LoginFocus::Password,
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            // Exercises stay usable without an account
            app.state = AppState::Normal;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = next_login_focus(app, app.login_focus);
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = prev_login_focus(app, app.login_focus);
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::KeepLoggedIn => app.keep_logged_in = !app.keep_logged_in,
            LoginFocus::Button => app.attempt_login().await,
            focus => app.login_focus = next_login_focus(app, focus),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::KeepLoggedIn | LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.chars().count(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::KeepLoggedIn => {
                if c == ' ' {
                    app.keep_logged_in = !app.keep_logged_in;
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
}

async fn handle_profile_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.profile_focus = match app.profile_focus {
                ProfileFocus::Name => ProfileFocus::Bio,
                ProfileFocus::Bio => ProfileFocus::Button,
                ProfileFocus::Button => ProfileFocus::Name,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.profile_focus = match app.profile_focus {
                ProfileFocus::Name => ProfileFocus::Button,
                ProfileFocus::Bio => ProfileFocus::Name,
                ProfileFocus::Button => ProfileFocus::Bio,
            };
        }
        KeyCode::Enter => match app.profile_focus {
            ProfileFocus::Name => app.profile_focus = ProfileFocus::Bio,
            ProfileFocus::Bio => app.profile_focus = ProfileFocus::Button,
            ProfileFocus::Button => app.save_profile().await,
        },
        KeyCode::Backspace => match app.profile_focus {
            ProfileFocus::Name => {
                app.profile_name.pop();
            }
            ProfileFocus::Bio => {
                app.profile_bio.pop();
            }
            ProfileFocus::Button => {}
        },
        KeyCode::Char(c) => match app.profile_focus {
            ProfileFocus::Name => {
                if can_add_name_char(app.profile_name.chars().count(), c) {
                    app.profile_name.push(c);
                }
            }
            ProfileFocus::Bio => {
                if can_add_bio_char(app.profile_bio.chars().count(), c) {
                    app.profile_bio.push(c);
                }
            }
            ProfileFocus::Button => {}
        },
        _ => {}
    }
}

fn handle_path_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.picker_error = None;
            app.state = AppState::Normal;
        }
        KeyCode::Enter => app.load_picker_image(),
        KeyCode::Backspace => {
            app.picker_path.pop();
        }
        KeyCode::Char(c) => {
            if can_add_path_char(app.picker_path.chars().count(), c) {
                app.picker_path.push(c);
            }
        }
        _ => {}
    }
}

fn handle_typing_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.state = AppState::Normal;
        return;
    }
    if let Some(name) = key_name(key.code) {
        app.keyboard.press(&name, Instant::now());
    }
    match key.code {
        KeyCode::Char(c) => app.keyboard.type_char(c),
        KeyCode::Backspace => app.keyboard.backspace(),
        KeyCode::Enter => app.keyboard.newline(),
        _ => {}
    }
}

// ============================================================================
// Tabs
// ============================================================================

async fn handle_account_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('l') if !app.is_authenticated() => app.start_login(),
        KeyCode::Char('e') if app.profile.is_some() => app.start_profile_edit(),
        KeyCode::Char('r') if app.is_authenticated() => app.reload_profile().await,
        KeyCode::Char('x') if app.is_authenticated() => app.logout().await,
        _ => {}
    }
}

fn handle_quiz_input(app: &mut App, key: KeyEvent) {
    match app.quiz.phase() {
        QuizPhase::Loading => {}
        QuizPhase::Empty => {
            if matches!(key.code, KeyCode::Char('n') | KeyCode::Enter) {
                app.load_quiz();
            }
        }
        QuizPhase::InProgress => match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.move_quiz_selection(false),
            KeyCode::Down | KeyCode::Char('j') => app.move_quiz_selection(true),
            KeyCode::Enter | KeyCode::Char(' ') => app.answer_quiz(Instant::now()),
            _ => {}
        },
        QuizPhase::Complete => match key.code {
            KeyCode::Char('r') => app.quiz.start_review(),
            KeyCode::Char('n') => app.load_quiz(),
            _ => {}
        },
        QuizPhase::Reviewing => match key.code {
            KeyCode::Left | KeyCode::Char('h') => app.quiz.prev_review(),
            KeyCode::Right | KeyCode::Char('l') => app.quiz.next_review(),
            KeyCode::Esc | KeyCode::Char('b') => app.quiz.back_to_score(),
            KeyCode::Char('n') => app.load_quiz(),
            _ => {}
        },
    }
}

fn handle_flip_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.move_flip_selection(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.move_flip_selection(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.move_flip_selection(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_flip_selection(0, 1),
        KeyCode::Enter | KeyCode::Char(' ') => app.flip_selected(Instant::now()),
        KeyCode::Char('n') => app.new_flip_game(app.flip.category_index()),
        KeyCode::Char('c') => app.next_flip_category(),
        _ => {}
    }
}

fn handle_keyboard_tab_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('i') => app.state = AppState::Typing,
        KeyCode::Char('c') => app.keyboard.clear_text(),
        _ => {}
    }
}

fn handle_picker_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('o') => app.start_path_entry(),
        KeyCode::Char('r') => app.reset_picker(),
        KeyCode::Left | KeyCode::Char('h') => app.move_picker_cursor(-1, 0),
        KeyCode::Right | KeyCode::Char('l') => app.move_picker_cursor(1, 0),
        KeyCode::Up | KeyCode::Char('k') => app.move_picker_cursor(0, -1),
        KeyCode::Down | KeyCode::Char('j') => app.move_picker_cursor(0, 1),
        KeyCode::Enter | KeyCode::Char(' ') => app.pick_color(),
        _ => {}
    }
}
