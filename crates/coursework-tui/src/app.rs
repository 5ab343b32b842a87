//! Application state management for Coursework.
//!
//! This module contains the core `App` struct that owns the auth flow, the
//! exercise state machines, UI state, and background task coordination.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use coursework_core::api::ApiResult;
use coursework_core::auth::{ActiveToken, AuthFlow, Credentials, RestoreOutcome};
use coursework_core::config::Config;
use coursework_core::exercises::{
    ColorPicker, FlipMatch, FlipOutcome, QuizGame, QuizPhase, ScreenKeyboard, CATEGORIES,
    MISMATCH_HIDE_DELAY, REVEAL_DURATION,
};
use coursework_core::models::{ProfileUpdate, Question, UserProfile};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 8;

const MAX_EMAIL_LENGTH: usize = 100;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_NAME_LENGTH: usize = 80;
const MAX_BIO_LENGTH: usize = 500;
const MAX_PATH_LENGTH: usize = 1024;

/// Environment variables that prefill the login form
const ENV_EMAIL: &str = "COURSEWORK_EMAIL";
const ENV_PASSWORD: &str = "COURSEWORK_PASSWORD";

/// Flip match board width in cards
pub const FLIP_COLUMNS: usize = 4;

/// Colour picker cursor moves this many steps across the image per keypress
const PICKER_STEPS: u32 = 48;

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Account,
    Quiz,
    FlipMatch,
    Keyboard,
    ColorPicker,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Account,
        Tab::Quiz,
        Tab::FlipMatch,
        Tab::Keyboard,
        Tab::ColorPicker,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Account => "Account",
            Tab::Quiz => "Quiz",
            Tab::FlipMatch => "Flip Match",
            Tab::Keyboard => "Keyboard",
            Tab::ColorPicker => "Colour Picker",
        }
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Tab::Account => Tab::Quiz,
            Tab::Quiz => Tab::FlipMatch,
            Tab::FlipMatch => Tab::Keyboard,
            Tab::Keyboard => Tab::ColorPicker,
            Tab::ColorPicker => Tab::Account,
        }
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Tab::Account => Tab::ColorPicker,
            Tab::Quiz => Tab::Account,
            Tab::FlipMatch => Tab::Quiz,
            Tab::Keyboard => Tab::FlipMatch,
            Tab::ColorPicker => Tab::Keyboard,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    LoggingIn,
    EditingProfile,
    /// Keyboard tab captures every key
    Typing,
    /// Colour picker is asking for an image path
    EnteringPath,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    KeepLoggedIn,
    Button,
}

/// Profile form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileFocus {
    Name,
    Bio,
    Button,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from background tasks back to the UI loop.
enum BackgroundResult {
    /// Quiz questions for the load tagged `generation`
    Questions {
        generation: u64,
        result: ApiResult<Vec<Question>>,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub auth: AuthFlow,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub status_message: Option<String>,

    // Account
    pub profile: Option<UserProfile>,
    pub session_info: Option<ActiveToken>,
    pub profile_error: Option<String>,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub keep_logged_in: bool,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Profile form state
    pub profile_name: String,
    pub profile_bio: String,
    pub profile_focus: ProfileFocus,
    pub profile_form_error: Option<String>,

    // Quiz
    pub quiz: QuizGame,
    pub quiz_selection: usize,
    quiz_generation: u64,
    quiz_reveal_deadline: Option<Instant>,

    // Flip match
    pub flip: FlipMatch,
    pub flip_selection: usize,
    flip_hide_deadline: Option<Instant>,

    // Keyboard
    pub keyboard: ScreenKeyboard,
    /// The terminal reports key releases, so presses are not expired on a timer
    pub key_release_supported: bool,

    // Colour picker
    pub picker: ColorPicker,
    pub picker_path: String,
    pub picker_cursor: (u32, u32),
    pub picker_error: Option<String>,

    // Background task channel
    bg_rx: mpsc::Receiver<BackgroundResult>,
    bg_tx: mpsc::Sender<BackgroundResult>,
}

impl App {
    /// Create a new application instance wired up from `config`
    pub fn new(config: Config) -> Result<Self> {
        debug!(api = %config.api_base_url(), backend = ?config.persistent_backend, "Config loaded");
        let auth = AuthFlow::from_config(&config)?;
        Ok(Self::with_parts(config, auth))
    }

    pub fn with_parts(config: Config, auth: AuthFlow) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Prefill from env vars or config
        let login_email = std::env::var(ENV_EMAIL)
            .ok()
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();
        let login_password = std::env::var(ENV_PASSWORD).unwrap_or_default();

        Self {
            config,
            auth,

            state: AppState::Normal,
            current_tab: Tab::Account,
            status_message: None,

            profile: None,
            session_info: None,
            profile_error: None,

            login_email,
            login_password,
            keep_logged_in: false,
            login_focus: LoginFocus::Email,
            login_error: None,

            profile_name: String::new(),
            profile_bio: String::new(),
            profile_focus: ProfileFocus::Name,
            profile_form_error: None,

            quiz: QuizGame::new(),
            quiz_selection: 0,
            quiz_generation: 0,
            quiz_reveal_deadline: None,

            flip: FlipMatch::new(0),
            flip_selection: 0,
            flip_hide_deadline: None,

            keyboard: ScreenKeyboard::new(),
            key_release_supported: false,

            picker: ColorPicker::new(),
            picker_path: String::new(),
            picker_cursor: (0, 0),
            picker_error: None,

            bg_rx: rx,
            bg_tx: tx,
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session_info.is_some()
    }

    fn refresh_session_info(&mut self) {
        self.session_info = self.auth.session().read();
    }

    /// Pick up a session left by an earlier run
    pub async fn restore_session(&mut self) {
        match self.auth.restore().await {
            RestoreOutcome::Restored { profile, token } => {
                self.status_message = Some(format!("Logged in from {}", token.kind));
                self.profile = Some(profile);
                self.session_info = Some(token);
                self.profile_error = None;
            }
            RestoreOutcome::NoSession => {
                self.start_login();
            }
            RestoreOutcome::Expired => {
                self.clear_account();
                self.start_login();
                self.login_error = Some("Session expired. Please login again.".to_string());
            }
            RestoreOutcome::Failed(e) => {
                self.refresh_session_info();
                self.profile_error = Some(e.user_message());
                self.status_message = Some("Could not load profile. Press [r] to retry.".into());
            }
        }
    }

    /// Show the login overlay
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) {
        let credentials = Credentials::new(&self.login_email, &self.login_password);
        if let Err(e) = credentials.validate() {
            self.login_error = Some(e.user_message());
            return;
        }
        self.login_error = None;

        match self.auth.login(&credentials, self.keep_logged_in).await {
            Ok(outcome) => {
                self.config.last_email = Some(credentials.email().to_string());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.profile = Some(outcome.profile);
                self.profile_error = None;
                self.refresh_session_info();
                self.state = AppState::Normal;
                self.current_tab = Tab::Account;
                self.status_message = Some(format!("Logged in ({})", outcome.storage));
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.refresh_session_info();
                if self.session_info.is_some() {
                    // Token stored but the profile could not be read
                    self.login_password.clear();
                    self.state = AppState::Normal;
                    self.current_tab = Tab::Account;
                    self.profile_error = Some(e.user_message());
                } else {
                    self.login_error = Some(e.user_message());
                }
            }
        }
    }

    /// Re-read the profile for the active session
    pub async fn reload_profile(&mut self) {
        match self.auth.refresh_profile().await {
            Ok(profile) => {
                self.profile = Some(profile);
                self.profile_error = None;
                self.status_message = Some("Profile reloaded".to_string());
            }
            Err(e) if e.is_auth_failure() => {
                self.clear_account();
                self.start_login();
                self.login_error = Some(e.user_message());
            }
            Err(e) => {
                self.profile_error = Some(e.user_message());
            }
        }
    }

    /// Open the profile form prefilled from the current profile
    pub fn start_profile_edit(&mut self) {
        if !self.auth.features().profile_editing {
            self.status_message = Some("Profile editing is disabled".to_string());
            return;
        }
        let Some(ref profile) = self.profile else {
            return;
        };
        let update = ProfileUpdate::from_profile(profile);
        self.profile_name = update.name;
        self.profile_bio = update.bio;
        self.profile_focus = ProfileFocus::Name;
        self.profile_form_error = None;
        self.state = AppState::EditingProfile;
    }

    pub async fn save_profile(&mut self) {
        let update = ProfileUpdate::new(&self.profile_name, &self.profile_bio);
        match self.auth.update_profile(&update).await {
            Ok(profile) => {
                self.profile = Some(profile);
                self.profile_error = None;
                self.state = AppState::Normal;
                self.status_message = Some("Profile updated".to_string());
            }
            Err(e) if e.is_auth_failure() => {
                self.clear_account();
                self.start_login();
                self.login_error = Some(e.user_message());
            }
            Err(e) => {
                self.profile_form_error = Some(e.user_message());
            }
        }
    }

    pub async fn logout(&mut self) {
        self.auth.logout().await;
        self.clear_account();
        self.status_message = Some("Logged out".to_string());
        info!("User logged out");
    }

    fn clear_account(&mut self) {
        self.profile = None;
        self.session_info = None;
        self.profile_error = None;
    }

    // =========================================================================
    // Background tasks
    // =========================================================================

    /// Fetch quiz questions in the background. Results from earlier loads
    /// still in flight are discarded.
    pub fn load_quiz(&mut self) {
        self.quiz_generation += 1;
        let generation = self.quiz_generation;
        self.quiz.restart();
        self.quiz_selection = 0;
        self.quiz_reveal_deadline = None;

        let api = self.auth.api().clone();
        let tx = self.bg_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_questions().await;
            if tx
                .send(BackgroundResult::Questions { generation, result })
                .await
                .is_err()
            {
                debug!("UI closed before quiz load finished");
            }
        });
        debug!(generation, "Quiz load started");
    }

    /// Load the quiz the first time its tab is shown
    pub fn ensure_quiz_loaded(&mut self) {
        if self.quiz_generation == 0 {
            self.load_quiz();
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        while let Ok(result) = self.bg_rx.try_recv() {
            self.process_background_result(result);
        }
    }

    fn process_background_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Questions { generation, result } => {
                if generation != self.quiz_generation {
                    debug!(generation, current = self.quiz_generation, "Discarding stale quiz load");
                    return;
                }
                match result {
                    Ok(questions) => {
                        info!(count = questions.len(), "Quiz loaded");
                        self.quiz.load(questions);
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to load quiz");
                        self.quiz.load_failed(e.user_message());
                    }
                }
            }
        }
    }

    // =========================================================================
    // Timed transitions
    // =========================================================================

    /// Fire any deadline that has passed
    pub fn tick(&mut self, now: Instant) {
        if self.quiz_reveal_deadline.is_some_and(|d| now >= d) {
            self.quiz_reveal_deadline = None;
            self.quiz.advance();
            self.quiz_selection = 0;
        }
        if self.flip_hide_deadline.is_some_and(|d| now >= d) {
            self.flip_hide_deadline = None;
            self.flip.hide_mismatch();
        }
        if !self.key_release_supported {
            self.keyboard.expire(now);
        }
    }

    // =========================================================================
    // Quiz
    // =========================================================================

    pub fn answer_quiz(&mut self, now: Instant) {
        if self.quiz.answer(self.quiz_selection).is_some() {
            self.quiz_reveal_deadline = Some(now + REVEAL_DURATION);
        }
    }

    pub fn move_quiz_selection(&mut self, down: bool) {
        let count = self
            .quiz
            .current_question()
            .map(|q| q.answers.len())
            .unwrap_or(0);
        if count == 0 || self.quiz.is_showing_result() {
            return;
        }
        self.quiz_selection = if down {
            (self.quiz_selection + 1).min(count - 1)
        } else {
            self.quiz_selection.saturating_sub(1)
        };
    }

    pub fn quiz_is_loading(&self) -> bool {
        matches!(self.quiz.phase(), QuizPhase::Loading)
    }

    // =========================================================================
    // Flip match
    // =========================================================================

    pub fn flip_selected(&mut self, now: Instant) {
        match self.flip.flip(self.flip_selection) {
            FlipOutcome::Mismatch => {
                self.flip_hide_deadline = Some(now + MISMATCH_HIDE_DELAY);
            }
            FlipOutcome::Matched if self.flip.is_complete() => {
                self.status_message = Some(format!(
                    "All pairs found in {} moves!",
                    self.flip.moves()
                ));
            }
            _ => {}
        }
    }

    /// Move the board cursor by whole cells, clamped to the board
    pub fn move_flip_selection(&mut self, dx: isize, dy: isize) {
        let len = self.flip.len();
        if len == 0 {
            return;
        }
        let rows = len.div_ceil(FLIP_COLUMNS);
        let col = (self.flip_selection % FLIP_COLUMNS) as isize + dx;
        let row = (self.flip_selection / FLIP_COLUMNS) as isize + dy;
        let col = col.clamp(0, FLIP_COLUMNS as isize - 1) as usize;
        let row = row.clamp(0, rows as isize - 1) as usize;
        self.flip_selection = (row * FLIP_COLUMNS + col).min(len - 1);
    }

    pub fn new_flip_game(&mut self, category: usize) {
        self.flip.new_game(category);
        self.flip_selection = 0;
        self.flip_hide_deadline = None;
    }

    pub fn next_flip_category(&mut self) {
        let next = (self.flip.category_index() + 1) % CATEGORIES.len();
        self.new_flip_game(next);
    }

    // =========================================================================
    // Colour picker
    // =========================================================================

    pub fn start_path_entry(&mut self) {
        self.picker_error = None;
        self.state = AppState::EnteringPath;
    }

    pub fn load_picker_image(&mut self) {
        let path = PathBuf::from(self.picker_path.trim());
        match self.picker.load(&path) {
            Ok(()) => {
                self.picker_error = None;
                self.picker_cursor = self
                    .picker
                    .dimensions()
                    .map(|(w, h)| (w / 2, h / 2))
                    .unwrap_or((0, 0));
                self.state = AppState::Normal;
            }
            Err(e) => {
                self.picker_error = Some(e.to_string());
            }
        }
    }

    pub fn move_picker_cursor(&mut self, dx: i64, dy: i64) {
        let Some((w, h)) = self.picker.dimensions() else {
            return;
        };
        let step_x = (w / PICKER_STEPS).max(1) as i64;
        let step_y = (h / PICKER_STEPS).max(1) as i64;
        let x = (self.picker_cursor.0 as i64 + dx * step_x).clamp(0, w as i64 - 1);
        let y = (self.picker_cursor.1 as i64 + dy * step_y).clamp(0, h as i64 - 1);
        self.picker_cursor = (x as u32, y as u32);
    }

    pub fn pick_color(&mut self) {
        let (x, y) = self.picker_cursor;
        match self.picker.pick(x, y) {
            Ok(color) => {
                self.picker_error = None;
                self.status_message = Some(format!("Picked {} {}", color.hex(), color.css()));
            }
            Err(e) => self.picker_error = Some(e.to_string()),
        }
    }

    pub fn reset_picker(&mut self) {
        self.picker.reset();
        self.picker_path.clear();
        self.picker_cursor = (0, 0);
        self.picker_error = None;
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c)
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

pub fn can_add_name_char(current_len: usize, c: char) -> bool {
    current_len < MAX_NAME_LENGTH && is_valid_input_char(c)
}

pub fn can_add_bio_char(current_len: usize, c: char) -> bool {
    current_len < MAX_BIO_LENGTH && is_valid_input_char(c)
}

pub fn can_add_path_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PATH_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use coursework_core::api::ApiClient;
    use coursework_core::auth::{MemoryStorage, SessionStore};
    use coursework_core::config::LoginFeatures;
    use coursework_core::ApiError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_app() -> App {
        test_app_with(LoginFeatures::default())
    }

    fn test_app_with(features: LoginFeatures) -> App {
        test_app_at("http://127.0.0.1:9", features)
    }

    fn test_app_at(base_url: &str, features: LoginFeatures) -> App {
        let api = ApiClient::with_endpoints(
            base_url,
            &format!("{}/quiz", base_url),
            Duration::from_millis(500),
        )
        .unwrap();
        let session = SessionStore::new(
            Box::new(MemoryStorage::new()),
            Box::new(MemoryStorage::new()),
        );
        let auth = AuthFlow::new(api, session, features);
        App::with_parts(Config::default(), auth)
    }

    fn question(correct: usize) -> Question {
        Question {
            question: "q".into(),
            answers: vec!["a".into(), "b".into()],
            correct,
        }
    }

    // -------------------------------------------------------------------------
    // Tab Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_tab_next() {
        assert_eq!(Tab::Account.next(), Tab::Quiz);
        assert_eq!(Tab::Quiz.next(), Tab::FlipMatch);
        assert_eq!(Tab::FlipMatch.next(), Tab::Keyboard);
        assert_eq!(Tab::Keyboard.next(), Tab::ColorPicker);
        assert_eq!(Tab::ColorPicker.next(), Tab::Account); // Wraps around
    }

    #[test]
    fn test_tab_prev() {
        for tab in Tab::ALL {
            assert_eq!(tab.next().prev(), tab);
        }
        assert_eq!(Tab::Account.prev(), Tab::ColorPicker);
    }

    // -------------------------------------------------------------------------
    // Background results and deadlines
    // -------------------------------------------------------------------------

    #[test]
    fn test_stale_quiz_load_discarded() {
        let mut app = test_app();
        app.quiz_generation = 2;
        app.process_background_result(BackgroundResult::Questions {
            generation: 1,
            result: Ok(vec![question(0)]),
        });
        assert_eq!(app.quiz.phase(), &QuizPhase::Loading);

        app.process_background_result(BackgroundResult::Questions {
            generation: 2,
            result: Ok(vec![question(0)]),
        });
        assert_eq!(app.quiz.phase(), &QuizPhase::InProgress);
    }

    #[test]
    fn test_failed_quiz_load_shows_empty() {
        let mut app = test_app();
        app.quiz_generation = 1;
        app.process_background_result(BackgroundResult::Questions {
            generation: 1,
            result: Err(ApiError::Timeout),
        });
        assert_eq!(app.quiz.phase(), &QuizPhase::Empty);
        assert_eq!(app.quiz.load_error(), Some("Request timeout. Please try again."));
    }

    #[test]
    fn test_quiz_reveal_advances_after_deadline() {
        let mut app = test_app();
        app.quiz.load(vec![question(1), question(0)]);
        let start = Instant::now();

        app.move_quiz_selection(true);
        app.answer_quiz(start);
        assert!(app.quiz.is_showing_result());
        assert_eq!(app.quiz.score(), 1);

        app.tick(start + Duration::from_millis(1000));
        assert_eq!(app.quiz.current_index(), 0);

        app.tick(start + REVEAL_DURATION);
        assert_eq!(app.quiz.current_index(), 1);
        assert!(!app.quiz.is_showing_result());
        assert_eq!(app.quiz_selection, 0);
    }

    #[test]
    fn test_flip_mismatch_hidden_after_deadline() {
        let mut app = test_app();
        app.flip = FlipMatch::from_deck(0, vec!["A", "B", "A", "B"]);
        let start = Instant::now();

        app.flip_selection = 0;
        app.flip_selected(start);
        app.flip_selection = 1;
        app.flip_selected(start);
        assert!(app.flip.has_pending_mismatch());

        app.tick(start + Duration::from_millis(500));
        assert!(app.flip.has_pending_mismatch());
        app.tick(start + MISMATCH_HIDE_DELAY);
        assert!(!app.flip.has_pending_mismatch());
    }

    #[test]
    fn test_flip_selection_clamped() {
        let mut app = test_app();
        app.move_flip_selection(-1, -1);
        assert_eq!(app.flip_selection, 0);
        app.move_flip_selection(10, 10);
        assert_eq!(app.flip_selection, 15);
        app.move_flip_selection(-1, 0);
        assert_eq!(app.flip_selection, 14);
    }

    #[test]
    fn test_key_presses_expire_without_release_support() {
        let mut app = test_app();
        let start = Instant::now();
        app.keyboard.press("a", start);
        app.tick(start + Duration::from_secs(1));
        assert!(!app.keyboard.is_pressed("A"));

        app.key_release_supported = true;
        app.keyboard.press("a", start);
        app.tick(start + Duration::from_secs(1));
        assert!(app.keyboard.is_pressed("A"));
    }

    #[tokio::test]
    async fn test_empty_login_sets_error_without_state_change() {
        let mut app = test_app();
        app.login_email = "a@b.com".into();
        app.login_password.clear();
        app.start_login();
        app.attempt_login().await;
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(
            app.login_error.as_deref(),
            Some("Please enter both email and password")
        );
    }

    #[tokio::test]
    async fn test_logout_clears_account() {
        let mut app = test_app_with(LoginFeatures {
            remote_logout: false,
            ..Default::default()
        });
        app.auth.session().save("T", false).unwrap();
        app.refresh_session_info();
        assert!(app.is_authenticated());

        app.logout().await;
        assert!(!app.is_authenticated());
        assert!(app.auth.session().read().is_none());
        assert_eq!(app.status_message.as_deref(), Some("Logged out"));
    }

    async fn mount_unauthorized_profile(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/user"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Unauthenticated."})),
            )
            .mount(server)
            .await;
    }

    fn assert_signed_out(app: &App) {
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(app.profile.is_none());
        assert!(!app.is_authenticated());
        assert!(app.auth.session().read().is_none());
        assert_eq!(
            app.login_error.as_deref(),
            Some("Session expired. Please login again.")
        );
    }

    #[tokio::test]
    async fn test_restore_with_rejected_token_shows_login() {
        let server = MockServer::start().await;
        mount_unauthorized_profile(&server).await;

        let mut app = test_app_at(&server.uri(), LoginFeatures::default());
        app.auth.session().save("T1", true).unwrap();

        app.restore_session().await;
        assert_signed_out(&app);
    }

    #[tokio::test]
    async fn test_reload_with_rejected_token_shows_login() {
        let server = MockServer::start().await;
        mount_unauthorized_profile(&server).await;

        let mut app = test_app_at(&server.uri(), LoginFeatures::default());
        app.auth.session().save("T1", false).unwrap();
        app.refresh_session_info();
        app.profile = coursework_core::models::UserProfile::from_value(
            serde_json::json!({"name": "Ada"}),
        );
        assert!(app.is_authenticated());

        app.reload_profile().await;
        assert_signed_out(&app);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, 'a'));
        assert!(can_add_email_char(99, '@'));
        assert!(!can_add_email_char(100, 'a'));
        assert!(!can_add_email_char(0, '\n'));
        assert!(!can_add_email_char(0, '\t'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\x00'));
    }

    #[test]
    fn test_can_add_profile_chars() {
        assert!(can_add_name_char(79, 'é'));
        assert!(!can_add_name_char(80, 'a'));
        assert!(can_add_bio_char(499, ' '));
        assert!(!can_add_bio_char(500, 'a'));
        assert!(can_add_path_char(0, '/'));
        assert!(!can_add_path_char(0, '\r'));
    }
}
