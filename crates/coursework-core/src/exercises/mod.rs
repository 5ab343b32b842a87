//! The interactive exercises.
//!
//! - `quiz`: multiple-choice quiz with timed answer reveal and review
//! - `flip_match`: memory matching card game
//! - `keyboard`: on-screen keyboard that mirrors key presses
//! - `color_picker`: sample colours from an image

pub mod color_picker;
pub mod flip_match;
pub mod keyboard;
pub mod quiz;

pub use color_picker::{ColorPicker, PickerError, Rgb};
pub use flip_match::{CardState, Category, FlipMatch, FlipOutcome, CATEGORIES, MISMATCH_HIDE_DELAY};
pub use keyboard::{normalize_key, ScreenKeyboard, LAYOUT, PRESS_HOLD};
pub use quiz::{AnswerVerdict, QuizGame, QuizPhase, REVEAL_DURATION};
