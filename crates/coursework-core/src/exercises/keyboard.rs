//! On-screen keyboard that lights up keys as they are pressed and echoes
//! typing into a text buffer.

use std::time::{Duration, Instant};

/// Rows of the on-screen layout.
pub const LAYOUT: [&[&str]; 5] = [
    &["1", "2", "3", "4", "5", "6", "7", "8", "9", "0", "Backspace"],
    &["Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P"],
    &["A", "S", "D", "F", "G", "H", "J", "K", "L", "Enter"],
    &["Z", "X", "C", "V", "B", "N", "M"],
    &["Space"],
];

/// Without key-release events a press is shown for this long.
pub const PRESS_HOLD: Duration = Duration::from_millis(180);

/// Map a raw key name to the layout's naming: `" "` becomes `Space`,
/// single characters are upper-cased, named keys keep their spelling.
pub fn normalize_key(raw: &str) -> String {
    match raw {
        " " => "Space".to_string(),
        "Backspace" | "Enter" | "Space" => raw.to_string(),
        _ if raw.chars().count() == 1 => raw.to_uppercase(),
        _ => raw.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PressedKey {
    name: String,
    at: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct ScreenKeyboard {
    text: String,
    pressed: Vec<PressedKey>,
}

impl ScreenKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clear_text(&mut self) {
        self.text.clear();
    }

    /// Mark a key as held. Pressing an already held key refreshes its hold.
    pub fn press(&mut self, raw: &str, at: Instant) {
        let name = normalize_key(raw);
        match self.pressed.iter_mut().find(|k| k.name == name) {
            Some(key) => key.at = at,
            None => self.pressed.push(PressedKey { name, at }),
        }
    }

    pub fn release(&mut self, raw: &str) {
        let name = normalize_key(raw);
        self.pressed.retain(|k| k.name != name);
    }

    /// Drop presses older than `PRESS_HOLD`, for terminals that never send releases
    pub fn expire(&mut self, now: Instant) {
        self.pressed
            .retain(|k| now.saturating_duration_since(k.at) < PRESS_HOLD);
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        let name = normalize_key(key);
        self.pressed.iter().any(|k| k.name.eq_ignore_ascii_case(&name))
    }

    pub fn pressed_keys(&self) -> Vec<&str> {
        self.pressed.iter().map(|k| k.name.as_str()).collect()
    }

    // ===== Text buffer =====

    pub fn type_char(&mut self, c: char) {
        if !c.is_control() {
            self.text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn newline(&mut self) {
        self.text.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key(" "), "Space");
        assert_eq!(normalize_key("a"), "A");
        assert_eq!(normalize_key("Q"), "Q");
        assert_eq!(normalize_key("7"), "7");
        assert_eq!(normalize_key("Backspace"), "Backspace");
        assert_eq!(normalize_key("Enter"), "Enter");
        assert_eq!(normalize_key("Tab"), "Tab");
    }

    #[test]
    fn test_press_and_release() {
        let mut kb = ScreenKeyboard::new();
        let now = Instant::now();
        kb.press("a", now);
        kb.press("A", now);
        assert_eq!(kb.pressed_keys(), vec!["A"]);
        assert!(kb.is_pressed("a"));
        kb.press(" ", now);
        assert!(kb.is_pressed("Space"));
        kb.release("a");
        assert!(!kb.is_pressed("A"));
        assert!(kb.is_pressed("Space"));
    }

    #[test]
    fn test_expire_old_presses() {
        let mut kb = ScreenKeyboard::new();
        let start = Instant::now();
        kb.press("q", start);
        kb.press("w", start + Duration::from_millis(150));
        kb.expire(start + Duration::from_millis(200));
        assert!(!kb.is_pressed("Q"));
        assert!(kb.is_pressed("W"));
    }

    #[test]
    fn test_text_buffer() {
        let mut kb = ScreenKeyboard::new();
        kb.type_char('h');
        kb.type_char('i');
        kb.type_char('\u{7}');
        kb.newline();
        kb.type_char('x');
        kb.backspace();
        assert_eq!(kb.text(), "hi\n");
        kb.clear_text();
        assert_eq!(kb.text(), "");
        // Backspace on empty text is harmless
        kb.backspace();
    }

    #[test]
    fn test_layout_keys_normalize_to_themselves() {
        for row in LAYOUT {
            for key in row {
                assert_eq!(normalize_key(key), *key);
            }
        }
    }
}
