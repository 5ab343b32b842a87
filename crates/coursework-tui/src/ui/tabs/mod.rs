pub mod account;
pub mod color_picker;
pub mod flip_match;
pub mod keyboard;
pub mod quiz;
