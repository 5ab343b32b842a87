//! Data models exchanged with the remote services.
//!
//! - `UserProfile`: loosely typed profile returned by `GET /api/user`
//! - `ProfileUpdate`: payload for `PUT /api/profile`
//! - `Question`: a quiz question with its answer choices

pub mod profile;
pub mod quiz;

pub use profile::{ProfileUpdate, UserProfile};
pub use quiz::Question;
