use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys rendered in their own section rather than the generic field list.
const FEATURED_KEYS: &[&str] = &["name", "bio", "description", "profile_picture"];

/// A user profile as returned by the auth service.
///
/// The service does not guarantee a schema, so the profile keeps the raw JSON
/// object and exposes typed accessors for the handful of fields the UI
/// features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile {
    fields: Map<String, Value>,
}

impl UserProfile {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.non_empty_str("name")
    }

    pub fn email(&self) -> Option<&str> {
        self.non_empty_str("email")
    }

    /// Bio text, falling back to `description` when `bio` is empty.
    pub fn bio(&self) -> Option<&str> {
        self.non_empty_str("bio").or_else(|| self.non_empty_str("description"))
    }

    pub fn picture_url(&self) -> Option<&str> {
        self.non_empty_str("profile_picture")
    }

    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        self.name().or_else(|| self.email()).unwrap_or("there")
    }

    /// Every displayable field in key order.
    ///
    /// Only primitive values are shown: objects, arrays, nulls and falsy
    /// scalars (`""`, `0`, `false`) are skipped.
    pub fn display_fields(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .fields
            .iter()
            .filter_map(|(key, value)| render_primitive(value).map(|text| (key.clone(), text)))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        fields
    }

    /// Displayable fields minus the featured ones shown in their own section.
    pub fn other_fields(&self) -> Vec<(String, String)> {
        self.display_fields()
            .into_iter()
            .filter(|(key, _)| !FEATURED_KEYS.contains(&key.as_str()))
            .collect()
    }
}

fn render_primitive(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Payload for `PUT /api/profile`.
///
/// The service reads the free text from either `bio` or `description`
/// depending on the account, so both are sent with the same value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct ProfileUpdate {
    pub name: String,
    pub bio: String,
    pub description: String,
}

impl ProfileUpdate {
    /// Build a trimmed update from form input.
    pub fn new(name: &str, bio: &str) -> Self {
        let bio = bio.trim().to_string();
        Self {
            name: name.trim().to_string(),
            description: bio.clone(),
            bio,
        }
    }

    /// Prefill the edit form from the current profile.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self::new(profile.name().unwrap_or_default(), profile.bio().unwrap_or_default())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Name cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(value: Value) -> UserProfile {
        UserProfile::from_value(value).expect("object")
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(UserProfile::from_value(json!([1, 2])).is_none());
        assert!(UserProfile::from_value(json!("x")).is_none());
        assert!(UserProfile::from_value(json!({})).is_some());
    }

    #[test]
    fn test_display_fields_skip_objects_and_falsy() {
        let p = profile(json!({
            "name": "Ada",
            "age": 36,
            "score": 0,
            "verified": true,
            "banned": false,
            "nickname": "",
            "address": {"city": "London"},
            "tags": ["a"],
            "deleted_at": null
        }));
        let fields = p.display_fields();
        assert_eq!(
            fields,
            vec![
                ("age".to_string(), "36".to_string()),
                ("name".to_string(), "Ada".to_string()),
                ("verified".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_other_fields_exclude_featured() {
        let p = profile(json!({
            "name": "Ada",
            "bio": "Engineer",
            "profile_picture": "https://example.com/a.png",
            "email": "ada@example.com"
        }));
        assert_eq!(
            p.other_fields(),
            vec![("email".to_string(), "ada@example.com".to_string())]
        );
    }

    #[test]
    fn test_bio_falls_back_to_description() {
        let p = profile(json!({"bio": " ", "description": "Hello"}));
        assert_eq!(p.bio(), Some("Hello"));
        let p = profile(json!({"bio": "Mine", "description": "Other"}));
        assert_eq!(p.bio(), Some("Mine"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(profile(json!({"name": "Ada"})).display_name(), "Ada");
        assert_eq!(profile(json!({"email": "a@b.com"})).display_name(), "a@b.com");
        assert_eq!(profile(json!({})).display_name(), "there");
    }

    #[test]
    fn test_profile_update_trims_and_mirrors_bio() {
        let update = ProfileUpdate::new("  Ada ", " Likes engines ");
        assert_eq!(update.name, "Ada");
        assert_eq!(update.bio, "Likes engines");
        assert_eq!(update.description, "Likes engines");
        assert!(update.validate().is_ok());
        assert_eq!(
            ProfileUpdate::new("   ", "bio").validate(),
            Err("Name cannot be empty".to_string())
        );
    }

    #[test]
    fn test_profile_update_from_profile() {
        let p = profile(json!({"name": "Ada", "description": "Old"}));
        let update = ProfileUpdate::from_profile(&p);
        assert_eq!(update.name, "Ada");
        assert_eq!(update.bio, "Old");
    }
}
