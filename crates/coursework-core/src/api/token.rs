//! Bearer token extraction from login responses.
//!
//! The auth service has returned the token under different field names over
//! time, so the client checks an ordered list instead of binding one schema.

use serde_json::Value;

/// Field names checked when no override is configured, in priority order.
pub const DEFAULT_TOKEN_FIELDS: &[&str] = &["token", "access_token", "jwt", "authToken"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFieldStrategy {
    fields: Vec<String>,
}

impl Default for TokenFieldStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_FIELDS.iter().map(|f| f.to_string()))
    }
}

impl TokenFieldStrategy {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from an optional configured list, falling back to the defaults
    /// when the list is missing or empty.
    pub fn from_config(fields: Option<&[String]>) -> Self {
        match fields {
            Some(list) if !list.is_empty() => Self::new(list.iter().cloned()),
            _ => Self::default(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Return the first non-empty string found under one of the listed fields.
    /// Tokens nested under a `data` object are also accepted.
    pub fn resolve(&self, body: &Value) -> Option<String> {
        self.resolve_flat(body)
            .or_else(|| body.get("data").and_then(|data| self.resolve_flat(data)))
    }

    fn resolve_flat(&self, body: &Value) -> Option<String> {
        self.fields
            .iter()
            .filter_map(|field| body.get(field))
            .filter_map(Value::as_str)
            .find(|token| !token.trim().is_empty())
            .map(str::to_string)
    }
}
