use serde::Serialize;

use crate::api::ApiError;

/// Login form input. Held only until submission, never stored.
#[derive(Clone, Default)]
pub struct Credentials {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

impl Credentials {
    /// The email is trimmed; the password is kept verbatim.
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// Reject empty fields before anything touches the network
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(ApiError::Validation(
                "Please enter both email and password".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn to_body(&self) -> impl Serialize + '_ {
        LoginBody {
            email: &self.email,
            password: &self.password,
        }
    }
}

// Keep the password out of debug output and logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}
