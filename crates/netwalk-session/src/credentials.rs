//! Device management credentials

use std::fmt;

/// Username/password/enable-password triple used for every session in
/// a discovery run
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub enable_password: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        enable_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            enable_password: enable_password.into(),
        }
    }
}

// Secrets stay out of logs and panic messages
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("enable_password", &"<redacted>")
            .finish()
    }
}
