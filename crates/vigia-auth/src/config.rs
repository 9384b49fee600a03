//! Authentication configuration.

/// Configuration for the authentication service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Reset-code lifetime in seconds (default: 600 = 10 minutes).
    pub code_ttl_secs: u64,
    /// Minimum password length for policy enforcement.
    pub min_password_length: usize,
    /// Optional pepper prepended to passwords before Argon2id
    /// verification. Must match the pepper used during hashing.
    pub pepper: Option<String>,
    /// Subject line for outgoing reset mails.
    pub mail_subject: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            code_ttl_secs: 600,
            min_password_length: 6,
            pepper: None,
            mail_subject: "Your VIGIA password reset code".into(),
        }
    }
}
