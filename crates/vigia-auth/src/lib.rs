//! VIGIA Auth — password verification, 6-digit reset codes, and the
//! password-reset flow.

pub mod code;
pub mod config;
pub mod error;
pub mod mailer;
pub mod password;
pub mod service;

pub use config::AuthConfig;
pub use error::AuthError;
pub use mailer::{DeliveryError, Mailer, TracingMailer};
pub use service::{AuthService, CompleteResetInput, ResetOutcome};
