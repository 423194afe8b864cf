pub mod config;
pub mod mailer;
pub mod template;

// Re-export commonly used types
pub use config::{Config, ConfigError, MailerAccount};
pub use mailer::{Emailer, EmailError};
