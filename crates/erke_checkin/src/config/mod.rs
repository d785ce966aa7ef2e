//! Configuration: accounts, endpoint settings, notification sink.

mod account;
mod settings;

pub use account::{mask, AccountCredential};
pub use settings::{Config, ConfigError, NotifyConfig, DEFAULT_BASE_URL, DEFAULT_CONFIG_PATH};
