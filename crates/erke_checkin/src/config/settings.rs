//! JSON config file loading and fail-fast validation.

use super::account::AccountCredential;
use crate::sign::DEFAULT_APPID;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "./erke.json";
pub const DEFAULT_BASE_URL: &str = "https://hope.demogic.com/gic-wx-app";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_BARK_SERVER: &str = "https://api.day.app";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no accounts configured")]
    NoAccounts,
    #[error("account #{index} ({name}): missing field `{field}`")]
    MissingField {
        index: usize,
        name: String,
        field: &'static str,
    },
    #[error("{field}: not an http(s) url: {value}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("notify {kind}: missing `{field}`")]
    NotifyMissing {
        kind: &'static str,
        field: &'static str,
    },
}

/// Push notification sink selected by `notify.kind`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NotifyConfig {
    #[default]
    None,
    Webhook {
        url: String,
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
    PushPlus {
        token: String,
        #[serde(default)]
        topic: Option<String>,
    },
    ServerChan {
        sendkey: String,
    },
    Bark {
        #[serde(default = "default_bark_server")]
        server: String,
        device_key: String,
    },
}

impl NotifyConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            NotifyConfig::None => "none",
            NotifyConfig::Webhook { .. } => "webhook",
            NotifyConfig::PushPlus { .. } => "pushplus",
            NotifyConfig::ServerChan { .. } => "serverchan",
            NotifyConfig::Bark { .. } => "bark",
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let kind = self.kind();
        let require = |field: &'static str, value: &str| {
            if value.trim().is_empty() {
                Err(ConfigError::NotifyMissing { kind, field })
            } else {
                Ok(())
            }
        };
        match self {
            NotifyConfig::None => Ok(()),
            NotifyConfig::Webhook { url, .. } => check_url("notify.url", url),
            NotifyConfig::PushPlus { token, .. } => require("token", token),
            NotifyConfig::ServerChan { sendkey } => require("sendkey", sendkey),
            NotifyConfig::Bark { server, device_key } => {
                require("device_key", device_key)?;
                check_url("notify.server", server)
            }
        }
    }
}

/// Run configuration, passed by reference into the runner.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub accounts: Vec<AccountCredential>,
    #[serde(default = "default_appid")]
    pub appid: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            appid: default_appid(),
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
            notify: NotifyConfig::None,
        }
    }
}

impl Config {
    /// Read, parse and validate the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = raw.len(), "config read");
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_json::from_str(raw)?;
        config.fill_account_names();
        config.validate()?;
        Ok(config)
    }

    fn fill_account_names(&mut self) {
        for (i, account) in self.accounts.iter_mut().enumerate() {
            if account.account_name.trim().is_empty() {
                account.account_name = format!("账号{}", i + 1);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accounts.is_empty() {
            return Err(ConfigError::NoAccounts);
        }
        for (i, account) in self.accounts.iter().enumerate() {
            if let Some(field) = account.missing_field() {
                return Err(ConfigError::MissingField {
                    index: i + 1,
                    name: account.account_name.clone(),
                    field,
                });
            }
        }
        if self.appid.trim().is_empty() {
            return Err(ConfigError::MissingField {
                index: 0,
                name: "config".to_string(),
                field: "appid",
            });
        }
        check_url("base_url", &self.base_url)?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Zero("timeout_secs"));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Zero("page_size"));
        }
        self.notify.validate()
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    match url::Url::parse(value) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.has_host() => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

fn default_appid() -> String {
    DEFAULT_APPID.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_bark_server() -> String {
    DEFAULT_BARK_SERVER.to_string()
}
