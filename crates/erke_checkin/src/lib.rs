//! erke_checkin — daily check-in for the Erke member mini-program.
//!
//! Signs requests the way the GIC backend expects, reads the points ledger and
//! performs the daily sign-in for each configured account, one after another.
//! Session identifiers are captured from the mini-program beforehand; nothing
//! is persisted between runs.

pub mod api;
pub mod config;
pub mod notify;
pub mod runner;
pub mod sign;

pub use api::{interpret_body, AccountSession, ApiError, ApiResult, CheckinApi, GicClient};
pub use config::{AccountCredential, Config, ConfigError, NotifyConfig};
pub use notify::{Notification, Notifier, NotifyError};
pub use runner::{run_accounts, AccountOutcome, AccountState, RunSummary};
pub use sign::{DemogicSigner, RequestSigner, SignParams, SignedParams};
