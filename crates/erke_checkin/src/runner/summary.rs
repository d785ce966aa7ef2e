//! Per-account outcome records and the run-wide aggregate.

use super::state::AccountState;
use crate::api::ApiResult;
use serde::Serialize;
use serde_json::Value;

/// What happened to one account. `points` and `sign` hold the raw call results.
#[derive(Debug)]
pub struct AccountOutcome {
    /// 1-based position in the configuration.
    pub index: usize,
    pub account_name: String,
    pub state: AccountState,
    pub points: ApiResult,
    pub sign: ApiResult,
}

impl AccountOutcome {
    pub fn succeeded(&self) -> bool {
        self.state == AccountState::Succeeded
    }
}

/// Aggregate of a run, built incrementally as accounts finish.
#[derive(Debug, Default)]
pub struct RunSummary {
    total_accounts: usize,
    succeeded_count: usize,
    failed_count: usize,
    outcomes: Vec<AccountOutcome>,
}

impl RunSummary {
    pub fn new(total_accounts: usize) -> Self {
        Self {
            total_accounts,
            outcomes: Vec::with_capacity(total_accounts),
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: AccountOutcome) {
        if outcome.succeeded() {
            self.succeeded_count += 1;
        } else {
            self.failed_count += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn total_accounts(&self) -> usize {
        self.total_accounts
    }

    pub fn succeeded_count(&self) -> usize {
        self.succeeded_count
    }

    pub fn failed_count(&self) -> usize {
        self.failed_count
    }

    pub fn outcomes(&self) -> &[AccountOutcome] {
        &self.outcomes
    }

    /// True once every account has reached a terminal state.
    pub fn is_complete(&self) -> bool {
        self.succeeded_count + self.failed_count == self.total_accounts
    }

    pub fn all_succeeded(&self) -> bool {
        self.is_complete() && self.failed_count == 0
    }

    /// JSON rendition; each call result becomes `{success, result, error}`.
    pub fn to_json(&self) -> Value {
        let accounts: Vec<AccountRecord<'_>> = self.outcomes.iter().map(AccountRecord::from).collect();
        serde_json::json!({
            "total_accounts": self.total_accounts,
            "succeeded_count": self.succeeded_count,
            "failed_count": self.failed_count,
            "accounts": accounts,
        })
    }
}

#[derive(Serialize)]
struct CallRecord<'a> {
    success: bool,
    result: Option<&'a Value>,
    error: Option<String>,
}

impl<'a> From<&'a ApiResult> for CallRecord<'a> {
    fn from(r: &'a ApiResult) -> Self {
        match r {
            Ok(v) => Self {
                success: true,
                result: Some(v),
                error: None,
            },
            Err(e) => Self {
                success: false,
                result: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Serialize)]
struct AccountRecord<'a> {
    index: usize,
    account_name: &'a str,
    state: AccountState,
    points: CallRecord<'a>,
    sign: CallRecord<'a>,
}

impl<'a> From<&'a AccountOutcome> for AccountRecord<'a> {
    fn from(o: &'a AccountOutcome) -> Self {
        Self {
            index: o.index,
            account_name: &o.account_name,
            state: o.state,
            points: CallRecord::from(&o.points),
            sign: CallRecord::from(&o.sign),
        }
    }
}
