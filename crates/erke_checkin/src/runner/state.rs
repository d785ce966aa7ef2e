//! Per-account lifecycle: pending → querying_points → signing_in → succeeded | failed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountState {
    Pending,
    QueryingPoints,
    SigningIn,
    Succeeded,
    Failed,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid transition {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: AccountState,
    pub to: AccountState,
}

impl AccountState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AccountState::Succeeded | AccountState::Failed)
    }

    /// Move to `to` if the lifecycle allows it. Terminal states never move.
    pub fn advance(self, to: AccountState) -> Result<AccountState, TransitionError> {
        use AccountState::*;
        match (self, to) {
            (Pending, QueryingPoints)
            | (QueryingPoints, SigningIn)
            | (SigningIn, Succeeded)
            | (SigningIn, Failed) => Ok(to),
            _ => Err(TransitionError { from: self, to }),
        }
    }
}
