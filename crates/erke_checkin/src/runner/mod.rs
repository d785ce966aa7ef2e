//! Sequential per-account execution and result aggregation.

mod state;
mod summary;

pub use state::{AccountState, TransitionError};
pub use summary::{AccountOutcome, RunSummary};

use crate::api::CheckinApi;
use crate::config::{mask, AccountCredential};
use tracing::{debug, info, warn};

/// Process `accounts` in order: ledger page 1, then sign-in.
///
/// `session_for` binds the API to each account; `on_outcome` sees every outcome
/// as soon as the account finishes. Only the sign-in result decides success; a
/// failed ledger query is recorded but does not fail the account.
pub async fn run_accounts<'a, A, F, O>(
    accounts: &'a [AccountCredential],
    page_size: u32,
    mut session_for: F,
    mut on_outcome: O,
) -> RunSummary
where
    A: CheckinApi,
    F: FnMut(&'a AccountCredential) -> A,
    O: FnMut(&AccountOutcome),
{
    let mut summary = RunSummary::new(accounts.len());
    for (i, account) in accounts.iter().enumerate() {
        info!(
            index = i + 1,
            total = accounts.len(),
            account = %account.account_name,
            member = %mask(&account.member_id),
            "processing account"
        );
        let api = session_for(account);
        let outcome = process_account(i + 1, account, &api, page_size).await;
        on_outcome(&outcome);
        summary.record(outcome);
    }
    info!(
        total = summary.total_accounts(),
        succeeded = summary.succeeded_count(),
        failed = summary.failed_count(),
        "run complete"
    );
    summary
}

async fn process_account<A: CheckinApi>(
    index: usize,
    account: &AccountCredential,
    api: &A,
    page_size: u32,
) -> AccountOutcome {
    let mut state = AccountState::Pending;

    step(&mut state, AccountState::QueryingPoints, account);
    let points = api.get_integral_record(1, page_size).await;
    if let Err(e) = &points {
        warn!(account = %account.account_name, error = %e, "points query failed, continuing with sign-in");
    }

    step(&mut state, AccountState::SigningIn, account);
    let sign = api.member_sign().await;
    let terminal = if sign.is_ok() {
        AccountState::Succeeded
    } else {
        AccountState::Failed
    };
    step(&mut state, terminal, account);

    AccountOutcome {
        index,
        account_name: account.account_name.clone(),
        state,
        points,
        sign,
    }
}

fn step(state: &mut AccountState, to: AccountState, account: &AccountCredential) {
    match state.advance(to) {
        Ok(next) => {
            debug!(account = %account.account_name, from = ?state, to = ?next, "state");
            *state = next;
        }
        Err(e) => {
            warn!(account = %account.account_name, error = %e, "marking account failed");
            *state = AccountState::Failed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{interpret_body, ApiError, ApiResult};
    use std::cell::RefCell;

    /// Replays canned response bodies; `None` for the ledger simulates a transport-level failure.
    struct Scripted<'a> {
        points: Option<&'static str>,
        sign: &'static str,
        calls: &'a RefCell<Vec<String>>,
        member: String,
    }

    impl CheckinApi for Scripted<'_> {
        async fn get_integral_record(&self, current_page: u32, page_size: u32) -> ApiResult {
            self.calls
                .borrow_mut()
                .push(format!("points:{}:{}:{}", self.member, current_page, page_size));
            match self.points {
                Some(body) => interpret_body(body),
                None => Err(ApiError::Status(502, "bad gateway".into())),
            }
        }

        async fn member_sign(&self) -> ApiResult {
            self.calls.borrow_mut().push(format!("sign:{}", self.member));
            interpret_body(self.sign)
        }
    }

    const SIGN_OK: &str = r#"{"success": true, "result": {"points_awarded": 10}}"#;
    const SIGN_DUP: &str = r#"{"success": false, "error": "already signed in"}"#;
    const LEDGER_OK: &str = r#"{"success": true, "result": {"list": []}}"#;

    fn account(member: &str) -> AccountCredential {
        AccountCredential {
            account_name: format!("acc-{}", member),
            member_id: member.into(),
            enterprise_id: "E".into(),
            unionid: "U".into(),
            openid: "O".into(),
            wx_openid: "W".into(),
            user_agent: None,
        }
    }

    async fn run(
        accounts: &[AccountCredential],
        script: impl Fn(&str) -> (Option<&'static str>, &'static str),
    ) -> (RunSummary, Vec<String>, Vec<usize>) {
        let calls = RefCell::new(Vec::new());
        let mut seen = Vec::new();
        let summary = run_accounts(
            accounts,
            20,
            |acc| {
                let (points, sign) = script(&acc.member_id);
                Scripted {
                    points,
                    sign,
                    calls: &calls,
                    member: acc.member_id.clone(),
                }
            },
            |outcome| seen.push(outcome.index),
        )
        .await;
        (summary, calls.into_inner(), seen)
    }

    #[tokio::test]
    async fn single_account_success() {
        let accounts = [account("m1")];
        let (summary, calls, seen) = run(&accounts, |_| (Some(LEDGER_OK), SIGN_OK)).await;
        assert_eq!(calls, vec!["points:m1:1:20", "sign:m1"]);
        assert_eq!(seen, vec![1]);
        assert_eq!(summary.total_accounts(), 1);
        assert_eq!(summary.succeeded_count(), 1);
        assert_eq!(summary.failed_count(), 0);
        let o = &summary.outcomes()[0];
        assert_eq!(o.state, AccountState::Succeeded);
        assert_eq!(o.sign.as_ref().unwrap()["points_awarded"], 10);
    }

    #[tokio::test]
    async fn already_signed_in_fails_account() {
        let accounts = [account("m1")];
        let (summary, _, _) = run(&accounts, |_| (Some(LEDGER_OK), SIGN_DUP)).await;
        assert_eq!(summary.succeeded_count(), 0);
        assert_eq!(summary.failed_count(), 1);
        assert!(!summary.all_succeeded());
        let o = &summary.outcomes()[0];
        assert_eq!(o.state, AccountState::Failed);
        assert_eq!(o.sign.as_ref().unwrap_err().to_string(), "already signed in");
    }

    #[tokio::test]
    async fn ledger_failure_does_not_fail_account() {
        let accounts = [account("m1"), account("m2")];
        let (summary, calls, _) = run(&accounts, |m| {
            if m == "m2" {
                (None, SIGN_OK)
            } else {
                (Some(LEDGER_OK), SIGN_OK)
            }
        })
        .await;
        assert_eq!(calls.len(), 4);
        assert_eq!(summary.succeeded_count(), 2);
        assert_eq!(summary.failed_count(), 0);
        assert!(summary.outcomes()[1].points.is_err());
        assert!(summary.all_succeeded());
    }

    #[tokio::test]
    async fn failures_isolated_and_order_kept() {
        let accounts: Vec<_> = (1..=5).map(|i| account(&format!("m{}", i))).collect();
        // m2 and m4 fail sign-in; m3's ledger fails too, which must not matter.
        let (summary, calls, seen) = run(&accounts, |m| match m {
            "m2" | "m4" => (Some(LEDGER_OK), SIGN_DUP),
            "m3" => (None, SIGN_OK),
            _ => (Some(LEDGER_OK), SIGN_OK),
        })
        .await;
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        assert_eq!(calls.len(), 10);
        assert_eq!(calls[9], "sign:m5");
        assert_eq!(summary.failed_count(), 2);
        assert_eq!(summary.succeeded_count(), 3);
        assert!(summary.is_complete());
        let failed: Vec<_> = summary
            .outcomes()
            .iter()
            .filter(|o| !o.succeeded())
            .map(|o| o.account_name.as_str())
            .collect();
        assert_eq!(failed, vec!["acc-m2", "acc-m4"]);
    }

    #[test]
    fn step_rejects_invalid_transition() {
        let acc = account("m1");
        let mut state = AccountState::Pending;
        step(&mut state, AccountState::Succeeded, &acc);
        assert_eq!(state, AccountState::Failed);
    }
}
