//! Console and notification rendering of a check-in run.

use erke_checkin::{AccountOutcome, ApiResult, Notification, RunSummary};
use serde_json::Value;
use std::io::Write;
use std::path::Path;

pub const NOTIFY_TITLE: &str = "鸿星尔克签到";

/// Keys the sign-in result may use for the number of points awarded.
const POINTS_KEYS: [&str; 4] = ["points_awarded", "integral", "integralValue", "points"];

/// One progress line for a finished account, e.g.
/// `[1/2] main: 积分明细获取成功 | 签到成功, 获得 10 积分`.
pub fn account_line(outcome: &AccountOutcome, total: usize) -> String {
    format!(
        "[{}/{}] {}: {} | {}",
        outcome.index,
        total,
        outcome.account_name,
        ledger_text(&outcome.points),
        sign_text(&outcome.sign)
    )
}

/// Aggregate counters in both human and `key=value` form.
pub fn summary_text(summary: &RunSummary) -> String {
    format!(
        "总计 {} 个账号, 成功 {}, 失败 {} (total={}, success={}, fail={})",
        summary.total_accounts(),
        summary.succeeded_count(),
        summary.failed_count(),
        summary.total_accounts(),
        summary.succeeded_count(),
        summary.failed_count()
    )
}

/// Full report: every account line followed by the summary.
pub fn build_report(summary: &RunSummary) -> String {
    let total = summary.total_accounts();
    let mut out = String::new();
    for outcome in summary.outcomes() {
        out.push_str(&account_line(outcome, total));
        out.push('\n');
    }
    out.push_str(&summary_text(summary));
    out
}

pub fn notification(summary: &RunSummary) -> Notification {
    Notification {
        title: NOTIFY_TITLE.to_string(),
        content: build_report(summary),
    }
}

/// Write the summary as pretty JSON to `out_path`.
pub fn write_summary_json(summary: &RunSummary, out_path: impl AsRef<Path>) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(&summary.to_json()).map_err(ReportError::Json)?;
    let mut f = std::fs::File::create(out_path.as_ref()).map_err(ReportError::Io)?;
    f.write_all(json.as_bytes()).map_err(ReportError::Io)?;
    Ok(())
}

fn ledger_text(points: &ApiResult) -> String {
    match points {
        Ok(_) => "积分明细获取成功".to_string(),
        Err(e) => format!("积分明细获取失败: {}", e),
    }
}

fn sign_text(sign: &ApiResult) -> String {
    match sign {
        Ok(result) => match points_awarded(result) {
            Some(points) => format!("签到成功, 获得 {} 积分", points),
            None => "签到成功".to_string(),
        },
        Err(e) => format!("签到失败: {}", e),
    }
}

/// Points reported by a successful sign-in, when the backend includes them.
pub fn points_awarded(result: &Value) -> Option<String> {
    let obj = result.as_object()?;
    POINTS_KEYS.iter().find_map(|k| match obj.get(*k)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    })
}

#[derive(Debug)]
pub enum ReportError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "io: {}", e),
            ReportError::Json(e) => write!(f, "json: {}", e),
        }
    }
}

impl std::error::Error for ReportError {}
