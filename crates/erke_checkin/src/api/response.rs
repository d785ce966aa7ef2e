//! Classification of backend responses into an API result.

use serde_json::Value;
use thiserror::Error;

const BODY_SNIPPET_CHARS: usize = 200;
const MESSAGE_KEYS: [&str; 4] = ["error", "message", "errorMessage", "msg"];

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("api error: status {0} body {1}")]
    Status(u16, String),
    #[error("malformed response: {0}")]
    Malformed(String),
    /// Application-level failure reported by the backend (already signed in, session expired, ...).
    #[error("{0}")]
    Backend(String),
    #[error("invalid page: current_page={current_page} page_size={page_size}")]
    InvalidPage { current_page: u32, page_size: u32 },
    #[error("invalid header {0}")]
    InvalidHeader(String),
    #[error("timestamp: {0}")]
    Sign(#[from] time::error::Format),
}

/// Outcome of one backend call: the result payload or the captured error, never both.
pub type ApiResult = Result<Value, ApiError>;

pub(crate) async fn read(sent: Result<reqwest::Response, reqwest::Error>) -> ApiResult {
    let response = sent?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status(status.as_u16(), snippet(&body)));
    }
    interpret_body(&body)
}

/// Classify a 2xx response body.
///
/// Bodies flagged with `"success": false` or a non-zero `errorCode` are backend
/// failures. Otherwise the `result` field is returned when present and non-null,
/// else the whole body. A successful result is never `null`.
pub fn interpret_body(body: &str) -> ApiResult {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ApiError::Malformed(format!("{}: {}", e, snippet(body))))?;
    if let Some(message) = backend_failure(&value) {
        return Err(ApiError::Backend(message));
    }
    match value {
        Value::Null => Err(ApiError::Malformed("null body".to_string())),
        Value::Object(mut map) => Ok(match map.remove("result") {
            Some(result) if !result.is_null() => result,
            _ => Value::Object(map),
        }),
        other => Ok(other),
    }
}

fn backend_failure(value: &Value) -> Option<String> {
    let obj = value.as_object()?;
    let flagged = obj.get("success").and_then(Value::as_bool) == Some(false)
        || obj.get("errorCode").is_some_and(is_nonzero_code);
    if !flagged {
        return None;
    }
    let message = MESSAGE_KEYS
        .iter()
        .find_map(|k| obj.get(*k).and_then(describe))
        .unwrap_or_else(|| "backend reported failure".to_string());
    Some(message)
}

fn is_nonzero_code(code: &Value) -> bool {
    match code {
        Value::Number(n) => n.as_f64().is_some_and(|c| c != 0.0),
        Value::String(s) => s.trim().parse::<i64>().is_ok_and(|c| c != 0),
        _ => false,
    }
}

fn describe(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn snippet(body: &str) -> String {
    let mut out: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
    if body.chars().count() > BODY_SNIPPET_CHARS {
        out.push('…');
    }
    out
}
