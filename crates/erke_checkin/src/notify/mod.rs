//! Push notification of the run summary. Single attempt, best-effort.

use crate::config::NotifyConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const PUSHPLUS_URL: &str = "http://www.pushplus.plus/send";
const SERVERCHAN_URL: &str = "https://sctapi.ftqq.com";
const PUSHPLUS_OK: i64 = 200;
const SERVERCHAN_OK: i64 = 0;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("push error: status {0} body {1}")]
    Status(u16, String),
    #[error("invalid header {0}")]
    InvalidHeader(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub content: String,
}

/// Body of an outgoing push request.
#[derive(Clone, Debug, PartialEq)]
pub enum PushBody {
    Json(serde_json::Value),
    Form(Vec<(&'static str, String)>),
}

/// A fully described push request, built before anything is sent.
#[derive(Clone, Debug, PartialEq)]
pub struct PushRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: PushBody,
    /// `code` the sink puts in a 2xx body when it accepted the push.
    pub success_code: Option<i64>,
}

pub struct Notifier {
    http: reqwest::Client,
    config: NotifyConfig,
}

impl Notifier {
    pub fn new(config: NotifyConfig, timeout: Duration) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn is_enabled(&self) -> bool {
        self.config != NotifyConfig::None
    }

    pub async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let Some(req) = build_request(&self.config, notification) else {
            return Ok(());
        };
        let mut headers = HeaderMap::new();
        for (name, value) in &req.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| NotifyError::InvalidHeader(name.clone()))?;
            let value =
                HeaderValue::from_str(value).map_err(|_| NotifyError::InvalidHeader(name.to_string()))?;
            headers.insert(name, value);
        }
        let builder = self.http.post(&req.url).headers(headers);
        let builder = match &req.body {
            PushBody::Json(v) => builder.json(v),
            PushBody::Form(f) => builder.form(f),
        };
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16(), body));
        }
        check_push_body(req.success_code, status.as_u16(), &body)
    }

    /// Send once and log the outcome. Returns whether the push was delivered.
    pub async fn dispatch(&self, notification: &Notification) -> bool {
        if !self.is_enabled() {
            info!("notification disabled");
            return false;
        }
        match self.send(notification).await {
            Ok(()) => {
                info!(kind = self.config.kind(), "notification sent");
                true
            }
            Err(e) => {
                warn!(kind = self.config.kind(), error = %e, "notification failed");
                false
            }
        }
    }
}

/// Sinks that answer 200 for rejected pushes report the outcome in the body's `code`.
pub fn check_push_body(success_code: Option<i64>, status: u16, body: &str) -> Result<(), NotifyError> {
    let Some(expected) = success_code else {
        return Ok(());
    };
    let code = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("code").and_then(Value::as_i64));
    if code == Some(expected) {
        Ok(())
    } else {
        Err(NotifyError::Status(status, body.to_string()))
    }
}

/// Describe the push request for `config`; `None` when notifications are off.
pub fn build_request(config: &NotifyConfig, n: &Notification) -> Option<PushRequest> {
    let req = match config {
        NotifyConfig::None => return None,
        NotifyConfig::Webhook { url, headers } => PushRequest {
            url: url.clone(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            body: PushBody::Json(json!({ "title": n.title, "content": n.content })),
            success_code: None,
        },
        NotifyConfig::PushPlus { token, topic } => {
            let mut body = json!({
                "token": token,
                "title": n.title,
                "content": n.content,
                "template": "txt",
            });
            if let Some(topic) = topic {
                body["topic"] = json!(topic);
            }
            PushRequest {
                url: PUSHPLUS_URL.to_string(),
                headers: Vec::new(),
                body: PushBody::Json(body),
                success_code: Some(PUSHPLUS_OK),
            }
        }
        NotifyConfig::ServerChan { sendkey } => PushRequest {
            url: format!("{}/{}.send", SERVERCHAN_URL, sendkey.trim()),
            headers: Vec::new(),
            body: PushBody::Form(vec![("title", n.title.clone()), ("desp", n.content.clone())]),
            success_code: Some(SERVERCHAN_OK),
        },
        NotifyConfig::Bark { server, device_key } => PushRequest {
            url: format!("{}/push", server.trim_end_matches('/')),
            headers: Vec::new(),
            body: PushBody::Json(json!({
                "device_key": device_key,
                "title": n.title,
                "body": n.content,
                "group": "erke",
            })),
            success_code: None,
        },
    };
    Some(req)
}
