//! HTTPS client for the GIC backend. One request per call, no retries.

use super::payload::{self, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
use super::response::{self, ApiError, ApiResult};
use super::CheckinApi;
use crate::config::{mask, AccountCredential, Config};
use crate::sign::{DemogicSigner, RequestSigner, SignParams, SignedParams};
use std::time::Duration;
use tracing::{debug, info, warn};

const INTEGRAL_RECORD_PATH: &str = "/integral_record.json";
const MEMBER_SIGN_PATH: &str = "/sign/member_sign.json";

/// Shared HTTP client, endpoint and signer. Bind it to an account with [`GicClient::session`].
pub struct GicClient<S = DemogicSigner> {
    http: reqwest::Client,
    base_url: String,
    appid: String,
    signer: S,
}

impl GicClient<DemogicSigner> {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        Self::with_signer(config, DemogicSigner)
    }
}

impl<S: RequestSigner> GicClient<S> {
    pub fn with_signer(config: &Config, signer: S) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            appid: config.appid.clone(),
            signer,
        })
    }

    pub fn session<'a>(&'a self, account: &'a AccountCredential) -> AccountSession<'a, S> {
        AccountSession {
            client: self,
            account,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// A client bound to one account's identity.
pub struct AccountSession<'a, S = DemogicSigner> {
    client: &'a GicClient<S>,
    account: &'a AccountCredential,
}

impl<S: RequestSigner> AccountSession<'_, S> {
    fn signed(&self) -> Result<SignedParams, ApiError> {
        let params = SignParams::fresh(&self.client.appid, &self.account.member_id)?;
        Ok(self.client.signer.sign(&params))
    }

    fn log_result(&self, op: &'static str, result: &ApiResult) {
        match result {
            Ok(_) => info!(account = %self.account.account_name, op, "ok"),
            Err(e) => warn!(account = %self.account.account_name, op, error = %e, "failed"),
        }
    }
}

impl<S: RequestSigner> CheckinApi for AccountSession<'_, S> {
    async fn get_integral_record(&self, current_page: u32, page_size: u32) -> ApiResult {
        if current_page == 0 || page_size == 0 {
            return Err(ApiError::InvalidPage {
                current_page,
                page_size,
            });
        }
        info!(account = %self.account.account_name, current_page, page_size, "querying integral record");
        let signed = self.signed()?;
        let headers = payload::headers(self.account, &self.client.appid, FORM_CONTENT_TYPE)?;
        let form = payload::integral_record_form(self.account, &signed, current_page, page_size);
        let url = self.client.endpoint(INTEGRAL_RECORD_PATH);
        debug!(%url, member = %mask(&self.account.member_id), "POST form");
        let sent = self
            .client
            .http
            .post(&url)
            .headers(headers)
            .form(&form)
            .send()
            .await;
        let result = response::read(sent).await;
        self.log_result("integral_record", &result);
        result
    }

    async fn member_sign(&self) -> ApiResult {
        info!(account = %self.account.account_name, "signing in");
        let signed = self.signed()?;
        let headers = payload::headers(self.account, &self.client.appid, JSON_CONTENT_TYPE)?;
        let body = payload::member_sign_body(self.account, &signed);
        let url = self.client.endpoint(MEMBER_SIGN_PATH);
        debug!(%url, member = %mask(&self.account.member_id), "POST json");
        // `.json()` would replace the charset-qualified content type set above.
        let sent = self
            .client
            .http
            .post(&url)
            .headers(headers)
            .body(body.to_string())
            .send()
            .await;
        let result = response::read(sent).await;
        self.log_result("member_sign", &result);
        result
    }
}
