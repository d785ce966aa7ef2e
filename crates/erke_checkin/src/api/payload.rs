//! Request headers and bodies expected by the mini-program backend.

use super::response::ApiError;
use crate::config::AccountCredential;
use crate::sign::SignedParams;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{json, Value};

pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub(crate) const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

const GIC_WXA_VERSION: &str = "3.9.56";
const LAUNCH_OPTIONS: &str = r#"{"path":"pages/authorize/authorize","query":{},"scene":1101,"referrerInfo":{},"apiCategory":"default"}"#;
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36 \
MicroMessenger/7.0.20.1781(0x6700143B) NetType/WIFI \
MiniProgramEnv/Windows WindowsWechat/WMPF \
WindowsWechat(0x63090a13) UnifiedPCWindowsWechat(0xf2541510) XWEB/17071";

/// Browser-like headers of the desktop WeChat mini-program runtime.
///
/// The `sign` header carries the enterprise id; the real signature travels in the body.
pub(crate) fn headers(
    account: &AccountCredential,
    appid: &str,
    content_type: &str,
) -> Result<HeaderMap, ApiError> {
    let user_agent = account
        .user_agent
        .as_deref()
        .filter(|ua| !ua.trim().is_empty())
        .unwrap_or(DEFAULT_USER_AGENT);
    let referer = format!("https://servicewechat.com/{}/85/page-frame.html", appid);
    let pairs: [(&str, &str); 12] = [
        ("pragma", "no-cache"),
        ("cache-control", "no-cache"),
        ("sign", &account.enterprise_id),
        ("channelentrance", "wx_app"),
        ("xweb_xhr", "1"),
        ("sec-fetch-site", "cross-site"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-dest", "empty"),
        ("referer", &referer),
        ("accept-language", "zh-CN,zh;q=0.9"),
        ("user-agent", user_agent),
        ("content-type", content_type),
    ];
    let mut map = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let name = HeaderName::from_static(name);
        let value =
            HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader(name.to_string()))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Form fields of `integral_record.json`.
pub(crate) fn integral_record_form(
    account: &AccountCredential,
    signed: &SignedParams,
    current_page: u32,
    page_size: u32,
) -> Vec<(&'static str, String)> {
    vec![
        ("currentPage", current_page.to_string()),
        ("pageSize", page_size.to_string()),
        ("memberId", account.member_id.clone()),
        ("cliqueId", "-1".to_string()),
        ("cliqueMemberId", "-1".to_string()),
        ("useClique", "0".to_string()),
        ("enterpriseId", account.enterprise_id.clone()),
        ("unionid", account.unionid.clone()),
        ("openid", account.openid.clone()),
        ("wxOpenid", account.wx_openid.clone()),
        ("random", signed.random.to_string()),
        ("appid", signed.appid.clone()),
        ("transId", signed.trans_id.clone()),
        ("sign", signed.sign.clone()),
        ("timestamp", signed.timestamp.clone()),
        ("gicWxaVersion", GIC_WXA_VERSION.to_string()),
        ("launchOptions", LAUNCH_OPTIONS.to_string()),
    ]
}

/// JSON body of `sign/member_sign.json`.
pub(crate) fn member_sign_body(account: &AccountCredential, signed: &SignedParams) -> Value {
    json!({
        "source": "wxapp",
        "memberId": account.member_id,
        "cliqueId": "-1",
        "cliqueMemberId": "-1",
        "useClique": 0,
        "enterpriseId": account.enterprise_id,
        "unionid": account.unionid,
        "openid": account.openid,
        "wxOpenid": account.wx_openid,
        "sign": signed.sign,
        "random": signed.random,
        "appid": signed.appid,
        "transId": signed.trans_id,
        "timestamp": signed.timestamp,
        "gicWxaVersion": GIC_WXA_VERSION,
        "launchOptions": LAUNCH_OPTIONS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::{DemogicSigner, RequestSigner, SignParams, DEFAULT_APPID};
    use reqwest::header::{CONTENT_TYPE, USER_AGENT};

    fn account() -> AccountCredential {
        AccountCredential {
            account_name: "main".into(),
            member_id: "M10001".into(),
            enterprise_id: "ENT1".into(),
            unionid: "U1".into(),
            openid: "O1".into(),
            wx_openid: "W1".into(),
            user_agent: None,
        }
    }

    fn signed() -> SignedParams {
        DemogicSigner.sign(&SignParams::new(
            DEFAULT_APPID,
            "M10001",
            "2025-11-28 11:36:14",
            1234567,
        ))
    }

    #[test]
    fn headers_carry_enterprise_sign_and_default_ua() {
        let h = headers(&account(), DEFAULT_APPID, JSON_CONTENT_TYPE).unwrap();
        assert_eq!(h["sign"], "ENT1");
        assert_eq!(h["channelentrance"], "wx_app");
        assert_eq!(h[CONTENT_TYPE], JSON_CONTENT_TYPE);
        assert!(h[USER_AGENT].to_str().unwrap().contains("MicroMessenger"));
        assert_eq!(
            h["referer"],
            "https://servicewechat.com/wxa1f1fa3785a47c7d/85/page-frame.html"
        );
    }

    #[test]
    fn custom_user_agent_wins() {
        let mut acc = account();
        acc.user_agent = Some("custom/1.0".into());
        let h = headers(&acc, DEFAULT_APPID, FORM_CONTENT_TYPE).unwrap();
        assert_eq!(h[USER_AGENT], "custom/1.0");
    }

    #[test]
    fn invalid_header_value_is_error() {
        let mut acc = account();
        acc.enterprise_id = "bad\nvalue".into();
        let err = headers(&acc, DEFAULT_APPID, FORM_CONTENT_TYPE).unwrap_err();
        assert!(matches!(err, ApiError::InvalidHeader(ref n) if n == "sign"));
    }

    #[test]
    fn form_contains_paging_and_signature() {
        let form = integral_record_form(&account(), &signed(), 2, 50);
        let get = |k: &str| form.iter().find(|(n, _)| *n == k).map(|(_, v)| v.as_str());
        assert_eq!(get("currentPage"), Some("2"));
        assert_eq!(get("pageSize"), Some("50"));
        assert_eq!(get("sign"), Some("d5405b13f1a3e31f180280b83a3e768a"));
        assert_eq!(get("transId"), Some("wxa1f1fa3785a47c7d2025-11-28 11:36:14"));
        assert_eq!(get("useClique"), Some("0"));
    }

    #[test]
    fn sign_body_matches_backend_shape() {
        let body = member_sign_body(&account(), &signed());
        assert_eq!(body["source"], "wxapp");
        assert_eq!(body["useClique"], 0);
        assert_eq!(body["random"], 1234567);
        assert_eq!(body["wxOpenid"], "W1");
        assert_eq!(body["sign"], "d5405b13f1a3e31f180280b83a3e768a");
    }
}
