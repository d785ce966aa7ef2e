//! Per-account credentials captured from the mini-program session.

use serde::{Deserialize, Serialize};

/// Identity fields sent with every request for one member. Missing fields
/// deserialize as empty strings so validation can name them.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountCredential {
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub member_id: String,
    #[serde(default)]
    pub enterprise_id: String,
    #[serde(default)]
    pub unionid: String,
    #[serde(default)]
    pub openid: String,
    #[serde(default)]
    pub wx_openid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl AccountCredential {
    /// First required field that is blank, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("member_id", &self.member_id),
            ("enterprise_id", &self.enterprise_id),
            ("unionid", &self.unionid),
            ("openid", &self.openid),
            ("wx_openid", &self.wx_openid),
        ]
        .into_iter()
        .find(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Mask an identifier for logs: keep three characters at each end.
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> AccountCredential {
        AccountCredential {
            account_name: "a".into(),
            member_id: "m".into(),
            enterprise_id: "e".into(),
            unionid: "u".into(),
            openid: "o".into(),
            wx_openid: "w".into(),
            user_agent: None,
        }
    }

    #[test]
    fn missing_field_reports_first_blank() {
        assert_eq!(full().missing_field(), None);
        let mut acc = full();
        acc.openid = "  ".into();
        acc.wx_openid = String::new();
        assert_eq!(acc.missing_field(), Some("openid"));
    }

    #[test]
    fn mask_short_and_long() {
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask("ff8080818c0a"), "ff8***c0a");
        assert_eq!(mask("会员编号一二三四"), "会员编***二三四");
    }
}
