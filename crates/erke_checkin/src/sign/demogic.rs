//! MD5 scheme used by the demogic mini-program client (gicWxaVersion 3.9.x).

use super::{RequestSigner, SignParams, SignedParams};
use time::macros::{format_description, offset};
use time::OffsetDateTime;

pub const DEFAULT_APPID: &str = "wxa1f1fa3785a47c7d";
/// Upper bound (inclusive) of the per-request nonce.
pub const RANDOM_MAX: u32 = 9_999_999;

const SECRET: &str = "damogic8888";

#[derive(Clone, Copy, Debug, Default)]
pub struct DemogicSigner;

impl RequestSigner for DemogicSigner {
    fn sign(&self, params: &SignParams) -> SignedParams {
        let trans_id = format!("{}{}", params.appid, params.timestamp);
        // Field order is fixed by the backend; there are no separators.
        let sign_str = format!(
            "timestamp={}transId={}secret={}random={}memberId={}",
            params.timestamp, trans_id, SECRET, params.random, params.member_id
        );
        let sign = format!("{:x}", md5::compute(sign_str.as_bytes()));
        SignedParams {
            sign,
            timestamp: params.timestamp.clone(),
            trans_id,
            random: params.random,
            appid: params.appid.clone(),
            member_id: params.member_id.clone(),
        }
    }
}

/// Format `now` in GMT+8 as `YYYY-MM-DD HH:MM:SS`.
pub fn gmt8_timestamp(now: OffsetDateTime) -> Result<String, time::error::Format> {
    now.to_offset(offset!(+8))
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(random: u32) -> SignParams {
        SignParams::new(DEFAULT_APPID, "M10001", "2025-11-28 11:36:14", random)
    }

    #[test]
    fn known_vector() {
        let signed = DemogicSigner.sign(&params(1234567));
        assert_eq!(signed.sign, "d5405b13f1a3e31f180280b83a3e768a");
        assert_eq!(signed.trans_id, "wxa1f1fa3785a47c7d2025-11-28 11:36:14");
        assert_eq!(signed.random, 1234567);
        assert_eq!(signed.member_id, "M10001");

        let zero = DemogicSigner.sign(&params(0));
        assert_eq!(zero.sign, "7c5c8d733d2b6776c68546647e24417b");
    }

    #[test]
    fn deterministic() {
        let a = DemogicSigner.sign(&params(42));
        let b = DemogicSigner.sign(&params(42));
        assert_eq!(a, b);
        assert_ne!(a.sign, DemogicSigner.sign(&params(43)).sign);
    }

    #[test]
    fn timestamp_is_gmt8() {
        // 2025-11-28 03:36:14 UTC
        let now = OffsetDateTime::from_unix_timestamp(1_764_300_974).unwrap();
        assert_eq!(gmt8_timestamp(now).unwrap(), "2025-11-28 11:36:14");
        // Single-digit fields are zero-padded.
        let early = OffsetDateTime::from_unix_timestamp(1_735_660_805).unwrap();
        assert_eq!(gmt8_timestamp(early).unwrap(), "2025-01-01 00:00:05");
    }

    #[test]
    fn fresh_params_in_range() {
        for _ in 0..32 {
            let p = SignParams::fresh(DEFAULT_APPID, "M1").unwrap();
            assert!(p.random <= RANDOM_MAX);
            assert_eq!(p.timestamp.len(), 19);
        }
    }
}
