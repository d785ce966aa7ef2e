//! Request signing for the GIC member backend.

mod demogic;

pub use demogic::{gmt8_timestamp, DemogicSigner, DEFAULT_APPID, RANDOM_MAX};

use serde::Serialize;

/// Declared inputs of a signature. The timestamp and nonce are drawn by the
/// caller, so signing itself is a pure function of these fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignParams {
    pub appid: String,
    pub member_id: String,
    /// GMT+8 wall clock, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
    pub random: u32,
}

impl SignParams {
    pub fn new(
        appid: impl Into<String>,
        member_id: impl Into<String>,
        timestamp: impl Into<String>,
        random: u32,
    ) -> Self {
        Self {
            appid: appid.into(),
            member_id: member_id.into(),
            timestamp: timestamp.into(),
            random,
        }
    }

    /// Draw a fresh timestamp and nonce for one request.
    pub fn fresh(appid: &str, member_id: &str) -> Result<Self, time::error::Format> {
        let now = time::OffsetDateTime::now_utc();
        Ok(Self::new(
            appid,
            member_id,
            gmt8_timestamp(now)?,
            fastrand::u32(0..=RANDOM_MAX),
        ))
    }
}

/// Signature plus the fields the backend expects next to it in every payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedParams {
    pub sign: String,
    pub timestamp: String,
    pub trans_id: String,
    pub random: u32,
    pub appid: String,
    pub member_id: String,
}

/// A backend signing scheme. Swapping the scheme only requires another impl.
pub trait RequestSigner {
    fn sign(&self, params: &SignParams) -> SignedParams;
}
