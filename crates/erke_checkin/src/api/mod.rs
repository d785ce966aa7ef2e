//! GIC mini-program backend: points ledger query and daily member sign-in.

mod client;
mod payload;
mod response;

pub use client::{AccountSession, GicClient};
pub use response::{interpret_body, ApiError, ApiResult};

/// The two remote operations performed for one account.
#[allow(async_fn_in_trait)]
pub trait CheckinApi {
    /// Fetch one page of the points ledger. `current_page >= 1`, `page_size > 0`.
    async fn get_integral_record(&self, current_page: u32, page_size: u32) -> ApiResult;

    /// Perform the daily check-in.
    async fn member_sign(&self) -> ApiResult;
}
