//! DMS REST API client and response assertions.

mod assertion;
mod client;
mod response;

pub use assertion::{assert_body_fields, assert_error_body, assert_response_time, assert_status};
pub use client::DmsApiClient;
pub use response::{ApiResponse, ResponseLike};
