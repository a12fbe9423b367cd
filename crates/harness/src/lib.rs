//! DMS Harness: end-to-end test automation for the DMS web application.
//!
//! Drives the dealer management UI through page objects and exercises its
//! REST API directly, asserting behaviour in both.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Test case                                                    │
//! ├────────────────────────────┬─────────────────────────────────┤
//! │  pages::{Login, RepairOrders, Appointments}                   │
//! │            │               │  api::DmsApiClient               │
//! │  page_object::BasePage     │  api::assert_*                   │
//! │            │               │            │                     │
//! │  driver::PageDriver        │         reqwest                  │
//! │   ├── MockDriver           │                                  │
//! │   └── ChromiumDriver (cdp) │                                  │
//! ├────────────────────────────┴─────────────────────────────────┤
//! │  config · fixtures · model · result · logging                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dms_harness::prelude::*;
//!
//! let config = HarnessConfig::from_env()?;
//! let mut api = DmsApiClient::new(&config);
//! api.init()?;
//! let resp = api.get_repair_order_by_id(fixtures::nonexistent_order_number()).await?;
//! assert_status(&resp, 404)?;
//! api.dispose();
//! ```

// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod api;
pub mod browser;
pub mod config;
pub mod driver;
pub mod fixtures;
pub mod locator;
pub mod logging;
pub mod model;
pub mod page_object;
pub mod pages;
pub mod result;
pub mod wait;

pub use api::{ApiResponse, DmsApiClient, ResponseLike};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::Browser;
pub use config::HarnessConfig;
pub use driver::{MockDriver, PageDriver};
#[cfg(feature = "browser")]
pub use driver::ChromiumDriver;
pub use locator::{Locator, Selector};
pub use page_object::{BasePage, PageObject};
pub use result::{AssertionError, HarnessError, HarnessResult};

/// Everything a test module usually needs
pub mod prelude {
    pub use crate::api::{
        assert_body_fields, assert_error_body, assert_response_time, assert_status, ApiResponse, DmsApiClient,
        ResponseLike,
    };
    pub use crate::config::HarnessConfig;
    pub use crate::driver::{MockDriver, PageDriver};
    pub use crate::fixtures;
    pub use crate::locator::{Locator, Selector};
    pub use crate::model::*;
    pub use crate::page_object::{BasePage, PageObject};
    pub use crate::pages::{AppointmentsPage, LoginPage, PaginationInfo, RepairOrdersPage};
    pub use crate::result::{AssertionError, HarnessError, HarnessResult};
}
