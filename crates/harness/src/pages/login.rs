//! Login screen.

use crate::locator::Locator;
use crate::model::Credentials;
use crate::page_object::{BasePage, PageObject};
use crate::result::HarnessResult;
use tracing::info;

/// The `/login` page
#[derive(Debug, Clone)]
pub struct LoginPage {
    base: BasePage,
}

impl PageObject for LoginPage {
    fn url_pattern(&self) -> &str {
        "/login"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn page_name(&self) -> &str {
        "LoginPage"
    }
}

impl LoginPage {
    /// Wrap the shared action layer
    #[must_use]
    pub const fn new(base: BasePage) -> Self {
        Self { base }
    }

    pub fn username_input() -> Locator {
        Locator::test_id("username-input")
    }

    pub fn password_input() -> Locator {
        Locator::test_id("password-input")
    }

    pub fn login_button() -> Locator {
        Locator::test_id("login-button")
    }

    pub fn error_banner() -> Locator {
        Locator::test_id("login-error")
    }

    pub fn logout_button() -> Locator {
        Locator::test_id("logout-button")
    }

    /// Submit the login form and wait for the resulting page to settle
    pub async fn login(&self, username: &str, password: &str) -> HarnessResult<()> {
        info!(username, "login");
        self.base.fill(&Self::username_input(), username).await?;
        self.base.fill(&Self::password_input(), password).await?;
        self.base.click(&Self::login_button()).await?;
        self.base.wait_for_page_settled().await
    }

    /// [`login`](Self::login) with a credential pair
    pub async fn login_with(&self, credentials: &Credentials) -> HarnessResult<()> {
        self.login(&credentials.username, &credentials.password).await
    }

    /// Whether the logout control is visible
    pub async fn is_logged_in(&self) -> HarnessResult<bool> {
        self.base.is_visible(&Self::logout_button()).await
    }

    pub async fn is_error_visible(&self) -> HarnessResult<bool> {
        self.base.is_visible(&Self::error_banner()).await
    }

    /// Text of the error banner, empty when absent
    pub async fn error_message(&self) -> HarnessResult<String> {
        self.base.text(&Self::error_banner()).await
    }

    /// Log out and wait for the login page to come back
    pub async fn logout(&self) -> HarnessResult<()> {
        self.base.click(&Self::logout_button()).await?;
        self.base.wait_for_page_settled().await?;
        self.base.wait_for_element(&Self::login_button(), None).await
    }

    /// Whether the browser shows the login route
    pub async fn is_on_login_page(&self) -> HarnessResult<bool> {
        self.is_current().await
    }
}
