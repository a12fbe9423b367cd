//! Repair order list, search and form.

use crate::locator::{css_attr, Locator};
use crate::model::{NewRepairOrder, RepairOrderStatus};
use crate::page_object::{BasePage, PageObject};
use crate::result::{HarnessError, HarnessResult};
use regex::Regex;
use tracing::info;

const ROW_CSS: &str = "[data-testid=\"order-row\"]";

/// Parsed "Page X of Y" indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationInfo {
    /// 1-based current page
    pub current: u32,
    /// Total pages
    pub total: u32,
}

impl PaginationInfo {
    /// Parse `Page <current> of <total>` anywhere in `text`
    pub fn parse(text: &str) -> HarnessResult<Option<Self>> {
        let re = Regex::new(r"Page\s+(\d+)\s+of\s+(\d+)").map_err(|e| HarnessError::driver(e.to_string()))?;
        Ok(re.captures(text).and_then(|caps| {
            Some(Self {
                current: caps.get(1)?.as_str().parse().ok()?,
                total: caps.get(2)?.as_str().parse().ok()?,
            })
        }))
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current < self.total
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current > 1
    }
}

/// The `/repair-orders` page
#[derive(Debug, Clone)]
pub struct RepairOrdersPage {
    base: BasePage,
}

impl PageObject for RepairOrdersPage {
    fn url_pattern(&self) -> &str {
        "/repair-orders"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn page_name(&self) -> &str {
        "RepairOrdersPage"
    }
}

// Selection criteria
impl RepairOrdersPage {
    pub fn search_input() -> Locator {
        Locator::test_id("search-input")
    }

    pub fn search_button() -> Locator {
        Locator::test_id("search-button")
    }

    pub fn clear_search_button() -> Locator {
        Locator::test_id("clear-search-button")
    }

    pub fn status_filter() -> Locator {
        Locator::test_id("status-filter")
    }

    pub fn create_button() -> Locator {
        Locator::test_id("create-order-button")
    }

    pub fn order_form() -> Locator {
        Locator::test_id("order-form")
    }

    pub fn order_number_input() -> Locator {
        Locator::test_id("order-number-input")
    }

    pub fn customer_name_input() -> Locator {
        Locator::test_id("customer-name-input")
    }

    pub fn vin_input() -> Locator {
        Locator::test_id("vin-input")
    }

    pub fn make_input() -> Locator {
        Locator::test_id("make-input")
    }

    pub fn model_input() -> Locator {
        Locator::test_id("model-input")
    }

    pub fn year_input() -> Locator {
        Locator::test_id("year-input")
    }

    pub fn description_input() -> Locator {
        Locator::test_id("description-input")
    }

    pub fn estimated_cost_input() -> Locator {
        Locator::test_id("estimated-cost-input")
    }

    pub fn status_select() -> Locator {
        Locator::test_id("status-select")
    }

    pub fn save_button() -> Locator {
        Locator::test_id("save-order-button")
    }

    pub fn confirm_delete_button() -> Locator {
        Locator::test_id("confirm-delete-button")
    }

    pub fn form_error() -> Locator {
        Locator::test_id("form-error")
    }

    pub fn success_message() -> Locator {
        Locator::test_id("success-message")
    }

    pub fn results_table() -> Locator {
        Locator::test_id("orders-table")
    }

    pub fn no_results() -> Locator {
        Locator::test_id("no-results")
    }

    pub fn pagination_label() -> Locator {
        Locator::test_id("pagination-info")
    }

    pub fn next_page_button() -> Locator {
        Locator::test_id("next-page-button")
    }

    pub fn previous_page_button() -> Locator {
        Locator::test_id("prev-page-button")
    }

    pub fn order_details() -> Locator {
        Locator::test_id("order-details")
    }

    /// Every rendered result row
    pub fn order_rows() -> Locator {
        Locator::new(ROW_CSS)
    }

    /// Order-number cell of every row
    pub fn order_number_cells() -> Locator {
        Locator::new(format!("{ROW_CSS} [data-testid=\"order-number\"]"))
    }

    /// The row for one order
    pub fn order_row(order_number: &str) -> Locator {
        Locator::new(Self::row_css(order_number))
    }

    /// A cell or control inside one order's row
    pub fn order_row_part(order_number: &str, test_id: &str) -> Locator {
        Locator::new(format!(
            "{} {}",
            Self::row_css(order_number),
            css_attr("data-testid", test_id)
        ))
    }

    fn row_css(order_number: &str) -> String {
        format!("{ROW_CSS}{}", css_attr("data-order-number", order_number))
    }
}

impl RepairOrdersPage {
    /// Wrap the shared action layer
    #[must_use]
    pub const fn new(base: BasePage) -> Self {
        Self { base }
    }

    /// Open the create form, fill the supplied fields only, submit, settle.
    ///
    /// Fields left `None` are not touched, so incomplete orders reach the
    /// application's own validation.
    pub async fn create_repair_order(&self, order: &NewRepairOrder) -> HarnessResult<()> {
        info!(order_number = ?order.order_number, "create repair order");
        self.base.click(&Self::create_button()).await?;
        self.base.wait_for_element(&Self::order_form(), None).await?;

        let text_fields = [
            (Self::order_number_input(), order.order_number.clone()),
            (Self::customer_name_input(), order.customer_name.clone()),
            (Self::vin_input(), order.vehicle_vin.clone()),
            (Self::make_input(), order.make.clone()),
            (Self::model_input(), order.model.clone()),
            (Self::year_input(), order.year.map(|y| y.to_string())),
            (Self::description_input(), order.description.clone()),
            (Self::estimated_cost_input(), order.estimated_cost.map(|c| format!("{c:.2}"))),
        ];
        for (locator, value) in &text_fields {
            if let Some(value) = value {
                self.base.fill(locator, value).await?;
            }
        }
        if let Some(status) = order.status {
            self.base.select_option(&Self::status_select(), status.label()).await?;
        }

        self.base.click(&Self::save_button()).await?;
        self.base.wait_for_page_settled().await
    }

    /// Change one order's status through its edit form
    pub async fn update_status(&self, order_number: &str, status: RepairOrderStatus) -> HarnessResult<()> {
        info!(order_number, %status, "update status");
        self.base.click(&Self::order_row_part(order_number, "edit-button")).await?;
        self.base.wait_for_element(&Self::order_form(), None).await?;
        self.base.select_option(&Self::status_select(), status.label()).await?;
        self.base.click(&Self::save_button()).await?;
        self.base.wait_for_page_settled().await
    }

    /// Delete one order, confirming the prompt
    pub async fn delete_repair_order(&self, order_number: &str) -> HarnessResult<()> {
        info!(order_number, "delete repair order");
        self.base.click(&Self::order_row_part(order_number, "delete-button")).await?;
        self.base.click(&Self::confirm_delete_button()).await?;
        self.base.wait_for_page_settled().await
    }

    /// Open the details view for one order
    pub async fn open_order(&self, order_number: &str) -> HarnessResult<()> {
        self.base.click(&Self::order_row_part(order_number, "order-number")).await?;
        self.base.wait_for_page_settled().await?;
        self.base.wait_for_element(&Self::order_details(), None).await
    }

    /// Search by free text (order number, customer, make, ...)
    pub async fn search(&self, term: &str) -> HarnessResult<()> {
        info!(term, "search repair orders");
        self.base.fill(&Self::search_input(), term).await?;
        self.base.click(&Self::search_button()).await?;
        self.base.wait_for_page_settled().await
    }

    pub async fn clear_search(&self) -> HarnessResult<()> {
        self.base.click(&Self::clear_search_button()).await?;
        self.base.wait_for_page_settled().await
    }

    pub async fn filter_by_status(&self, status: RepairOrderStatus) -> HarnessResult<()> {
        self.base.select_option(&Self::status_filter(), status.label()).await?;
        self.base.wait_for_page_settled().await
    }

    /// Whether at least one result row is shown
    pub async fn has_results(&self) -> HarnessResult<bool> {
        self.base.is_visible(&Self::order_rows()).await
    }

    pub async fn is_no_results_visible(&self) -> HarnessResult<bool> {
        self.base.is_visible(&Self::no_results()).await
    }

    pub async fn is_results_table_visible(&self) -> HarnessResult<bool> {
        self.base.is_visible(&Self::results_table()).await
    }

    /// Number of rows currently rendered
    pub async fn row_count(&self) -> HarnessResult<usize> {
        self.base.count(&Self::order_rows()).await
    }

    /// Order numbers of every rendered row, in display order
    pub async fn all_order_numbers(&self) -> HarnessResult<Vec<String>> {
        self.base.all_texts(&Self::order_number_cells()).await
    }

    pub async fn has_order(&self, order_number: &str) -> HarnessResult<bool> {
        Ok(self
            .all_order_numbers()
            .await?
            .iter()
            .any(|n| n == order_number))
    }

    /// Status shown in one order's row; `None` when the row is absent or
    /// the label is not a known status
    pub async fn order_status(&self, order_number: &str) -> HarnessResult<Option<RepairOrderStatus>> {
        let cell = Self::order_row_part(order_number, "order-status");
        if !self.base.is_attached(&cell).await? {
            return Ok(None);
        }
        Ok(RepairOrderStatus::from_label(&self.base.text(&cell).await?))
    }

    pub async fn is_form_error_visible(&self) -> HarnessResult<bool> {
        self.base.is_visible(&Self::form_error()).await
    }

    pub async fn form_error_message(&self) -> HarnessResult<String> {
        self.base.text(&Self::form_error()).await
    }

    pub async fn is_success_visible(&self) -> HarnessResult<bool> {
        self.base.is_visible(&Self::success_message()).await
    }

    /// Current and total page, `None` when no indicator is rendered
    pub async fn pagination_info(&self) -> HarnessResult<Option<PaginationInfo>> {
        let label = self.base.text(&Self::pagination_label()).await?;
        PaginationInfo::parse(&label)
    }

    pub async fn next_page(&self) -> HarnessResult<()> {
        self.base.click(&Self::next_page_button()).await?;
        self.base.wait_for_page_settled().await
    }

    pub async fn previous_page(&self) -> HarnessResult<()> {
        self.base.click(&Self::previous_page_button()).await?;
        self.base.wait_for_page_settled().await
    }
}
