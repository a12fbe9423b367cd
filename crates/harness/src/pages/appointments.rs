//! Appointment scheduling: list, form and calendar.

use crate::locator::{css_attr, Locator};
use crate::model::{NewAppointment, ServiceType};
use crate::page_object::{BasePage, PageObject};
use crate::result::{AssertionError, HarnessError, HarnessResult};
use crate::wait::{poll_until, WaitOptions};
use std::sync::Mutex;
use tracing::{debug, info};

const ROW_CSS: &str = "[data-testid=\"appointment-row\"]";

/// The `/appointments` page
#[derive(Debug, Clone)]
pub struct AppointmentsPage {
    base: BasePage,
}

impl PageObject for AppointmentsPage {
    fn url_pattern(&self) -> &str {
        "/appointments"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn page_name(&self) -> &str {
        "AppointmentsPage"
    }
}

// Selection criteria
impl AppointmentsPage {
    pub fn new_appointment_button() -> Locator {
        Locator::test_id("new-appointment-button")
    }

    pub fn appointment_form() -> Locator {
        Locator::test_id("appointment-form")
    }

    pub fn customer_name_input() -> Locator {
        Locator::test_id("customer-name-input")
    }

    pub fn phone_input() -> Locator {
        Locator::test_id("phone-input")
    }

    pub fn email_input() -> Locator {
        Locator::test_id("email-input")
    }

    pub fn service_type_select() -> Locator {
        Locator::test_id("service-type-select")
    }

    pub fn vin_input() -> Locator {
        Locator::test_id("vin-input")
    }

    pub fn date_input() -> Locator {
        Locator::test_id("date-input")
    }

    pub fn time_input() -> Locator {
        Locator::test_id("time-input")
    }

    pub fn notes_input() -> Locator {
        Locator::test_id("notes-input")
    }

    pub fn save_button() -> Locator {
        Locator::test_id("save-appointment-button")
    }

    pub fn confirm_cancel_button() -> Locator {
        Locator::test_id("confirm-cancel-button")
    }

    pub fn form_error() -> Locator {
        Locator::test_id("form-error")
    }

    pub fn success_message() -> Locator {
        Locator::test_id("success-message")
    }

    pub fn service_type_filter() -> Locator {
        Locator::test_id("service-type-filter")
    }

    pub fn calendar_view_button() -> Locator {
        Locator::test_id("calendar-view-button")
    }

    pub fn list_view_button() -> Locator {
        Locator::test_id("list-view-button")
    }

    pub fn calendar() -> Locator {
        Locator::test_id("calendar-view")
    }

    pub fn appointment_list() -> Locator {
        Locator::test_id("appointment-list")
    }

    pub fn month_label() -> Locator {
        Locator::test_id("current-month")
    }

    pub fn next_month_button() -> Locator {
        Locator::test_id("next-month-button")
    }

    pub fn previous_month_button() -> Locator {
        Locator::test_id("prev-month-button")
    }

    /// Every rendered appointment row
    pub fn appointment_rows() -> Locator {
        Locator::new(ROW_CSS)
    }

    /// The row for one customer's appointment
    pub fn appointment_row(customer_name: &str) -> Locator {
        Locator::new(format!("{ROW_CSS}{}", css_attr("data-customer", customer_name)))
    }

    /// The cancel control inside one customer's row
    pub fn cancel_button(customer_name: &str) -> Locator {
        Locator::new(format!(
            "{ROW_CSS}{} [data-testid=\"cancel-button\"]",
            css_attr("data-customer", customer_name)
        ))
    }
}

impl AppointmentsPage {
    /// Wrap the shared action layer
    #[must_use]
    pub const fn new(base: BasePage) -> Self {
        Self { base }
    }

    /// Open the form, fill the supplied fields only, submit, settle
    pub async fn schedule_appointment(&self, appointment: &NewAppointment) -> HarnessResult<()> {
        info!(customer = ?appointment.customer_name, "schedule appointment");
        self.base.click(&Self::new_appointment_button()).await?;
        self.base.wait_for_element(&Self::appointment_form(), None).await?;

        let text_fields = [
            (Self::customer_name_input(), &appointment.customer_name),
            (Self::phone_input(), &appointment.phone_number),
            (Self::email_input(), &appointment.email),
            (Self::vin_input(), &appointment.vehicle_vin),
            (Self::date_input(), &appointment.scheduled_date),
            (Self::time_input(), &appointment.scheduled_time),
            (Self::notes_input(), &appointment.notes),
        ];
        for (locator, value) in &text_fields {
            if let Some(value) = value {
                self.base.fill(locator, value).await?;
            }
        }
        if let Some(service) = appointment.service_type {
            self.base
                .select_option(&Self::service_type_select(), service.label())
                .await?;
        }

        self.base.click(&Self::save_button()).await?;
        self.base.wait_for_page_settled().await
    }

    /// Cancel one customer's appointment, confirming the prompt
    pub async fn cancel_appointment(&self, customer_name: &str) -> HarnessResult<()> {
        info!(customer_name, "cancel appointment");
        self.base.click(&Self::cancel_button(customer_name)).await?;
        self.base.click(&Self::confirm_cancel_button()).await?;
        self.base.wait_for_page_settled().await
    }

    pub async fn filter_by_service_type(&self, service: ServiceType) -> HarnessResult<()> {
        self.base
            .select_option(&Self::service_type_filter(), service.label())
            .await?;
        self.base.wait_for_page_settled().await
    }

    /// Number of appointment rows currently rendered
    pub async fn appointment_count(&self) -> HarnessResult<usize> {
        self.base.count(&Self::appointment_rows()).await
    }

    pub async fn has_appointment(&self, customer_name: &str) -> HarnessResult<bool> {
        self.base.is_visible(&Self::appointment_row(customer_name)).await
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

    pub async fn switch_to_calendar_view(&self) -> HarnessResult<()> {
        self.base.click(&Self::calendar_view_button()).await?;
        self.base.wait_for_element(&Self::calendar(), None).await
    }

    pub async fn switch_to_list_view(&self) -> HarnessResult<()> {
        self.base.click(&Self::list_view_button()).await?;
        self.base.wait_for_element(&Self::appointment_list(), None).await
    }

    /// Month shown in the calendar header, e.g. "June 2024"
    pub async fn current_month_label(&self) -> HarnessResult<String> {
        self.base.text(&Self::month_label()).await
    }

    /// Advance one month and wait for the header to change
    pub async fn next_month(&self) -> HarnessResult<String> {
        self.step_month(&Self::next_month_button()).await
    }

    /// Go back one month and wait for the header to change
    pub async fn previous_month(&self) -> HarnessResult<String> {
        self.step_month(&Self::previous_month_button()).await
    }

    /// Move forward `steps` months, then back `steps` months.
    ///
    /// Fails with an assertion error unless the forward moves changed the
    /// label and the backward moves restored it exactly. Returns the label.
    pub async fn verify_month_round_trip(&self, steps: usize) -> HarnessResult<String> {
        let original = self.current_month_label().await?;
        let mut label = original.clone();
        for _ in 0..steps {
            label = self.next_month().await?;
        }
        if steps > 0 && label == original {
            return Err(AssertionError::PageState {
                what: format!("calendar month after {steps} step(s) forward"),
                expected: format!("anything but {original}"),
                actual: label,
            }
            .into());
        }
        for _ in 0..steps {
            label = self.previous_month().await?;
        }
        if label != original {
            return Err(AssertionError::PageState {
                what: format!("calendar month after {steps} step(s) forward and back"),
                expected: original,
                actual: label,
            }
            .into());
        }
        Ok(original)
    }

    async fn step_month(&self, button: &Locator) -> HarnessResult<String> {
        let before = self.current_month_label().await?;
        self.base.click(button).await?;

        let options = WaitOptions::new()
            .with_timeout(self.base.config().action_timeout)
            .with_poll_interval(button.options().poll_interval);
        let label = Self::month_label();
        let moved_to = Mutex::new(String::new());
        let result = poll_until(
            || {
                let (label, before, moved_to) = (&label, &before, &moved_to);
                async move {
                    let text = self.base.text(label).await?;
                    if text.is_empty() || text == *before {
                        return Ok(false);
                    }
                    *moved_to
                        .lock()
                        .map_err(|_| HarnessError::driver("calendar label lock poisoned"))? = text;
                    Ok::<_, HarnessError>(true)
                }
            },
            options,
        )
        .await?;
        if !result.success {
            return Err(HarnessError::ElementTimeout {
                locator: label.to_string(),
                state: "changed",
                ms: options.timeout_ms(),
            });
        }
        let after = moved_to
            .into_inner()
            .map_err(|_| HarnessError::driver("calendar label lock poisoned"))?;
        debug!(%before, %after, "calendar moved");
        Ok(after)
    }
}
