//! Shared fakes for integration tests.
//!
//! * [`FakeDms`] renders the DMS UI into a [`MockDriver`]: login, repair
//!   orders and appointments, with the validation rules the real app has.
//! * [`FakeApi`] serves the DMS REST surface from an in-process axum server.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Datelike, NaiveDate};
use dms_harness::driver::{MockDom, MockElement};
use dms_harness::fixtures;
use dms_harness::model::{AppointmentStatus, RepairOrderStatus, ServiceType};
use dms_harness::pages::{AppointmentsPage, LoginPage, RepairOrdersPage};
use dms_harness::{BasePage, HarnessConfig, Locator, MockDriver, Selector};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const USERNAME: &str = "service.advisor";
pub const PASSWORD: &str = "correct-horse";
pub const API_TOKEN: &str = "test-api-token";
pub const BASE_URL: &str = "http://dms.test";

const PAGE_SIZE: usize = 10;

/// Configuration with timeouts short enough for negative probes
pub fn fast_config() -> HarnessConfig {
    HarnessConfig::default()
        .with_base_url(BASE_URL)
        .with_credentials(USERNAME, PASSWORD)
        .with_navigation_timeout(Duration::from_secs(2))
        .with_action_timeout(Duration::from_millis(300))
        .with_visibility_probe_timeout(Duration::from_millis(60))
}

fn sel(locator: Locator) -> Selector {
    locator.selector().clone()
}

// ============================================================================
// Fake UI
// ============================================================================

#[derive(Debug, Clone)]
pub struct UiOrder {
    pub order_number: String,
    pub customer_name: String,
    pub make: String,
    pub model: String,
    pub vin: String,
    pub status: RepairOrderStatus,
}

#[derive(Debug, Clone)]
pub struct UiAppointment {
    pub customer_name: String,
    pub service_type: ServiceType,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum OrderForm {
    Create,
    Edit(String),
}

#[derive(Debug)]
pub struct AppState {
    logged_in: bool,
    login_error: bool,
    pub orders: Vec<UiOrder>,
    search: Option<String>,
    status_filter: Option<RepairOrderStatus>,
    order_form: Option<OrderForm>,
    pending_delete: Option<String>,
    details: Option<String>,
    page: usize,
    success: Option<String>,
    pub appointments: Vec<UiAppointment>,
    appointment_form: bool,
    pending_cancel: Option<String>,
    service_filter: Option<ServiceType>,
    calendar: bool,
    month: NaiveDate,
}

type Shared = Arc<Mutex<AppState>>;

/// A scripted DMS front end running inside a [`MockDriver`]
pub struct FakeDms {
    pub driver: Arc<MockDriver>,
    pub state: Shared,
}

impl FakeDms {
    /// Seeded with RO-2024-001 plus `extra_orders` generated orders
    pub fn new(extra_orders: usize) -> Self {
        let mut orders = vec![UiOrder {
            order_number: fixtures::EXISTING_ORDER_NUMBER.to_string(),
            customer_name: "John Smith".to_string(),
            make: "Honda".to_string(),
            model: "Civic".to_string(),
            vin: "1HGBH41JXMN109186".to_string(),
            status: RepairOrderStatus::Pending,
        }];
        for i in 0..extra_orders {
            orders.push(UiOrder {
                order_number: format!("RO-2024-{:03}", i + 2),
                customer_name: format!("Customer {}", i + 2),
                make: "Ford".to_string(),
                model: "Focus".to_string(),
                vin: fixtures::generate_vin(),
                status: RepairOrderStatus::InProgress,
            });
        }
        let state = Arc::new(Mutex::new(AppState {
            logged_in: false,
            login_error: false,
            orders,
            search: None,
            status_filter: None,
            order_form: None,
            pending_delete: None,
            details: None,
            page: 1,
            success: None,
            appointments: vec![UiAppointment {
                customer_name: "Existing Customer".to_string(),
                service_type: ServiceType::TireRotation,
                status: AppointmentStatus::Scheduled,
            }],
            appointment_form: false,
            pending_cancel: None,
            service_filter: None,
            calendar: false,
            month: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        }));

        let driver = Arc::new(MockDriver::new());
        let nav_state = state.clone();
        driver
            .on_navigate(move |dom, url| route(dom, &nav_state, url))
            .unwrap();
        Self { driver, state }
    }

    /// Start already authenticated
    pub fn logged_in(self) -> Self {
        self.state.lock().unwrap().logged_in = true;
        self
    }

    /// Action layer over this app with [`fast_config`]
    pub fn base(&self) -> BasePage {
        BasePage::new(self.driver.clone(), fast_config())
    }

    pub fn order_count(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }
}

fn route(dom: &mut MockDom, state: &Shared, url: &str) {
    let path = url.strip_prefix(BASE_URL).unwrap_or(url);
    let logged_in = state.lock().unwrap().logged_in;
    if !logged_in || path.starts_with("/login") {
        go(dom, state, "/login");
        return;
    }
    if path.starts_with("/repair-orders") {
        go(dom, state, "/repair-orders");
    } else if path.starts_with("/appointments") {
        go(dom, state, "/appointments");
    } else {
        go(dom, state, "/dashboard");
    }
}

fn go(dom: &mut MockDom, state: &Shared, path: &str) {
    dom.url = format!("{BASE_URL}{path}");
    render(dom, state);
}

fn render(dom: &mut MockDom, state: &Shared) {
    dom.clear();
    let path = dom.url.strip_prefix(BASE_URL).unwrap_or("").to_string();
    match path.as_str() {
        "/login" => render_login(dom, state),
        "/repair-orders" => render_orders(dom, state),
        "/appointments" => render_appointments(dom, state),
        _ => render_dashboard(dom, state),
    }
}

fn logout_control(dom: &mut MockDom, state: &Shared) {
    dom.add(MockElement::new(sel(LoginPage::logout_button())).with_text("Log out"));
    let s = state.clone();
    dom.on_click(sel(LoginPage::logout_button()), move |dom| {
        s.lock().unwrap().logged_in = false;
        go(dom, &s, "/login");
    });
}

fn render_login(dom: &mut MockDom, state: &Shared) {
    dom.title = "DMS - Login".to_string();
    dom.add(MockElement::new(sel(LoginPage::username_input())))
        .add(MockElement::new(sel(LoginPage::password_input())))
        .add(MockElement::new(sel(LoginPage::login_button())).with_text("Sign in"));
    if state.lock().unwrap().login_error {
        dom.add(MockElement::new(sel(LoginPage::error_banner())).with_text("Invalid username or password"));
    }
    let s = state.clone();
    dom.on_click(sel(LoginPage::login_button()), move |dom| {
        let user = dom.value_of(&sel(LoginPage::username_input()));
        let pass = dom.value_of(&sel(LoginPage::password_input()));
        let ok = user == USERNAME && pass == PASSWORD;
        {
            let mut st = s.lock().unwrap();
            st.logged_in = ok;
            st.login_error = !ok;
        }
        if ok {
            go(dom, &s, "/dashboard");
        } else {
            render(dom, &s);
        }
    });
}

fn render_dashboard(dom: &mut MockDom, state: &Shared) {
    dom.title = "DMS - Dashboard".to_string();
    dom.add(MockElement::new(Selector::test_id("dashboard")).with_text("Welcome"));
    logout_control(dom, state);
}

fn visible_orders(st: &AppState) -> Vec<UiOrder> {
    st.orders
        .iter()
        .filter(|o| {
            st.search.as_ref().map_or(true, |term| {
                let term = term.to_lowercase();
                [&o.order_number, &o.customer_name, &o.make, &o.model]
                    .iter()
                    .any(|f| f.to_lowercase().contains(&term))
            })
        })
        .filter(|o| st.status_filter.map_or(true, |s| o.status == s))
        .cloned()
        .collect()
}

fn render_orders(dom: &mut MockDom, state: &Shared) {
    dom.title = "DMS - Repair Orders".to_string();
    logout_control(dom, state);
    let st = state.lock().unwrap();
    let status_labels: Vec<&str> = RepairOrderStatus::ALL.iter().map(|s| s.label()).collect();

    dom.add(MockElement::new(sel(RepairOrdersPage::search_input())).with_value(st.search.clone().unwrap_or_default()))
        .add(MockElement::new(sel(RepairOrdersPage::search_button())).with_text("Search"))
        .add(MockElement::new(sel(RepairOrdersPage::clear_search_button())).with_text("Clear"))
        .add(
            MockElement::new(sel(RepairOrdersPage::status_filter()))
                .with_options(status_labels.clone())
                .with_value(st.status_filter.map(|s| s.label().to_string()).unwrap_or_default()),
        )
        .add(MockElement::new(sel(RepairOrdersPage::create_button())).with_text("New Repair Order"));

    let matching = visible_orders(&st);
    let pages = matching.len().div_ceil(PAGE_SIZE).max(1);
    let page = st.page.min(pages);
    if matching.is_empty() {
        dom.add(MockElement::new(sel(RepairOrdersPage::no_results())).with_text("No results found"));
    } else {
        dom.add(MockElement::new(sel(RepairOrdersPage::results_table())));
        for order in matching.iter().skip((page - 1) * PAGE_SIZE).take(PAGE_SIZE) {
            let n = &order.order_number;
            dom.add(MockElement::new(sel(RepairOrdersPage::order_rows())).with_text(format!(
                "{n} {} {} {} {}",
                order.customer_name, order.make, order.model, order.status
            )))
            .add(MockElement::new(sel(RepairOrdersPage::order_number_cells())).with_text(n.clone()))
            .add(MockElement::new(sel(RepairOrdersPage::order_row(n))).with_text(n.clone()))
            .add(MockElement::new(sel(RepairOrdersPage::order_row_part(n, "order-number"))).with_text(n.clone()))
            .add(MockElement::new(sel(RepairOrdersPage::order_row_part(n, "order-status"))).with_text(order.status.label()))
            .add(MockElement::new(sel(RepairOrdersPage::order_row_part(n, "edit-button"))).with_text("Edit"))
            .add(MockElement::new(sel(RepairOrdersPage::order_row_part(n, "delete-button"))).with_text("Delete"));
        }
        dom.add(MockElement::new(sel(RepairOrdersPage::pagination_label())).with_text(format!("Page {page} of {pages}")));
        let mut next = MockElement::new(sel(RepairOrdersPage::next_page_button())).with_text("Next");
        next.enabled = page < pages;
        let mut prev = MockElement::new(sel(RepairOrdersPage::previous_page_button())).with_text("Previous");
        prev.enabled = page > 1;
        dom.add(next).add(prev);
    }

    if let Some(form) = &st.order_form {
        let editing = match form {
            OrderForm::Edit(n) => st.orders.iter().find(|o| &o.order_number == n).cloned(),
            OrderForm::Create => None,
        };
        dom.add(MockElement::new(sel(RepairOrdersPage::order_form())));
        for input in [
            RepairOrdersPage::order_number_input(),
            RepairOrdersPage::customer_name_input(),
            RepairOrdersPage::vin_input(),
            RepairOrdersPage::make_input(),
            RepairOrdersPage::model_input(),
            RepairOrdersPage::year_input(),
            RepairOrdersPage::description_input(),
            RepairOrdersPage::estimated_cost_input(),
        ] {
            dom.add(MockElement::new(sel(input)));
        }
        dom.add(
            MockElement::new(sel(RepairOrdersPage::status_select()))
                .with_options(status_labels)
                .with_value(editing.map_or("Pending", |o| o.status.label())),
        )
        .add(MockElement::new(sel(RepairOrdersPage::save_button())).with_text("Save"));
    }
    if st.pending_delete.is_some() {
        dom.add(MockElement::new(sel(RepairOrdersPage::confirm_delete_button())).with_text("Confirm"));
    }
    if let Some(n) = &st.details {
        dom.add(MockElement::new(sel(RepairOrdersPage::order_details())).with_text(format!("Repair order {n}")));
    }
    if let Some(message) = &st.success {
        dom.add(MockElement::new(sel(RepairOrdersPage::success_message())).with_text(message.clone()));
    }
    let numbers: Vec<String> = matching.iter().map(|o| o.order_number.clone()).collect();
    drop(st);

    register_order_handlers(dom, state, &numbers);
}

fn register_order_handlers(dom: &mut MockDom, state: &Shared, numbers: &[String]) {
    let s = state.clone();
    dom.on_click(sel(RepairOrdersPage::search_button()), move |dom| {
        let term = dom.value_of(&sel(RepairOrdersPage::search_input()));
        {
            let mut st = s.lock().unwrap();
            st.search = if term.trim().is_empty() { None } else { Some(term) };
            st.page = 1;
            st.success = None;
        }
        render(dom, &s);
    });

    let s = state.clone();
    dom.on_click(sel(RepairOrdersPage::clear_search_button()), move |dom| {
        {
            let mut st = s.lock().unwrap();
            st.search = None;
            st.status_filter = None;
            st.page = 1;
        }
        render(dom, &s);
    });

    let s = state.clone();
    dom.on_change(sel(RepairOrdersPage::status_filter()), move |dom| {
        let label = dom.value_of(&sel(RepairOrdersPage::status_filter()));
        {
            let mut st = s.lock().unwrap();
            st.status_filter = RepairOrderStatus::from_label(&label);
            st.page = 1;
        }
        render(dom, &s);
    });

    let s = state.clone();
    dom.on_click(sel(RepairOrdersPage::create_button()), move |dom| {
        {
            let mut st = s.lock().unwrap();
            st.order_form = Some(OrderForm::Create);
            st.success = None;
        }
        render(dom, &s);
    });

    let s = state.clone();
    dom.on_click(sel(RepairOrdersPage::save_button()), move |dom| save_order(dom, &s));

    let s = state.clone();
    dom.on_click(sel(RepairOrdersPage::next_page_button()), move |dom| {
        s.lock().unwrap().page += 1;
        render(dom, &s);
    });

    let s = state.clone();
    dom.on_click(sel(RepairOrdersPage::previous_page_button()), move |dom| {
        {
            let mut st = s.lock().unwrap();
            st.page = st.page.saturating_sub(1).max(1);
        }
        render(dom, &s);
    });

    let s = state.clone();
    dom.on_click(sel(RepairOrdersPage::confirm_delete_button()), move |dom| {
        {
            let mut st = s.lock().unwrap();
            if let Some(n) = st.pending_delete.take() {
                st.orders.retain(|o| o.order_number != n);
                st.success = Some("Repair order deleted".to_string());
            }
        }
        render(dom, &s);
    });

    for n in numbers {
        let (s, num) = (state.clone(), n.clone());
        dom.on_click(sel(RepairOrdersPage::order_row_part(n, "edit-button")), move |dom| {
            s.lock().unwrap().order_form = Some(OrderForm::Edit(num.clone()));
            render(dom, &s);
        });
        let (s, num) = (state.clone(), n.clone());
        dom.on_click(sel(RepairOrdersPage::order_row_part(n, "delete-button")), move |dom| {
            s.lock().unwrap().pending_delete = Some(num.clone());
            render(dom, &s);
        });
        let (s, num) = (state.clone(), n.clone());
        dom.on_click(sel(RepairOrdersPage::order_row_part(n, "order-number")), move |dom| {
            s.lock().unwrap().details = Some(num.clone());
            render(dom, &s);
        });
    }
}

fn save_order(dom: &mut MockDom, state: &Shared) {
    let field = |dom: &MockDom, l: Locator| dom.value_of(&sel(l)).trim().to_string();
    let form = state.lock().unwrap().order_form.clone();
    match form {
        Some(OrderForm::Create) => {
            let number = field(dom, RepairOrdersPage::order_number_input());
            let customer = field(dom, RepairOrdersPage::customer_name_input());
            let vin = field(dom, RepairOrdersPage::vin_input());
            let make = field(dom, RepairOrdersPage::make_input());
            let model = field(dom, RepairOrdersPage::model_input());
            if [&number, &customer, &vin, &make, &model].iter().any(|v| v.is_empty()) {
                dom.add(
                    MockElement::new(sel(RepairOrdersPage::form_error()))
                        .with_text("Please fill in all required fields"),
                );
                return;
            }
            let status = RepairOrderStatus::from_label(&field(dom, RepairOrdersPage::status_select()))
                .unwrap_or(RepairOrderStatus::Pending);
            let mut st = state.lock().unwrap();
            st.orders.push(UiOrder {
                order_number: number,
                customer_name: customer,
                make,
                model,
                vin,
                status,
            });
            st.order_form = None;
            st.success = Some("Repair order created".to_string());
        }
        Some(OrderForm::Edit(n)) => {
            let status = RepairOrderStatus::from_label(&field(dom, RepairOrdersPage::status_select()));
            let mut st = state.lock().unwrap();
            if let (Some(order), Some(status)) = (st.orders.iter_mut().find(|o| o.order_number == n), status) {
                order.status = status;
            }
            st.order_form = None;
            st.success = Some("Repair order updated".to_string());
        }
        None => return,
    }
    render(dom, state);
}

fn render_appointments(dom: &mut MockDom, state: &Shared) {
    dom.title = "DMS - Appointments".to_string();
    logout_control(dom, state);
    let st = state.lock().unwrap();
    let services: Vec<&str> = ServiceType::ALL.iter().map(|s| s.label()).collect();

    dom.add(MockElement::new(sel(AppointmentsPage::new_appointment_button())).with_text("New Appointment"))
        .add(MockElement::new(sel(AppointmentsPage::service_type_filter())).with_options(services.clone()))
        .add(MockElement::new(sel(AppointmentsPage::calendar_view_button())).with_text("Calendar"))
        .add(MockElement::new(sel(AppointmentsPage::list_view_button())).with_text("List"));

    let active: Vec<UiAppointment> = st
        .appointments
        .iter()
        .filter(|a| a.status != AppointmentStatus::Cancelled)
        .filter(|a| st.service_filter.map_or(true, |s| a.service_type == s))
        .cloned()
        .collect();

    if st.calendar {
        dom.add(MockElement::new(sel(AppointmentsPage::calendar())))
            .add(MockElement::new(sel(AppointmentsPage::month_label())).with_text(st.month.format("%B %Y").to_string()))
            .add(MockElement::new(sel(AppointmentsPage::next_month_button())).with_text(">"))
            .add(MockElement::new(sel(AppointmentsPage::previous_month_button())).with_text("<"));
    } else {
        dom.add(MockElement::new(sel(AppointmentsPage::appointment_list())));
        for appt in &active {
            let name = &appt.customer_name;
            dom.add(
                MockElement::new(sel(AppointmentsPage::appointment_rows()))
                    .with_text(format!("{name} {}", appt.service_type)),
            )
            .add(MockElement::new(sel(AppointmentsPage::appointment_row(name))).with_text(name.clone()))
            .add(MockElement::new(sel(AppointmentsPage::cancel_button(name))).with_text("Cancel"));
        }
    }

    if st.appointment_form {
        dom.add(MockElement::new(sel(AppointmentsPage::appointment_form())));
        for input in [
            AppointmentsPage::customer_name_input(),
            AppointmentsPage::phone_input(),
            AppointmentsPage::email_input(),
            AppointmentsPage::vin_input(),
            AppointmentsPage::date_input(),
            AppointmentsPage::time_input(),
            AppointmentsPage::notes_input(),
        ] {
            dom.add(MockElement::new(sel(input)));
        }
        dom.add(MockElement::new(sel(AppointmentsPage::service_type_select())).with_options(services))
            .add(MockElement::new(sel(AppointmentsPage::save_button())).with_text("Save"));
    }
    if st.pending_cancel.is_some() {
        dom.add(MockElement::new(sel(AppointmentsPage::confirm_cancel_button())).with_text("Yes, cancel"));
    }
    if let Some(message) = &st.success {
        dom.add(MockElement::new(sel(AppointmentsPage::success_message())).with_text(message.clone()));
    }
    let names: Vec<String> = active.iter().map(|a| a.customer_name.clone()).collect();
    drop(st);

    register_appointment_handlers(dom, state, &names);
}

fn shift_month(month: NaiveDate, forward: bool) -> NaiveDate {
    let (y, m) = (month.year(), month.month());
    let (y, m) = match (forward, m) {
        (true, 12) => (y + 1, 1),
        (true, m) => (y, m + 1),
        (false, 1) => (y - 1, 12),
        (false, m) => (y, m - 1),
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap()
}

fn is_valid_phone(phone: &str) -> bool {
    let digits: Vec<&str> = phone.split('-').collect();
    digits.len() == 3
        && [3, 3, 4]
            .iter()
            .zip(&digits)
            .all(|(len, part)| part.len() == *len && part.chars().all(|c| c.is_ascii_digit()))
}

fn register_appointment_handlers(dom: &mut MockDom, state: &Shared, names: &[String]) {
    let s = state.clone();
    dom.on_click(sel(AppointmentsPage::new_appointment_button()), move |dom| {
        {
            let mut st = s.lock().unwrap();
            st.appointment_form = true;
            st.calendar = false;
            st.success = None;
        }
        render(dom, &s);
    });

    let s = state.clone();
    dom.on_click(sel(AppointmentsPage::save_button()), move |dom| {
        let field = |l: Locator| dom.value_of(&sel(l)).trim().to_string();
        let customer = field(AppointmentsPage::customer_name_input());
        let phone = field(AppointmentsPage::phone_input());
        let date = field(AppointmentsPage::date_input());
        let time = field(AppointmentsPage::time_input());
        let service = ServiceType::from_label(&field(AppointmentsPage::service_type_select()));

        let error = if customer.is_empty() || date.is_empty() || time.is_empty() || service.is_none() {
            Some("Please fill in all required fields")
        } else if !is_valid_phone(&phone) {
            Some("Please enter a valid phone number")
        } else {
            None
        };
        if let Some(message) = error {
            dom.add(MockElement::new(sel(AppointmentsPage::form_error())).with_text(message));
            return;
        }
        {
            let mut st = s.lock().unwrap();
            st.appointments.push(UiAppointment {
                customer_name: customer,
                service_type: service.unwrap_or(ServiceType::Maintenance),
                status: AppointmentStatus::Scheduled,
            });
            st.appointment_form = false;
            st.success = Some("Appointment scheduled".to_string());
        }
        render(dom, &s);
    });

    let s = state.clone();
    dom.on_change(sel(AppointmentsPage::service_type_filter()), move |dom| {
        let label = dom.value_of(&sel(AppointmentsPage::service_type_filter()));
        s.lock().unwrap().service_filter = ServiceType::from_label(&label);
        render(dom, &s);
    });

    let s = state.clone();
    dom.on_click(sel(AppointmentsPage::calendar_view_button()), move |dom| {
        s.lock().unwrap().calendar = true;
        render(dom, &s);
    });

    let s = state.clone();
    dom.on_click(sel(AppointmentsPage::list_view_button()), move |dom| {
        s.lock().unwrap().calendar = false;
        render(dom, &s);
    });

    for forward in [true, false] {
        let s = state.clone();
        let button = if forward {
            AppointmentsPage::next_month_button()
        } else {
            AppointmentsPage::previous_month_button()
        };
        dom.on_click(sel(button), move |dom| {
            {
                let mut st = s.lock().unwrap();
                st.month = shift_month(st.month, forward);
            }
            render(dom, &s);
        });
    }

    let s = state.clone();
    dom.on_click(sel(AppointmentsPage::confirm_cancel_button()), move |dom| {
        {
            let mut st = s.lock().unwrap();
            if let Some(name) = st.pending_cancel.take() {
                for appt in st.appointments.iter_mut().filter(|a| a.customer_name == name) {
                    appt.status = AppointmentStatus::Cancelled;
                }
                st.success = Some("Appointment cancelled".to_string());
            }
        }
        render(dom, &s);
    });

    for name in names {
        let (s, who) = (state.clone(), name.clone());
        dom.on_click(sel(AppointmentsPage::cancel_button(name)), move |dom| {
            s.lock().unwrap().pending_cancel = Some(who.clone());
            render(dom, &s);
        });
    }
}

// ============================================================================
// Fake REST API
// ============================================================================

#[derive(Debug, Default)]
struct ApiState {
    repair_orders: Vec<Map<String, Value>>,
    appointments: Vec<Map<String, Value>>,
}

type ApiShared = Arc<Mutex<ApiState>>;

/// A running fake of the DMS REST surface
#[derive(Debug)]
pub struct FakeApi {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl FakeApi {
    /// Bind an ephemeral port and serve until dropped
    pub async fn spawn() -> Self {
        let mut seeded = Map::new();
        for (k, v) in [
            ("id", json!(uuid::Uuid::new_v4().to_string())),
            ("orderNumber", json!(fixtures::EXISTING_ORDER_NUMBER)),
            ("customerName", json!("John Smith")),
            ("vehicleVin", json!("1HGBH41JXMN109186")),
            ("make", json!("Honda")),
            ("model", json!("Civic")),
            ("year", json!(2021)),
            ("description", json!("Oil change and tire rotation")),
            ("estimatedCost", json!(149.99)),
            ("status", json!("Pending")),
        ] {
            seeded.insert(k.to_string(), v);
        }
        let state: ApiShared = Arc::new(Mutex::new(ApiState {
            repair_orders: vec![seeded],
            appointments: Vec::new(),
        }));

        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/validate", get(validate))
            .route("/api/repair-orders", get(list_orders).post(create_order))
            .route(
                "/api/repair-orders/{id}",
                get(get_order).patch(patch_order).delete(delete_order),
            )
            .route("/api/appointments", get(list_appointments).post(create_appointment))
            .route(
                "/api/appointments/{id}",
                get(get_appointment).patch(patch_appointment).delete(delete_appointment),
            )
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            base_url: format!("http://{addr}/api"),
            handle,
        }
    }

    /// Harness configuration pointing at this server
    pub fn config(&self) -> HarnessConfig {
        fast_config()
            .with_api_base_url(self.base_url.clone())
            .with_api_token(API_TOKEN)
            .with_api_timeout(Duration::from_secs(5))
    }
}

/// A listener that accepts connections and never answers
#[derive(Debug)]
pub struct SilentApi {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for SilentApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl SilentApi {
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        Self {
            base_url: format!("http://{addr}/api"),
            handle,
        }
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {API_TOKEN}"))
}

async fn login(Json(body): Json<Value>) -> Response {
    let user = body.get("username").and_then(Value::as_str);
    let pass = body.get("password").and_then(Value::as_str);
    if user == Some(USERNAME) && pass == Some(PASSWORD) {
        Json(json!({ "token": uuid::Uuid::new_v4().to_string(), "user": USERNAME })).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn validate(headers: HeaderMap) -> Response {
    if authorized(&headers) {
        Json(json!({ "valid": true })).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Unauthorized")
    }
}

#[derive(Clone, Copy)]
enum Collection {
    RepairOrders,
    Appointments,
}

impl Collection {
    fn records(self, state: &mut ApiState) -> &mut Vec<Map<String, Value>> {
        match self {
            Self::RepairOrders => &mut state.repair_orders,
            Self::Appointments => &mut state.appointments,
        }
    }

    fn not_found(self) -> Response {
        match self {
            Self::RepairOrders => error(StatusCode::NOT_FOUND, "Repair order not found"),
            Self::Appointments => error(StatusCode::NOT_FOUND, "Appointment not found"),
        }
    }
}

fn list(state: &ApiShared, headers: &HeaderMap, filters: &HashMap<String, String>, collection: Collection) -> Response {
    if !authorized(headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut st = state.lock().unwrap();
    let matching: Vec<Value> = collection
        .records(&mut st)
        .iter()
        .filter(|record| {
            filters.iter().all(|(key, want)| match record.get(key) {
                Some(Value::String(s)) => s == want,
                Some(other) => &other.to_string() == want,
                None => false,
            })
        })
        .map(|record| Value::Object(record.clone()))
        .collect();
    Json(Value::Array(matching)).into_response()
}

fn find(state: &ApiShared, headers: &HeaderMap, id: &str, collection: Collection) -> Response {
    if !authorized(headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut st = state.lock().unwrap();
    match collection.records(&mut st).iter().find(|r| r.get("id") == Some(&json!(id))) {
        Some(record) => Json(Value::Object(record.clone())).into_response(),
        None => collection.not_found(),
    }
}

fn create(
    state: &ApiShared,
    headers: &HeaderMap,
    body: Value,
    collection: Collection,
    required: &[&str],
    default_status: &str,
) -> Response {
    if !authorized(headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let Value::Object(mut record) = body else {
        return error(StatusCode::BAD_REQUEST, "Body must be a JSON object");
    };
    for field in required {
        if record.get(*field).and_then(Value::as_str).map_or(true, str::is_empty) {
            return error(StatusCode::BAD_REQUEST, &format!("Missing required field: {field}"));
        }
    }
    if let Some(phone) = record.get("phoneNumber").and_then(Value::as_str) {
        if !is_valid_phone(phone) {
            return error(StatusCode::BAD_REQUEST, "Invalid phone number");
        }
    }
    let mut st = state.lock().unwrap();
    let records = collection.records(&mut st);
    if let Some(number) = record.get("orderNumber") {
        if records.iter().any(|r| r.get("orderNumber") == Some(number)) {
            return error(StatusCode::CONFLICT, "Order number already exists");
        }
    }
    record.insert("id".to_string(), json!(uuid::Uuid::new_v4().to_string()));
    record.entry("status").or_insert_with(|| json!(default_status));
    records.push(record.clone());
    (StatusCode::CREATED, Json(Value::Object(record))).into_response()
}

fn patch(state: &ApiShared, headers: &HeaderMap, id: &str, body: Value, collection: Collection) -> Response {
    if !authorized(headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let Value::Object(changes) = body else {
        return error(StatusCode::BAD_REQUEST, "Body must be a JSON object");
    };
    let mut st = state.lock().unwrap();
    match collection.records(&mut st).iter_mut().find(|r| r.get("id") == Some(&json!(id))) {
        Some(record) => {
            for (k, v) in changes {
                if k != "id" {
                    record.insert(k, v);
                }
            }
            Json(Value::Object(record.clone())).into_response()
        }
        None => collection.not_found(),
    }
}

fn delete(state: &ApiShared, headers: &HeaderMap, id: &str, collection: Collection) -> Response {
    if !authorized(headers) {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let mut st = state.lock().unwrap();
    let records = collection.records(&mut st);
    let before = records.len();
    records.retain(|r| r.get("id") != Some(&json!(id)));
    if records.len() == before {
        collection.not_found()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

const ORDER_REQUIRED: &[&str] = &["orderNumber", "customerName", "vehicleVin", "make", "model"];
const APPOINTMENT_REQUIRED: &[&str] = &["customerName", "phoneNumber", "serviceType", "scheduledDate", "scheduledTime"];

async fn list_orders(
    State(state): State<ApiShared>,
    headers: HeaderMap,
    Query(filters): Query<HashMap<String, String>>,
) -> Response {
    list(&state, &headers, &filters, Collection::RepairOrders)
}

async fn get_order(State(state): State<ApiShared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    find(&state, &headers, &id, Collection::RepairOrders)
}

async fn create_order(State(state): State<ApiShared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    create(&state, &headers, body, Collection::RepairOrders, ORDER_REQUIRED, "Pending")
}

async fn patch_order(
    State(state): State<ApiShared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    patch(&state, &headers, &id, body, Collection::RepairOrders)
}

async fn delete_order(State(state): State<ApiShared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    delete(&state, &headers, &id, Collection::RepairOrders)
}

async fn list_appointments(
    State(state): State<ApiShared>,
    headers: HeaderMap,
    Query(filters): Query<HashMap<String, String>>,
) -> Response {
    list(&state, &headers, &filters, Collection::Appointments)
}

async fn get_appointment(State(state): State<ApiShared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    find(&state, &headers, &id, Collection::Appointments)
}

async fn create_appointment(State(state): State<ApiShared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    create(&state, &headers, body, Collection::Appointments, APPOINTMENT_REQUIRED, "Scheduled")
}

async fn patch_appointment(
    State(state): State<ApiShared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    patch(&state, &headers, &id, body, Collection::Appointments)
}

async fn delete_appointment(State(state): State<ApiShared>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    delete(&state, &headers, &id, Collection::Appointments)
}
