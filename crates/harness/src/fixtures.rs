//! Test data: static records plus generators for unique values.
//!
//! Static fixtures are plain values; generators produce a fresh value per
//! call and depend only on process-local randomness and the clock.

use crate::config::HarnessConfig;
use crate::model::{Credentials, NewAppointment, NewRepairOrder, RepairOrderStatus, ServiceType};
use crate::result::HarnessResult;
use chrono::{Datelike, Duration as ChronoDuration, Local, NaiveDate, Weekday};
use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

/// Characters legal in a VIN (no I, O or Q)
pub const VIN_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPRSTUVWXYZ0123456789";

/// VIN length
pub const VIN_LENGTH: usize = 17;

/// Order-number suffix space (5 digits)
const ORDER_SUFFIX_SPACE: u32 = 100_000;

/// Order number known to exist in the seeded DMS dataset
pub const EXISTING_ORDER_NUMBER: &str = "RO-2024-001";

/// Order number guaranteed not to exist
pub const NONEXISTENT_ORDER_NUMBER: &str = "RO-9999-999";

static ORDER_OFFSET: OnceLock<u32> = OnceLock::new();
static ORDER_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Generate a unique order number: `RO-<current year>-<5 digits>`.
///
/// The suffix is a random per-process offset advanced by a process-wide
/// counter, so consecutive calls in one process never repeat within 100000
/// generations. Across processes collisions stay possible; creation
/// failures on a duplicate key are a data collision, not a harness fault.
#[must_use]
pub fn generate_order_number() -> String {
    order_number_for_year(Local::now().year())
}

/// Generate a unique order number for a given year.
#[must_use]
pub fn order_number_for_year(year: i32) -> String {
    let offset = *ORDER_OFFSET.get_or_init(|| rand::thread_rng().gen_range(0..ORDER_SUFFIX_SPACE));
    let n = ORDER_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = offset.wrapping_add(n) % ORDER_SUFFIX_SPACE;
    format!("RO-{year:04}-{suffix:05}")
}

/// Generate a random 17-character VIN from the VIN-legal alphabet.
#[must_use]
pub fn generate_vin() -> String {
    let mut rng = rand::thread_rng();
    (0..VIN_LENGTH)
        .map(|_| char::from(VIN_ALPHABET[rng.gen_range(0..VIN_ALPHABET.len())]))
        .collect()
}

/// Next business day after `today`.
///
/// Friday and Saturday roll forward to Monday; every other day yields
/// tomorrow.
#[must_use]
pub fn next_business_day(today: NaiveDate) -> NaiveDate {
    let days = match today.weekday() {
        Weekday::Fri => 3,
        Weekday::Sat => 2,
        _ => 1,
    };
    today + ChronoDuration::days(days)
}

/// [`next_business_day`] relative to the local date.
#[must_use]
pub fn next_business_day_from_now() -> NaiveDate {
    next_business_day(Local::now().date_naive())
}

/// Configured valid credentials
pub fn valid_credentials(config: &HarnessConfig) -> HarnessResult<Credentials> {
    config.credentials()
}

/// Credential pairs the application must reject
#[must_use]
pub fn invalid_credentials() -> Vec<Credentials> {
    vec![
        Credentials::new("invalid_user", "wrong_password"),
        Credentials::new("admin", "not-the-password"),
        Credentials::new("", ""),
        Credentials::new("' OR '1'='1", "' OR '1'='1"),
    ]
}

/// The seeded repair order used by read/search tests
#[must_use]
pub fn existing_repair_order() -> NewRepairOrder {
    NewRepairOrder {
        order_number: Some(EXISTING_ORDER_NUMBER.to_string()),
        customer_name: Some("John Smith".to_string()),
        vehicle_vin: Some("1HGBH41JXMN109186".to_string()),
        make: Some("Honda".to_string()),
        model: Some("Civic".to_string()),
        year: Some(2021),
        description: Some("Oil change and tire rotation".to_string()),
        estimated_cost: Some(149.99),
        status: Some(RepairOrderStatus::Pending),
    }
}

/// Order number that never exists
#[must_use]
pub fn nonexistent_order_number() -> &'static str {
    NONEXISTENT_ORDER_NUMBER
}

/// A complete, freshly-numbered repair order
#[must_use]
pub fn new_repair_order() -> NewRepairOrder {
    NewRepairOrder {
        order_number: Some(generate_order_number()),
        customer_name: Some("Test Customer".to_string()),
        vehicle_vin: Some(generate_vin()),
        make: Some("Toyota".to_string()),
        model: Some("Camry".to_string()),
        year: Some(2022),
        description: Some("Brake pad replacement, front axle".to_string()),
        estimated_cost: Some(389.50),
        status: Some(RepairOrderStatus::Pending),
    }
}

/// A repair order missing VIN, make and model
#[must_use]
pub fn incomplete_repair_order() -> NewRepairOrder {
    NewRepairOrder {
        vehicle_vin: None,
        make: None,
        model: None,
        ..new_repair_order()
    }
}

/// A complete appointment on the next business day
#[must_use]
pub fn new_appointment() -> NewAppointment {
    NewAppointment {
        customer_name: Some("Jane Doe".to_string()),
        phone_number: Some("555-123-4567".to_string()),
        email: Some("jane.doe@example.com".to_string()),
        service_type: Some(ServiceType::OilChange),
        vehicle_vin: Some(generate_vin()),
        scheduled_date: Some(next_business_day_from_now().format("%Y-%m-%d").to_string()),
        scheduled_time: Some("10:00".to_string()),
        notes: Some("Customer will wait on site".to_string()),
    }
}

/// An appointment whose phone number fails validation
#[must_use]
pub fn invalid_phone_appointment() -> NewAppointment {
    NewAppointment {
        phone_number: Some("invalid".to_string()),
        ..new_appointment()
    }
}

/// Search values for the repair order list
#[must_use]
pub fn search_terms() -> SearchTerms {
    SearchTerms {
        existing_order_number: EXISTING_ORDER_NUMBER,
        nonexistent_order_number: NONEXISTENT_ORDER_NUMBER,
        customer_name: "John Smith",
        make: "Honda",
    }
}

/// Search values for the repair order list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTerms {
    /// Order number present in the seeded data
    pub existing_order_number: &'static str,
    /// Order number absent from any dataset
    pub nonexistent_order_number: &'static str,
    /// Customer present in the seeded data
    pub customer_name: &'static str,
    /// Make present in the seeded data
    pub make: &'static str,
}
