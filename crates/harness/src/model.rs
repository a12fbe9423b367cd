//! DMS records as they travel over the wire and through forms.
//!
//! JSON keys are camelCase. Every `New*`/`*Patch`/`*Filter` type holds
//! optional fields only; unset fields are omitted on the wire and left
//! untouched when filling a form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Username/password pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create a credential pair
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Repair order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepairOrderStatus {
    /// Awaiting work
    Pending,
    /// Work under way
    #[serde(rename = "In Progress")]
    InProgress,
    /// Blocked on parts
    #[serde(rename = "Awaiting Parts")]
    AwaitingParts,
    /// Done
    Completed,
    /// Abandoned
    Cancelled,
}

impl RepairOrderStatus {
    /// Every status, in workflow order
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InProgress,
        Self::AwaitingParts,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Label shown in the UI and used on the wire
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::AwaitingParts => "Awaiting Parts",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Parse a UI label
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for RepairOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Appointment service category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    /// Oil change
    #[serde(rename = "Oil Change")]
    OilChange,
    /// Tire rotation
    #[serde(rename = "Tire Rotation")]
    TireRotation,
    /// Brake service
    #[serde(rename = "Brake Service")]
    BrakeService,
    /// Scheduled maintenance
    Maintenance,
    /// Diagnostics
    Diagnostics,
    /// General repair
    Repair,
}

impl ServiceType {
    /// Every service type
    pub const ALL: [Self; 6] = [
        Self::OilChange,
        Self::TireRotation,
        Self::BrakeService,
        Self::Maintenance,
        Self::Diagnostics,
        Self::Repair,
    ];

    /// Label shown in the UI and used on the wire
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OilChange => "Oil Change",
            Self::TireRotation => "Tire Rotation",
            Self::BrakeService => "Brake Service",
            Self::Maintenance => "Maintenance",
            Self::Diagnostics => "Diagnostics",
            Self::Repair => "Repair",
        }
    }

    /// Parse a UI label
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    /// Booked
    Scheduled,
    /// Confirmed with the customer
    Confirmed,
    /// Service done
    Completed,
    /// Cancelled
    Cancelled,
}

impl AppointmentStatus {
    /// Label shown in the UI and used on the wire
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Confirmed => "Confirmed",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A repair order as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairOrder {
    /// Server-issued identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Business order number, e.g. `RO-2024-00042`
    pub order_number: String,
    /// Customer name
    pub customer_name: String,
    /// Vehicle identification number
    pub vehicle_vin: String,
    /// Vehicle make
    pub make: String,
    /// Vehicle model
    pub model: String,
    /// Model year
    pub year: u16,
    /// Work description
    #[serde(default)]
    pub description: String,
    /// Estimated cost
    #[serde(default)]
    pub estimated_cost: f64,
    /// Lifecycle status
    pub status: RepairOrderStatus,
}

/// Repair order creation payload / form contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRepairOrder {
    /// Business order number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    /// Customer name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// Vehicle identification number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_vin: Option<String>,
    /// Vehicle make
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    /// Vehicle model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Model year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// Work description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Estimated cost
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    /// Initial status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RepairOrderStatus>,
}

/// Partial repair order update; only `Some` fields change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairOrderPatch {
    /// New customer name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New estimated cost
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    /// New status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RepairOrderStatus>,
}

impl RepairOrderPatch {
    /// Patch that only moves the status
    #[must_use]
    pub fn status(status: RepairOrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Repair order search criteria, serialised as query parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairOrderFilter {
    /// Exact order number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    /// Customer name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// Status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RepairOrderStatus>,
    /// Vehicle make
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    /// Vehicle VIN
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_vin: Option<String>,
}

/// An appointment as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Server-issued identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Customer name
    pub customer_name: String,
    /// Contact phone
    pub phone_number: String,
    /// Contact email
    pub email: String,
    /// Service category
    pub service_type: ServiceType,
    /// Vehicle identification number
    pub vehicle_vin: String,
    /// Date, `YYYY-MM-DD`
    pub scheduled_date: String,
    /// Time, `HH:MM`
    pub scheduled_time: String,
    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Lifecycle status
    pub status: AppointmentStatus,
}

/// Appointment creation payload / form contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    /// Customer name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// Contact phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Contact email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Service category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    /// Vehicle identification number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_vin: Option<String>,
    /// Date, `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    /// Time, `HH:MM`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    /// Free-text notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial appointment update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    /// New date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    /// New time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    /// New notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// New status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
}

/// Appointment search criteria
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentFilter {
    /// Customer name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    /// Service category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    /// Date, `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    /// Status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
}
