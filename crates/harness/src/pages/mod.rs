//! Page objects for the DMS UI.
//!
//! Each page composes a [`BasePage`](crate::page_object::BasePage) and
//! exposes its selection criteria as associated functions that build a
//! fresh [`Locator`](crate::locator::Locator) per call.

mod appointments;
mod login;
mod repair_orders;

pub use appointments::AppointmentsPage;
pub use login::LoginPage;
pub use repair_orders::{PaginationInfo, RepairOrdersPage};
