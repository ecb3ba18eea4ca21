//! The seven record kinds of the console.
//!
//! Each module is mostly data: the entity's [`EntityDescriptor`] value, a
//! typed serde struct for callers that want more than a raw field map, and a
//! status enum where the entity is status-bearing. All control flow lives in
//! the generic [`crate::service::EntityService`].
//!
//! Status transitions are a calling-convention, not an adapter invariant:
//! the store has no server-side state machine and the adapter will perform
//! whatever single-field update is requested. The enums document the
//! conventional value sets and terminal states.
//!
//! [`EntityDescriptor`]: crate::descriptor::EntityDescriptor

pub mod appointment;
pub mod emergency;
pub mod invoice;
pub mod lab_result;
pub mod medication;
pub mod patient;
pub mod prescription;

pub use appointment::{Appointment, AppointmentStatus};
pub use emergency::{Emergency, EmergencyStatus};
pub use invoice::{Invoice, InvoiceStatus};
pub use lab_result::{LabResult, LabResultStatus};
pub use medication::Medication;
pub use patient::Patient;
pub use prescription::{Prescription, PrescriptionStatus};
