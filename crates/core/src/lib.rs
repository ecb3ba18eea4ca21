//! # HMS Core
//!
//! Business logic for the hospital administration console.
//!
//! The console's seven screens (patients, appointments, invoices,
//! medications, prescriptions, lab results, emergencies) are all CRUD
//! surfaces over the same remote record store. The original system carried
//! one hand-written service module per screen; this crate collapses them
//! into a single generic engine:
//!
//! - [`descriptor::EntityDescriptor`] — static per-entity configuration
//!   (table name, field whitelists, defaults, derived-name template)
//! - [`payload`] — turns raw form payloads into store-ready records
//!   (whitelisting, coercions, default injection, derived `Name`)
//! - [`service::EntityService`] — the adapter itself: list / get / create /
//!   update / remove / set_field against the store, with per-id mutation
//!   serialization and the user-facing notification side channel
//! - [`entities`] — the seven data-only descriptors plus typed records and
//!   status enums
//!
//! **No API concerns**: HTTP routing and CLI parsing live in `api-rest` and
//! `hms-cli`; the transport itself lives in `hms-store`.

pub mod config;
pub mod descriptor;
pub mod entities;
pub mod error;
pub mod notify;
pub mod payload;
pub mod service;

pub use config::ConsoleConfig;
pub use descriptor::{Entity, EntityDescriptor, EntityKind, FieldDefault, NameTemplate};
pub use error::{ServiceError, ServiceResult};
pub use notify::{BufferedNotifier, LogNotifier, Notification, Notify, Severity};
pub use service::{EntityService, ListQuery, ServiceRegistry, Typed};
