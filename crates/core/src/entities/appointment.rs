//! Appointment scheduling records.

use crate::descriptor::{Entity, EntityDescriptor, EntityKind, FieldDefault, NameTemplate};
use hms_types::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub static APPOINTMENT: EntityDescriptor = EntityDescriptor {
    table: "appointments",
    singular: "appointment",
    plural: "appointments",
    readable_fields: &[
        "Id",
        "Name",
        "patient_name",
        "doctor",
        "department",
        "date",
        "time",
        "type",
        "status",
        "notes",
        "created_at",
        "updated_at",
    ],
    writable_fields: &[
        "Name",
        "patient_name",
        "doctor",
        "department",
        "date",
        "time",
        "type",
        "status",
        "notes",
    ],
    defaults: &[
        ("status", FieldDefault::Text("pending")),
        ("type", FieldDefault::Text("consultation")),
    ],
    name_template: NameTemplate {
        parts: &["patient_name", "doctor", "date"],
        separator: " - ",
    },
    search_fields: &["patient_name", "doctor", "department"],
    boolean_fields: &[],
    numeric_fields: &[],
    order_field: "date",
    order_descending: true,
};

/// Conventional appointment lifecycle:
/// `pending → confirmed → completed`, or `pending|confirmed → cancelled`.
///
/// Cancellation needs explicit user confirmation upstream; the adapter does
/// not enforce the transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown appointment status {other:?}")),
        }
    }
}

/// A scheduled appointment as the store returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(rename = "Id", default)]
    pub id: Option<RecordId>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub doctor: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(rename = "type", default)]
    pub appointment_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Entity for Appointment {
    const KIND: EntityKind = EntityKind::Appointment;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            let parsed: AppointmentStatus =
                status.as_str().parse().expect("status string should parse");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn completed_and_cancelled_are_terminal() {
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(!AppointmentStatus::Pending.is_terminal());
        assert!(!AppointmentStatus::Confirmed.is_terminal());
    }
}
