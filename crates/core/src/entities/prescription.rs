//! Prescription records.

use crate::descriptor::{Entity, EntityDescriptor, EntityKind, FieldDefault, NameTemplate};
use hms_types::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub static PRESCRIPTION: EntityDescriptor = EntityDescriptor {
    table: "prescriptions",
    singular: "prescription",
    plural: "prescriptions",
    readable_fields: &[
        "Id",
        "Name",
        "patient_name",
        "doctor",
        "medication_name",
        "dosage",
        "frequency",
        "duration",
        "quantity",
        "order_date",
        "status",
        "notes",
        "created_at",
        "updated_at",
    ],
    writable_fields: &[
        "Name",
        "patient_name",
        "doctor",
        "medication_name",
        "dosage",
        "frequency",
        "duration",
        "quantity",
        "order_date",
        "status",
        "notes",
    ],
    defaults: &[
        ("status", FieldDefault::Text("pending")),
        ("order_date", FieldDefault::Today),
        ("quantity", FieldDefault::Number(1)),
    ],
    name_template: NameTemplate {
        parts: &["patient_name", "medication_name"],
        separator: " - ",
    },
    search_fields: &["patient_name", "doctor", "medication_name"],
    boolean_fields: &[],
    numeric_fields: &["quantity"],
    order_field: "order_date",
    order_descending: true,
};

/// Conventional prescription lifecycle: `pending → dispensed` (terminal).
/// Dispensing may attach free-text notes via a regular update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    Pending,
    Dispensed,
}

impl PrescriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Dispensed => "dispensed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Dispensed)
    }
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrescriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "dispensed" => Ok(Self::Dispensed),
            other => Err(format!("unknown prescription status {other:?}")),
        }
    }
}

/// A prescription as the store returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prescription {
    #[serde(rename = "Id", default)]
    pub id: Option<RecordId>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub doctor: String,
    #[serde(default)]
    pub medication_name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub order_date: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Entity for Prescription {
    const KIND: EntityKind = EntityKind::Prescription;
}
