//! Emergency alerting records.

use crate::descriptor::{Entity, EntityDescriptor, EntityKind, FieldDefault, NameTemplate};
use hms_types::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub static EMERGENCY: EntityDescriptor = EntityDescriptor {
    table: "emergencies",
    singular: "emergency",
    plural: "emergencies",
    readable_fields: &[
        "Id",
        "Name",
        "patient_name",
        "location",
        "severity",
        "description",
        "status",
        "reported_date",
        "responder",
        "created_at",
        "updated_at",
    ],
    writable_fields: &[
        "Name",
        "patient_name",
        "location",
        "severity",
        "description",
        "status",
        "reported_date",
        "responder",
    ],
    defaults: &[
        ("status", FieldDefault::Text("active")),
        ("reported_date", FieldDefault::Today),
    ],
    name_template: NameTemplate {
        parts: &["patient_name", "location"],
        separator: " - ",
    },
    search_fields: &["patient_name", "location", "responder"],
    boolean_fields: &[],
    numeric_fields: &[],
    order_field: "reported_date",
    order_descending: true,
};

/// Conventional emergency lifecycle: `active → resolved` (terminal), with no
/// intermediate states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmergencyStatus {
    Active,
    Resolved,
}

impl EmergencyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resolved => "resolved",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl fmt::Display for EmergencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmergencyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "resolved" => Ok(Self::Resolved),
            other => Err(format!("unknown emergency status {other:?}")),
        }
    }
}

/// An emergency alert as the store returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Emergency {
    #[serde(rename = "Id", default)]
    pub id: Option<RecordId>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub reported_date: String,
    #[serde(default)]
    pub responder: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Entity for Emergency {
    const KIND: EntityKind = EntityKind::Emergency;
}
