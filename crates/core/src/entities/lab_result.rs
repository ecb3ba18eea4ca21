//! Laboratory result records.

use crate::descriptor::{Entity, EntityDescriptor, EntityKind, FieldDefault, NameTemplate};
use hms_types::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub static LAB_RESULT: EntityDescriptor = EntityDescriptor {
    table: "lab_results",
    singular: "lab result",
    plural: "lab results",
    readable_fields: &[
        "Id",
        "Name",
        "patient_name",
        "test_name",
        "category",
        "result_value",
        "unit",
        "reference_range",
        "status",
        "critical_flags",
        "sample_date",
        "technician",
        "created_at",
        "updated_at",
    ],
    writable_fields: &[
        "Name",
        "patient_name",
        "test_name",
        "category",
        "result_value",
        "unit",
        "reference_range",
        "status",
        "critical_flags",
        "sample_date",
        "technician",
    ],
    defaults: &[
        ("status", FieldDefault::Text("pending")),
        ("critical_flags", FieldDefault::Flag(false)),
        ("sample_date", FieldDefault::Today),
    ],
    name_template: NameTemplate {
        parts: &["patient_name", "test_name"],
        separator: " - ",
    },
    search_fields: &["patient_name", "test_name", "technician"],
    boolean_fields: &["critical_flags"],
    numeric_fields: &[],
    order_field: "sample_date",
    order_descending: true,
};

/// Conventional lab-result lifecycle: `pending → in-progress → completed`.
///
/// The `critical_flags` boolean is orthogonal to status and may be toggled
/// at any point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabResultStatus {
    Pending,
    InProgress,
    Completed,
}

impl LabResultStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for LabResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabResultStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown lab result status {other:?}")),
        }
    }
}

/// A lab result as the store returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabResult {
    #[serde(rename = "Id", default)]
    pub id: Option<RecordId>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub test_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub result_value: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub reference_range: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub critical_flags: bool,
    #[serde(default)]
    pub sample_date: String,
    #[serde(default)]
    pub technician: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Entity for LabResult {
    const KIND: EntityKind = EntityKind::LabResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_serializes_kebab_case() {
        let json = serde_json::to_string(&LabResultStatus::InProgress)
            .expect("status should serialize");
        assert_eq!(json, "\"in-progress\"");
        assert_eq!(
            "in-progress".parse::<LabResultStatus>().expect("should parse"),
            LabResultStatus::InProgress
        );
    }
}
