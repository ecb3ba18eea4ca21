//! Billing and invoicing records.

use crate::descriptor::{Entity, EntityDescriptor, EntityKind, FieldDefault, NameTemplate};
use hms_types::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub static INVOICE: EntityDescriptor = EntityDescriptor {
    table: "invoices",
    singular: "invoice",
    plural: "invoices",
    readable_fields: &[
        "Id",
        "Name",
        "patient_name",
        "description",
        "amount",
        "issued_date",
        "due_date",
        "status",
        "payment_method",
        "created_at",
        "updated_at",
    ],
    writable_fields: &[
        "Name",
        "patient_name",
        "description",
        "amount",
        "issued_date",
        "due_date",
        "status",
        "payment_method",
    ],
    defaults: &[
        ("status", FieldDefault::Text("pending")),
        ("issued_date", FieldDefault::Today),
        ("amount", FieldDefault::Number(0)),
    ],
    name_template: NameTemplate {
        parts: &["patient_name", "issued_date"],
        separator: " - ",
    },
    search_fields: &["patient_name", "description"],
    boolean_fields: &[],
    numeric_fields: &["amount"],
    order_field: "issued_date",
    order_descending: true,
};

/// Conventional invoice lifecycle: `pending → paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(format!("unknown invoice status {other:?}")),
        }
    }
}

/// An invoice as the store returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "Id", default)]
    pub id: Option<RecordId>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub issued_date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Entity for Invoice {
    const KIND: EntityKind = EntityKind::Invoice;
}
