//! Patient registration records.

use crate::descriptor::{Entity, EntityDescriptor, EntityKind, FieldDefault, NameTemplate};
use hms_types::RecordId;
use serde::{Deserialize, Serialize};

pub static PATIENT: EntityDescriptor = EntityDescriptor {
    table: "patients",
    singular: "patient",
    plural: "patients",
    readable_fields: &[
        "Id",
        "Name",
        "first_name",
        "last_name",
        "email",
        "phone",
        "date_of_birth",
        "gender",
        "address",
        "blood_group",
        "registered_date",
        "created_at",
        "updated_at",
    ],
    writable_fields: &[
        "Name",
        "first_name",
        "last_name",
        "email",
        "phone",
        "date_of_birth",
        "gender",
        "address",
        "blood_group",
        "registered_date",
    ],
    defaults: &[("registered_date", FieldDefault::Today)],
    name_template: NameTemplate {
        parts: &["first_name", "last_name"],
        separator: " ",
    },
    search_fields: &["first_name", "last_name", "email"],
    boolean_fields: &[],
    numeric_fields: &[],
    order_field: "registered_date",
    order_descending: true,
};

/// A registered patient as the store returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Patient {
    #[serde(rename = "Id", default)]
    pub id: Option<RecordId>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub registered_date: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Entity for Patient {
    const KIND: EntityKind = EntityKind::Patient;
}
