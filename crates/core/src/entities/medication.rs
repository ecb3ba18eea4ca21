//! Pharmacy inventory records.

use crate::descriptor::{Entity, EntityDescriptor, EntityKind, FieldDefault, NameTemplate};
use hms_types::RecordId;
use serde::{Deserialize, Serialize};

pub static MEDICATION: EntityDescriptor = EntityDescriptor {
    table: "medications",
    singular: "medication",
    plural: "medications",
    readable_fields: &[
        "Id",
        "Name",
        "medication_name",
        "category",
        "stock",
        "unit_price",
        "reorder_level",
        "supplier",
        "expiry_date",
        "created_at",
        "updated_at",
    ],
    writable_fields: &[
        "Name",
        "medication_name",
        "category",
        "stock",
        "unit_price",
        "reorder_level",
        "supplier",
        "expiry_date",
    ],
    defaults: &[
        ("stock", FieldDefault::Number(0)),
        ("reorder_level", FieldDefault::Number(10)),
    ],
    name_template: NameTemplate {
        parts: &["medication_name", "category"],
        separator: " - ",
    },
    search_fields: &["medication_name", "category", "supplier"],
    boolean_fields: &[],
    numeric_fields: &["stock", "unit_price", "reorder_level"],
    order_field: "medication_name",
    order_descending: false,
};

/// A pharmacy inventory line as the store returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Medication {
    #[serde(rename = "Id", default)]
    pub id: Option<RecordId>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(default)]
    pub medication_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub reorder_level: i64,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Medication {
    /// True once stock has fallen to the reorder threshold.
    pub fn needs_reorder(&self) -> bool {
        self.stock <= self.reorder_level
    }
}

impl Entity for Medication {
    const KIND: EntityKind = EntityKind::Medication;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorder_threshold_is_inclusive() {
        let mut medication = Medication {
            stock: 10,
            reorder_level: 10,
            ..Medication::default()
        };
        assert!(medication.needs_reorder());

        medication.stock = 11;
        assert!(!medication.needs_reorder());
    }
}
