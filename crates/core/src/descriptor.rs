//! Static per-entity configuration.
//!
//! An [`EntityDescriptor`] is data, not behaviour: table name, field
//! whitelists, creation defaults and the template for the derived `Name`
//! display field. The generic [`crate::service::EntityService`] reads one of
//! these; the seven descriptor values live in [`crate::entities`].

use hms_types::IsoDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A default applied to a field that is absent from a create payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    /// A fixed string, e.g. a status defaulting to `"pending"`.
    Text(&'static str),
    /// A fixed number, e.g. a stock level defaulting to `0`.
    Number(i64),
    /// A fixed flag, e.g. `critical_flags` defaulting to `false`.
    Flag(bool),
    /// Today's date as an ISO 8601 string, resolved at create time.
    Today,
}

impl FieldDefault {
    /// Materializes the default, with `today` supplied by the caller so a
    /// whole create resolves against a single clock reading.
    pub fn materialize(&self, today: &IsoDate) -> Value {
        match self {
            Self::Text(text) => Value::from(*text),
            Self::Number(n) => Value::from(*n),
            Self::Flag(flag) => Value::from(*flag),
            Self::Today => Value::from(today.as_str()),
        }
    }
}

/// Template for the derived `Name` field: constituent fields joined by a
/// separator, e.g. `first_name` + `last_name` with `" "`, or
/// `patient_name` + `doctor` + `date` with `" - "`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameTemplate {
    pub parts: &'static [&'static str],
    pub separator: &'static str,
}

/// Static configuration for one entity kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityDescriptor {
    /// Remote collection identifier.
    pub table: &'static str,
    /// Lowercase singular noun used in notification wording.
    pub singular: &'static str,
    /// Lowercase plural noun used in notification wording.
    pub plural: &'static str,
    /// Fields returned by queries, audit fields included.
    pub readable_fields: &'static [&'static str],
    /// Fields permitted in create/update payloads. Audit and
    /// system-computed fields are excluded; `Id` is handled separately.
    pub writable_fields: &'static [&'static str],
    /// Defaults injected when a field is absent at creation time.
    pub defaults: &'static [(&'static str, FieldDefault)],
    /// Template for the derived `Name`.
    pub name_template: NameTemplate,
    /// Fields covered by the quick-search OR group.
    pub search_fields: &'static [&'static str],
    /// Fields coerced to real booleans before transmission.
    pub boolean_fields: &'static [&'static str],
    /// Fields coerced to numbers before transmission.
    pub numeric_fields: &'static [&'static str],
    /// Natural sort field, most-recent-first screens sort descending.
    pub order_field: &'static str,
    pub order_descending: bool,
}

impl EntityDescriptor {
    pub fn is_writable(&self, field: &str) -> bool {
        self.writable_fields.contains(&field)
    }

    pub fn is_boolean(&self, field: &str) -> bool {
        self.boolean_fields.contains(&field)
    }

    pub fn is_numeric(&self, field: &str) -> bool {
        self.numeric_fields.contains(&field)
    }

    pub fn default_for(&self, field: &str) -> Option<&FieldDefault> {
        self.defaults
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, default)| default)
    }

    /// Capitalized singular noun, e.g. `"Appointment"`. Used both in
    /// notification wording and as the last-resort derived `Name`.
    pub fn label(&self) -> String {
        let mut chars = self.singular.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

/// The seven record kinds of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Patient,
    Appointment,
    Invoice,
    Medication,
    Prescription,
    LabResult,
    Emergency,
}

impl EntityKind {
    pub const ALL: [Self; 7] = [
        Self::Patient,
        Self::Appointment,
        Self::Invoice,
        Self::Medication,
        Self::Prescription,
        Self::LabResult,
        Self::Emergency,
    ];

    pub fn descriptor(self) -> &'static EntityDescriptor {
        match self {
            Self::Patient => &crate::entities::patient::PATIENT,
            Self::Appointment => &crate::entities::appointment::APPOINTMENT,
            Self::Invoice => &crate::entities::invoice::INVOICE,
            Self::Medication => &crate::entities::medication::MEDICATION,
            Self::Prescription => &crate::entities::prescription::PRESCRIPTION,
            Self::LabResult => &crate::entities::lab_result::LAB_RESULT,
            Self::Emergency => &crate::entities::emergency::EMERGENCY,
        }
    }

    /// URL/CLI identifier, e.g. `lab-results`.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Patient => "patients",
            Self::Appointment => "appointments",
            Self::Invoice => "invoices",
            Self::Medication => "medications",
            Self::Prescription => "prescriptions",
            Self::LabResult => "lab-results",
            Self::Emergency => "emergencies",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Error from parsing an [`EntityKind`] out of a URL path or CLI argument.
#[derive(Debug, thiserror::Error)]
#[error("unknown entity kind {0:?}")]
pub struct UnknownEntity(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| UnknownEntity(s.to_owned()))
    }
}

/// A typed record kind: a serde-mapped struct bound to its descriptor.
///
/// Implemented by the structs in [`crate::entities`]; lets
/// [`crate::service::Typed`] decode store records into domain types.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    const KIND: EntityKind;

    fn descriptor() -> &'static EntityDescriptor {
        Self::KIND.descriptor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_parses_from_its_own_slug() {
        for kind in EntityKind::ALL {
            let parsed: EntityKind = kind.slug().parse().expect("slug should parse");
            assert_eq!(parsed, kind);
        }
        assert!("wards".parse::<EntityKind>().is_err());
    }

    #[test]
    fn writable_fields_are_a_subset_of_readable_fields() {
        for kind in EntityKind::ALL {
            let descriptor = kind.descriptor();
            for field in descriptor.writable_fields {
                assert!(
                    descriptor.readable_fields.contains(field),
                    "{}: writable field {field} missing from readable set",
                    descriptor.table
                );
            }
        }
    }

    #[test]
    fn audit_fields_are_never_writable() {
        for kind in EntityKind::ALL {
            let descriptor = kind.descriptor();
            for audit in ["created_at", "updated_at", "Id"] {
                assert!(
                    !descriptor.is_writable(audit),
                    "{}: {audit} must not be writable",
                    descriptor.table
                );
            }
        }
    }

    #[test]
    fn name_template_parts_and_defaults_reference_writable_fields() {
        for kind in EntityKind::ALL {
            let descriptor = kind.descriptor();
            for part in descriptor.name_template.parts {
                assert!(
                    descriptor.is_writable(part),
                    "{}: template part {part} is not writable",
                    descriptor.table
                );
            }
            for (field, _) in descriptor.defaults {
                assert!(
                    descriptor.is_writable(field),
                    "{}: defaulted field {field} is not writable",
                    descriptor.table
                );
            }
        }
    }

    #[test]
    fn label_capitalizes_the_singular() {
        assert_eq!(EntityKind::LabResult.descriptor().label(), "Lab result");
        assert_eq!(EntityKind::Patient.descriptor().label(), "Patient");
    }
}
