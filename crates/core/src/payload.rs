//! Turns raw form payloads into store-ready records.
//!
//! This is where the per-entity rules of the console live:
//!
//! - only `writable_fields` survive; anything else is silently dropped
//! - on **create**, empty-string values are treated as absent so blank form
//!   inputs never overwrite descriptor defaults
//! - on **update**, empty strings are forwarded as-is — "clear this field"
//!   and "field not part of this update" are different things
//! - boolean-flag fields become real booleans, numeric fields become real
//!   numbers (unparseable input collapses to the zero/false default rather
//!   than failing)
//! - dates pass through untouched as ISO 8601 strings
//! - create payloads get descriptor defaults and a derived `Name`

use crate::descriptor::EntityDescriptor;
use hms_store::{Record, NAME_FIELD};
use hms_types::IsoDate;
use serde_json::Value;

/// Whether a payload is being shaped for a create or an update; the
/// empty-string rule differs between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    Create,
    Update,
}

fn is_empty_string(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}

/// Coerces a value to a real boolean. Strings accept the usual truthy
/// spellings; anything unrecognised is `false`.
fn coerce_bool(value: &Value) -> Value {
    let flag = match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    };
    Value::from(flag)
}

/// Coerces a value to a number, preferring integer representation for whole
/// values. Non-numeric input collapses to `0`.
fn coerce_number(value: &Value) -> Value {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    match parsed {
        Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(f as i64),
        Some(f) => Value::from(f),
        None => Value::from(0),
    }
}

/// Today's date, the single clock reading a create resolves against.
pub fn today() -> IsoDate {
    IsoDate::today()
}

/// Renders the derived `Name` from the template over `record`, skipping
/// blank constituents. Falls back to the capitalized singular label so a
/// fully-defaulted create still gets a non-empty name.
pub fn derive_name(descriptor: &EntityDescriptor, record: &Record) -> String {
    let parts: Vec<&str> = descriptor
        .name_template
        .parts
        .iter()
        .filter_map(|part| record.get(*part).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if parts.is_empty() {
        descriptor.label()
    } else {
        parts.join(descriptor.name_template.separator)
    }
}

/// Shapes a raw payload into the record that goes over the wire.
///
/// For [`PayloadMode::Create`] the result additionally carries descriptor
/// defaults for absent fields and a derived `Name` (unless one was
/// supplied). `Id` is never part of the result; the service inserts it for
/// updates.
pub fn build_payload(descriptor: &EntityDescriptor, input: Record, mode: PayloadMode) -> Record {
    let mut record = Record::new();

    for (field, value) in input {
        if !descriptor.is_writable(&field) || value.is_null() {
            continue;
        }
        if mode == PayloadMode::Create && is_empty_string(&value) {
            continue;
        }

        let value = if descriptor.is_boolean(&field) {
            coerce_bool(&value)
        } else if descriptor.is_numeric(&field) {
            coerce_number(&value)
        } else {
            value
        };
        record.insert(field, value);
    }

    if mode == PayloadMode::Create {
        let today = today();
        for (field, default) in descriptor.defaults {
            if !record.contains_key(*field) {
                record.insert((*field).to_owned(), default.materialize(&today));
            }
        }

        let name_missing = record
            .get(NAME_FIELD)
            .and_then(Value::as_str)
            .map_or(true, |s| s.trim().is_empty());
        if name_missing {
            let name = derive_name(descriptor, &record);
            record.insert(NAME_FIELD.to_owned(), Value::from(name));
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::EntityKind;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn unknown_fields_are_silently_dropped() {
        let descriptor = EntityKind::Patient.descriptor();
        let payload = build_payload(
            descriptor,
            record(&[
                ("first_name", json!("Ada")),
                ("Id", json!(12)),
                ("created_at", json!("2024-01-01T00:00:00Z")),
                ("favourite_colour", json!("teal")),
            ]),
            PayloadMode::Create,
        );

        assert_eq!(payload["first_name"], "Ada");
        assert!(!payload.contains_key("Id"));
        assert!(!payload.contains_key("created_at"));
        assert!(!payload.contains_key("favourite_colour"));
    }

    #[test]
    fn create_suppresses_empty_strings_so_defaults_apply() {
        let descriptor = EntityKind::Appointment.descriptor();
        let payload = build_payload(
            descriptor,
            record(&[("status", json!("")), ("doctor", json!("Dr. X"))]),
            PayloadMode::Create,
        );

        assert_eq!(payload["status"], "pending", "blank status takes the default");
        assert_eq!(payload["type"], "consultation");
        assert_eq!(payload["doctor"], "Dr. X");
    }

    #[test]
    fn update_preserves_empty_strings_to_clear_fields() {
        let descriptor = EntityKind::Patient.descriptor();
        let payload = build_payload(
            descriptor,
            record(&[("phone", json!(""))]),
            PayloadMode::Update,
        );

        assert_eq!(payload["phone"], "", "empty string clears the field");
        assert!(
            !payload.contains_key("registered_date"),
            "updates never inject defaults"
        );
        assert!(!payload.contains_key(NAME_FIELD));
    }

    #[test]
    fn boolean_and_numeric_fields_are_coerced() {
        let descriptor = EntityKind::LabResult.descriptor();
        let payload = build_payload(
            descriptor,
            record(&[("critical_flags", json!("true"))]),
            PayloadMode::Update,
        );
        assert_eq!(payload["critical_flags"], json!(true));

        let descriptor = EntityKind::Medication.descriptor();
        let payload = build_payload(
            descriptor,
            record(&[
                ("stock", json!("250")),
                ("unit_price", json!("3.75")),
                ("reorder_level", json!("plenty")),
            ]),
            PayloadMode::Update,
        );
        assert_eq!(payload["stock"], json!(250));
        assert_eq!(payload["unit_price"], json!(3.75));
        assert_eq!(payload["reorder_level"], json!(0), "unparseable input becomes zero");
    }

    #[test]
    fn patient_create_derives_name_and_registration_date() {
        let descriptor = EntityKind::Patient.descriptor();
        let payload = build_payload(
            descriptor,
            record(&[
                ("first_name", json!("Ada")),
                ("last_name", json!("Lovelace")),
                ("phone", json!("555-0100")),
            ]),
            PayloadMode::Create,
        );

        assert_eq!(payload[NAME_FIELD], "Ada Lovelace");
        assert_eq!(payload["registered_date"], json!(today().as_str()));
    }

    #[test]
    fn appointment_create_derives_composite_name_and_defaults() {
        let descriptor = EntityKind::Appointment.descriptor();
        let payload = build_payload(
            descriptor,
            record(&[
                ("patient_name", json!("J. Doe")),
                ("doctor", json!("Dr. X")),
                ("date", json!("2024-03-01")),
            ]),
            PayloadMode::Create,
        );

        assert_eq!(payload[NAME_FIELD], "J. Doe - Dr. X - 2024-03-01");
        assert_eq!(payload["status"], "pending");
        assert_eq!(payload["type"], "consultation");
    }

    #[test]
    fn fully_defaulted_create_still_gets_a_non_empty_name() {
        for kind in EntityKind::ALL {
            let payload = build_payload(kind.descriptor(), Record::new(), PayloadMode::Create);
            let name = payload[NAME_FIELD].as_str().unwrap_or_default();
            assert!(
                !name.trim().is_empty(),
                "{}: create({{}}) must derive a non-empty Name",
                kind.descriptor().table
            );
        }
    }

    #[test]
    fn supplied_name_wins_over_the_template() {
        let descriptor = EntityKind::Patient.descriptor();
        let payload = build_payload(
            descriptor,
            record(&[
                ("Name", json!("A. Lovelace (VIP)")),
                ("first_name", json!("Ada")),
                ("last_name", json!("Lovelace")),
            ]),
            PayloadMode::Create,
        );
        assert_eq!(payload[NAME_FIELD], "A. Lovelace (VIP)");
    }

    #[test]
    fn dates_pass_through_unreformatted() {
        let descriptor = EntityKind::Appointment.descriptor();
        let payload = build_payload(
            descriptor,
            record(&[("date", json!("2024-03-01"))]),
            PayloadMode::Update,
        );
        assert_eq!(payload["date"], "2024-03-01");
    }
}
