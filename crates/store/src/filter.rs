//! Filter expression construction for store queries.
//!
//! A query may carry flat field matches (combined with AND by the store) and
//! composite groups for predicates like "first name contains X OR last name
//! contains X OR email contains X". Expressions serialize with the camelCase
//! keys the store expects (`booleanOp`, `operator`, `values`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator of a single field match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    /// Case-insensitive substring match.
    Contains,
    /// Strict equality.
    ExactMatch,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
    /// Loose token match: every whitespace-separated token of the needle
    /// must appear somewhere in the field value, case-insensitively.
    RelativeMatch,
}

/// Boolean combinator for composite filter groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BoolOp {
    And,
    Or,
}

/// A single-field predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMatch {
    pub field: String,
    pub operator: FilterOp,
    pub values: Vec<Value>,
}

impl FieldMatch {
    pub fn new(field: impl Into<String>, operator: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            values: vec![value.into()],
        }
    }
}

/// A composite predicate over several member expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroup {
    pub boolean_op: BoolOp,
    pub members: Vec<Filter>,
}

/// A filter expression: either a single field match or a boolean group.
///
/// Serialized untagged; the two shapes have disjoint key sets so the store
/// (and our own deserializer) can tell them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Filter {
    Match(FieldMatch),
    Group(FilterGroup),
}

impl Filter {
    /// Convenience constructor for a `Contains` match.
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Match(FieldMatch::new(field, FilterOp::Contains, needle.into()))
    }

    /// Convenience constructor for an `ExactMatch`.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Match(FieldMatch::new(field, FilterOp::ExactMatch, value))
    }

    /// Builds an OR group of `Contains` matches over the given fields, the
    /// shape every quick-search box in the console produces.
    pub fn any_contains(fields: &[&str], needle: &str) -> Self {
        Self::Group(FilterGroup {
            boolean_op: BoolOp::Or,
            members: fields
                .iter()
                .map(|f| Self::contains(*f, needle))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_match_serializes_with_operator_and_values() {
        let filter = Filter::equals("status", "pending");
        let json = serde_json::to_value(&filter).expect("should serialize");
        assert_eq!(
            json,
            json!({"field": "status", "operator": "ExactMatch", "values": ["pending"]})
        );
    }

    #[test]
    fn group_serializes_with_camel_case_boolean_op() {
        let filter = Filter::any_contains(&["first_name", "last_name"], "ada");
        let json = serde_json::to_value(&filter).expect("should serialize");
        assert_eq!(json["booleanOp"], "OR");
        assert_eq!(json["members"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["members"][0]["operator"], "Contains");
    }

    #[test]
    fn filters_round_trip_through_untagged_representation() {
        let original = Filter::Group(FilterGroup {
            boolean_op: BoolOp::And,
            members: vec![
                Filter::contains("doctor", "Dr. X"),
                Filter::Match(FieldMatch::new(
                    "date",
                    FilterOp::GreaterThanOrEqualTo,
                    "2024-01-01",
                )),
            ],
        });
        let json = serde_json::to_value(&original).expect("should serialize");
        let parsed: Filter = serde_json::from_value(json).expect("should deserialize");
        assert_eq!(parsed, original);
    }
}
