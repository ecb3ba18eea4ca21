//! Small validated value types shared across the HMS workspace.
//!
//! These types exist so that invalid values are rejected at construction
//! time rather than deep inside a service call: a record id that parses, a
//! configuration string that is not blank, a date that is really a date.

use std::fmt;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("text must contain at least one non-whitespace character")]
    Blank,
}

/// Errors from parsing a [`RecordId`].
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    #[error("record id must be a positive integer, got {0:?}")]
    Invalid(String),
}

/// Errors from parsing an [`IsoDate`].
#[derive(Debug, thiserror::Error)]
pub enum DateError {
    #[error("date must be an ISO 8601 calendar date (YYYY-MM-DD), got {0:?}")]
    Invalid(String),
}

/// A configuration string that is guaranteed to carry content.
///
/// Bearer tokens and base URLs arrive from the environment, where "unset",
/// "" and "   " all mean the same thing: absent. Converting to
/// `Option<NonEmptyText>` at the boundary settles that question once, so
/// downstream code never re-checks for blankness.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Trims `input` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Blank` when nothing but whitespace remains.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        match input.as_ref().trim() {
            "" => Err(TextError::Blank),
            kept => Ok(Self(kept.to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a record in the remote store.
///
/// The store assigns ids on create; callers never invent them. On the wire
/// an id is a JSON number, which is why this is a thin wrapper over `i64`
/// rather than an opaque string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }

    /// Parses an id from its decimal string form (CLI arguments, URL paths).
    ///
    /// # Errors
    ///
    /// Returns `IdError::Invalid` for anything that is not a positive
    /// base-10 integer.
    pub fn parse(input: &str) -> Result<Self, IdError> {
        match input.trim().parse::<i64>() {
            Ok(n) if n > 0 => Ok(Self(n)),
            _ => Err(IdError::Invalid(input.to_owned())),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An ISO 8601 calendar date (`YYYY-MM-DD`), kept as a string.
///
/// Dates move through the system as ISO strings and are never reformatted;
/// this type only checks the shape so that obviously broken input fails at
/// the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsoDate(String);

impl IsoDate {
    /// Validates the `YYYY-MM-DD` shape without interpreting the calendar.
    ///
    /// # Errors
    ///
    /// Returns `DateError::Invalid` if the input is not ten characters of
    /// digits and hyphens in date positions.
    pub fn new(input: impl AsRef<str>) -> Result<Self, DateError> {
        let s = input.as_ref().trim();
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit());
        if !well_formed {
            return Err(DateError::Invalid(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }

    /// Today's date in UTC, the clock reading behind date-valued creation
    /// defaults.
    pub fn today() -> Self {
        Self(chrono::Utc::now().format("%Y-%m-%d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
