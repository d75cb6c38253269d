//! Canonical occurrence record and the fields it is built from

use serde::{Deserialize, Serialize};

/// A single normalized occurrence.
///
/// Every field is optional: `None` means either the source column was not
/// found or the cell was blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub location: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub timestamp: Option<String>,
}

impl Occurrence {
    /// Set the value for a canonical field
    pub fn set(&mut self, field: CanonicalField, value: Option<String>) {
        match field {
            CanonicalField::Id => self.id = value,
            CanonicalField::Type => self.kind = value,
            CanonicalField::Location => self.location = value,
            CanonicalField::Severity => self.severity = value,
            CanonicalField::Status => self.status = value,
            CanonicalField::Timestamp => self.timestamp = value,
        }
    }

    /// Get the value for a canonical field
    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::Id => self.id.as_deref(),
            CanonicalField::Type => self.kind.as_deref(),
            CanonicalField::Location => self.location.as_deref(),
            CanonicalField::Severity => self.severity.as_deref(),
            CanonicalField::Status => self.status.as_deref(),
            CanonicalField::Timestamp => self.timestamp.as_deref(),
        }
    }
}

/// The six fields of the canonical schema, in declaration order.
///
/// Declaration order matters: when aliases overlap, the field declared first
/// claims the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalField {
    Id,
    Type,
    Location,
    Severity,
    Status,
    Timestamp,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::Id,
        CanonicalField::Type,
        CanonicalField::Location,
        CanonicalField::Severity,
        CanonicalField::Status,
        CanonicalField::Timestamp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Id => "id",
            CanonicalField::Type => "type",
            CanonicalField::Location => "location",
            CanonicalField::Severity => "severity",
            CanonicalField::Status => "status",
            CanonicalField::Timestamp => "timestamp",
        }
    }

    /// Parse a field name as used in configuration files
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_type_and_nulls() {
        let occ = Occurrence {
            id: Some("42".to_string()),
            kind: Some("Incêndio".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&occ).unwrap();
        assert_eq!(json["id"], "42");
        assert_eq!(json["type"], "Incêndio");
        assert!(json["location"].is_null());
        assert!(json["timestamp"].is_null());
    }

    #[test]
    fn test_field_from_name() {
        assert_eq!(CanonicalField::from_name("Severity"), Some(CanonicalField::Severity));
        assert_eq!(CanonicalField::from_name(" type "), Some(CanonicalField::Type));
        assert_eq!(CanonicalField::from_name("priority"), None);
    }

    #[test]
    fn test_set_and_get_roundtrip_per_field() {
        let mut occ = Occurrence::default();
        for field in CanonicalField::ALL {
            occ.set(field, Some(field.as_str().to_uppercase()));
        }
        assert_eq!(occ.get(CanonicalField::Location), Some("LOCATION"));
        assert_eq!(occ.kind.as_deref(), Some("TYPE"));
    }
}
