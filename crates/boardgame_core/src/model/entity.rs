//! Field-descriptor contract shared by every catalog entity.
//!
//! # Responsibility
//! - Describe an entity as an ordered list of named fields so SQL can be
//!   rendered without per-type code.
//! - Carry the pre-persistence validation hook.
//!
//! # Invariants
//! - The first declared field is the row identifier (`id`).
//! - Field names equal column names in the backing table.

use rusqlite::types::Value;
use rusqlite::Row;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Auto-assigned SQLite integer primary key.
pub type EntityId = i64;

/// SQLite storage class a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Real,
    Text,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Text => "text",
        }
    }
}

/// One column of an entity: its name, storage class, how to read its value
/// and, for foreign keys, the referenced table.
pub struct FieldDescriptor<E> {
    pub name: &'static str,
    pub kind: ValueKind,
    pub value: fn(&E) -> Value,
    pub references: Option<&'static str>,
}

impl<E> FieldDescriptor<E> {
    pub fn is_foreign_key(&self) -> bool {
        self.references.is_some()
    }

    /// Whether `value` may be written into this column.
    ///
    /// Only foreign keys take `NULL`; every other catalog column is
    /// `NOT NULL`. Integers are accepted for real columns.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self.kind, value) {
            (_, Value::Null) => self.is_foreign_key(),
            (ValueKind::Integer, Value::Integer(_)) => true,
            (ValueKind::Real, Value::Real(_) | Value::Integer(_)) => true,
            (ValueKind::Text, Value::Text(_)) => true,
            _ => false,
        }
    }
}

/// Validation failures raised before any SQL is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyNaturalKey {
        entity: &'static str,
        field: &'static str,
    },
    InvalidPlayerRange {
        min: i64,
        max: i64,
    },
    NegativeValue {
        entity: &'static str,
        field: &'static str,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyNaturalKey { entity, field } => {
                write!(f, "{entity}.{field} must not be empty")
            }
            Self::InvalidPlayerRange { min, max } => {
                write!(f, "min_players ({min}) must be <= max_players ({max})")
            }
            Self::NegativeValue { entity, field } => {
                write!(f, "{entity}.{field} must not be negative")
            }
        }
    }
}

impl Error for ValidationError {}

/// A flat record stored in exactly one catalog table.
pub trait Entity: Sized + 'static {
    /// Default backing table.
    const TABLE: &'static str;
    /// Human-meaningful lookup column (title, last name, name).
    const NATURAL_KEY: &'static str;

    /// Ordered field descriptors; index 0 is the identifier.
    fn fields() -> &'static [FieldDescriptor<Self>];

    /// Decodes one row selected with the full descriptor column list.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    fn field(name: &str) -> Option<&'static FieldDescriptor<Self>> {
        Self::fields().iter().find(|field| field.name == name)
    }

    /// Current runtime value of `name`, or `None` when no such field exists.
    fn value_of(&self, name: &str) -> Option<Value> {
        Self::field(name).map(|field| (field.value)(self))
    }

    /// All field values in declared order.
    fn values(&self) -> Vec<Value> {
        Self::fields()
            .iter()
            .map(|field| (field.value)(self))
            .collect()
    }
}

pub(crate) fn require_text(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyNaturalKey { entity, field });
    }
    Ok(())
}

pub(crate) fn require_non_negative(
    entity: &'static str,
    field: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { entity, field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{FieldDescriptor, ValueKind};
    use rusqlite::types::Value;

    fn column(kind: ValueKind, references: Option<&'static str>) -> FieldDescriptor<()> {
        FieldDescriptor {
            name: "column",
            kind,
            value: |_| Value::Null,
            references,
        }
    }

    #[test]
    fn accepts_matches_storage_class() {
        let year = column(ValueKind::Integer, None);
        assert!(year.accepts(&Value::Integer(2017)));
        assert!(!year.accepts(&Value::Text("soon".to_string())));
        assert!(!year.accepts(&Value::Real(2017.5)));

        let price = column(ValueKind::Real, None);
        assert!(price.accepts(&Value::Real(9.99)));
        assert!(price.accepts(&Value::Integer(10)));
        assert!(!price.accepts(&Value::Blob(vec![1])));

        let title = column(ValueKind::Text, None);
        assert!(title.accepts(&Value::Text("Azul".to_string())));
        assert!(!title.accepts(&Value::Integer(1)));
    }

    #[test]
    fn only_foreign_keys_accept_null() {
        assert!(column(ValueKind::Integer, Some("publishers")).accepts(&Value::Null));
        assert!(!column(ValueKind::Integer, None).accepts(&Value::Null));
        assert!(!column(ValueKind::Text, None).accepts(&Value::Null));
    }
}
