//! Publisher and category entities, both identified by a unique `name`.

use super::entity::{
    require_text, Entity, EntityId, FieldDescriptor, ValidationError, ValueKind,
};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

static PUBLISHER_FIELDS: &[FieldDescriptor<Publisher>] = &[
    FieldDescriptor {
        name: "id",
        kind: ValueKind::Integer,
        value: |publisher: &Publisher| Value::from(publisher.id),
        references: None,
    },
    FieldDescriptor {
        name: "name",
        kind: ValueKind::Text,
        value: |publisher: &Publisher| Value::Text(publisher.name.clone()),
        references: None,
    },
];

static CATEGORY_FIELDS: &[FieldDescriptor<Category>] = &[
    FieldDescriptor {
        name: "id",
        kind: ValueKind::Integer,
        value: |category: &Category| Value::from(category.id),
        references: None,
    },
    FieldDescriptor {
        name: "name",
        kind: ValueKind::Text,
        value: |category: &Category| Value::Text(category.name.clone()),
        references: None,
    },
];

/// Publishing house; one publisher owns many boardgames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: Option<EntityId>,
    pub name: String,
}

impl Publisher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

impl Entity for Publisher {
    const TABLE: &'static str = "publishers";
    const NATURAL_KEY: &'static str = "name";

    fn fields() -> &'static [FieldDescriptor<Self>] {
        PUBLISHER_FIELDS
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("publisher", "name", &self.name)
    }
}

/// Classification tag such as "Adventure" or "Deck Building".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<EntityId>,
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

impl Entity for Category {
    const TABLE: &'static str = "categories";
    const NATURAL_KEY: &'static str = "name";

    fn fields() -> &'static [FieldDescriptor<Self>] {
        CATEGORY_FIELDS
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("category", "name", &self.name)
    }
}
