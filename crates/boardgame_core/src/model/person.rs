//! People credited on a boardgame: designers and artists.
//!
//! Both are resolved by `last_name` when associations are written, and both
//! tables are unique on `(first_name, last_name)`.

use super::entity::{
    require_text, Entity, EntityId, FieldDescriptor, ValidationError, ValueKind,
};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

static DESIGNER_FIELDS: &[FieldDescriptor<Designer>] = &[
    FieldDescriptor {
        name: "id",
        kind: ValueKind::Integer,
        value: |designer: &Designer| Value::from(designer.id),
        references: None,
    },
    FieldDescriptor {
        name: "first_name",
        kind: ValueKind::Text,
        value: |designer: &Designer| Value::Text(designer.first_name.clone()),
        references: None,
    },
    FieldDescriptor {
        name: "last_name",
        kind: ValueKind::Text,
        value: |designer: &Designer| Value::Text(designer.last_name.clone()),
        references: None,
    },
];

static ARTIST_FIELDS: &[FieldDescriptor<Artist>] = &[
    FieldDescriptor {
        name: "id",
        kind: ValueKind::Integer,
        value: |artist: &Artist| Value::from(artist.id),
        references: None,
    },
    FieldDescriptor {
        name: "first_name",
        kind: ValueKind::Text,
        value: |artist: &Artist| Value::Text(artist.first_name.clone()),
        references: None,
    },
    FieldDescriptor {
        name: "last_name",
        kind: ValueKind::Text,
        value: |artist: &Artist| Value::Text(artist.last_name.clone()),
        references: None,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Designer {
    pub id: Option<EntityId>,
    pub first_name: String,
    pub last_name: String,
}

impl Designer {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl Entity for Designer {
    const TABLE: &'static str = "designers";
    const NATURAL_KEY: &'static str = "last_name";

    fn fields() -> &'static [FieldDescriptor<Self>] {
        DESIGNER_FIELDS
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("designer", "last_name", &self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: Option<EntityId>,
    pub first_name: String,
    pub last_name: String,
}

impl Artist {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl Entity for Artist {
    const TABLE: &'static str = "artists";
    const NATURAL_KEY: &'static str = "last_name";

    fn fields() -> &'static [FieldDescriptor<Self>] {
        ARTIST_FIELDS
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("artist", "last_name", &self.last_name)
    }
}
