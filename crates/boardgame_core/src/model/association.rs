//! Shared association table model.
//!
//! # Responsibility
//! - Describe one sparse row linking any subset of the five entity kinds.
//! - Carry the natural-key tuple the resolver turns into identifiers.
//!
//! # Invariants
//! - An absent link is `None` (SQL `NULL`), never `0`.

use super::entity::EntityId;
use serde::{Deserialize, Serialize};

/// Backing table for every many-to-many link.
pub const ASSOCIATION_TABLE: &str = "associations";

/// One association column and the natural key that resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociationLink {
    pub column: &'static str,
    pub table: &'static str,
    pub natural_key: &'static str,
}

/// Association columns in table order.
pub const ASSOCIATION_LINKS: [AssociationLink; 5] = [
    AssociationLink {
        column: "boardgame_id",
        table: "boardgames",
        natural_key: "title",
    },
    AssociationLink {
        column: "designer_id",
        table: "designers",
        natural_key: "last_name",
    },
    AssociationLink {
        column: "publisher_id",
        table: "publishers",
        natural_key: "name",
    },
    AssociationLink {
        column: "artist_id",
        table: "artists",
        natural_key: "last_name",
    },
    AssociationLink {
        column: "category_id",
        table: "categories",
        natural_key: "name",
    },
];

/// Natural keys of the entities taking part in one relationship.
///
/// Unset keys leave their column `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationKeys {
    pub boardgame_title: Option<String>,
    pub designer_last_name: Option<String>,
    pub publisher_name: Option<String>,
    pub artist_last_name: Option<String>,
    pub category_name: Option<String>,
}

impl AssociationKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boardgame(mut self, title: impl Into<String>) -> Self {
        self.boardgame_title = Some(title.into());
        self
    }

    pub fn designer(mut self, last_name: impl Into<String>) -> Self {
        self.designer_last_name = Some(last_name.into());
        self
    }

    pub fn publisher(mut self, name: impl Into<String>) -> Self {
        self.publisher_name = Some(name.into());
        self
    }

    pub fn artist(mut self, last_name: impl Into<String>) -> Self {
        self.artist_last_name = Some(last_name.into());
        self
    }

    pub fn category(mut self, name: impl Into<String>) -> Self {
        self.category_name = Some(name.into());
        self
    }

    /// Supplied natural keys in `ASSOCIATION_LINKS` order.
    pub fn values(&self) -> [Option<&str>; 5] {
        [
            self.boardgame_title.as_deref(),
            self.designer_last_name.as_deref(),
            self.publisher_name.as_deref(),
            self.artist_last_name.as_deref(),
            self.category_name.as_deref(),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.values().iter().all(Option::is_none)
    }
}

/// One persisted association row with resolved identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationRow {
    pub boardgame_id: Option<EntityId>,
    pub designer_id: Option<EntityId>,
    pub publisher_id: Option<EntityId>,
    pub artist_id: Option<EntityId>,
    pub category_id: Option<EntityId>,
}

/// Result of an association insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationOutcome {
    /// A new row was written; carries its SQLite rowid.
    Inserted(i64),
    /// An identical row already existed, nothing was written.
    AlreadyPresent,
}
