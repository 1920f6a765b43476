//! Boardgame entity.
//!
//! # Invariants
//! - `title` is non-empty and unique across the catalog.
//! - `min_players <= max_players`.
//! - Prices, quantities and durations are never negative.

use super::entity::{
    require_non_negative, require_text, Entity, EntityId, FieldDescriptor, ValidationError,
    ValueKind,
};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

static BOARDGAME_FIELDS: &[FieldDescriptor<Boardgame>] = &[
    FieldDescriptor {
        name: "id",
        kind: ValueKind::Integer,
        value: |game: &Boardgame| Value::from(game.id),
        references: None,
    },
    FieldDescriptor {
        name: "publisher_id",
        kind: ValueKind::Integer,
        value: |game: &Boardgame| Value::from(game.publisher_id),
        references: Some("publishers"),
    },
    FieldDescriptor {
        name: "title",
        kind: ValueKind::Text,
        value: |game: &Boardgame| Value::Text(game.title.clone()),
        references: None,
    },
    FieldDescriptor {
        name: "year_released",
        kind: ValueKind::Integer,
        value: |game: &Boardgame| Value::Integer(game.year_released),
        references: None,
    },
    FieldDescriptor {
        name: "selling_price",
        kind: ValueKind::Real,
        value: |game: &Boardgame| Value::Real(game.selling_price),
        references: None,
    },
    FieldDescriptor {
        name: "min_players",
        kind: ValueKind::Integer,
        value: |game: &Boardgame| Value::Integer(game.min_players),
        references: None,
    },
    FieldDescriptor {
        name: "max_players",
        kind: ValueKind::Integer,
        value: |game: &Boardgame| Value::Integer(game.max_players),
        references: None,
    },
    FieldDescriptor {
        name: "playing_time",
        kind: ValueKind::Integer,
        value: |game: &Boardgame| Value::Integer(game.playing_time),
        references: None,
    },
    FieldDescriptor {
        name: "age_from",
        kind: ValueKind::Integer,
        value: |game: &Boardgame| Value::Integer(game.age_from),
        references: None,
    },
    FieldDescriptor {
        name: "printed_quantity",
        kind: ValueKind::Integer,
        value: |game: &Boardgame| Value::Integer(game.printed_quantity),
        references: None,
    },
    FieldDescriptor {
        name: "printing_price",
        kind: ValueKind::Real,
        value: |game: &Boardgame| Value::Real(game.printing_price),
        references: None,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boardgame {
    pub id: Option<EntityId>,
    /// Owning publisher; `None` when unpublished or unknown.
    pub publisher_id: Option<EntityId>,
    pub title: String,
    pub year_released: i64,
    pub selling_price: f64,
    pub min_players: i64,
    pub max_players: i64,
    /// Minutes.
    pub playing_time: i64,
    pub age_from: i64,
    pub printed_quantity: i64,
    pub printing_price: f64,
}

impl Boardgame {
    /// Creates an unsaved boardgame for one player with zeroed numbers.
    pub fn new(title: impl Into<String>, year_released: i64) -> Self {
        Self {
            id: None,
            publisher_id: None,
            title: title.into(),
            year_released,
            selling_price: 0.0,
            min_players: 1,
            max_players: 1,
            playing_time: 0,
            age_from: 0,
            printed_quantity: 0,
            printing_price: 0.0,
        }
    }

    pub fn with_publisher(mut self, publisher_id: EntityId) -> Self {
        self.publisher_id = Some(publisher_id);
        self
    }

    pub fn with_players(mut self, min_players: i64, max_players: i64) -> Self {
        self.min_players = min_players;
        self.max_players = max_players;
        self
    }

    pub fn with_playing_time(mut self, minutes: i64, age_from: i64) -> Self {
        self.playing_time = minutes;
        self.age_from = age_from;
        self
    }

    /// Sets retail price and print run economics.
    pub fn with_pricing(
        mut self,
        selling_price: f64,
        printed_quantity: i64,
        printing_price: f64,
    ) -> Self {
        self.selling_price = selling_price;
        self.printed_quantity = printed_quantity;
        self.printing_price = printing_price;
        self
    }
}

impl Entity for Boardgame {
    const TABLE: &'static str = "boardgames";
    const NATURAL_KEY: &'static str = "title";

    fn fields() -> &'static [FieldDescriptor<Self>] {
        BOARDGAME_FIELDS
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            publisher_id: row.get("publisher_id")?,
            title: row.get("title")?,
            year_released: row.get("year_released")?,
            selling_price: row.get("selling_price")?,
            min_players: row.get("min_players")?,
            max_players: row.get("max_players")?,
            playing_time: row.get("playing_time")?,
            age_from: row.get("age_from")?,
            printed_quantity: row.get("printed_quantity")?,
            printing_price: row.get("printing_price")?,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text("boardgame", "title", &self.title)?;
        if self.min_players > self.max_players {
            return Err(ValidationError::InvalidPlayerRange {
                min: self.min_players,
                max: self.max_players,
            });
        }
        require_non_negative("boardgame", "selling_price", self.selling_price)?;
        require_non_negative("boardgame", "printing_price", self.printing_price)?;
        require_non_negative("boardgame", "printed_quantity", self.printed_quantity as f64)?;
        require_non_negative("boardgame", "playing_time", self.playing_time as f64)?;
        require_non_negative("boardgame", "age_from", self.age_from as f64)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Boardgame;
    use crate::model::entity::{Entity, ValidationError};
    use rusqlite::types::Value;

    #[test]
    fn descriptors_start_with_identifier_and_mark_publisher_fk() {
        let names: Vec<_> = Boardgame::fields().iter().map(|field| field.name).collect();
        assert_eq!(names[0], "id");
        assert_eq!(names.len(), 11);
        assert_eq!(
            Boardgame::field("publisher_id").and_then(|field| field.references),
            Some("publishers")
        );
        assert!(!Boardgame::field("title").unwrap().is_foreign_key());
        assert!(Boardgame::field("publisher_id")
            .unwrap()
            .accepts(&Value::Null));
    }

    #[test]
    fn values_follow_declared_order() {
        let game = Boardgame::new("Gloomhaven", 2017).with_players(1, 4);
        let values = game.values();
        assert_eq!(values[0], Value::Null);
        assert_eq!(values[2], Value::Text("Gloomhaven".to_string()));
        assert_eq!(values[5], Value::Integer(1));
        assert_eq!(values[6], Value::Integer(4));
        assert_eq!(game.value_of("unknown"), None);
    }

    #[test]
    fn validate_rejects_inverted_player_range() {
        let game = Boardgame::new("Backwards", 2020).with_players(5, 2);
        assert_eq!(
            game.validate().unwrap_err(),
            ValidationError::InvalidPlayerRange { min: 5, max: 2 }
        );
    }

    #[test]
    fn validate_rejects_blank_title_and_negative_price() {
        assert!(matches!(
            Boardgame::new("  ", 2020).validate(),
            Err(ValidationError::EmptyNaturalKey { field: "title", .. })
        ));
        assert!(matches!(
            Boardgame::new("Cheap", 2020).with_pricing(-1.0, 0, 0.0).validate(),
            Err(ValidationError::NegativeValue { field: "selling_price", .. })
        ));
    }
}
