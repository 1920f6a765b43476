//! Catalog domain model.
//!
//! # Responsibility
//! - Define the flat records stored in the catalog tables.
//! - Expose each record through ordered field descriptors so persistence
//!   stays generic.
//!
//! # Invariants
//! - Identifiers are `None` until the database assigns them.

pub mod association;
pub mod boardgame;
pub mod entity;
pub mod person;
pub mod publisher;
