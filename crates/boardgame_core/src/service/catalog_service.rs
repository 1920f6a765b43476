//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD and association entry points for core callers.
//! - Offer typed shortcuts keyed by each entity's default table and natural key.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::association::{AssociationKeys, AssociationOutcome, AssociationRow};
use crate::model::entity::{Entity, EntityId};
use crate::repo::association_repo::AssociationRepository;
use crate::repo::catalog_repo::{CatalogRepository, RepoResult};
use rusqlite::types::Value;

/// Use-case service wrapper for catalog operations.
pub struct CatalogService<R> {
    repo: R,
}

impl<R: CatalogRepository + AssociationRepository> CatalogService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn insert<E: Entity>(&self, entity: &E, table: &str) -> RepoResult<EntityId> {
        self.repo.insert(entity, table)
    }

    pub fn fetch<E: Entity>(
        &self,
        entity: &E,
        table: &str,
        filter_field: Option<&str>,
    ) -> RepoResult<Vec<Vec<Value>>> {
        self.repo.fetch(entity, table, filter_field)
    }

    pub fn update<E: Entity>(
        &self,
        entity: &E,
        table: &str,
        field_to_update: &str,
        new_value: Value,
        filter_field: &str,
    ) -> RepoResult<EntityId> {
        self.repo
            .update(entity, table, field_to_update, new_value, filter_field)
    }

    pub fn delete<E: Entity>(
        &self,
        entity: &E,
        table: &str,
        filter_field: &str,
    ) -> RepoResult<EntityId> {
        self.repo.delete(entity, table, filter_field)
    }

    pub fn insert_association(&self, keys: &AssociationKeys) -> RepoResult<AssociationOutcome> {
        self.repo.insert_association(keys)
    }

    pub fn list_associations(&self) -> RepoResult<Vec<AssociationRow>> {
        self.repo.list_associations()
    }

    /// Inserts into the entity's default table.
    pub fn add<E: Entity>(&self, entity: &E) -> RepoResult<EntityId> {
        self.repo.insert(entity, E::TABLE)
    }

    /// Looks rows up by the entity's natural key in its default table.
    pub fn find_by_natural_key<E: Entity>(&self, entity: &E) -> RepoResult<Vec<E>> {
        self.repo
            .fetch_entities(entity, E::TABLE, Some(E::NATURAL_KEY))
    }
}
