//! Core persistence for the board game catalog.
//! This crate owns the schema, the generic entity-to-SQL mapping and the
//! natural-key association resolver.

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{StoreConfig, DEFAULT_DB_FILE_NAME};
pub use engine::{Engine, MutationOutcome};
pub use logging::{default_log_level, init_logging, init_logging_to, logging_status, LogTarget};
pub use model::association::{AssociationKeys, AssociationOutcome, AssociationRow};
pub use model::boardgame::Boardgame;
pub use model::entity::{Entity, EntityId, FieldDescriptor, ValidationError, ValueKind};
pub use model::person::{Artist, Designer};
pub use model::publisher::{Category, Publisher};
pub use query::{QueryError, Statement, StatementKind};
pub use repo::association_repo::AssociationRepository;
pub use repo::catalog_repo::{CatalogRepository, RepoError, RepoResult, SqliteCatalogRepository};
pub use rusqlite::types::Value;
pub use service::catalog_service::CatalogService;

/// Opens (bootstrapping if needed) the store described by `config` and wraps
/// it in a service.
pub fn open_catalog(config: &StoreConfig) -> RepoResult<CatalogService<SqliteCatalogRepository>> {
    let engine = Engine::open(config)?;
    Ok(CatalogService::new(SqliteCatalogRepository::new(engine)))
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
