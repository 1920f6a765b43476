//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQL rendering and execution from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Entity::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, ambiguity) in
//!   addition to DB transport errors.

pub mod association_repo;
pub mod catalog_repo;
