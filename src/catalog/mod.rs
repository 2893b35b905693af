//! Catalog coordination layer
//!
//! - **model**: creature records, create payloads and partial patches
//! - **validation**: checks applied at the mutation boundary
//! - **coordinator**: cache-aside reads, invalidate-after-write, seeding

mod coordinator;
mod model;
pub mod validation;

pub use coordinator::{
    CatalogCoordinator, IngestConfig, Reinitialized, SeedOutcome, ALL_CREATURES_KEY,
};
pub use model::{Creature, CreaturePatch, Deleted, NewCreature};
pub use validation::{validate_new, validate_patch, ValidationError};
