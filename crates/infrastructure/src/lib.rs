//! Infrastructure adapters for access-resolution ports.

#![forbid(unsafe_code)]

mod in_memory_access_repository;
mod postgres_access_repository;
mod static_identity_source;

pub use in_memory_access_repository::InMemoryAccessRepository;
pub use postgres_access_repository::{GRANULAR_PERMISSIONS_KEY, PostgresAccessRepository};
pub use static_identity_source::StaticIdentitySource;
