//! # enrollhub-database
//!
//! PostgreSQL connection management, query repositories, and the
//! transactional [`store::RegistrationStore`] seam used by the admission
//! engine. An in-memory store with the same semantics backs the test
//! suites and local tooling.

pub mod connection;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::memory::MemoryRegistrationStore;
pub use store::postgres::PgRegistrationStore;
pub use store::{RegistrationStore, StoreTransaction};
