//! Repositories module
//!
//! Capa de persistencia: el contrato `Store` y sus dos implementaciones.

pub mod memory_store;
pub mod pg_store;
pub mod store;

pub use memory_store::MemoryStore;
pub use pg_store::PgStore;
pub use store::{Registration, Store};
