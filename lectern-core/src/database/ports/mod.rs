//! Repository ports implemented by the in-memory and PostgreSQL adapters.

pub mod courses;
pub mod positions;
