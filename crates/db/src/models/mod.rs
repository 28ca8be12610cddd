//! Model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Plain create DTOs for inserts

pub mod audit;
pub mod catalog;
pub mod generation;
pub mod permission;
pub mod rate_limit;
pub mod session;
pub mod staff;
