//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A safe `Serialize` response struct where the row carries secrets
//! - `Deserialize` create/update DTOs

pub mod course;
pub mod payment;
pub mod user;
