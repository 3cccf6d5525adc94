//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod campaign;
pub mod contact;
pub mod conversation;
pub mod flow;
pub mod message;
pub mod settings;
pub mod template;
