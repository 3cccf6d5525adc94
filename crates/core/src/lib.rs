//! Domain logic shared by the database, Meta client and API crates.
//!
//! Nothing in here talks to the network or the database.

pub mod action;
pub mod error;
pub mod flow;
pub mod messaging;
pub mod phone;
pub mod search;
pub mod signature;
pub mod template;
pub mod types;
