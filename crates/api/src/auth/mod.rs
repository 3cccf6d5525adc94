//! Authentication primitives.
//!
//! - [`jwt`] -- validation of bearer tokens issued by the hosted auth provider.

pub mod jwt;
