//! Client for the Meta Graph API: WhatsApp Cloud API messaging, template
//! management, business profile, OAuth code exchange and Marketing API
//! ad campaigns. Also carries the webhook payload types.

pub mod ads;
pub mod api;
pub mod config;
pub mod webhook;
pub mod whatsapp;

pub use api::{MetaApi, MetaApiError};
pub use config::MetaConfig;
