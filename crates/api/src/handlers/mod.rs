pub mod actions;
pub mod campaigns;
pub mod contacts;
pub mod conversations;
pub mod flows;
pub mod settings;
pub mod templates;
pub mod webhook;
