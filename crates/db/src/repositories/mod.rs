//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Queries issued on behalf
//! of a user take the `owner_id` and filter on it.

pub mod campaign_repo;
pub mod contact_repo;
pub mod conversation_repo;
pub mod flow_repo;
pub mod message_repo;
pub mod settings_repo;
pub mod template_repo;

pub use campaign_repo::CampaignRepo;
pub use contact_repo::ContactRepo;
pub use conversation_repo::ConversationRepo;
pub use flow_repo::FlowRepo;
pub use message_repo::MessageRepo;
pub use settings_repo::SettingsRepo;
pub use template_repo::TemplateRepo;
