/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Owners are the auth provider's user ids (the JWT `sub` claim).
pub type OwnerId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
