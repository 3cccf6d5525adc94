//! Conversation, message and campaign vocabulary.

/// Message direction relative to the business.
pub mod directions {
    pub const INBOUND: &str = "inbound";
    pub const OUTBOUND: &str = "outbound";
}

/// Message delivery states. Outbound messages move
/// `sent -> delivered -> read` (or `failed`); inbound ones are `received`.
pub mod message_statuses {
    pub const SENT: &str = "sent";
    pub const DELIVERED: &str = "delivered";
    pub const READ: &str = "read";
    pub const FAILED: &str = "failed";
    pub const RECEIVED: &str = "received";

    pub const ALL: &[&str] = &[SENT, DELIVERED, READ, FAILED, RECEIVED];
}

/// Message content types stored locally.
pub mod message_types {
    pub const TEXT: &str = "text";
    pub const TEMPLATE: &str = "template";
    pub const IMAGE: &str = "image";
    pub const INTERACTIVE: &str = "interactive";
    pub const OTHER: &str = "other";
}

/// Campaign lifecycle states.
pub mod campaign_statuses {
    pub const DRAFT: &str = "draft";
    pub const SENDING: &str = "sending";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
}

/// Campaign kinds: template broadcasts sent by us, or Meta ad campaigns.
pub mod campaign_kinds {
    pub const BROADCAST: &str = "broadcast";
    pub const AD: &str = "ad";
}

/// Rank of a delivery status, so late or duplicate webhook callbacks never
/// move a message backwards (`read` arriving before `delivered`).
pub fn status_rank(status: &str) -> u8 {
    match status {
        message_statuses::SENT => 1,
        message_statuses::DELIVERED => 2,
        message_statuses::READ => 3,
        message_statuses::FAILED => 4,
        _ => 0,
    }
}

/// Whether a stored message status should be replaced by `incoming`.
pub fn should_advance_status(current: &str, incoming: &str) -> bool {
    status_rank(incoming) > status_rank(current)
}

/// Map a Meta message `type` onto the local vocabulary.
pub fn classify_message_type(meta_type: &str) -> &'static str {
    match meta_type {
        "text" => message_types::TEXT,
        "template" => message_types::TEMPLATE,
        "image" => message_types::IMAGE,
        "interactive" | "button" => message_types::INTERACTIVE,
        _ => message_types::OTHER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_only_move_forward() {
        assert!(should_advance_status("sent", "delivered"));
        assert!(should_advance_status("delivered", "read"));
        assert!(!should_advance_status("read", "delivered"));
        assert!(!should_advance_status("read", "read"));
    }

    #[test]
    fn failure_overrides_progress() {
        assert!(should_advance_status("delivered", "failed"));
    }

    #[test]
    fn unknown_meta_types_are_other() {
        assert_eq!(classify_message_type("button"), message_types::INTERACTIVE);
        assert_eq!(classify_message_type("sticker"), message_types::OTHER);
    }
}
