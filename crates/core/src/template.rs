//! Message template rules.
//!
//! Meta requires template names to be lowercase alphanumerics and
//! underscores, and every template to declare one of three categories.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Template categories accepted by the Graph API.
pub mod categories {
    pub const MARKETING: &str = "MARKETING";
    pub const UTILITY: &str = "UTILITY";
    pub const AUTHENTICATION: &str = "AUTHENTICATION";

    pub const ALL: &[&str] = &[MARKETING, UTILITY, AUTHENTICATION];
}

/// Template review states. `draft` is local-only; the rest mirror Meta.
pub mod statuses {
    pub const DRAFT: &str = "draft";
    pub const PENDING: &str = "PENDING";
    pub const APPROVED: &str = "APPROVED";
    pub const REJECTED: &str = "REJECTED";
    pub const PAUSED: &str = "PAUSED";
    pub const DISABLED: &str = "DISABLED";
}

/// Maximum template name length enforced by Meta.
pub const MAX_TEMPLATE_NAME_LEN: usize = 512;

/// Default template language.
pub const DEFAULT_LANGUAGE: &str = "en_US";

static TEMPLATE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("valid template name regex"));

/// Check a template name against Meta's naming rule.
pub fn validate_template_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() || name.len() > MAX_TEMPLATE_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Template name must be 1-{MAX_TEMPLATE_NAME_LEN} characters"
        )));
    }
    if !TEMPLATE_NAME_RE.is_match(name) {
        return Err(CoreError::Validation(
            "Template name may only contain lowercase letters, digits and underscores".into(),
        ));
    }
    Ok(())
}

/// Check that a category string is one Meta accepts (case-insensitive).
///
/// Returns the canonical uppercase form.
pub fn normalize_category(category: &str) -> Result<&'static str, CoreError> {
    let upper = category.trim().to_ascii_uppercase();
    categories::ALL
        .iter()
        .copied()
        .find(|c| *c == upper)
        .ok_or_else(|| CoreError::Validation(format!("Unknown template category '{category}'")))
}

/// Suggest a valid template name from free text (`"Order Shipped!"` ->
/// `"order_shipped"`).
pub fn slugify_template_name(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}
