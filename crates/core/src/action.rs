//! The `{ "action": ..., ...params }` request envelope shared by the
//! action handlers.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::CoreError;

/// An action invocation: the dispatch key plus every other top-level field.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl ActionRequest {
    /// A required, non-blank string parameter.
    pub fn require_str(&self, field: &str) -> Result<&str, CoreError> {
        self.optional_str(field).ok_or_else(|| missing(field))
    }

    /// An optional string parameter. Blank strings count as absent.
    pub fn optional_str(&self, field: &str) -> Option<&str> {
        self.params
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// A required integer parameter. Numeric strings are accepted since the
    /// dashboard forms submit ids as text.
    pub fn require_i64(&self, field: &str) -> Result<i64, CoreError> {
        match self.params.get(field) {
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| CoreError::Validation(format!("{field} must be an integer"))),
            Some(Value::String(s)) if !s.trim().is_empty() => s
                .trim()
                .parse()
                .map_err(|_| CoreError::Validation(format!("{field} must be an integer"))),
            _ => Err(missing(field)),
        }
    }

    /// An optional parameter of any JSON shape. `null` counts as absent.
    pub fn optional_value(&self, field: &str) -> Option<&Value> {
        self.params.get(field).filter(|v| !v.is_null())
    }

    /// Deserialize all params into a typed struct.
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, CoreError> {
        serde_json::from_value(Value::Object(self.params.clone()))
            .map_err(|e| CoreError::Validation(format!("Invalid parameters for '{}': {e}", self.action)))
    }
}

fn missing(field: &str) -> CoreError {
    CoreError::Validation(format!("Missing required field: {field}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn request(value: Value) -> ActionRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn action_is_split_from_params() {
        let req = request(json!({ "action": "send_message", "to": "+15550001", "text": "hi" }));
        assert_eq!(req.action, "send_message");
        assert_eq!(req.params.len(), 2);
        assert!(!req.params.contains_key("action"));
    }

    #[test]
    fn missing_action_fails_to_parse() {
        let parsed: Result<ActionRequest, _> = serde_json::from_value(json!({ "to": "x" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn blank_required_string_is_missing() {
        let req = request(json!({ "action": "send_message", "to": "  " }));
        let err = req.require_str("to").unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Missing required field: to");
    }

    #[test]
    fn integer_accepts_numeric_strings() {
        let req = request(json!({ "action": "x", "a": 7, "b": " 12 ", "c": "nope" }));
        assert_eq!(req.require_i64("a").unwrap(), 7);
        assert_eq!(req.require_i64("b").unwrap(), 12);
        assert_matches!(req.require_i64("c"), Err(CoreError::Validation(_)));
        assert_matches!(req.require_i64("d"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn params_deserialize_into_struct() {
        #[derive(Deserialize)]
        struct Params {
            name: String,
            daily_budget: Option<i64>,
        }

        let req = request(json!({ "action": "create_campaign", "name": "Spring" }));
        let params: Params = req.params_as().unwrap();
        assert_eq!(params.name, "Spring");
        assert!(params.daily_budget.is_none());
    }
}
