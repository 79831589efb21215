use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Key under which errors that belong to no single field are stored.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Field name → message, shared by client-side validation and server answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Overwrites per field; fields absent from `other` keep their message.
    pub fn merge(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Reads a DRF-style error body.
    ///
    /// `{"title": ["too long"]}` maps field to message, `{"error": "..."}` and
    /// `{"detail": "..."}` land under [`NON_FIELD_ERRORS`], and anything that is
    /// not an object becomes a single non-field message.
    pub fn from_response_body(body: &Value) -> Self {
        let mut errors = Self::new();
        match body {
            Value::Object(map) => {
                for (key, value) in map {
                    let field = match key.as_str() {
                        "error" | "detail" => NON_FIELD_ERRORS,
                        other => other,
                    };
                    if let Some(message) = flatten_message(value) {
                        errors.insert(field, message);
                    }
                }
            }
            other => {
                if let Some(message) = flatten_message(other) {
                    errors.insert(NON_FIELD_ERRORS, message);
                }
            }
        }
        errors
    }
}

impl FromIterator<(String, String)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn flatten_message(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten_message).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(" "))
            }
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .filter_map(|(k, v)| flatten_message(v).map(|m| format!("{}: {}", k, m)))
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    // Транспортные ошибки
    #[error("Network error: {0}")]
    Network(String),

    // Ошибки валидации
    #[error("Validation failed")]
    Validation(FieldErrors),

    // Ошибки доступа
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found")]
    NotFound,

    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    // Ошибки сериализации/десериализации
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Classifies a non-success response from its status and raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let json = serde_json::from_str::<Value>(body).ok();
        match status {
            400 => match json {
                Some(value @ Value::Object(_)) => {
                    Self::Validation(FieldErrors::from_response_body(&value))
                }
                _ => Self::Server {
                    status,
                    message: body.to_string(),
                },
            },
            401 => Self::Unauthorized(extract_message(json.as_ref(), body)),
            403 => Self::Forbidden(extract_message(json.as_ref(), body)),
            404 => Self::NotFound,
            _ => Self::Server {
                status,
                message: extract_message(json.as_ref(), body),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Message suitable for an inline banner or an alert.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) | Self::Decode(_) | Self::Server { .. } => {
                "Something went wrong. Please try again.".to_string()
            }
            Self::Validation(errors) => match errors.get(NON_FIELD_ERRORS) {
                Some(message) => message.to_string(),
                None => "Please fix the highlighted fields.".to_string(),
            },
            Self::Unauthorized(_) => "Please sign in to continue.".to_string(),
            Self::Forbidden(message) if !message.is_empty() => message.clone(),
            Self::Forbidden(_) => "You do not have permission to do that.".to_string(),
            Self::NotFound => "Not found.".to_string(),
        }
    }
}

fn extract_message(json: Option<&Value>, raw: &str) -> String {
    json.and_then(|value| {
        ["error", "detail"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str))
            .map(str::to_string)
    })
    .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn drf_field_lists_are_flattened() {
        let body = json!({
            "title": ["Ensure this field has no more than 200 characters."],
            "price": ["A valid number is required.", "Must be positive."],
            "detail": "Bad input"
        });
        let errors = FieldErrors::from_response_body(&body);
        assert_eq!(
            errors.get("title"),
            Some("Ensure this field has no more than 200 characters.")
        );
        assert_eq!(
            errors.get("price"),
            Some("A valid number is required. Must be positive.")
        );
        assert_eq!(errors.get(NON_FIELD_ERRORS), Some("Bad input"));
    }

    #[test]
    fn merge_overwrites_only_present_fields() {
        let mut local = FieldErrors::new();
        local.insert("title", "Title is required");
        local.insert("phone", "Phone number is required");

        let mut server = FieldErrors::new();
        server.insert("title", "Title already used");
        local.merge(server);

        assert_eq!(local.get("title"), Some("Title already used"));
        assert_eq!(local.get("phone"), Some("Phone number is required"));
    }

    #[test]
    fn status_classification() {
        assert!(ApiError::from_status(404, "").is_not_found());
        assert_eq!(
            ApiError::from_status(401, r#"{"error":"Invalid credentials"}"#),
            ApiError::Unauthorized("Invalid credentials".into())
        );
        assert_eq!(
            ApiError::from_status(403, r#"{"detail":"Blocked users cannot create listings."}"#),
            ApiError::Forbidden("Blocked users cannot create listings.".into())
        );
        let validation = ApiError::from_status(400, r#"{"title":["required"]}"#);
        assert_eq!(
            validation.field_errors().and_then(|e| e.get("title")),
            Some("required")
        );
        assert_eq!(
            ApiError::from_status(502, "bad gateway"),
            ApiError::Server {
                status: 502,
                message: "bad gateway".into()
            }
        );
    }

    #[test]
    fn network_failures_ask_for_retry() {
        let err = ApiError::Network("connection refused".into());
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }
}
