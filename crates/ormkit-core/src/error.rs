//! Core error types.

use thiserror::Error;

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed filter node construction.
    #[error("{0}")]
    Validation(String),

    /// A filter key names nothing the model knows about.
    #[error("Unknown filter param '{key}'. Allowed base values are {}", format_allowed(.allowed))]
    Field {
        /// The rejected key.
        key: String,
        /// Sorted field, relation and custom filter names.
        allowed: Vec<String>,
    },

    /// Structurally invalid usage at runtime.
    #[error("{0}")]
    Operational(String),

    /// Invalid metadata or schema configuration.
    #[error("{0}")]
    Configuration(String),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ormkit_proto::Error),

    /// JSON decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_allowed(allowed: &[String]) -> String {
    let quoted: Vec<String> = allowed.iter().map(|name| format!("'{name}'")).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_message() {
        let err = Error::Field {
            key: "nme".into(),
            allowed: vec!["age".into(), "id".into(), "name".into()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown filter param 'nme'. Allowed base values are ['age', 'id', 'name']"
        );
    }

    #[test]
    fn test_plain_messages() {
        let err = Error::Configuration("Can't create schema due to cyclic fk references".into());
        assert_eq!(
            err.to_string(),
            "Can't create schema due to cyclic fk references"
        );
    }
}
