use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// PersistError
// ---------------------------------------------------------------------------

/// Failures that can escape the persistence engine.
///
/// Most anomalies (missing document, unknown field, unsupported type) are
/// absorbed locally and degrade to "field left at its default" — only the
/// variants below reach the caller.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Saved text could not be converted to the destination field's type.
    /// This is the one load-side failure that propagates.
    #[error("unable to parse {value:?} as {target} for property {property}")]
    Conversion {
        value: String,
        target: String,
        property: String,
    },

    /// The document file could not be written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory document could not be serialized.
    #[error("cannot serialize saved document: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_message_names_value_and_target() {
        let e = PersistError::Conversion {
            value: "abc".into(),
            target: "integer".into(),
            property: "Port".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("\"abc\""));
        assert!(msg.contains("integer"));
        assert!(msg.contains("Port"));
    }

    #[test]
    fn write_message_names_path() {
        let e = PersistError::Write {
            path: PathBuf::from("/tmp/saved.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/tmp/saved.json"));
    }
}
