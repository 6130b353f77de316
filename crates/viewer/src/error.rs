//! Load pipeline error taxonomy.

use std::time::Duration;

use thiserror::Error;

use crate::loader::LoadGeneration;

#[derive(Debug, Error)]
pub enum LoadError {
    /// Extension or content is not one of GLB, glTF or STL.
    #[error("unsupported format{}", .name.as_deref().map(|n| format!(": {n}")).unwrap_or_default())]
    UnsupportedFormat { name: Option<String> },

    /// The container was recognized but its content is structurally invalid.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Superseded by a newer load. Never shown to the user.
    #[error("load {generation} superseded by {current}")]
    StaleLoad {
        generation: LoadGeneration,
        current: LoadGeneration,
    },

    #[error("load timed out after {}s", .after.as_secs())]
    TimedOut { after: Duration },

    #[error("failed to read model: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }

    /// Whether the failure should be surfaced in the UI.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Self::StaleLoad { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_message() {
        let e = LoadError::UnsupportedFormat {
            name: Some("model.obj".into()),
        };
        assert_eq!(e.to_string(), "unsupported format: model.obj");

        let e = LoadError::UnsupportedFormat { name: None };
        assert_eq!(e.to_string(), "unsupported format");
    }

    #[test]
    fn test_stale_load_is_silent() {
        let e = LoadError::StaleLoad {
            generation: LoadGeneration(1),
            current: LoadGeneration(2),
        };
        assert!(!e.is_user_visible());
        assert!(LoadError::malformed("bad").is_user_visible());
        assert!(LoadError::TimedOut {
            after: Duration::from_secs(3)
        }
        .is_user_visible());
    }
}
