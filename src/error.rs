//! error types
//!
//! structured errors for config, schema loading, parsing, and projection.

use std::path::PathBuf;

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// error type for the generator and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("io error at {}: {source}", path.display())]
    Io {
        /// file or directory being accessed
        path: PathBuf,
        /// underlying io error
        #[source]
        source: std::io::Error,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("document discovery error: {0}")]
    Walk(#[from] ignore::Error),

    #[error("failed to parse schema: {0}")]
    SchemaParse(String),

    #[error("failed to parse documents {documents}: {message}")]
    DocumentParse {
        /// document patterns the text was collected from
        documents: String,
        /// parser message
        message: String,
    },

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("type `{parent}` has no field `{field}`")]
    UnknownField {
        /// parent type the field was selected on
        parent: String,
        /// selected field name
        field: String,
    },

    #[error("unknown fragment `{0}`")]
    UnknownFragment(String),

    #[error("fragment spread cycle: {0}")]
    FragmentCycle(String),

    #[error("operations must be named")]
    AnonymousOperation,

    #[error("unsupported {kind} in `{context}`")]
    UnsupportedSelection {
        /// operation or fragment containing the selection
        context: String,
        /// selection kind
        kind: &'static str,
    },
}

impl Error {
    /// true if the error came from the graphql parser
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::SchemaParse(_) | Error::DocumentParse { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_parse_error() {
        assert!(Error::SchemaParse("unexpected `}`".to_string()).is_parse_error());

        let err = Error::DocumentParse {
            documents: "src/**/*.ts".to_string(),
            message: "unexpected end of input".to_string(),
        };
        assert!(err.is_parse_error());

        assert!(!Error::UnknownFragment("UserFields".to_string()).is_parse_error());
        assert!(!Error::Config("schema is required".to_string()).is_parse_error());
    }

    #[test]
    fn test_display() {
        let err = Error::UnknownField {
            parent: "Query".to_string(),
            field: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "type `Query` has no field `nope`");

        let err = Error::io(
            "schema.graphql",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "io error at schema.graphql: missing");
    }
}
