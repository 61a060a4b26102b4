use std::fmt;

use thiserror::Error;

/// Position of a syntax error inside a YAML document, as reported by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YamlLocation {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for YamlLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Application-wide error types.
///
/// This enum represents all possible errors that can occur while loading providers,
/// retrieving their files, normalizing data descriptions and querying them.
///
/// # Propagation
///
/// Errors fall in two groups:
/// - item-level errors (retrieval, unsupported file type, archive, schema, YAML syntax,
///   duplicate description) are isolated by the fetch pipeline and recorded in its
///   report, see [`AppError::is_item_level`];
/// - request-level errors (provider registry, query, configuration) propagate to the caller.
///
/// # Examples
///
/// ```
/// use edits_core::error::AppError;
///
/// let err = AppError::ProviderNotFound("acme".to_string());
/// assert_eq!(err.to_string(), "No provider entry with id: acme");
/// assert!(!err.is_item_level());
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// A provider configuration entry violates the provider schema.
    ///
    /// `entry` identifies the offending record (its position and, when known, its id).
    #[error("Malformed provider entry {entry}: {reason}")]
    MalformedProvider { entry: String, reason: String },

    /// No provider entry matches the requested id.
    #[error("No provider entry with id: {0}")]
    ProviderNotFound(String),

    /// More than one provider entry shares the same id.
    #[error("Duplicate provider entries with id: {0}")]
    DuplicateProvider(String),

    /// Retrieving a remote file failed.
    ///
    /// Covers invalid URLs, connection failures, timeouts and non-success
    /// HTTP statuses. Requests are never retried.
    #[error("Failed to retrieve {url}: {reason}")]
    RetrievalError { url: String, reason: String },

    /// A provider file is neither a `.yaml` document nor a `.zip` archive.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// A ZIP archive could not be opened, or one of its entries could not be read.
    #[error("Archive error: {0}")]
    ArchiveError(String),

    /// A data description lacks a required field, or a field has the wrong shape.
    #[error("Description '{id}': field '{field}' {reason}")]
    SchemaError {
        id: String,
        field: String,
        reason: String,
    },

    /// A document is not valid YAML, or its top level is not a mapping.
    #[error(
        "Malformed YAML in {origin}: {message}{}",
        .location.map(|l| format!(" (at {l})")).unwrap_or_default()
    )]
    MalformedYaml {
        origin: String,
        message: String,
        location: Option<YamlLocation>,
    },

    /// A description with the same full id was already collected.
    #[error("Duplicate description id: {0}")]
    DuplicateDescription(String),

    /// A search expression or kind that cannot be serviced.
    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    /// Reading or parsing the provider configuration failed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic application error for cases not covered by specific variants.
    #[error("Error: {0}")]
    Generic(String),
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ProviderNotFound(id) => format!(
                "No provider entry with id: {}\n   Check the ids listed in providers.yaml.",
                id
            ),
            AppError::DuplicateProvider(id) => format!(
                "Duplicate provider entries with id: {}\n   Each ID should be used only once.",
                id
            ),
            AppError::RetrievalError { url, reason } => {
                if reason.contains("timed out") {
                    format!(
                        "Request timed out: {}\n   The server may be slow or unreachable.",
                        url
                    )
                } else {
                    format!(
                        "Cannot retrieve {}: {}\n   Check your internet connection and the URL.",
                        url, reason
                    )
                }
            }
            AppError::UnsupportedQuery(expr) => format!(
                "Can't search for {}\n   Use KIND=KEY where KIND is \"dimension\" or \"measure\".",
                expr
            ),
            _ => self.to_string(),
        }
    }

    /// Returns true if the fetch pipeline isolates this error to a single file or document.
    pub fn is_item_level(&self) -> bool {
        matches!(
            self,
            AppError::RetrievalError { .. }
                | AppError::UnsupportedFileType(_)
                | AppError::ArchiveError(_)
                | AppError::SchemaError { .. }
                | AppError::MalformedYaml { .. }
                | AppError::DuplicateDescription(_)
        )
    }

    pub(crate) fn missing_field(id: &str, field: &str) -> Self {
        AppError::SchemaError {
            id: id.to_string(),
            field: field.to_string(),
            reason: "is required but missing".to_string(),
        }
    }

    pub(crate) fn invalid_field(id: &str, field: &str, reason: impl Into<String>) -> Self {
        AppError::SchemaError {
            id: id.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::ArchiveError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::DuplicateProvider("acme".to_string());
        assert_eq!(err.to_string(), "Duplicate provider entries with id: acme");
    }

    #[test]
    fn test_schema_error_names_field_and_document() {
        let err = AppError::missing_field("energy", "title");
        assert_eq!(
            err.to_string(),
            "Description 'energy': field 'title' is required but missing"
        );
    }

    #[test]
    fn test_malformed_yaml_with_location() {
        let err = AppError::MalformedYaml {
            origin: "https://x/meta.yaml".to_string(),
            message: "did not find expected key".to_string(),
            location: Some(YamlLocation { line: 3, column: 7 }),
        };
        assert_eq!(
            err.to_string(),
            "Malformed YAML in https://x/meta.yaml: did not find expected key (at line 3, column 7)"
        );
    }

    #[test]
    fn test_malformed_yaml_without_location() {
        let err = AppError::MalformedYaml {
            origin: "a.yaml".to_string(),
            message: "top level is not a mapping".to_string(),
            location: None,
        };
        assert_eq!(
            err.to_string(),
            "Malformed YAML in a.yaml: top level is not a mapping"
        );
    }

    #[test]
    fn test_user_message_retrieval_timeout() {
        let err = AppError::RetrievalError {
            url: "https://x/meta.zip".to_string(),
            reason: "request timed out after 30 seconds".to_string(),
        };
        assert!(err.user_message().contains("Request timed out"));
    }

    #[test]
    fn test_user_message_duplicate_provider() {
        let err = AppError::DuplicateProvider("acme".to_string());
        assert!(err.user_message().contains("only once"));
    }

    #[test]
    fn test_is_item_level() {
        assert!(AppError::UnsupportedFileType("x.csv".to_string()).is_item_level());
        assert!(AppError::missing_field("a", "title").is_item_level());
        assert!(!AppError::ProviderNotFound("a".to_string()).is_item_level());
        assert!(!AppError::UnsupportedQuery("x".to_string()).is_item_level());
    }
}
