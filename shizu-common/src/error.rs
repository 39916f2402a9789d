//! Common error types for Shizu
//!
//! Every public operation returns either its value or one of these variants.
//! `Error::kind()` is the machine-readable code surfaced by the HTTP layer.

use std::fmt;
use thiserror::Error;

/// Common result type for Shizu operations
pub type Result<T> = std::result::Result<T, Error>;

/// Named entity categories that errors can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    File,
    Theme,
    Promo,
    Dj,
    Event,
    /// A DJ's membership in an event lineup
    DjSlot,
    /// A promo's membership in an event's promo list
    PromoSlot,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::File => "File",
            EntityKind::Theme => "Theme",
            EntityKind::Promo => "Promo",
            EntityKind::Dj => "DJ",
            EntityKind::Event => "Event",
            EntityKind::DjSlot => "DJ slot",
            EntityKind::PromoSlot => "Promo slot",
        };
        f.write_str(label)
    }
}

/// Error taxonomy shared by the store, lineup manager, exporter and importer
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Entity or slot missing
    #[error("{entity} {name} does not exist")]
    NotFound { entity: EntityKind, name: String },

    /// Duplicate insert
    #[error("{entity} {name} already exists")]
    AlreadyExists { entity: EntityKind, name: String },

    /// A record points at an entity that is not in the store
    #[error("{field} references {entity} {name}, which does not exist")]
    InvalidReference {
        entity: EntityKind,
        name: String,
        field: String,
    },

    /// Move index outside the lineup
    #[error("Cannot move slot {index_a} to {index_b}: lineup has {len} entries")]
    InvalidRange {
        index_a: usize,
        index_b: usize,
        len: usize,
    },

    /// Missing or undownloadable media, one entry per problem
    #[error("Invalid files: {}", .0.join("; "))]
    InvalidFile(Vec<String>),

    /// Media probing failed for one or more export entries
    #[error("Export failed: {}", .0.join("; "))]
    ExportFailure(Vec<String>),

    /// Legacy import finished with failures
    #[error("Import finished with {} failure(s): {}", .0.len(), .0.join("; "))]
    ImportFailure(Vec<String>),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn not_found(entity: EntityKind, name: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            name: name.into(),
        }
    }

    pub fn already_exists(entity: EntityKind, name: impl Into<String>) -> Self {
        Error::AlreadyExists {
            entity,
            name: name.into(),
        }
    }

    pub fn invalid_reference(
        entity: EntityKind,
        name: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Error::InvalidReference {
            entity,
            name: name.into(),
            field: field.into(),
        }
    }

    /// Machine-readable error code
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Database(_) => "DATABASE_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            Error::NotFound { .. } => "NOT_FOUND",
            Error::AlreadyExists { .. } => "ALREADY_EXISTS",
            Error::InvalidReference { .. } => "INVALID_REFERENCE",
            Error::InvalidRange { .. } => "INVALID_RANGE",
            Error::InvalidFile(_) => "INVALID_FILE",
            Error::ExportFailure(_) => "EXPORT_FAILURE",
            Error::ImportFailure(_) => "IMPORT_FAILURE",
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_entity() {
        let err = Error::not_found(EntityKind::DjSlot, "Launch/Bob");
        assert_eq!(err.to_string(), "DJ slot Launch/Bob does not exist");
        assert_eq!(err.kind(), "NOT_FOUND");

        let err = Error::invalid_reference(EntityKind::File, "rec1", "recording");
        assert_eq!(
            err.to_string(),
            "recording references File rec1, which does not exist"
        );
    }

    #[test]
    fn test_aggregate_lists_every_entry() {
        let err = Error::InvalidFile(vec!["a missing".into(), "b missing".into()]);
        assert_eq!(err.to_string(), "Invalid files: a missing; b missing");
        assert_eq!(err.kind(), "INVALID_FILE");
    }
}
