//! Error types for the curator library.
//!
//! This module provides a comprehensive error type that encompasses all
//! possible failure modes when curating metadata, including:
//! - Schema validation failures
//! - Structural problems in imported documents
//! - Catalog (sqlite) operations
//! - Reference data loading
//!
//! Lookup-style functions in this crate do not use these errors for absence:
//! a DOI that is not registered or a language code that does not resolve is
//! an `Option::None`, not an `Err`.

use thiserror::Error;

use crate::validator::ValidationFailure;

/// Error type alias used for the [`curator`](crate) crate.
pub type Result<T> = core::result::Result<T, CuratorError>;

/// Errors that can occur when curating metadata.
///
/// This enum provides a comprehensive set of error cases that can occur when:
/// - Validating a DataCite document against the 4.6 schema
/// - Transforming an external payload into internal entities
/// - Working with the local catalog
/// - Loading reference data from disk
#[derive(Error, Debug)]
pub enum CuratorError {
  /// A DataCite document failed schema validation.
  ///
  /// Carries the fixed schema version tag and the complete ordered list of
  /// violations found in one pass, so a client can render all problems at
  /// once instead of fixing them one round trip at a time.
  #[error(transparent)]
  Validation(#[from] ValidationFailure),

  /// An imported document has a structural problem no default can cover.
  ///
  /// Most gaps in an external payload degrade to a documented fallback
  /// (unresolvable resource type, absent publisher, unknown language). This
  /// error is reserved for the ones that cannot, e.g. a document without any
  /// usable title text.
  #[error("Unusable DataCite payload: {0}")]
  Transform(String),

  /// A sqlite operation in the catalog failed.
  #[error(transparent)]
  Sqlite(#[from] rusqlite::Error),

  /// A file system operation failed.
  ///
  /// This occurs when:
  /// - Creating the catalog file fails
  /// - Reading reference data from disk fails
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// A reference data file could not be parsed as TOML.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// An XML document could not be written.
  #[error(transparent)]
  Xml(#[from] quick_xml::Error),

  /// Rendered XML was not valid UTF-8.
  #[error(transparent)]
  Utf8(#[from] std::string::FromUtf8Error),
}
