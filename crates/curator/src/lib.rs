//! Scholarly metadata curation and DataCite interchange library.
//!
//! `curator` is the interchange core of our data publication service,
//! providing:
//!
//! - Bidirectional transforms between an internal resource graph and the
//!   DataCite Metadata Schema 4.6 (JSON and XML)
//! - Registry-acceptance validation that collects every violation in one pass
//! - ORCID/ROR identifier canonicalization and label resolution
//! - Partial-date resolution into boundary dates
//! - Entity deduplication across creators, contributors, and affiliations
//! - Pattern-based suggestion of the next free DOI suffix
//!
//! # Features
//!
//! - **Import**: parse an external DataCite JSON document into internal
//!   entities, reusing reference records instead of duplicating them
//! - **Export**: render a resource as a registry-ready DataCite document,
//!   with defined fallbacks for every optional field
//! - **Validation**: check a document against the 4.6 schema rules before
//!   handing it to the registration service
//! - **Storage**: a small sqlite-backed catalog for entity lookup, DOI
//!   existence checks, and resource persistence
//!
//! # Getting Started
//!
//! ```no_run
//! use curator::{
//!   catalog::Catalog, export::Exporter, prelude::*, transform::Transformer, validator,
//! };
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!   let reference = ReferenceData::builtin();
//!   let mut catalog = Catalog::open(Catalog::default_path())?;
//!
//!   // Ingest a DataCite payload fetched by the registry client
//!   let payload: serde_json::Value = serde_json::from_str("{}")?;
//!   let resource = Transformer::new(&reference).transform(&payload, "curator", &mut catalog)?;
//!
//!   // Render and validate the registry submission
//!   let exporter = Exporter::new(&reference);
//!   let document = exporter.json(&resource);
//!   validator::validate(&document, true)?;
//!   let xml = exporter.xml(&resource)?;
//!   println!("{xml}");
//!
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`resource`] / [`party`]: the internal resource graph
//! - [`transform`]: DataCite JSON into internal entities
//! - [`export`]: internal entities into DataCite JSON/XML
//! - [`validator`]: DataCite 4.6 schema validation
//! - [`identifier`]: ORCID/ROR canonicalization
//! - [`dates`]: partial date resolution
//! - [`doi`]: DOI normalization and suffix suggestion
//! - [`catalog`]: sqlite-backed entity and resource storage
//! - [`reference`]: reference data (vocabularies, languages, publisher)
//!
//! # Design Philosophy
//!
//! This library emphasizes:
//! - Export never fails for missing optional data; every gap has a defined
//!   fallback
//! - Re-importing the same payload never duplicates reference entities
//! - Validation reports all problems at once, never just the first
//! - No network I/O; registry submission belongs to a collaborator

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::BTreeMap,
  fmt::Display,
  path::{Path, PathBuf},
  str::FromStr,
};

use chrono::{Datelike, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

pub mod catalog;
pub mod dates;
pub mod doi;
pub mod error;
pub mod export;
pub mod identifier;
pub mod party;
pub mod reference;
pub mod resource;
pub mod transform;
pub mod validator;
pub mod vocab;

use crate::error::*;

/// Common types for ergonomic imports.
///
/// This module provides a convenient way to import frequently used types
/// with a single glob import.
///
/// # Usage
///
/// ```no_run
/// use curator::{catalog::Catalog, prelude::*};
///
/// fn example() -> Result<()> {
///   let reference = ReferenceData::builtin();
///   let catalog = Catalog::open_in_memory()?;
///   let _ = (reference, catalog);
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{
    error::{CuratorError, Result},
    reference::ReferenceData,
  };
}
