//! DOI normalization, format checks, and next-suffix suggestion.
//!
//! Assigned DOIs under our prefixes follow a handful of suffix shapes that
//! grew over the years (`project.year.number`, `gfz.section.section.year.
//! number`, hyphenated campaign names, ...). The suggestion engine
//! classifies the last assigned DOI against that shape library, increments
//! its trailing numeric run while preserving the zero-padding width, and
//! skips candidates that are already taken in the catalog.
//!
//! # Examples
//!
//! ```
//! use curator::doi::{is_valid_doi_format, normalize_doi};
//!
//! assert_eq!(normalize_doi("https://doi.org/10.5880/fidgeo.2026.005"), "10.5880/fidgeo.2026.005");
//! assert!(is_valid_doi_format("10.5880/fidgeo.2026.005"));
//! assert!(!is_valid_doi_format("doi:10.5880/fidgeo.2026.005"));
//! ```

use crate::catalog::Catalog;

use super::*;

/// Upper bound on collision probes, so pathological catalogs cannot spin
/// the suggestion loop forever.
const MAX_COLLISION_PROBES: usize = 1000;

lazy_static! {
  /// `10.<registrant-code>/<suffix>` after normalization.
  static ref DOI_FORMAT: Regex = Regex::new(r"^10\.\d{4,9}/\S+$").unwrap();
  /// Splits a suffix into everything before its trailing numeric run.
  static ref TRAILING_RUN: Regex = Regex::new(r"^(.*?)(\d+)$").unwrap();
}

/// One recognizable suffix shape.
struct SuffixShape {
  /// Shape label used for tracing and tests
  name:    &'static str,
  /// Full-suffix pattern
  pattern: Regex,
}

lazy_static! {
  /// Ordered library of known suffix shapes; first match wins.
  static ref SUFFIX_SHAPES: Vec<SuffixShape> = vec![
    shape("gfz.section.section.year.number", r"(?i)^gfz\.\d+\.\d+\.\d{4}\.\d+$"),
    shape("gfz.code.year.number", r"(?i)^gfz\.[a-z0-9]+\.\d{4}\.\d+$"),
    shape("project.d.year.number", r"(?i)^[a-z0-9]+\.d\.\d{4}\.\d+$"),
    shape("project.year.number", r"(?i)^[a-z0-9]+\.\d{4}\.\d+$"),
    shape("project-suffix.numbers", r"(?i)^[a-z0-9]+(?:-[a-z0-9]+)+\.\d+$"),
    shape("institutional-code", r"(?i)^[a-z0-9]+(?:\.[a-z0-9]+){2,}\.\d+$"),
    shape("projectdb.number", r"(?i)^[a-z][a-z0-9]*\.\d+$"),
  ];
}

/// Builds one [`SuffixShape`] entry.
fn shape(name: &'static str, pattern: &str) -> SuffixShape {
  SuffixShape { name, pattern: Regex::new(pattern).unwrap() }
}

/// Trims a raw DOI and strips any resolver host prefix.
///
/// `https://doi.org/`, `http://doi.org/`, and `https://dx.doi.org/` (host
/// matched case-insensitively) all reduce to the bare `10.x/suffix` form;
/// anything else passes through trimmed.
pub fn normalize_doi(raw: &str) -> String {
  let raw = raw.trim();
  if let Ok(url) = Url::parse(raw) {
    if matches!(url.scheme(), "http" | "https")
      && matches!(url.host_str(), Some("doi.org") | Some("dx.doi.org") | Some("www.doi.org"))
    {
      return url.path().trim_start_matches('/').to_string();
    }
  }
  raw.to_string()
}

/// Whether the input is a well-formed DOI after normalization.
///
/// Scheme-prefixed forms like `doi:10.x/y` are rejected; resolver URLs are
/// accepted because normalization strips them first.
pub fn is_valid_doi_format(raw: &str) -> bool {
  DOI_FORMAT.is_match(&normalize_doi(raw))
}

/// Classifies a DOI suffix against the shape library.
///
/// Returns the shape label, or `None` for a suffix no shape covers.
pub fn classify_suffix(suffix: &str) -> Option<&'static str> {
  SUFFIX_SHAPES.iter().find(|shape| shape.pattern.is_match(suffix)).map(|shape| shape.name)
}

/// Suggests the next free DOI following the pattern of the last assigned
/// one.
///
/// Returns `None` when the input is not a valid DOI, and otherwise always
/// produces a suggestion: suffixes matching no known shape still get a
/// deterministic fallback. Candidates already present in the catalog are
/// skipped, with the probe count capped.
pub fn suggest_next_doi(last_doi: &str, catalog: &Catalog) -> Result<Option<String>> {
  let normalized = normalize_doi(last_doi);
  if !DOI_FORMAT.is_match(&normalized) {
    return Ok(None);
  }
  // The format guarantees the slash.
  let Some((prefix, suffix)) = normalized.split_once('/') else {
    return Ok(None);
  };

  match classify_suffix(suffix) {
    Some(name) => trace!("suffix {suffix:?} classified as {name}"),
    None => trace!("suffix {suffix:?} matches no known shape, using fallback increment"),
  }

  let mut candidate_suffix = suffix.to_string();
  for _ in 0..MAX_COLLISION_PROBES {
    candidate_suffix = increment_suffix(&candidate_suffix);
    let candidate = format!("{prefix}/{candidate_suffix}");
    if !catalog.doi_exists(&candidate, None)? {
      debug!("suggesting {candidate} after {normalized}");
      return Ok(Some(candidate));
    }
  }

  warn!("gave up suggesting a successor for {normalized} after {MAX_COLLISION_PROBES} probes");
  Ok(None)
}

/// Increments the trailing numeric run of a suffix, preserving its digit
/// width; a suffix without a trailing run gets a `.001` counter appended.
fn increment_suffix(suffix: &str) -> String {
  match TRAILING_RUN.captures(suffix) {
    Some(caps) => {
      let head = &caps[1];
      let digits = &caps[2];
      let width = digits.len();
      let next = digits.parse::<u128>().map(|n| n + 1).unwrap_or(1);
      format!("{head}{next:0width$}")
    },
    None => format!("{suffix}.001"),
  }
}
