//! ORCID and ROR identifier canonicalization.
//!
//! Depositors paste identifiers in every form the wild has to offer: bare
//! IDs, http URLs, uppercase hosts. Internally and in registry payloads we
//! only ever store one shape per scheme:
//!
//! - ORCID: `https://orcid.org/0000-0002-1825-0097`
//! - ROR: `https://ror.org/04z8jg394`
//!
//! Canonicalization returns `None` for anything that does not match the
//! scheme's shape; it never guesses. Label resolution against the local
//! reference dataset degrades silently to a fallback, because a missing
//! dataset must not block curation.
//!
//! # Examples
//!
//! ```
//! use curator::identifier::canonicalise_ror;
//!
//! let canonical = canonicalise_ror("HTTP://ROR.ORG/04Z8JG394");
//! assert_eq!(canonical.as_deref(), Some("https://ror.org/04z8jg394"));
//! assert_eq!(canonicalise_ror("not-a-ror"), None);
//! ```

use super::*;

lazy_static! {
  /// Four hyphen-separated 4-digit groups; the last group may end in X.
  static ref ORCID_ID: Regex = Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{3}[\dXx]$").unwrap();
  /// Fixed-length alphanumeric ROR identifier.
  static ref ROR_ID: Regex = Regex::new(r"^[0-9a-zA-Z]{9}$").unwrap();
}

/// Canonicalizes an ORCID given as a bare ID or an orcid.org URL.
///
/// Accepts http or https and any host casing; returns the https form with
/// the identifier lowercased, or `None` for empty input or input that does
/// not match the ORCID shape.
pub fn canonicalise_orcid(raw: &str) -> Option<String> {
  canonicalise(raw, "orcid.org", &ORCID_ID)
}

/// Canonicalizes a ROR identifier given as a bare ID or a ror.org URL.
///
/// Accepts http or https and any host casing; returns the https form with
/// the identifier lowercased, or `None` for empty input or input that does
/// not match the ROR shape.
pub fn canonicalise_ror(raw: &str) -> Option<String> {
  canonicalise(raw, "ror.org", &ROR_ID)
}

/// Returns true when the input is an orcid.org URL carrying a well-formed ID.
pub fn is_orcid_url(raw: &str) -> bool {
  url_identifier(raw, "orcid.org").is_some_and(|id| ORCID_ID.is_match(&id))
}

/// Returns true when the input is a ror.org URL carrying a well-formed ID.
pub fn is_ror_url(raw: &str) -> bool {
  url_identifier(raw, "ror.org").is_some_and(|id| ROR_ID.is_match(&id))
}

/// Shared canonicalization over a scheme host and ID shape.
fn canonicalise(raw: &str, host: &str, shape: &Regex) -> Option<String> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  let id = match Url::parse(raw) {
    Ok(_) => url_identifier(raw, host)?,
    Err(_) => raw.to_string(),
  };

  shape.is_match(&id).then(|| format!("https://{host}/{}", id.to_lowercase()))
}

/// Extracts the path identifier from an http(s) URL on the given host.
///
/// The `url` parser lowercases schemes and hosts for us, so `HTTP://ROR.ORG`
/// matches without any extra handling. Path case is preserved.
fn url_identifier(raw: &str, host: &str) -> Option<String> {
  let url = Url::parse(raw.trim()).ok()?;
  if !matches!(url.scheme(), "http" | "https") {
    return None;
  }
  let matches_host = match url.host_str() {
    Some(candidate) => candidate == host || candidate.strip_prefix("www.") == Some(host),
    None => false,
  };
  matches_host.then(|| url.path().trim_matches('/').to_string())
}

/// A canonical identifier together with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLabel {
  /// Canonical https identifier.
  pub id:    String,
  /// Human-readable label for the identifier.
  pub label: String,
}

/// Resolves human-readable labels for ROR identifiers.
///
/// Backed by the label dataset in [`ReferenceData`](crate::reference::ReferenceData);
/// an absent or incomplete dataset degrades to the supplied fallback label,
/// and with no fallback the canonical identifier doubles as the label. This
/// function chain never errors.
#[derive(Debug, Clone)]
pub struct LabelResolver<'a> {
  /// Canonical ROR identifier to label.
  labels: &'a BTreeMap<String, String>,
}

impl<'a> LabelResolver<'a> {
  /// Creates a resolver over a canonical-identifier-to-label dataset.
  pub fn new(labels: &'a BTreeMap<String, String>) -> Self {
    Self { labels }
  }

  /// Resolves a label for a raw ROR identifier.
  ///
  /// Returns `None` only when the input is not a well-formed ROR identifier.
  /// Dataset misses fall back to `fallback`, then to the canonical
  /// identifier itself.
  pub fn resolve_with_fallback(&self, raw: &str, fallback: Option<&str>) -> Option<ResolvedLabel> {
    let id = canonicalise_ror(raw)?;
    let label = match self.labels.get(&id) {
      Some(label) => label.clone(),
      None => {
        trace!("no label for {id} in reference dataset, falling back");
        fallback
          .map(str::trim)
          .filter(|label| !label.is_empty())
          .map(str::to_string)
          .unwrap_or_else(|| id.clone())
      },
    };
    Some(ResolvedLabel { id, label })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ror_forms_canonicalise_identically() {
    let expected = Some("https://ror.org/04z8jg394".to_string());
    assert_eq!(canonicalise_ror("04z8jg394"), expected);
    assert_eq!(canonicalise_ror("https://ror.org/04z8jg394"), expected);
    assert_eq!(canonicalise_ror("HTTP://ROR.ORG/04Z8JG394"), expected);
    assert_eq!(canonicalise_ror("  https://www.ror.org/04z8jg394  "), expected);
  }

  #[test]
  fn orcid_forms_canonicalise_identically() {
    let expected = Some("https://orcid.org/0000-0002-1825-0097".to_string());
    assert_eq!(canonicalise_orcid("0000-0002-1825-0097"), expected);
    assert_eq!(canonicalise_orcid("http://orcid.org/0000-0002-1825-0097"), expected);
    assert_eq!(canonicalise_orcid("HTTPS://ORCID.ORG/0000-0002-1825-0097"), expected);
  }

  #[test]
  fn orcid_checksum_letter_is_accepted() {
    assert_eq!(
      canonicalise_orcid("0000-0002-1694-233X"),
      Some("https://orcid.org/0000-0002-1694-233x".to_string())
    );
  }

  #[test]
  fn malformed_identifiers_are_rejected() {
    assert_eq!(canonicalise_ror(""), None);
    assert_eq!(canonicalise_ror("04z8jg39"), None);
    assert_eq!(canonicalise_ror("https://example.org/04z8jg394"), None);
    assert_eq!(canonicalise_orcid("0000-0002-1825"), None);
    assert_eq!(canonicalise_orcid("ftp://orcid.org/0000-0002-1825-0097"), None);
  }

  #[test]
  fn url_predicates_require_the_scheme_host() {
    assert!(is_ror_url("https://ror.org/04z8jg394"));
    assert!(is_ror_url("http://ROR.org/04z8jg394"));
    assert!(!is_ror_url("04z8jg394"));
    assert!(!is_ror_url("https://ror.org/definitely-not"));
    assert!(is_orcid_url("https://orcid.org/0000-0002-1825-0097"));
    assert!(!is_orcid_url("0000-0002-1825-0097"));
  }

  #[test]
  fn label_resolution_falls_back_in_order() {
    let mut labels = BTreeMap::new();
    labels
      .insert("https://ror.org/04z8jg394".to_string(), "GFZ Helmholtz Centre".to_string());
    let resolver = LabelResolver::new(&labels);

    let hit = resolver.resolve_with_fallback("04z8jg394", Some("ignored")).unwrap();
    assert_eq!(hit.label, "GFZ Helmholtz Centre");

    let fallback = resolver.resolve_with_fallback("05r7n9c40", Some("Some Institute")).unwrap();
    assert_eq!(fallback.label, "Some Institute");

    let bare = resolver.resolve_with_fallback("05r7n9c40", None).unwrap();
    assert_eq!(bare.label, "https://ror.org/05r7n9c40");

    assert!(resolver.resolve_with_fallback("nope", Some("x")).is_none());
  }
}
