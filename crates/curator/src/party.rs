//! People, institutions, and their affiliations.
//!
//! Creators and contributors are polymorphic over persons and institutions.
//! [`Party`] models that as a tagged sum type with an explicit discriminant;
//! serialization and deduplication switch on the tag, and nothing in this
//! crate ever treats an institution as a person.
//!
//! Affiliation lists are owned collections with replace semantics: a sync
//! replaces the whole list and hands back the previous one, so stale rows
//! cannot accumulate across repeated imports.

use crate::identifier::{canonicalise_orcid, canonicalise_ror, is_ror_url};

use super::*;

/// Scheme name attached to canonical ORCID identifiers.
pub const ORCID_SCHEME: &str = "ORCID";
/// Scheme URI attached to canonical ORCID identifiers.
pub const ORCID_SCHEME_URI: &str = "https://orcid.org";
/// Scheme name attached to canonical ROR identifiers.
pub const ROR_SCHEME: &str = "ROR";
/// Scheme URI attached to canonical ROR identifiers.
pub const ROR_SCHEME_URI: &str = "https://ror.org";

/// A person or an institution appearing as creator or contributor.
///
/// The discriminant is explicit in serialized form (`kind`), and the
/// identifier fields carry canonical https identifiers only: ORCID for
/// persons, ROR for institutions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Party {
  /// A natural person.
  Person {
    /// Given name, absent for mononymous depositors
    given_name:             Option<String>,
    /// Family name
    family_name:            String,
    /// Canonical ORCID
    name_identifier:        Option<String>,
    /// Identifier scheme name, `"ORCID"` when an identifier is present
    name_identifier_scheme: Option<String>,
    /// Scheme landing URI
    scheme_uri:             Option<String>,
  },
  /// An organization acting as creator or contributor.
  Institution {
    /// Institution name
    name:                   String,
    /// Canonical ROR
    name_identifier:        Option<String>,
    /// Identifier scheme name, `"ROR"` when an identifier is present
    name_identifier_scheme: Option<String>,
    /// Scheme landing URI
    scheme_uri:             Option<String>,
  },
}

impl Party {
  /// Creates a person, canonicalizing the ORCID and dropping it when it does
  /// not match the scheme shape.
  pub fn person(
    given_name: Option<&str>,
    family_name: &str,
    orcid: Option<&str>,
  ) -> Self {
    let canonical = orcid.and_then(canonicalise_orcid);
    Party::Person {
      given_name:             given_name.map(str::to_string),
      family_name:            family_name.to_string(),
      name_identifier_scheme: canonical.as_ref().map(|_| ORCID_SCHEME.to_string()),
      scheme_uri:             canonical.as_ref().map(|_| ORCID_SCHEME_URI.to_string()),
      name_identifier:        canonical,
    }
  }

  /// Creates an institution, canonicalizing the ROR and dropping it when it
  /// does not match the scheme shape.
  pub fn institution(name: &str, ror: Option<&str>) -> Self {
    let canonical = ror.and_then(canonicalise_ror);
    Party::Institution {
      name:                   name.to_string(),
      name_identifier_scheme: canonical.as_ref().map(|_| ROR_SCHEME.to_string()),
      scheme_uri:             canonical.as_ref().map(|_| ROR_SCHEME_URI.to_string()),
      name_identifier:        canonical,
    }
  }

  /// True for the person variant.
  pub fn is_person(&self) -> bool {
    matches!(self, Party::Person { .. })
  }

  /// The canonical name identifier, if any.
  pub fn name_identifier(&self) -> Option<&str> {
    match self {
      Party::Person { name_identifier, .. } | Party::Institution { name_identifier, .. } =>
        name_identifier.as_deref(),
    }
  }

  /// The scheme name of the canonical identifier, if any.
  pub fn name_identifier_scheme(&self) -> Option<&str> {
    match self {
      Party::Person { name_identifier_scheme, .. }
      | Party::Institution { name_identifier_scheme, .. } => name_identifier_scheme.as_deref(),
    }
  }

  /// The scheme URI of the canonical identifier, if any.
  pub fn scheme_uri(&self) -> Option<&str> {
    match self {
      Party::Person { scheme_uri, .. } | Party::Institution { scheme_uri, .. } =>
        scheme_uri.as_deref(),
    }
  }

  /// Display name: `"Family, Given"` for persons (given-name segment omitted
  /// when absent), the plain name for institutions.
  pub fn display_name(&self) -> String {
    match self {
      Party::Person { given_name, family_name, .. } => match given_name.as_deref() {
        Some(given) if !given.is_empty() => format!("{family_name}, {given}"),
        _ => family_name.clone(),
      },
      Party::Institution { name, .. } => name.clone(),
    }
  }

  /// Whether two parties are the same real-world entity.
  ///
  /// Two persons match when both carry a canonical ORCID and the canonical
  /// forms are equal, or, when at least one side lacks an identifier, when
  /// family and given name match exactly (case-sensitive, no normalization).
  /// Institutions match by canonical ROR or exact name; a person never
  /// matches an institution.
  pub fn same_entity(&self, other: &Party) -> bool {
    match (self, other) {
      (
        Party::Person {
          given_name: given_a,
          family_name: family_a,
          name_identifier: id_a,
          ..
        },
        Party::Person {
          given_name: given_b,
          family_name: family_b,
          name_identifier: id_b,
          ..
        },
      ) => {
        // Identifiers may arrive in URL or bare form; compare canonically.
        let id_a = id_a.as_deref().and_then(canonicalise_orcid);
        let id_b = id_b.as_deref().and_then(canonicalise_orcid);
        match (id_a, id_b) {
          (Some(a), Some(b)) => a == b,
          _ => family_a == family_b && given_a == given_b,
        }
      },
      (
        Party::Institution { name: name_a, name_identifier: id_a, .. },
        Party::Institution { name: name_b, name_identifier: id_b, .. },
      ) => {
        let id_a = id_a.as_deref().and_then(canonicalise_ror);
        let id_b = id_b.as_deref().and_then(canonicalise_ror);
        match (id_a, id_b) {
          (Some(a), Some(b)) => a == b,
          _ => name_a == name_b,
        }
      },
      _ => false,
    }
  }
}

/// A creator of a resource, with its owned affiliation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
  /// The person or institution
  pub party:        Party,
  /// Owned, ordered affiliations
  pub affiliations: Vec<Affiliation>,
}

impl Creator {
  /// Creates a creator with no affiliations.
  pub fn new(party: Party) -> Self {
    Self { party, affiliations: Vec::new() }
  }

  /// Replaces the whole affiliation list, returning the previous one.
  ///
  /// An empty `new` leaves the creator with zero affiliations; this is a
  /// replacement, never a merge or a skip.
  pub fn replace_affiliations(&mut self, new: Vec<Affiliation>) -> Vec<Affiliation> {
    std::mem::replace(&mut self.affiliations, new)
  }
}

/// A contributor to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
  /// The person or institution
  pub party:            Party,
  /// DataCite contributor type; `"Other"` when the source value is unknown
  pub contributor_type: String,
  /// Owned, ordered affiliations
  pub affiliations:     Vec<Affiliation>,
}

impl Contributor {
  /// Creates a contributor with no affiliations, defaulting unrecognized
  /// contributor types to `"Other"`.
  pub fn new(party: Party, contributor_type: &str) -> Self {
    let contributor_type = if vocab::CONTRIBUTOR_TYPES.contains(&contributor_type) {
      contributor_type.to_string()
    } else {
      trace!("unrecognized contributor type {contributor_type:?}, defaulting to Other");
      "Other".to_string()
    };
    Self { party, contributor_type, affiliations: Vec::new() }
  }

  /// Replaces the whole affiliation list, returning the previous one.
  pub fn replace_affiliations(&mut self, new: Vec<Affiliation>) -> Vec<Affiliation> {
    std::mem::replace(&mut self.affiliations, new)
  }
}

/// An institutional affiliation of a creator or contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation {
  /// Affiliation name, may be empty when only an identifier is known
  pub name:              String,
  /// Optional identifier, canonical when the scheme is recognized
  pub identifier:        Option<String>,
  /// Identifier scheme, `None` for unrecognized schemes
  pub identifier_scheme: Option<String>,
  /// Scheme landing URI
  pub scheme_uri:        Option<String>,
}

/// Parses a loosely-typed affiliation list into ordered [`Affiliation`]s.
///
/// Entries that are not record-shaped are dropped, as are entries whose
/// trimmed name is empty and whose identifier is empty. All string fields
/// are trimmed. A ROR URL in the name field is moved to the identifier and
/// the name cleared, so the URL is not duplicated as a display name.
/// Identifiers with unrecognized schemes pass through with a `None` scheme.
pub fn parse_affiliations(raw: &Value) -> Vec<Affiliation> {
  let Some(entries) = raw.as_array() else {
    return Vec::new();
  };
  entries.iter().filter_map(parse_affiliation_entry).collect()
}

/// Parses one affiliation record; `None` drops the entry.
fn parse_affiliation_entry(entry: &Value) -> Option<Affiliation> {
  let record = entry.as_object()?;

  let mut name = string_field(record, "name").unwrap_or_default();
  let mut identifier = string_field(record, "affiliationIdentifier")
    .or_else(|| string_field(record, "identifier"));
  let scheme = string_field(record, "affiliationIdentifierScheme")
    .or_else(|| string_field(record, "identifierScheme"));
  let mut scheme_uri = string_field(record, "schemeUri");

  // A ROR URL pasted into the name field is really an identifier.
  if is_ror_url(&name) {
    identifier = canonicalise_ror(&name);
    name = String::new();
  }

  let (identifier, identifier_scheme) = match identifier {
    Some(id) => match canonicalise_ror(&id) {
      Some(canonical) => {
        scheme_uri = Some(ROR_SCHEME_URI.to_string());
        (Some(canonical), Some(ROR_SCHEME.to_string()))
      },
      None => {
        if scheme.is_some() {
          trace!("passing affiliation identifier {id:?} through with unrecognized scheme {scheme:?}");
        }
        (Some(id), None)
      },
    },
    None => (None, None),
  };

  if name.is_empty() && identifier.as_deref().unwrap_or("").is_empty() {
    return None;
  }

  Some(Affiliation { name, identifier, identifier_scheme, scheme_uri })
}

/// Trimmed, non-empty string field of a JSON object.
fn string_field(record: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
  record
    .get(key)
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|value| !value.is_empty())
    .map(str::to_string)
}
