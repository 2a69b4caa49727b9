//! Core resource graph types for curated metadata.
//!
//! A [`Resource`] is the internal representation of one publishable item: a
//! dataset, a physical sample collection, an article. It owns ordered
//! collections of titles, people, and descriptive records, all of which
//! serialize into DataCite documents through [`crate::export`] and are
//! populated from external documents by [`crate::transform`].
//!
//! Ordering is meaningful everywhere: the position of a title, creator, or
//! contributor in its vector is its serialization position.

use crate::party::{Contributor, Creator};

use super::*;

/// Complete representation of a curated resource with metadata.
///
/// The DOI stays `None` until the registry has assigned one. The publisher
/// is optional at the model level; export substitutes the reference-data
/// default, so a resource without one still renders a complete document.
///
/// # Examples
///
/// ```
/// use curator::resource::{Resource, Title};
///
/// let mut resource = Resource::new("dataset", 2024);
/// resource.titles.push(Title::main("Seismic velocities of the Ohre rift"));
/// assert!(resource.doi.is_none());
/// assert_eq!(resource.main_title().unwrap().value, "Seismic velocities of the Ohre rift");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
  /// Registered DOI, absent until registration
  pub doi:                 Option<String>,
  /// Year of publication
  pub publication_year:    i32,
  /// Resource type slug from the reference data (e.g. "dataset")
  pub resource_type:       String,
  /// Optional version string
  pub version:             Option<String>,
  /// Optional ISO language code
  pub language:            Option<String>,
  /// Owning publisher; export falls back to the reference default
  pub publisher:           Option<Publisher>,
  /// Whether the resource carries physical-sample (IGSN) metadata
  pub physical_sample:     bool,
  /// Ordered titles
  pub titles:              Vec<Title>,
  /// Ordered creators
  pub creators:            Vec<Creator>,
  /// Ordered contributors
  pub contributors:        Vec<Contributor>,
  /// Ordered descriptions
  pub descriptions:        Vec<Description>,
  /// Ordered subject keywords
  pub subjects:            Vec<Subject>,
  /// Ordered rights statements
  pub rights:              Vec<Rights>,
  /// Ordered dates
  pub dates:               Vec<ResourceDate>,
  /// Ordered related identifiers
  pub related_identifiers: Vec<RelatedIdentifier>,
  /// Ordered funding references
  pub funding_references:  Vec<FundingReference>,
  /// Free-text sizes (e.g. "2.4 GB", "173 measurements")
  pub sizes:               Vec<String>,
  /// Media types or formats
  pub formats:             Vec<String>,
  /// Ordered geographic locations
  pub geo_locations:       Vec<GeoLocation>,
}

impl Resource {
  /// Creates an empty resource of the given type and publication year.
  pub fn new(resource_type: impl Into<String>, publication_year: i32) -> Self {
    Self {
      doi:                 None,
      publication_year,
      resource_type:       resource_type.into(),
      version:             None,
      language:            None,
      publisher:           None,
      physical_sample:     false,
      titles:              Vec::new(),
      creators:            Vec::new(),
      contributors:        Vec::new(),
      descriptions:        Vec::new(),
      subjects:            Vec::new(),
      rights:              Vec::new(),
      dates:               Vec::new(),
      related_identifiers: Vec::new(),
      funding_references:  Vec::new(),
      sizes:               Vec::new(),
      formats:             Vec::new(),
      geo_locations:       Vec::new(),
    }
  }

  /// Returns the implicit main title, the first untyped title if any.
  pub fn main_title(&self) -> Option<&Title> {
    self.titles.iter().find(|title| title.title_type == TitleType::Main)
  }

  /// Returns true when a date of the given type is present, matched
  /// case-insensitively.
  pub fn has_date_of_type(&self, date_type: &str) -> bool {
    self.dates.iter().any(|date| date.date_type.eq_ignore_ascii_case(date_type))
  }
}

/// A single resource title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
  /// Title text
  pub value:      String,
  /// Title kind; [`TitleType::Main`] is the implicit untyped title
  pub title_type: TitleType,
  /// Optional ISO language code
  pub language:   Option<String>,
}

impl Title {
  /// Creates the implicit main title.
  pub fn main(value: impl Into<String>) -> Self {
    Self { value: value.into(), title_type: TitleType::Main, language: None }
  }
}

/// Title kinds; at most one [`TitleType::Main`] per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleType {
  /// The implicit untyped main title
  Main,
  /// A subtitle
  Subtitle,
  /// An alternative title
  AlternativeTitle,
  /// A translated title
  TranslatedTitle,
  /// Any other title kind
  Other,
}

impl TitleType {
  /// The DataCite `titleType` attribute value; the main title carries none.
  pub fn datacite_value(&self) -> Option<&'static str> {
    match self {
      TitleType::Main => None,
      TitleType::Subtitle => Some("Subtitle"),
      TitleType::AlternativeTitle => Some("AlternativeTitle"),
      TitleType::TranslatedTitle => Some("TranslatedTitle"),
      TitleType::Other => Some("Other"),
    }
  }
}

impl FromStr for TitleType {
  type Err = ();

  fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
    match s {
      "Subtitle" => Ok(TitleType::Subtitle),
      "AlternativeTitle" => Ok(TitleType::AlternativeTitle),
      "TranslatedTitle" => Ok(TitleType::TranslatedTitle),
      "Other" => Ok(TitleType::Other),
      _ => Err(()),
    }
  }
}

/// A publishing institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
  /// Publisher name
  pub name:              String,
  /// Optional identifier (e.g. a re3data or ROR URL)
  pub identifier:        Option<String>,
  /// Scheme of the identifier (e.g. "re3data")
  pub identifier_scheme: Option<String>,
  /// Scheme landing URI
  pub scheme_uri:        Option<String>,
  /// Optional ISO language code of the name
  pub language:          Option<String>,
}

/// A date attached to a resource, either a single value or a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDate {
  /// The date value
  pub value:       DateValue,
  /// DataCite date type (Created, Issued, Collected, ...)
  pub date_type:   String,
  /// Optional free-text qualifier
  pub information: Option<String>,
}

impl ResourceDate {
  /// Creates a single-valued date.
  pub fn single(value: impl Into<String>, date_type: impl Into<String>) -> Self {
    Self {
      value:       DateValue::Single(value.into()),
      date_type:   date_type.into(),
      information: None,
    }
  }
}

/// A single date or a start/end range; either end of a range may be open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateValue {
  /// One date
  Single(String),
  /// A range serialized as `start/end`
  Range {
    /// Range start, empty when open
    start: Option<String>,
    /// Range end, empty when open
    end:   Option<String>,
  },
}

impl Display for DateValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      DateValue::Single(value) => write!(f, "{value}"),
      DateValue::Range { start, end } =>
        write!(f, "{}/{}", start.as_deref().unwrap_or(""), end.as_deref().unwrap_or("")),
    }
  }
}

/// A resource description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
  /// Description text
  pub value:            String,
  /// DataCite description type (Abstract, Methods, ...)
  pub description_type: String,
  /// Optional ISO language code
  pub language:         Option<String>,
}

/// A subject keyword or classification entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  /// Subject text
  pub value:               String,
  /// Optional subject scheme name
  pub scheme:              Option<String>,
  /// Optional scheme URI
  pub scheme_uri:          Option<String>,
  /// Optional classification code within the scheme
  pub classification_code: Option<String>,
}

/// A rights statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rights {
  /// Rights statement text (e.g. "CC BY 4.0")
  pub statement:  String,
  /// Optional rights identifier (e.g. an SPDX id)
  pub identifier: Option<String>,
  /// Optional rights URI
  pub uri:        Option<String>,
}

/// A link from this resource to another identified object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedIdentifier {
  /// The related identifier value
  pub identifier:              String,
  /// DataCite relation type (IsSupplementTo, Collects, ...)
  pub relation_type:           String,
  /// DataCite identifier type (DOI, IGSN, RRID, ...)
  pub related_identifier_type: String,
}

/// A funding acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingReference {
  /// Funder name
  pub funder_name:            String,
  /// Optional funder identifier
  pub funder_identifier:      Option<String>,
  /// Scheme of the funder identifier (ROR, Crossref Funder ID, ...)
  pub funder_identifier_type: Option<String>,
  /// Optional award or grant number
  pub award_number:           Option<String>,
  /// Optional award title
  pub award_title:            Option<String>,
}

/// A geographic location, any combination of place name, point, and box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
  /// Free-text place name
  pub place:        Option<String>,
  /// Point coordinate
  pub point:        Option<GeoPoint>,
  /// Bounding box
  pub bounding_box: Option<GeoBox>,
}

/// A point coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
  /// Latitude in decimal degrees
  pub latitude:  f64,
  /// Longitude in decimal degrees
  pub longitude: f64,
}

/// A bounding box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBox {
  /// Westernmost longitude
  pub west_longitude:  f64,
  /// Easternmost longitude
  pub east_longitude:  f64,
  /// Southernmost latitude
  pub south_latitude:  f64,
  /// Northernmost latitude
  pub north_latitude:  f64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn main_title_is_the_first_untyped_title() {
    let mut resource = Resource::new("dataset", 2024);
    resource.titles.push(Title {
      value:      "Subtitle first".into(),
      title_type: TitleType::Subtitle,
      language:   None,
    });
    resource.titles.push(Title::main("The main one"));
    assert_eq!(resource.main_title().unwrap().value, "The main one");
  }

  #[test]
  fn date_type_lookup_ignores_case() {
    let mut resource = Resource::new("dataset", 2024);
    resource.dates.push(ResourceDate::single("2024-01-01", "created"));
    assert!(resource.has_date_of_type("Created"));
    assert!(!resource.has_date_of_type("Issued"));
  }

  #[test]
  fn ranges_render_with_open_ends() {
    let range = DateValue::Range { start: Some("2020-01-01".into()), end: None };
    assert_eq!(range.to_string(), "2020-01-01/");
    let closed = DateValue::Range {
      start: Some("2020-01-01".into()),
      end:   Some("2020-06-30".into()),
    };
    assert_eq!(closed.to_string(), "2020-01-01/2020-06-30");
  }
}
