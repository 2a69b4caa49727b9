//! Transformation of external DataCite JSON documents into the internal
//! resource graph.
//!
//! The transformer is deliberately forgiving: almost every gap in a payload
//! degrades to a documented default (resource type to "other", unknown
//! languages to none, absent publisher to the reference default) instead of
//! failing the import. The one thing it will not invent is a title; a
//! document without any usable title text is rejected.
//!
//! Reference entities are looked up before they are created, canonical
//! identifier first and exact name second, so re-importing the same payload
//! never duplicates persons, institutions, or publishers. Each import runs
//! inside a single catalog transaction.

use crate::{
  catalog::Catalog,
  dates::{resolve, DateBoundary},
  identifier::{canonicalise_orcid, canonicalise_ror},
  party::{parse_affiliations, Contributor, Creator, Party},
  reference::ReferenceData,
  resource::{
    DateValue, Description, FundingReference, GeoBox, GeoLocation, GeoPoint, Publisher,
    RelatedIdentifier, Resource, ResourceDate, Rights, Subject, Title, TitleType,
  },
};

use super::*;

/// Builds internal resources from external DataCite attribute documents.
pub struct Transformer<'a> {
  /// Reference data for type, language, and publisher resolution
  reference: &'a ReferenceData,
}

impl<'a> Transformer<'a> {
  /// Creates a transformer over the given reference data.
  pub fn new(reference: &'a ReferenceData) -> Self {
    Self { reference }
  }

  /// Transforms a DataCite document into a stored [`Resource`].
  ///
  /// Accepts either the bare attributes object or the full
  /// `{"data": {"attributes": ...}}` envelope. `actor` is recorded as the
  /// creator of the stored resource row. The whole import is one catalog
  /// transaction; on error nothing is persisted.
  pub fn transform(
    &self,
    document: &Value,
    actor: &str,
    catalog: &mut Catalog,
  ) -> Result<Resource> {
    let attributes = document.pointer("/data/attributes").unwrap_or(document);
    catalog.within_transaction(|catalog| self.transform_attributes(attributes, actor, catalog))
  }

  /// Transformation body, run inside the transaction.
  fn transform_attributes(
    &self,
    attributes: &Value,
    actor: &str,
    catalog: &mut Catalog,
  ) -> Result<Resource> {
    let general = attributes
      .pointer("/types/resourceTypeGeneral")
      .and_then(Value::as_str)
      .unwrap_or_default();
    let slug = vocab::kebab_slug(general);
    let resource_type = match self.reference.resource_type(&slug) {
      Some(resource_type) => resource_type,
      None => {
        debug!("resource type {general:?} did not resolve, falling back to other");
        self.reference.fallback_resource_type()
      },
    };

    let mut resource = Resource::new(&resource_type.slug, publication_year(attributes));
    resource.physical_sample = general == "PhysicalObject";

    resource.titles = parse_titles(attributes);
    if resource.titles.is_empty() {
      return Err(CuratorError::Transform("document contains no usable title text".into()));
    }

    resource.doi = attributes.get("doi").and_then(Value::as_str).and_then(|raw| {
      let normalized = doi::normalize_doi(raw);
      if doi::is_valid_doi_format(&normalized) {
        Some(normalized)
      } else {
        warn!("ignoring malformed doi {raw:?}");
        None
      }
    });

    resource.version = attributes
      .get("version")
      .and_then(Value::as_str)
      .map(str::trim)
      .filter(|version| !version.is_empty())
      .map(str::to_string);

    resource.language = attributes
      .get("language")
      .and_then(Value::as_str)
      .map(str::trim)
      .and_then(|code| match self.reference.language_name(code) {
        Some(name) => {
          trace!("resolved language {code} ({name})");
          Some(code.to_string())
        },
        None => {
          debug!("language {code:?} is not a known code, dropping it");
          None
        },
      });

    resource.publisher = self.resolve_publisher(attributes.get("publisher"), catalog)?;

    for entry in array(attributes, "creators") {
      let Some(party) = parse_party(entry) else {
        continue;
      };
      ensure_party(catalog, &party)?;
      let mut creator = Creator::new(party);
      creator.replace_affiliations(parse_affiliations(entry.get("affiliation").unwrap_or(&Value::Null)));
      resource.creators.push(creator);
    }

    for entry in array(attributes, "contributors") {
      let Some(party) = parse_party(entry) else {
        continue;
      };
      ensure_party(catalog, &party)?;
      let contributor_type =
        entry.get("contributorType").and_then(Value::as_str).unwrap_or("Other");
      let mut contributor = Contributor::new(party, contributor_type);
      contributor
        .replace_affiliations(parse_affiliations(entry.get("affiliation").unwrap_or(&Value::Null)));
      resource.contributors.push(contributor);
    }

    resource.dates = parse_dates(attributes);
    if !resource.has_date_of_type("Created") {
      let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
      trace!("no Created date supplied, synthesizing {today}");
      resource.dates.push(ResourceDate::single(today, "Created"));
    }

    resource.descriptions = parse_descriptions(attributes);
    resource.subjects = parse_subjects(attributes);
    resource.rights = parse_rights(attributes);
    resource.related_identifiers = parse_related_identifiers(attributes);
    resource.funding_references = parse_funding_references(attributes);
    resource.geo_locations = parse_geo_locations(attributes);
    resource.sizes = string_array(attributes, "sizes");
    resource.formats = string_array(attributes, "formats");

    catalog.save_resource(&resource, actor)?;
    Ok(resource)
  }

  /// Resolves the publisher field, which may be a bare string or a
  /// structured object; absence falls back to the reference default.
  fn resolve_publisher(
    &self,
    value: Option<&Value>,
    catalog: &mut Catalog,
  ) -> Result<Option<Publisher>> {
    let publisher = match value {
      Some(Value::String(name)) if !name.trim().is_empty() => Some(Publisher {
        name:              name.trim().to_string(),
        identifier:        None,
        identifier_scheme: None,
        scheme_uri:        None,
        language:          None,
      }),
      Some(Value::Object(fields)) => fields
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| Publisher {
          name:              name.to_string(),
          identifier:        field(fields, "publisherIdentifier"),
          identifier_scheme: field(fields, "publisherIdentifierScheme"),
          scheme_uri:        field(fields, "schemeUri"),
          language:          field(fields, "lang"),
        }),
      _ => None,
    };

    let publisher = publisher.or_else(|| {
      trace!("no publisher supplied, using the reference default");
      self.reference.default_publisher().cloned()
    });

    if let Some(publisher) = &publisher {
      catalog.ensure_publisher(publisher)?;
    }
    Ok(publisher)
  }
}

/// Creates or reuses the catalog row behind a party.
fn ensure_party(catalog: &mut Catalog, party: &Party) -> Result<()> {
  match party {
    Party::Person { given_name, family_name, name_identifier, .. } => {
      catalog.ensure_person(given_name.as_deref(), family_name, name_identifier.as_deref())?;
    },
    Party::Institution { name, name_identifier, .. } => {
      catalog.ensure_institution(name, name_identifier.as_deref())?;
    },
  }
  Ok(())
}

/// Parses one creator/contributor entry into a party; `None` drops the
/// entry.
fn parse_party(entry: &Value) -> Option<Party> {
  let record = entry.as_object()?;

  let name_type = record.get("nameType").and_then(Value::as_str).unwrap_or("Personal");
  if name_type == "Organizational" {
    let name = field(record, "name")?;
    let ror = identifier_of_scheme(record, "ROR").and_then(|id| canonicalise_ror(&id));
    return Some(Party::institution(&name, ror.as_deref()));
  }

  let family = field(record, "familyName");
  let given = field(record, "givenName");
  let (family, given) = match family {
    Some(family) => (family, given),
    None => {
      // Fall back to splitting "Family, Given".
      let name = field(record, "name")?;
      match name.split_once(',') {
        Some((family, given)) => {
          let given = given.trim();
          (
            family.trim().to_string(),
            if given.is_empty() { None } else { Some(given.to_string()) },
          )
        },
        None => (name, None),
      }
    },
  };
  let orcid = identifier_of_scheme(record, "ORCID").and_then(|id| canonicalise_orcid(&id));
  Some(Party::person(given.as_deref(), &family, orcid.as_deref()))
}

/// Extracts the first name identifier of the given scheme from an entry's
/// `nameIdentifiers` list.
///
/// The scheme name is matched case-insensitively; entries that declare no
/// scheme at all are offered too, since the caller canonicalizes (and so
/// filters) the value anyway.
fn identifier_of_scheme(record: &serde_json::Map<String, Value>, scheme: &str) -> Option<String> {
  let entries = record.get("nameIdentifiers")?.as_array()?;
  let declared = entries.iter().find_map(|entry| {
    let entry = entry.as_object()?;
    let declared = entry.get("nameIdentifierScheme").and_then(Value::as_str)?;
    if declared.eq_ignore_ascii_case(scheme) {
      field(entry, "nameIdentifier")
    } else {
      None
    }
  });
  declared.or_else(|| {
    entries.iter().find_map(|entry| {
      let entry = entry.as_object()?;
      if entry.get("nameIdentifierScheme").and_then(Value::as_str).is_none() {
        field(entry, "nameIdentifier")
      } else {
        None
      }
    })
  })
}

/// Parses the titles array; untyped entries become the main title once,
/// further untyped entries degrade to `Other`.
fn parse_titles(attributes: &Value) -> Vec<Title> {
  let mut titles = Vec::new();
  let mut has_main = false;
  for entry in array(attributes, "titles") {
    let Some(record) = entry.as_object() else {
      continue;
    };
    let Some(value) = field(record, "title") else {
      continue;
    };
    let title_type = match record.get("titleType").and_then(Value::as_str) {
      Some(declared) => TitleType::from_str(declared).unwrap_or(TitleType::Other),
      None if has_main => {
        trace!("second untyped title {value:?} stored as Other");
        TitleType::Other
      },
      None => {
        has_main = true;
        TitleType::Main
      },
    };
    titles.push(Title { value, title_type, language: field(record, "lang") });
  }
  titles
}

/// Parses the dates array, expanding partial values through the date
/// resolver; unparseable values are stored verbatim.
fn parse_dates(attributes: &Value) -> Vec<ResourceDate> {
  let mut dates = Vec::new();
  for entry in array(attributes, "dates") {
    let Some(record) = entry.as_object() else {
      continue;
    };
    let Some(raw) = field(record, "date") else {
      continue;
    };
    let value = match raw.split_once('/') {
      Some((start, end)) => DateValue::Range {
        start: resolve_or_verbatim(start, DateBoundary::Start),
        end:   resolve_or_verbatim(end, DateBoundary::End),
      },
      None => DateValue::Single(
        resolve(&raw, DateBoundary::Start).unwrap_or_else(|| raw.clone()),
      ),
    };
    dates.push(ResourceDate {
      value,
      date_type: field(record, "dateType").unwrap_or_else(|| "Other".to_string()),
      information: field(record, "dateInformation"),
    });
  }
  dates
}

/// Resolves one side of a date range, keeping the raw text when the
/// resolver rejects it and dropping it only when empty.
fn resolve_or_verbatim(raw: &str, boundary: DateBoundary) -> Option<String> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  Some(resolve(raw, boundary).unwrap_or_else(|| raw.to_string()))
}

/// Parses the descriptions array.
fn parse_descriptions(attributes: &Value) -> Vec<Description> {
  array(attributes, "descriptions")
    .iter()
    .filter_map(|entry| {
      let record = entry.as_object()?;
      Some(Description {
        value:            field(record, "description")?,
        description_type: field(record, "descriptionType")
          .unwrap_or_else(|| "Abstract".to_string()),
        language:         field(record, "lang"),
      })
    })
    .collect()
}

/// Parses the subjects array.
fn parse_subjects(attributes: &Value) -> Vec<Subject> {
  array(attributes, "subjects")
    .iter()
    .filter_map(|entry| {
      let record = entry.as_object()?;
      Some(Subject {
        value:               field(record, "subject")?,
        scheme:              field(record, "subjectScheme"),
        scheme_uri:          field(record, "schemeUri"),
        classification_code: field(record, "classificationCode"),
      })
    })
    .collect()
}

/// Parses the rights list.
fn parse_rights(attributes: &Value) -> Vec<Rights> {
  array(attributes, "rightsList")
    .iter()
    .filter_map(|entry| {
      let record = entry.as_object()?;
      Some(Rights {
        statement:  field(record, "rights")?,
        identifier: field(record, "rightsIdentifier"),
        uri:        field(record, "rightsUri"),
      })
    })
    .collect()
}

/// Parses the related identifiers array; entries missing any of the three
/// required pieces are dropped.
fn parse_related_identifiers(attributes: &Value) -> Vec<RelatedIdentifier> {
  array(attributes, "relatedIdentifiers")
    .iter()
    .filter_map(|entry| {
      let record = entry.as_object()?;
      Some(RelatedIdentifier {
        identifier:              field(record, "relatedIdentifier")?,
        relation_type:           field(record, "relationType")?,
        related_identifier_type: field(record, "relatedIdentifierType")?,
      })
    })
    .collect()
}

/// Parses the funding references array; entries without a funder name are
/// dropped.
fn parse_funding_references(attributes: &Value) -> Vec<FundingReference> {
  array(attributes, "fundingReferences")
    .iter()
    .filter_map(|entry| {
      let record = entry.as_object()?;
      Some(FundingReference {
        funder_name:            field(record, "funderName")?,
        funder_identifier:      field(record, "funderIdentifier"),
        funder_identifier_type: field(record, "funderIdentifierType"),
        award_number:           field(record, "awardNumber"),
        award_title:            field(record, "awardTitle"),
      })
    })
    .collect()
}

/// Parses the geo locations array.
fn parse_geo_locations(attributes: &Value) -> Vec<GeoLocation> {
  array(attributes, "geoLocations")
    .iter()
    .filter_map(|entry| {
      let record = entry.as_object()?;
      let place = field(record, "geoLocationPlace");
      let point = record.get("geoLocationPoint").and_then(|point| {
        Some(GeoPoint {
          latitude:  number(point.get("pointLatitude")?)?,
          longitude: number(point.get("pointLongitude")?)?,
        })
      });
      let bounding_box = record.get("geoLocationBox").and_then(|bounds| {
        Some(GeoBox {
          west_longitude: number(bounds.get("westBoundLongitude")?)?,
          east_longitude: number(bounds.get("eastBoundLongitude")?)?,
          south_latitude: number(bounds.get("southBoundLatitude")?)?,
          north_latitude: number(bounds.get("northBoundLatitude")?)?,
        })
      });
      if place.is_none() && point.is_none() && bounding_box.is_none() {
        return None;
      }
      Some(GeoLocation { place, point, bounding_box })
    })
    .collect()
}

/// Publication year from the attributes, defaulting to the current year.
fn publication_year(attributes: &Value) -> i32 {
  let year = match attributes.get("publicationYear") {
    Some(Value::Number(number)) => number.as_i64(),
    Some(Value::String(text)) => text.trim().parse().ok(),
    _ => None,
  };
  match year {
    Some(year) => year as i32,
    None => {
      warn!("no usable publicationYear, defaulting to the current year");
      Utc::now().year()
    },
  }
}

/// The named array field, empty for anything that is not an array.
fn array<'v>(attributes: &'v Value, key: &str) -> &'v [Value] {
  attributes.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

/// The named field as a trimmed vector of strings.
fn string_array(attributes: &Value, key: &str) -> Vec<String> {
  array(attributes, key)
    .iter()
    .filter_map(Value::as_str)
    .map(str::trim)
    .filter(|value| !value.is_empty())
    .map(str::to_string)
    .collect()
}

/// Trimmed, non-empty string field of a JSON object.
fn field(record: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
  record
    .get(key)
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|value| !value.is_empty())
    .map(str::to_string)
}

/// A JSON number or numeric string as f64.
fn number(value: &Value) -> Option<f64> {
  match value {
    Value::Number(number) => number.as_f64(),
    Value::String(text) => text.trim().parse().ok(),
    _ => None,
  }
}
