//! JSON serialization of the shared export mapping.

use serde_json::{json, Map};

use crate::{
  party::{Affiliation, Contributor},
  resource::{GeoLocation, ResourceDate},
};

use super::*;

impl Exporter<'_> {
  /// Renders the DataCite attributes object for a resource.
  ///
  /// Optional collections are omitted entirely when empty; no empty-array
  /// artifacts appear in the output.
  pub fn attributes(&self, resource: &Resource) -> Value {
    let mut attributes = Map::new();

    if let Some(doi) = &resource.doi {
      attributes.insert("doi".into(), json!(doi));
      attributes.insert(
        "identifiers".into(),
        json!([{ "identifier": doi, "identifierType": "DOI" }]),
      );
    }

    attributes.insert(
      "creators".into(),
      Value::Array(self.effective_creators(resource).iter().map(creator_value).collect()),
    );

    attributes.insert(
      "titles".into(),
      Value::Array(self.effective_titles(resource).iter().map(title_value).collect()),
    );

    attributes.insert("publisher".into(), publisher_value(&self.effective_publisher(resource)));
    attributes.insert("publicationYear".into(), json!(resource.publication_year));

    let (type_name, general) = self.resource_type_parts(resource);
    attributes.insert(
      "types".into(),
      json!({ "resourceType": type_name, "resourceTypeGeneral": general }),
    );

    if !resource.contributors.is_empty() {
      attributes.insert(
        "contributors".into(),
        Value::Array(resource.contributors.iter().map(contributor_value).collect()),
      );
    }

    if !resource.subjects.is_empty() {
      attributes.insert(
        "subjects".into(),
        Value::Array(
          resource
            .subjects
            .iter()
            .map(|subject| {
              object([
                ("subject", Some(json!(subject.value))),
                ("subjectScheme", subject.scheme.as_ref().map(|v| json!(v))),
                ("schemeUri", subject.scheme_uri.as_ref().map(|v| json!(v))),
                (
                  "classificationCode",
                  subject.classification_code.as_ref().map(|v| json!(v)),
                ),
              ])
            })
            .collect(),
        ),
      );
    }

    if !resource.dates.is_empty() {
      attributes.insert(
        "dates".into(),
        Value::Array(resource.dates.iter().map(date_value).collect()),
      );
    }

    if let Some(language) = &resource.language {
      attributes.insert("language".into(), json!(language));
    }

    if !resource.related_identifiers.is_empty() {
      attributes.insert(
        "relatedIdentifiers".into(),
        Value::Array(
          resource
            .related_identifiers
            .iter()
            .map(|related| {
              json!({
                "relatedIdentifier": related.identifier,
                "relationType": related.relation_type,
                "relatedIdentifierType": related.related_identifier_type,
              })
            })
            .collect(),
        ),
      );
    }

    if !resource.sizes.is_empty() {
      attributes.insert("sizes".into(), json!(resource.sizes));
    }
    if !resource.formats.is_empty() {
      attributes.insert("formats".into(), json!(resource.formats));
    }
    if let Some(version) = &resource.version {
      attributes.insert("version".into(), json!(version));
    }

    if !resource.rights.is_empty() {
      attributes.insert(
        "rightsList".into(),
        Value::Array(
          resource
            .rights
            .iter()
            .map(|rights| {
              object([
                ("rights", Some(json!(rights.statement))),
                ("rightsIdentifier", rights.identifier.as_ref().map(|v| json!(v))),
                ("rightsUri", rights.uri.as_ref().map(|v| json!(v))),
              ])
            })
            .collect(),
        ),
      );
    }

    if !resource.descriptions.is_empty() {
      attributes.insert(
        "descriptions".into(),
        Value::Array(
          resource
            .descriptions
            .iter()
            .map(|description| {
              object([
                ("description", Some(json!(description.value))),
                ("descriptionType", Some(json!(description.description_type))),
                ("lang", description.language.as_ref().map(|v| json!(v))),
              ])
            })
            .collect(),
        ),
      );
    }

    if !resource.geo_locations.is_empty() {
      attributes.insert(
        "geoLocations".into(),
        Value::Array(resource.geo_locations.iter().map(geo_location_value).collect()),
      );
    }

    if !resource.funding_references.is_empty() {
      attributes.insert(
        "fundingReferences".into(),
        Value::Array(
          resource
            .funding_references
            .iter()
            .map(|funding| {
              object([
                ("funderName", Some(json!(funding.funder_name))),
                ("funderIdentifier", funding.funder_identifier.as_ref().map(|v| json!(v))),
                (
                  "funderIdentifierType",
                  funding.funder_identifier_type.as_ref().map(|v| json!(v)),
                ),
                ("awardNumber", funding.award_number.as_ref().map(|v| json!(v))),
                ("awardTitle", funding.award_title.as_ref().map(|v| json!(v))),
              ])
            })
            .collect(),
        ),
      );
    }

    attributes.insert("schemaVersion".into(), json!(KERNEL_NAMESPACE));

    Value::Object(attributes)
  }

  /// Renders the full registry envelope around [`Exporter::attributes`].
  pub fn json(&self, resource: &Resource) -> Value {
    json!({
      "data": {
        "type": "dois",
        "attributes": self.attributes(resource),
      }
    })
  }
}

/// Builds an object from key/optional-value pairs, dropping the `None`s.
fn object<const N: usize>(pairs: [(&str, Option<Value>); N]) -> Value {
  let mut map = Map::new();
  for (key, value) in pairs {
    if let Some(value) = value {
      map.insert(key.to_string(), value);
    }
  }
  Value::Object(map)
}

/// The structured publisher object.
fn publisher_value(publisher: &Publisher) -> Value {
  object([
    ("name", Some(json!(publisher.name))),
    ("publisherIdentifier", publisher.identifier.as_ref().map(|v| json!(v))),
    (
      "publisherIdentifierScheme",
      publisher.identifier_scheme.as_ref().map(|v| json!(v)),
    ),
    ("schemeUri", publisher.scheme_uri.as_ref().map(|v| json!(v))),
    ("lang", publisher.language.as_ref().map(|v| json!(v))),
  ])
}

/// One title entry; the main title carries no `titleType`.
fn title_value(title: &Title) -> Value {
  object([
    ("title", Some(json!(title.value))),
    ("titleType", title.title_type.datacite_value().map(|v| json!(v))),
    ("lang", title.language.as_ref().map(|v| json!(v))),
  ])
}

/// The name/identifier core shared by creators and contributors.
fn party_fields(party: &Party) -> Map<String, Value> {
  let mut fields = Map::new();
  fields.insert("name".into(), json!(party.display_name()));
  match party {
    Party::Person {
      given_name,
      family_name,
      name_identifier,
      name_identifier_scheme,
      scheme_uri,
    } => {
      fields.insert("nameType".into(), json!("Personal"));
      if let Some(given) = given_name {
        fields.insert("givenName".into(), json!(given));
      }
      fields.insert("familyName".into(), json!(family_name));
      if let Some(identifier) = name_identifier {
        fields.insert(
          "nameIdentifiers".into(),
          json!([{
            "nameIdentifier": identifier,
            "nameIdentifierScheme": name_identifier_scheme,
            "schemeUri": scheme_uri,
          }]),
        );
      }
    },
    Party::Institution { name_identifier, name_identifier_scheme, scheme_uri, .. } => {
      fields.insert("nameType".into(), json!("Organizational"));
      if let Some(identifier) = name_identifier {
        fields.insert(
          "nameIdentifiers".into(),
          json!([{
            "nameIdentifier": identifier,
            "nameIdentifierScheme": name_identifier_scheme,
            "schemeUri": scheme_uri,
          }]),
        );
      }
    },
  }
  fields
}

/// One creator entry.
fn creator_value(creator: &Creator) -> Value {
  let mut fields = party_fields(&creator.party);
  append_affiliations(&mut fields, &creator.affiliations);
  Value::Object(fields)
}

/// One contributor entry; identical to a creator plus `contributorType`.
fn contributor_value(contributor: &Contributor) -> Value {
  let mut fields = party_fields(&contributor.party);
  fields.insert("contributorType".into(), json!(contributor.contributor_type));
  append_affiliations(&mut fields, &contributor.affiliations);
  Value::Object(fields)
}

/// Appends the affiliation array when non-empty.
fn append_affiliations(fields: &mut Map<String, Value>, affiliations: &[Affiliation]) {
  if affiliations.is_empty() {
    return;
  }
  let values = affiliations
    .iter()
    .map(|affiliation| {
      object([
        ("name", Some(json!(affiliation.name))),
        (
          "affiliationIdentifier",
          affiliation.identifier.as_ref().map(|v| json!(v)),
        ),
        (
          "affiliationIdentifierScheme",
          affiliation.identifier_scheme.as_ref().map(|v| json!(v)),
        ),
        ("schemeUri", affiliation.scheme_uri.as_ref().map(|v| json!(v))),
      ])
    })
    .collect();
  fields.insert("affiliation".into(), Value::Array(values));
}

/// One date entry; ranges render as `start/end`.
fn date_value(date: &ResourceDate) -> Value {
  object([
    ("date", Some(json!(date.value.to_string()))),
    ("dateType", Some(json!(date.date_type))),
    ("dateInformation", date.information.as_ref().map(|v| json!(v))),
  ])
}

/// One geo location entry.
fn geo_location_value(location: &GeoLocation) -> Value {
  object([
    ("geoLocationPlace", location.place.as_ref().map(|v| json!(v))),
    (
      "geoLocationPoint",
      location.point.map(|point| {
        json!({
          "pointLatitude": point.latitude,
          "pointLongitude": point.longitude,
        })
      }),
    ),
    (
      "geoLocationBox",
      location.bounding_box.map(|bounds| {
        json!({
          "westBoundLongitude": bounds.west_longitude,
          "eastBoundLongitude": bounds.east_longitude,
          "southBoundLatitude": bounds.south_latitude,
          "northBoundLatitude": bounds.north_latitude,
        })
      }),
    ),
  ])
}
