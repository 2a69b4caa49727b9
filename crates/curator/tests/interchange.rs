//! End-to-end interchange tests: DataCite payload in, internal graph,
//! DataCite document back out.

use anyhow::Result;
use curator::{
  catalog::Catalog, export::Exporter, reference::ReferenceData, transform::Transformer, validator,
};
use serde_json::{json, Value};
use tracing_test::traced_test;

fn sample_payload() -> Value {
  json!({
    "data": {
      "type": "dois",
      "attributes": {
        "doi": "10.5880/fidgeo.2026.005",
        "titles": [
          { "title": "Seismic velocity model of the Ohre rift" },
          { "title": "Geschwindigkeitsmodell des Eger-Rifts", "titleType": "TranslatedTitle", "lang": "de" },
        ],
        "creators": [
          {
            "name": "Researcher, Alice",
            "nameType": "Personal",
            "givenName": "Alice",
            "familyName": "Researcher",
            "nameIdentifiers": [
              {
                "nameIdentifier": "https://orcid.org/0000-0002-1825-0097",
                "nameIdentifierScheme": "ORCID",
                "schemeUri": "https://orcid.org"
              }
            ],
            "affiliation": [
              {
                "name": "GFZ Potsdam",
                "affiliationIdentifier": "https://ror.org/04z8jg394",
                "affiliationIdentifierScheme": "ROR"
              }
            ]
          }
        ],
        "contributors": [
          {
            "name": "Curator, Chris",
            "nameType": "Personal",
            "familyName": "Curator",
            "givenName": "Chris",
            "contributorType": "DataCurator"
          }
        ],
        "publisher": { "name": "GFZ Data Services" },
        "publicationYear": 2026,
        "types": { "resourceType": "Dataset", "resourceTypeGeneral": "Dataset" },
        "dates": [
          { "date": "2024-03", "dateType": "Collected" },
          { "date": "2020/2021", "dateType": "Coverage" },
        ],
        "subjects": [{ "subject": "seismology", "classificationCode": "550" }],
        "language": "en",
        "sizes": ["2.4 GB"],
        "formats": ["application/x-netcdf"],
        "schemaVersion": "http://datacite.org/schema/kernel-4",
      }
    }
  })
}

#[test]
#[traced_test]
fn import_builds_the_full_resource_graph() -> Result<()> {
  let reference = ReferenceData::builtin();
  let mut catalog = Catalog::open_in_memory()?;
  let resource = Transformer::new(&reference).transform(&sample_payload(), "tests", &mut catalog)?;

  assert_eq!(resource.doi.as_deref(), Some("10.5880/fidgeo.2026.005"));
  assert_eq!(resource.publication_year, 2026);
  assert_eq!(resource.resource_type, "dataset");
  assert_eq!(resource.language.as_deref(), Some("en"));
  assert_eq!(resource.titles.len(), 2);
  assert_eq!(resource.creators.len(), 1);
  assert_eq!(
    resource.creators[0].party.name_identifier(),
    Some("https://orcid.org/0000-0002-1825-0097")
  );
  assert_eq!(
    resource.creators[0].affiliations[0].identifier.as_deref(),
    Some("https://ror.org/04z8jg394")
  );
  assert_eq!(resource.contributors[0].contributor_type, "DataCurator");

  // Partial dates were expanded to boundary dates.
  let collected = resource
    .dates
    .iter()
    .find(|date| date.date_type == "Collected")
    .expect("collected date");
  assert_eq!(collected.value.to_string(), "2024-03-01");
  let coverage = resource
    .dates
    .iter()
    .find(|date| date.date_type == "Coverage")
    .expect("coverage date");
  assert_eq!(coverage.value.to_string(), "2020-01-01/2021-12-31");

  // No Created date was supplied, so exactly one was synthesized.
  let created: Vec<_> = resource
    .dates
    .iter()
    .filter(|date| date.date_type.eq_ignore_ascii_case("Created"))
    .collect();
  assert_eq!(created.len(), 1);

  Ok(())
}

#[test]
fn reimport_creates_no_duplicate_reference_entities() -> Result<()> {
  let reference = ReferenceData::builtin();
  let mut catalog = Catalog::open_in_memory()?;
  let transformer = Transformer::new(&reference);

  transformer.transform(&sample_payload(), "tests", &mut catalog)?;
  transformer.transform(&sample_payload(), "tests", &mut catalog)?;

  // Two persons total (creator + contributor), stored once each; one
  // publisher row reused across both imports.
  assert_eq!(catalog.person_count()?, 2);
  assert_eq!(catalog.publisher_count()?, 1);

  Ok(())
}

#[test]
fn supplied_created_dates_suppress_the_synthetic_one() -> Result<()> {
  let reference = ReferenceData::builtin();
  let mut catalog = Catalog::open_in_memory()?;
  let mut payload = sample_payload();
  payload["data"]["attributes"]["dates"] = json!([
    { "date": "2019-05-04", "dateType": "created" },
  ]);

  let resource = Transformer::new(&reference).transform(&payload, "tests", &mut catalog)?;
  let created: Vec<_> = resource
    .dates
    .iter()
    .filter(|date| date.date_type.eq_ignore_ascii_case("Created"))
    .collect();
  assert_eq!(created.len(), 1);
  assert_eq!(created[0].value.to_string(), "2019-05-04");

  Ok(())
}

#[test]
fn documents_without_usable_titles_are_rejected() {
  let reference = ReferenceData::builtin();
  let mut catalog = Catalog::open_in_memory().unwrap();
  let mut payload = sample_payload();
  payload["data"]["attributes"]["titles"] = json!([{ "title": "   " }]);

  let result = Transformer::new(&reference).transform(&payload, "tests", &mut catalog);
  assert!(result.is_err());
  // The failed import left nothing behind.
  assert_eq!(catalog.person_count().unwrap(), 0);
}

#[test]
#[traced_test]
fn exported_documents_validate_in_strict_mode() -> Result<()> {
  let reference = ReferenceData::builtin();
  let mut catalog = Catalog::open_in_memory()?;
  let resource = Transformer::new(&reference).transform(&sample_payload(), "tests", &mut catalog)?;

  let exporter = Exporter::new(&reference);
  let document = exporter.json(&resource);
  validator::validate(&document, false)?;
  // The DOI is present, so identifiers are exported and strict mode passes.
  validator::validate(&document, true)?;

  Ok(())
}

#[test]
fn unknown_vocabulary_degrades_to_defaults() -> Result<()> {
  let reference = ReferenceData::builtin();
  let mut catalog = Catalog::open_in_memory()?;
  let mut payload = sample_payload();
  payload["data"]["attributes"]["types"] = json!({ "resourceTypeGeneral": "HolographicCube" });
  payload["data"]["attributes"]["contributors"] = json!([
    { "name": "Helper, Hana", "contributorType": "BestFriend" },
  ]);
  payload["data"]["attributes"]["language"] = json!("tlh");

  let resource = Transformer::new(&reference).transform(&payload, "tests", &mut catalog)?;
  assert_eq!(resource.resource_type, "other");
  assert_eq!(resource.contributors[0].contributor_type, "Other");
  assert_eq!(resource.language, None);

  Ok(())
}

#[test]
fn physical_sample_contributors_project_into_exported_creators() -> Result<()> {
  let reference = ReferenceData::builtin();
  let mut catalog = Catalog::open_in_memory()?;
  let payload = json!({
    "titles": [{ "title": "Borehole cuttings, expedition 42" }],
    "creators": [
      {
        "name": "Researcher, Alice",
        "familyName": "Researcher",
        "givenName": "Alice",
        "nameIdentifiers": [
          { "nameIdentifier": "0000-0002-1825-0097", "nameIdentifierScheme": "ORCID" }
        ]
      }
    ],
    "contributors": [
      {
        "name": "Researcher, Alice",
        "familyName": "Researcher",
        "givenName": "Alice",
        "contributorType": "DataCollector",
        "nameIdentifiers": [
          { "nameIdentifier": "https://orcid.org/0000-0002-1825-0097", "nameIdentifierScheme": "ORCID" }
        ]
      },
      {
        "name": "Sampler, Bora",
        "familyName": "Sampler",
        "givenName": "Bora",
        "contributorType": "DataCollector"
      }
    ],
    "publisher": "GFZ Data Services",
    "publicationYear": 2025,
    "types": { "resourceTypeGeneral": "PhysicalObject" },
    "schemaVersion": "http://datacite.org/schema/kernel-4",
  });

  let resource = Transformer::new(&reference).transform(&payload, "tests", &mut catalog)?;
  assert!(resource.physical_sample);

  let exporter = Exporter::new(&reference);
  let attributes = exporter.attributes(&resource);

  // One original creator plus the one contributor not already listed.
  let creators = attributes["creators"].as_array().unwrap();
  assert_eq!(creators.len(), 2);
  assert_eq!(creators[0]["name"], "Researcher, Alice");
  assert_eq!(creators[1]["name"], "Sampler, Bora");

  // Contributors stay untouched, both still present.
  let contributors = attributes["contributors"].as_array().unwrap();
  assert_eq!(contributors.len(), 2);

  Ok(())
}

#[test]
fn xml_and_json_render_the_same_mapping() -> Result<()> {
  let reference = ReferenceData::builtin();
  let mut catalog = Catalog::open_in_memory()?;
  let resource = Transformer::new(&reference).transform(&sample_payload(), "tests", &mut catalog)?;

  let exporter = Exporter::new(&reference);
  let xml = exporter.xml(&resource)?;

  assert!(xml.contains("<identifier identifierType=\"DOI\">10.5880/fidgeo.2026.005</identifier>"));
  assert!(xml.contains("<creatorName nameType=\"Personal\">Researcher, Alice</creatorName>"));
  assert!(xml.contains("affiliationIdentifier=\"https://ror.org/04z8jg394\""));
  assert!(xml.contains("<title xml:lang=\"de\" titleType=\"TranslatedTitle\">")
    || xml.contains("<title titleType=\"TranslatedTitle\" xml:lang=\"de\">"));
  assert!(xml.contains("<date dateType=\"Coverage\">2020-01-01/2021-12-31</date>"));
  assert!(xml.contains("<size>2.4 GB</size>"));
  assert!(xml.contains("<format>application/x-netcdf</format>"));

  Ok(())
}

#[test]
fn stored_resources_round_trip_through_the_catalog() -> Result<()> {
  let reference = ReferenceData::builtin();
  let mut catalog = Catalog::open_in_memory()?;
  Transformer::new(&reference).transform(&sample_payload(), "tests", &mut catalog)?;

  let (_, stored) = catalog
    .resource_by_doi("10.5880/FIDGEO.2026.005")?
    .expect("stored resource found case-insensitively");
  assert_eq!(stored.titles[0].value, "Seismic velocity model of the Ohre rift");
  assert_eq!(stored.creators.len(), 1);

  Ok(())
}
