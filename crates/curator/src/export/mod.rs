//! Rendering of the internal resource graph into DataCite documents.
//!
//! One mapping feeds two serializations: [`Exporter::json`] produces the
//! registry's JSON envelope, [`Exporter::xml`] the kernel-4 XML document.
//! Everything that decides *what* gets serialized lives in this module, so
//! the two formats cannot drift apart: placeholders for absent titles and
//! creators, the publisher fallback chain, and the physical-sample
//! projection of person contributors into the creators output.
//!
//! Export never fails for missing optional data. Empty collections are
//! omitted entirely; absent required fields get documented placeholders.

use crate::{
  party::{Creator, Party},
  reference::ReferenceData,
  resource::{Publisher, Resource, Title},
};

use super::*;

mod json;
mod xml;

/// DataCite kernel-4 namespace, also used as the JSON `schemaVersion`.
pub const KERNEL_NAMESPACE: &str = "http://datacite.org/schema/kernel-4";
/// Schema location pinning the 4.6 XSD.
pub const KERNEL_SCHEMA_LOCATION: &str =
  "http://datacite.org/schema/kernel-4 http://schema.datacite.org/meta/kernel-4.6/metadata.xsd";
/// Title used when a resource carries no titles at all.
pub const UNTITLED_PLACEHOLDER: &str = "Untitled";
/// Creator name used when a resource carries no creators at all.
pub const UNKNOWN_CREATOR: &str = "Unknown";

/// Renders resources as DataCite 4.6 documents.
///
/// # Examples
///
/// ```
/// use curator::{export::Exporter, prelude::*, resource::Resource};
///
/// let reference = ReferenceData::builtin();
/// let exporter = Exporter::new(&reference);
/// let document = exporter.json(&Resource::new("dataset", 2024));
/// assert_eq!(document["data"]["type"], "dois");
/// ```
pub struct Exporter<'a> {
  /// Reference data for resource type names and the default publisher
  reference: &'a ReferenceData,
}

impl<'a> Exporter<'a> {
  /// Creates an exporter over the given reference data.
  pub fn new(reference: &'a ReferenceData) -> Self {
    Self { reference }
  }

  /// The titles to serialize: the resource's own, or the placeholder.
  fn effective_titles(&self, resource: &Resource) -> Vec<Title> {
    if resource.titles.is_empty() {
      trace!("resource has no titles, serializing the placeholder");
      vec![Title::main(UNTITLED_PLACEHOLDER)]
    } else {
      resource.titles.clone()
    }
  }

  /// The creators to serialize.
  ///
  /// For physical-sample resources, person contributors are appended after
  /// all original creators, in original order, skipping anyone already
  /// present per [`Party::same_entity`]; institutions are never projected.
  /// A resource that still has no creators gets the placeholder person.
  fn effective_creators(&self, resource: &Resource) -> Vec<Creator> {
    let mut creators = resource.creators.clone();

    if resource.physical_sample {
      for contributor in &resource.contributors {
        if !contributor.party.is_person() {
          continue;
        }
        if creators.iter().any(|creator| creator.party.same_entity(&contributor.party)) {
          trace!("skipping already-listed sample contributor {}", contributor.party.display_name());
          continue;
        }
        creators.push(Creator {
          party:        contributor.party.clone(),
          affiliations: contributor.affiliations.clone(),
        });
      }
    }

    if creators.is_empty() {
      trace!("resource has no creators, serializing the placeholder");
      creators.push(Creator::new(Party::person(None, UNKNOWN_CREATOR, None)));
    }
    creators
  }

  /// The publisher to serialize: the resource's own, the reference default,
  /// or the hardcoded repository publisher. Never absent.
  fn effective_publisher(&self, resource: &Resource) -> Publisher {
    resource
      .publisher
      .clone()
      .or_else(|| self.reference.default_publisher().cloned())
      .unwrap_or_else(|| Publisher {
        name:              "GFZ Data Services".to_string(),
        identifier:        Some("https://www.re3data.org/repository/r3d100010958".to_string()),
        identifier_scheme: Some("re3data".to_string()),
        scheme_uri:        Some("https://www.re3data.org".to_string()),
        language:          Some("en".to_string()),
      })
  }

  /// Resolves the resource type slug to its display name and
  /// `resourceTypeGeneral`, falling back to the "other" type.
  fn resource_type_parts(&self, resource: &Resource) -> (String, String) {
    let resource_type = self
      .reference
      .resource_type(&resource.resource_type)
      .unwrap_or_else(|| self.reference.fallback_resource_type());
    (resource_type.name.clone(), resource_type.general.clone())
  }
}

#[cfg(test)]
mod tests {
  use crate::party::Contributor;

  use super::*;

  fn exporter_fixture() -> ReferenceData {
    ReferenceData::builtin()
  }

  #[test]
  fn missing_titles_and_creators_get_placeholders() {
    let reference = exporter_fixture();
    let exporter = Exporter::new(&reference);
    let resource = Resource::new("dataset", 2024);

    let titles = exporter.effective_titles(&resource);
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].value, UNTITLED_PLACEHOLDER);

    let creators = exporter.effective_creators(&resource);
    assert_eq!(creators.len(), 1);
    assert_eq!(creators[0].party.display_name(), UNKNOWN_CREATOR);
    assert!(creators[0].party.is_person());
  }

  #[test]
  fn sample_contributors_project_into_creators_without_duplicates() {
    let reference = exporter_fixture();
    let exporter = Exporter::new(&reference);
    let mut resource = Resource::new("physical-object", 2024);
    resource.physical_sample = true;

    let orcid = Some("0000-0002-1825-0097");
    resource.creators.push(Creator::new(Party::person(Some("Alice"), "Researcher", orcid)));
    resource
      .contributors
      .push(Contributor::new(Party::person(Some("A."), "Researcher", orcid), "DataCollector"));
    resource
      .contributors
      .push(Contributor::new(Party::person(Some("Bora"), "Sampler", None), "DataCollector"));
    resource
      .contributors
      .push(Contributor::new(Party::institution("GFZ Potsdam", None), "HostingInstitution"));

    let creators = exporter.effective_creators(&resource);
    assert_eq!(creators.len(), 2);
    assert_eq!(creators[1].party.display_name(), "Sampler, Bora");
    // Contributors themselves are untouched.
    assert_eq!(resource.contributors.len(), 3);
  }

  #[test]
  fn projection_requires_the_sample_flag() {
    let reference = exporter_fixture();
    let exporter = Exporter::new(&reference);
    let mut resource = Resource::new("dataset", 2024);
    resource.creators.push(Creator::new(Party::person(None, "Solo", None)));
    resource
      .contributors
      .push(Contributor::new(Party::person(None, "Helper", None), "DataCollector"));

    assert_eq!(exporter.effective_creators(&resource).len(), 1);
  }

  #[test]
  fn publisher_fallback_chain_ends_in_the_repository_publisher() {
    let empty = ReferenceData::default();
    let exporter = Exporter::new(&empty);
    let publisher = exporter.effective_publisher(&Resource::new("dataset", 2024));
    assert_eq!(publisher.name, "GFZ Data Services");
    assert_eq!(publisher.identifier_scheme.as_deref(), Some("re3data"));
  }
}
