//! XML serialization of the shared export mapping.
//!
//! Renders the kernel-4 document through a [`quick_xml::Writer`], which
//! escapes all text content and attribute values on write. The element
//! order follows the kernel-4.6 sequence; every optional section is only
//! opened when its collection is non-empty, so the output stays well-formed
//! for every reachable combination of populated and empty sections.

use quick_xml::{
  events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
  Writer,
};

use crate::party::{Affiliation, Party};

use super::*;

/// Writer alias used throughout this module.
type XmlWriter = Writer<Vec<u8>>;

impl Exporter<'_> {
  /// Renders the resource as a UTF-8 DataCite 4.6 XML document.
  pub fn xml(&self, resource: &Resource) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("resource");
    root.push_attribute(("xmlns", KERNEL_NAMESPACE));
    root.push_attribute(("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"));
    root.push_attribute(("xsi:schemaLocation", KERNEL_SCHEMA_LOCATION));
    writer.write_event(Event::Start(root))?;

    // The identifier element self-closes until a DOI is assigned.
    let mut identifier = BytesStart::new("identifier");
    identifier.push_attribute(("identifierType", "DOI"));
    match &resource.doi {
      Some(doi) => {
        writer.write_event(Event::Start(identifier))?;
        writer.write_event(Event::Text(BytesText::new(doi)))?;
        writer.write_event(Event::End(BytesEnd::new("identifier")))?;
      },
      None => writer.write_event(Event::Empty(identifier))?,
    }

    self.write_creators(&mut writer, resource)?;
    self.write_titles(&mut writer, resource)?;
    self.write_publisher(&mut writer, resource)?;
    text_element(
      &mut writer,
      "publicationYear",
      &[],
      &resource.publication_year.to_string(),
    )?;
    let (type_name, general) = self.resource_type_parts(resource);
    text_element(
      &mut writer,
      "resourceType",
      &[("resourceTypeGeneral", general.as_str())],
      &type_name,
    )?;

    write_subjects(&mut writer, resource)?;
    write_contributors(&mut writer, resource)?;
    write_dates(&mut writer, resource)?;

    if let Some(language) = &resource.language {
      text_element(&mut writer, "language", &[], language)?;
    }

    write_related_identifiers(&mut writer, resource)?;
    write_strings(&mut writer, "sizes", "size", &resource.sizes)?;
    write_strings(&mut writer, "formats", "format", &resource.formats)?;

    if let Some(version) = &resource.version {
      text_element(&mut writer, "version", &[], version)?;
    }

    write_rights(&mut writer, resource)?;
    write_descriptions(&mut writer, resource)?;
    write_geo_locations(&mut writer, resource)?;
    write_funding_references(&mut writer, resource)?;

    writer.write_event(Event::End(BytesEnd::new("resource")))?;
    Ok(String::from_utf8(writer.into_inner())?)
  }

  /// Writes the creators section, placeholders and projection included.
  fn write_creators(&self, writer: &mut XmlWriter, resource: &Resource) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("creators")))?;
    for creator in self.effective_creators(resource) {
      writer.write_event(Event::Start(BytesStart::new("creator")))?;
      write_party(writer, &creator.party, "creatorName")?;
      write_affiliations(writer, &creator.affiliations)?;
      writer.write_event(Event::End(BytesEnd::new("creator")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("creators")))?;
    Ok(())
  }

  /// Writes the titles section, placeholder included.
  fn write_titles(&self, writer: &mut XmlWriter, resource: &Resource) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("titles")))?;
    for title in self.effective_titles(resource) {
      let mut start = BytesStart::new("title");
      if let Some(title_type) = title.title_type.datacite_value() {
        start.push_attribute(("titleType", title_type));
      }
      if let Some(language) = &title.language {
        start.push_attribute(("xml:lang", language.as_str()));
      }
      writer.write_event(Event::Start(start))?;
      writer.write_event(Event::Text(BytesText::new(&title.value)))?;
      writer.write_event(Event::End(BytesEnd::new("title")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("titles")))?;
    Ok(())
  }

  /// Writes the publisher element with its identifier attributes.
  fn write_publisher(&self, writer: &mut XmlWriter, resource: &Resource) -> Result<()> {
    let publisher = self.effective_publisher(resource);
    let mut start = BytesStart::new("publisher");
    if let Some(identifier) = &publisher.identifier {
      start.push_attribute(("publisherIdentifier", identifier.as_str()));
    }
    if let Some(scheme) = &publisher.identifier_scheme {
      start.push_attribute(("publisherIdentifierScheme", scheme.as_str()));
    }
    if let Some(scheme_uri) = &publisher.scheme_uri {
      start.push_attribute(("schemeURI", scheme_uri.as_str()));
    }
    if let Some(language) = &publisher.language {
      start.push_attribute(("xml:lang", language.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(&publisher.name)))?;
    writer.write_event(Event::End(BytesEnd::new("publisher")))?;
    Ok(())
  }
}

/// Writes one element with fixed attributes and escaped text content.
fn text_element(
  writer: &mut XmlWriter,
  name: &str,
  attributes: &[(&str, &str)],
  value: &str,
) -> Result<()> {
  let mut start = BytesStart::new(name);
  for attribute in attributes {
    start.push_attribute(*attribute);
  }
  writer.write_event(Event::Start(start))?;
  writer.write_event(Event::Text(BytesText::new(value)))?;
  writer.write_event(Event::End(BytesEnd::new(name)))?;
  Ok(())
}

/// Writes the name block shared by creators and contributors.
fn write_party(writer: &mut XmlWriter, party: &Party, name_element: &str) -> Result<()> {
  let name_type = if party.is_person() { "Personal" } else { "Organizational" };
  text_element(writer, name_element, &[("nameType", name_type)], &party.display_name())?;

  if let Party::Person { given_name, family_name, .. } = party {
    if let Some(given) = given_name {
      text_element(writer, "givenName", &[], given)?;
    }
    text_element(writer, "familyName", &[], family_name)?;
  }

  if let Some(identifier) = party.name_identifier() {
    let mut attributes = Vec::new();
    if let Some(scheme) = party.name_identifier_scheme() {
      attributes.push(("nameIdentifierScheme", scheme));
    }
    if let Some(scheme_uri) = party.scheme_uri() {
      attributes.push(("schemeURI", scheme_uri));
    }
    text_element(writer, "nameIdentifier", &attributes, identifier)?;
  }
  Ok(())
}

/// Writes affiliation elements for one creator or contributor.
fn write_affiliations(writer: &mut XmlWriter, affiliations: &[Affiliation]) -> Result<()> {
  for affiliation in affiliations {
    let mut start = BytesStart::new("affiliation");
    if let Some(identifier) = &affiliation.identifier {
      start.push_attribute(("affiliationIdentifier", identifier.as_str()));
    }
    if let Some(scheme) = &affiliation.identifier_scheme {
      start.push_attribute(("affiliationIdentifierScheme", scheme.as_str()));
    }
    if let Some(scheme_uri) = &affiliation.scheme_uri {
      start.push_attribute(("schemeURI", scheme_uri.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(&affiliation.name)))?;
    writer.write_event(Event::End(BytesEnd::new("affiliation")))?;
  }
  Ok(())
}

/// Writes the contributors section when non-empty.
fn write_contributors(writer: &mut XmlWriter, resource: &Resource) -> Result<()> {
  if resource.contributors.is_empty() {
    return Ok(());
  }
  writer.write_event(Event::Start(BytesStart::new("contributors")))?;
  for contributor in &resource.contributors {
    let mut start = BytesStart::new("contributor");
    start.push_attribute(("contributorType", contributor.contributor_type.as_str()));
    writer.write_event(Event::Start(start))?;
    write_party(writer, &contributor.party, "contributorName")?;
    write_affiliations(writer, &contributor.affiliations)?;
    writer.write_event(Event::End(BytesEnd::new("contributor")))?;
  }
  writer.write_event(Event::End(BytesEnd::new("contributors")))?;
  Ok(())
}

/// Writes the subjects section when non-empty.
fn write_subjects(writer: &mut XmlWriter, resource: &Resource) -> Result<()> {
  if resource.subjects.is_empty() {
    return Ok(());
  }
  writer.write_event(Event::Start(BytesStart::new("subjects")))?;
  for subject in &resource.subjects {
    let mut start = BytesStart::new("subject");
    if let Some(scheme) = &subject.scheme {
      start.push_attribute(("subjectScheme", scheme.as_str()));
    }
    if let Some(scheme_uri) = &subject.scheme_uri {
      start.push_attribute(("schemeURI", scheme_uri.as_str()));
    }
    if let Some(code) = &subject.classification_code {
      start.push_attribute(("classificationCode", code.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(&subject.value)))?;
    writer.write_event(Event::End(BytesEnd::new("subject")))?;
  }
  writer.write_event(Event::End(BytesEnd::new("subjects")))?;
  Ok(())
}

/// Writes the dates section when non-empty.
fn write_dates(writer: &mut XmlWriter, resource: &Resource) -> Result<()> {
  if resource.dates.is_empty() {
    return Ok(());
  }
  writer.write_event(Event::Start(BytesStart::new("dates")))?;
  for date in &resource.dates {
    let mut start = BytesStart::new("date");
    start.push_attribute(("dateType", date.date_type.as_str()));
    if let Some(information) = &date.information {
      start.push_attribute(("dateInformation", information.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(&date.value.to_string())))?;
    writer.write_event(Event::End(BytesEnd::new("date")))?;
  }
  writer.write_event(Event::End(BytesEnd::new("dates")))?;
  Ok(())
}

/// Writes the related identifiers section when non-empty.
fn write_related_identifiers(writer: &mut XmlWriter, resource: &Resource) -> Result<()> {
  if resource.related_identifiers.is_empty() {
    return Ok(());
  }
  writer.write_event(Event::Start(BytesStart::new("relatedIdentifiers")))?;
  for related in &resource.related_identifiers {
    text_element(
      writer,
      "relatedIdentifier",
      &[
        ("relatedIdentifierType", related.related_identifier_type.as_str()),
        ("relationType", related.relation_type.as_str()),
      ],
      &related.identifier,
    )?;
  }
  writer.write_event(Event::End(BytesEnd::new("relatedIdentifiers")))?;
  Ok(())
}

/// Writes a plain string list section (`sizes`, `formats`) when non-empty.
fn write_strings(
  writer: &mut XmlWriter,
  section: &str,
  element: &str,
  values: &[String],
) -> Result<()> {
  if values.is_empty() {
    return Ok(());
  }
  writer.write_event(Event::Start(BytesStart::new(section)))?;
  for value in values {
    text_element(writer, element, &[], value)?;
  }
  writer.write_event(Event::End(BytesEnd::new(section)))?;
  Ok(())
}

/// Writes the rights list when non-empty.
fn write_rights(writer: &mut XmlWriter, resource: &Resource) -> Result<()> {
  if resource.rights.is_empty() {
    return Ok(());
  }
  writer.write_event(Event::Start(BytesStart::new("rightsList")))?;
  for rights in &resource.rights {
    let mut start = BytesStart::new("rights");
    if let Some(uri) = &rights.uri {
      start.push_attribute(("rightsURI", uri.as_str()));
    }
    if let Some(identifier) = &rights.identifier {
      start.push_attribute(("rightsIdentifier", identifier.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(&rights.statement)))?;
    writer.write_event(Event::End(BytesEnd::new("rights")))?;
  }
  writer.write_event(Event::End(BytesEnd::new("rightsList")))?;
  Ok(())
}

/// Writes the descriptions section when non-empty.
fn write_descriptions(writer: &mut XmlWriter, resource: &Resource) -> Result<()> {
  if resource.descriptions.is_empty() {
    return Ok(());
  }
  writer.write_event(Event::Start(BytesStart::new("descriptions")))?;
  for description in &resource.descriptions {
    let mut start = BytesStart::new("description");
    start.push_attribute(("descriptionType", description.description_type.as_str()));
    if let Some(language) = &description.language {
      start.push_attribute(("xml:lang", language.as_str()));
    }
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(&description.value)))?;
    writer.write_event(Event::End(BytesEnd::new("description")))?;
  }
  writer.write_event(Event::End(BytesEnd::new("descriptions")))?;
  Ok(())
}

/// Writes the geo locations section when non-empty.
fn write_geo_locations(writer: &mut XmlWriter, resource: &Resource) -> Result<()> {
  if resource.geo_locations.is_empty() {
    return Ok(());
  }
  writer.write_event(Event::Start(BytesStart::new("geoLocations")))?;
  for location in &resource.geo_locations {
    writer.write_event(Event::Start(BytesStart::new("geoLocation")))?;
    if let Some(place) = &location.place {
      text_element(writer, "geoLocationPlace", &[], place)?;
    }
    if let Some(point) = &location.point {
      writer.write_event(Event::Start(BytesStart::new("geoLocationPoint")))?;
      text_element(writer, "pointLatitude", &[], &point.latitude.to_string())?;
      text_element(writer, "pointLongitude", &[], &point.longitude.to_string())?;
      writer.write_event(Event::End(BytesEnd::new("geoLocationPoint")))?;
    }
    if let Some(bounds) = &location.bounding_box {
      writer.write_event(Event::Start(BytesStart::new("geoLocationBox")))?;
      text_element(writer, "westBoundLongitude", &[], &bounds.west_longitude.to_string())?;
      text_element(writer, "eastBoundLongitude", &[], &bounds.east_longitude.to_string())?;
      text_element(writer, "southBoundLatitude", &[], &bounds.south_latitude.to_string())?;
      text_element(writer, "northBoundLatitude", &[], &bounds.north_latitude.to_string())?;
      writer.write_event(Event::End(BytesEnd::new("geoLocationBox")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("geoLocation")))?;
  }
  writer.write_event(Event::End(BytesEnd::new("geoLocations")))?;
  Ok(())
}

/// Writes the funding references section when non-empty.
fn write_funding_references(writer: &mut XmlWriter, resource: &Resource) -> Result<()> {
  if resource.funding_references.is_empty() {
    return Ok(());
  }
  writer.write_event(Event::Start(BytesStart::new("fundingReferences")))?;
  for funding in &resource.funding_references {
    writer.write_event(Event::Start(BytesStart::new("fundingReference")))?;
    text_element(writer, "funderName", &[], &funding.funder_name)?;
    if let Some(identifier) = &funding.funder_identifier {
      let mut attributes = Vec::new();
      if let Some(identifier_type) = &funding.funder_identifier_type {
        attributes.push(("funderIdentifierType", identifier_type.as_str()));
      }
      text_element(writer, "funderIdentifier", &attributes, identifier)?;
    }
    if let Some(number) = &funding.award_number {
      text_element(writer, "awardNumber", &[], number)?;
    }
    if let Some(title) = &funding.award_title {
      text_element(writer, "awardTitle", &[], title)?;
    }
    writer.write_event(Event::End(BytesEnd::new("fundingReference")))?;
  }
  writer.write_event(Event::End(BytesEnd::new("fundingReferences")))?;
  Ok(())
}
