//! Controlled vocabularies of the DataCite Metadata Schema 4.6.
//!
//! These lists are the full 4.6 surface, including the values added over the
//! 4.x line: `Instrument`, `StudyRegistration`, `Award`, and `Project` for
//! resource types, `Translator` for contributors, `Collects` and
//! `IsPublishedIn` for relations, `CSTR` and `RRID` for related identifier
//! types, and the `Coverage` date type. The validator checks documents
//! against them; the importer uses them to decide when to fall back to
//! `Other`.

/// `resourceTypeGeneral` values.
pub const RESOURCE_TYPE_GENERAL: &[&str] = &[
  "Audiovisual",
  "Award",
  "Book",
  "BookChapter",
  "Collection",
  "ComputationalNotebook",
  "ConferencePaper",
  "ConferenceProceeding",
  "DataPaper",
  "Dataset",
  "Dissertation",
  "Event",
  "Image",
  "Instrument",
  "InteractiveResource",
  "Journal",
  "JournalArticle",
  "Model",
  "OutputManagementPlan",
  "PeerReview",
  "PhysicalObject",
  "Preprint",
  "Project",
  "Report",
  "Service",
  "Software",
  "Sound",
  "Standard",
  "StudyRegistration",
  "Text",
  "Workflow",
  "Other",
];

/// `contributorType` values.
pub const CONTRIBUTOR_TYPES: &[&str] = &[
  "ContactPerson",
  "DataCollector",
  "DataCurator",
  "DataManager",
  "Distributor",
  "Editor",
  "HostingInstitution",
  "Producer",
  "ProjectLeader",
  "ProjectManager",
  "ProjectMember",
  "RegistrationAgency",
  "RegistrationAuthority",
  "RelatedPerson",
  "Researcher",
  "ResearchGroup",
  "RightsHolder",
  "Sponsor",
  "Supervisor",
  "Translator",
  "WorkPackageLeader",
  "Other",
];

/// `relationType` values.
pub const RELATION_TYPES: &[&str] = &[
  "IsCitedBy",
  "Cites",
  "IsSupplementTo",
  "IsSupplementedBy",
  "IsContinuedBy",
  "Continues",
  "IsDescribedBy",
  "Describes",
  "HasMetadata",
  "IsMetadataFor",
  "HasVersion",
  "IsVersionOf",
  "IsNewVersionOf",
  "IsPreviousVersionOf",
  "IsPartOf",
  "HasPart",
  "IsPublishedIn",
  "IsReferencedBy",
  "References",
  "IsDocumentedBy",
  "Documents",
  "IsCompiledBy",
  "Compiles",
  "IsVariantFormOf",
  "IsOriginalFormOf",
  "IsIdenticalTo",
  "IsReviewedBy",
  "Reviews",
  "IsDerivedFrom",
  "IsSourceOf",
  "IsRequiredBy",
  "Requires",
  "IsObsoletedBy",
  "Obsoletes",
  "Collects",
  "IsCollectedBy",
  "IsTranslationOf",
  "HasTranslation",
];

/// `relatedIdentifierType` values.
pub const RELATED_IDENTIFIER_TYPES: &[&str] = &[
  "ARK",
  "arXiv",
  "bibcode",
  "CSTR",
  "DOI",
  "EAN13",
  "EISSN",
  "Handle",
  "IGSN",
  "ISBN",
  "ISSN",
  "ISTC",
  "LISSN",
  "LSID",
  "PMID",
  "PURL",
  "RRID",
  "UPC",
  "URL",
  "URN",
  "w3id",
];

/// `dateType` values.
pub const DATE_TYPES: &[&str] = &[
  "Accepted",
  "Available",
  "Collected",
  "Copyrighted",
  "Coverage",
  "Created",
  "Issued",
  "Submitted",
  "Updated",
  "Valid",
  "Withdrawn",
  "Other",
];

/// `titleType` values (the untyped main title carries no type).
pub const TITLE_TYPES: &[&str] =
  &["AlternativeTitle", "Subtitle", "TranslatedTitle", "Other"];

/// `nameType` values.
pub const NAME_TYPES: &[&str] = &["Organizational", "Personal"];

/// `descriptionType` values.
pub const DESCRIPTION_TYPES: &[&str] = &[
  "Abstract",
  "Methods",
  "SeriesInformation",
  "TableOfContents",
  "TechnicalInfo",
  "Other",
];

/// `funderIdentifierType` values.
pub const FUNDER_IDENTIFIER_TYPES: &[&str] =
  &["Crossref Funder ID", "GRID", "ISNI", "ROR", "Other"];

/// Converts a PascalCase vocabulary value into the kebab-case slug used for
/// reference data lookups, e.g. `PhysicalObject` into `physical-object`.
pub fn kebab_slug(value: &str) -> String {
  let mut slug = String::with_capacity(value.len() + 4);
  for (i, c) in value.chars().enumerate() {
    if c.is_uppercase() {
      if i > 0 {
        slug.push('-');
      }
      slug.extend(c.to_lowercase());
    } else {
      slug.push(c);
    }
  }
  slug
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slug_conversion_splits_pascal_case() {
    assert_eq!(kebab_slug("Dataset"), "dataset");
    assert_eq!(kebab_slug("PhysicalObject"), "physical-object");
    assert_eq!(kebab_slug("ComputationalNotebook"), "computational-notebook");
    assert_eq!(kebab_slug("Other"), "other");
  }

  #[test]
  fn the_46_additions_are_present() {
    assert!(RESOURCE_TYPE_GENERAL.contains(&"Award"));
    assert!(RESOURCE_TYPE_GENERAL.contains(&"Project"));
    assert!(CONTRIBUTOR_TYPES.contains(&"Translator"));
    assert!(RELATION_TYPES.contains(&"IsPublishedIn"));
    assert!(RELATION_TYPES.contains(&"Collects"));
    assert!(RELATED_IDENTIFIER_TYPES.contains(&"CSTR"));
    assert!(RELATED_IDENTIFIER_TYPES.contains(&"RRID"));
    assert!(DATE_TYPES.contains(&"Coverage"));
  }
}
