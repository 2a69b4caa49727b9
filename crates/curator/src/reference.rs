//! Reference data backing vocabulary and label lookups.
//!
//! Resource types, selectable languages, the default publisher, and the
//! local ROR label excerpt all live in TOML files under `config/reference/`.
//! The bundled copies ship inside the binary via [`ReferenceData::builtin`];
//! deployments that maintain their own reference data load a directory with
//! [`ReferenceData::from_dir`] instead.
//!
//! Components receive a `&ReferenceData` at construction. There is no global
//! lookup; what a transformer or exporter can resolve is exactly what it was
//! handed.

use crate::{
  identifier::{canonicalise_ror, LabelResolver},
  resource::Publisher,
};

use super::*;

/// Slug of the resource type every unresolvable type degrades to.
pub const FALLBACK_RESOURCE_TYPE: &str = "other";

/// A resource type offered by the curation forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
  /// Lookup slug (kebab-case)
  pub slug:    String,
  /// Display name serialized as the free `resourceType` text
  pub name:    String,
  /// DataCite `resourceTypeGeneral` value
  pub general: String,
}

/// Reference datasets for vocabulary, language, publisher, and label lookups.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
  /// Resource types keyed by slug
  resource_types:    BTreeMap<String, ResourceType>,
  /// Language names keyed by ISO code
  languages:         BTreeMap<String, String>,
  /// Publisher applied when a resource has none
  default_publisher: Option<Publisher>,
  /// ROR labels keyed by canonical identifier
  ror_labels:        BTreeMap<String, String>,
}

/// `resource_types.toml` shape.
#[derive(Debug, Deserialize)]
struct ResourceTypeFile {
  /// The entries
  #[serde(default)]
  resource_type: Vec<ResourceType>,
}

/// `languages.toml` shape.
#[derive(Debug, Deserialize)]
struct LanguageFile {
  /// The entries
  #[serde(default)]
  language: Vec<LanguageEntry>,
}

/// One selectable language.
#[derive(Debug, Deserialize)]
struct LanguageEntry {
  /// ISO code
  code: String,
  /// Display name
  name: String,
}

/// `publisher.toml` shape.
#[derive(Debug, Deserialize)]
struct PublisherFile {
  /// The default publisher
  publisher: Publisher,
}

/// `ror_labels.toml` shape.
#[derive(Debug, Deserialize)]
struct LabelFile {
  /// The entries
  #[serde(default)]
  label: Vec<LabelEntry>,
}

/// One ROR label.
#[derive(Debug, Deserialize)]
struct LabelEntry {
  /// ROR identifier, bare or URL form
  id:   String,
  /// Organization name
  name: String,
}

impl ReferenceData {
  /// Reference data bundled with the crate.
  pub fn builtin() -> Self {
    Self::from_sources(
      Some(include_str!("../config/reference/resource_types.toml")),
      Some(include_str!("../config/reference/languages.toml")),
      Some(include_str!("../config/reference/publisher.toml")),
      Some(include_str!("../config/reference/ror_labels.toml")),
    )
    .expect("bundled reference data is well-formed")
  }

  /// Loads reference data from a directory of TOML files.
  ///
  /// Missing files degrade to empty sections with a warning; this mirrors
  /// how label resolution degrades rather than failing curation outright.
  /// Present-but-malformed files are an error.
  pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref();
    let read = |file: &str| -> Result<Option<String>> {
      let path = dir.join(file);
      if path.is_file() {
        Ok(Some(std::fs::read_to_string(&path)?))
      } else {
        warn!("reference data file {} not found, continuing without it", path.display());
        Ok(None)
      }
    };

    let resource_types = read("resource_types.toml")?;
    let languages = read("languages.toml")?;
    let publisher = read("publisher.toml")?;
    let labels = read("ror_labels.toml")?;
    Self::from_sources(
      resource_types.as_deref(),
      languages.as_deref(),
      publisher.as_deref(),
      labels.as_deref(),
    )
  }

  /// Builds the dataset maps from raw TOML sources.
  fn from_sources(
    resource_types: Option<&str>,
    languages: Option<&str>,
    publisher: Option<&str>,
    labels: Option<&str>,
  ) -> Result<Self> {
    let mut data = ReferenceData::default();

    if let Some(source) = resource_types {
      let file: ResourceTypeFile = toml::from_str(source)?;
      for entry in file.resource_type {
        data.resource_types.insert(entry.slug.clone(), entry);
      }
    }
    // The fallback type must exist for unresolvable lookups to land on.
    data
      .resource_types
      .entry(FALLBACK_RESOURCE_TYPE.to_string())
      .or_insert_with(|| ResourceType {
        slug:    FALLBACK_RESOURCE_TYPE.to_string(),
        name:    "Other".to_string(),
        general: "Other".to_string(),
      });

    if let Some(source) = languages {
      let file: LanguageFile = toml::from_str(source)?;
      for entry in file.language {
        data.languages.insert(entry.code, entry.name);
      }
    }

    if let Some(source) = publisher {
      let file: PublisherFile = toml::from_str(source)?;
      data.default_publisher = Some(file.publisher);
    }

    if let Some(source) = labels {
      let file: LabelFile = toml::from_str(source)?;
      for entry in file.label {
        match canonicalise_ror(&entry.id) {
          Some(canonical) => {
            data.ror_labels.insert(canonical, entry.name);
          },
          None => warn!("skipping label entry with malformed ROR id {:?}", entry.id),
        }
      }
    }

    debug!(
      "loaded reference data: {} resource types, {} languages, {} labels",
      data.resource_types.len(),
      data.languages.len(),
      data.ror_labels.len()
    );
    Ok(data)
  }

  /// Looks up a resource type by slug.
  pub fn resource_type(&self, slug: &str) -> Option<&ResourceType> {
    self.resource_types.get(slug)
  }

  /// The resource type unresolvable lookups degrade to.
  pub fn fallback_resource_type(&self) -> &ResourceType {
    lazy_static! {
      /// Fallback for datasets that never loaded a type list at all.
      static ref OTHER: ResourceType = ResourceType {
        slug:    FALLBACK_RESOURCE_TYPE.to_string(),
        name:    "Other".to_string(),
        general: "Other".to_string(),
      };
    }
    self.resource_types.get(FALLBACK_RESOURCE_TYPE).unwrap_or(&OTHER)
  }

  /// Display name of a selectable language code, `None` for unknown codes.
  pub fn language_name(&self, code: &str) -> Option<&str> {
    self.languages.get(code).map(String::as_str)
  }

  /// The publisher applied when a resource has none, if configured.
  pub fn default_publisher(&self) -> Option<&Publisher> {
    self.default_publisher.as_ref()
  }

  /// A label resolver over the bundled ROR excerpt.
  pub fn label_resolver(&self) -> LabelResolver<'_> {
    LabelResolver::new(&self.ror_labels)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_data_loads_and_contains_the_fallback_type() {
    let data = ReferenceData::builtin();
    assert_eq!(data.resource_type("dataset").unwrap().general, "Dataset");
    assert_eq!(data.fallback_resource_type().general, "Other");
    assert_eq!(data.language_name("en"), Some("English"));
    assert_eq!(data.language_name("tlh"), None);
    assert_eq!(data.default_publisher().unwrap().name, "GFZ Data Services");
  }

  #[test]
  fn empty_sources_still_provide_the_fallback_type() {
    let data = ReferenceData::from_sources(None, None, None, None).unwrap();
    assert_eq!(data.fallback_resource_type().slug, FALLBACK_RESOURCE_TYPE);
    assert!(data.default_publisher().is_none());
  }

  #[test]
  fn labels_are_keyed_canonically() {
    let data = ReferenceData::builtin();
    let resolver = data.label_resolver();
    let resolved = resolver.resolve_with_fallback("HTTPS://ROR.ORG/04Z8JG394", None).unwrap();
    assert!(resolved.label.contains("GFZ"));
  }
}
