//! Validation of DataCite JSON documents against the 4.6 schema rules.
//!
//! The registry rejects non-conforming documents wholesale, so the
//! validator collects every violation in one pass instead of failing on the
//! first. A [`ValidationFailure`] carries the fixed schema version tag and
//! the full ordered violation list; serialized, it is exactly the error
//! shape our API returns to clients.
//!
//! Strict mode additionally requires an `identifiers` array, which is what
//! separates a draft export from a registry-submission candidate.

use thiserror::Error;

use crate::export::KERNEL_NAMESPACE;

use super::*;

/// The schema version this validator enforces.
pub const SCHEMA_VERSION: &str = "4.6";

/// One schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
  /// JSON-pointer-style path of the offending value
  pub path:    String,
  /// Human-readable description of the problem
  pub message: String,
  /// Schema keyword that failed (required, type, enum, format, ...)
  pub keyword: String,
  /// The offending value or the expectation it missed
  pub context: String,
}

/// A document failed schema validation.
///
/// Serializes as `{ message, schema_version, errors }`, the response shape
/// API clients render.
#[derive(Error, Debug, Clone, Serialize)]
#[error("{message}")]
pub struct ValidationFailure {
  /// Summary line
  pub message:        String,
  /// Always [`SCHEMA_VERSION`]
  pub schema_version: &'static str,
  /// Every violation found, in document order
  #[serde(rename = "errors")]
  pub violations:     Vec<Violation>,
}

impl ValidationFailure {
  /// Wraps collected violations in the client-facing failure shape.
  fn new(violations: Vec<Violation>) -> Self {
    Self {
      message: format!(
        "Document does not conform to DataCite Metadata Schema {SCHEMA_VERSION} ({} violation{})",
        violations.len(),
        if violations.len() == 1 { "" } else { "s" }
      ),
      schema_version: SCHEMA_VERSION,
      violations,
    }
  }
}

/// Validates a DataCite document, collecting every violation in one pass.
///
/// Accepts either the bare attributes object or the full
/// `{"data": {"attributes": ...}}` envelope. With `strict` set, an
/// `identifiers` array is mandatory (registry-submission readiness); without
/// it, the document may omit identifiers (draft/export-only use).
pub fn validate(document: &Value, strict: bool) -> core::result::Result<(), ValidationFailure> {
  let mut violations = Vec::new();
  if is_valid(document, &mut violations, strict) {
    Ok(())
  } else {
    debug!("document failed validation with {} violation(s)", violations.len());
    Err(ValidationFailure::new(violations))
  }
}

/// Non-throwing variant of [`validate`], appending violations to `errors`.
pub fn is_valid(document: &Value, errors: &mut Vec<Violation>, strict: bool) -> bool {
  let attributes = document.pointer("/data/attributes").unwrap_or(document);

  let mut checker = Checker::default();
  match attributes.as_object() {
    Some(_) => {
      checker.check_creators(attributes);
      checker.check_titles(attributes);
      checker.check_publisher(attributes);
      checker.check_publication_year(attributes);
      checker.check_types(attributes);
      checker.check_schema_version(attributes);
      checker.check_contributors(attributes);
      checker.check_dates(attributes);
      checker.check_subjects(attributes);
      checker.check_descriptions(attributes);
      checker.check_related_identifiers(attributes);
      checker.check_funding_references(attributes);
      checker.check_language(attributes);
      if strict {
        checker.check_identifiers(attributes);
      }
    },
    None => checker.violation("", "type", "document is not a JSON object", attributes),
  }

  let ok = checker.violations.is_empty();
  errors.extend(checker.violations);
  ok
}

/// Accumulates violations across all checks.
#[derive(Default)]
struct Checker {
  /// Violations in document order
  violations: Vec<Violation>,
}

impl Checker {
  /// Records one violation.
  fn violation(&mut self, path: &str, keyword: &str, message: &str, context: &Value) {
    let context = match context {
      Value::Null => String::from("null"),
      Value::String(text) => text.clone(),
      other => other.to_string(),
    };
    self.violations.push(Violation {
      path: format!("/{path}").trim_end_matches('/').to_string(),
      message: message.to_string(),
      keyword: keyword.to_string(),
      context,
    });
  }

  /// Records a missing required field.
  fn missing(&mut self, field: &str) {
    self.violation(field, "required", &format!("{field} is required"), &Value::Null);
  }

  /// The named field as a non-empty array, recording violations otherwise.
  ///
  /// `required` distinguishes mandatory sections from optional ones that
  /// only need checking when present.
  fn array_field<'v>(
    &mut self,
    attributes: &'v Value,
    field: &str,
    required: bool,
  ) -> Option<&'v Vec<Value>> {
    match attributes.get(field) {
      None | Some(Value::Null) => {
        if required {
          self.missing(field);
        }
        None
      },
      Some(Value::Array(entries)) => {
        if entries.is_empty() && required {
          self.violation(field, "minItems", &format!("{field} must not be empty"), &Value::Null);
          None
        } else {
          Some(entries)
        }
      },
      Some(other) => {
        self.violation(field, "type", &format!("{field} must be an array"), other);
        None
      },
    }
  }

  /// Checks a value against a controlled vocabulary.
  fn check_vocabulary(&mut self, path: &str, keyword_field: &str, value: &str, allowed: &[&str]) {
    if !allowed.contains(&value) {
      self.violation(
        path,
        "enum",
        &format!("{keyword_field} {value:?} is not a known value"),
        &Value::String(value.to_string()),
      );
    }
  }

  /// `creators` is required, non-empty, and every entry needs a name.
  fn check_creators(&mut self, attributes: &Value) {
    if let Some(entries) = self.array_field(attributes, "creators", true) {
      for (index, entry) in entries.iter().enumerate() {
        self.check_name_entry(entry, &format!("creators/{index}"));
      }
    }
  }

  /// `contributors` is optional, but entries need a valid contributorType.
  fn check_contributors(&mut self, attributes: &Value) {
    if let Some(entries) = self.array_field(attributes, "contributors", false) {
      for (index, entry) in entries.iter().enumerate() {
        let path = format!("contributors/{index}");
        self.check_name_entry(entry, &path);
        match entry.get("contributorType").and_then(Value::as_str) {
          Some(contributor_type) => self.check_vocabulary(
            &format!("{path}/contributorType"),
            "contributorType",
            contributor_type,
            vocab::CONTRIBUTOR_TYPES,
          ),
          None => self.violation(
            &format!("{path}/contributorType"),
            "required",
            "contributorType is required",
            entry,
          ),
        }
      }
    }
  }

  /// Shared name checks for creators and contributors.
  fn check_name_entry(&mut self, entry: &Value, path: &str) {
    let Some(record) = entry.as_object() else {
      self.violation(path, "type", "entry must be an object", entry);
      return;
    };
    let has_name = record
      .get("name")
      .or_else(|| record.get("familyName"))
      .and_then(Value::as_str)
      .is_some_and(|name| !name.trim().is_empty());
    if !has_name {
      self.violation(&format!("{path}/name"), "required", "a non-empty name is required", entry);
    }
    if let Some(name_type) = record.get("nameType").and_then(Value::as_str) {
      self.check_vocabulary(&format!("{path}/nameType"), "nameType", name_type, vocab::NAME_TYPES);
    }
  }

  /// `titles` is required, non-empty, and every entry needs title text.
  fn check_titles(&mut self, attributes: &Value) {
    if let Some(entries) = self.array_field(attributes, "titles", true) {
      for (index, entry) in entries.iter().enumerate() {
        let path = format!("titles/{index}");
        let has_text = entry
          .get("title")
          .and_then(Value::as_str)
          .is_some_and(|title| !title.trim().is_empty());
        if !has_text {
          self.violation(&format!("{path}/title"), "required", "title text is required", entry);
        }
        if let Some(title_type) = entry.get("titleType").and_then(Value::as_str) {
          self.check_vocabulary(
            &format!("{path}/titleType"),
            "titleType",
            title_type,
            vocab::TITLE_TYPES,
          );
        }
      }
    }
  }

  /// `publisher` accepts a non-empty string or an object with a name.
  fn check_publisher(&mut self, attributes: &Value) {
    match attributes.get("publisher") {
      None | Some(Value::Null) => self.missing("publisher"),
      Some(Value::String(name)) if !name.trim().is_empty() => (),
      Some(Value::Object(fields)) => {
        let has_name = fields
          .get("name")
          .and_then(Value::as_str)
          .is_some_and(|name| !name.trim().is_empty());
        if !has_name {
          self.violation(
            "publisher/name",
            "required",
            "publisher object needs a non-empty name",
            attributes.get("publisher").unwrap_or(&Value::Null),
          );
        }
      },
      Some(other) => self.violation(
        "publisher",
        "type",
        "publisher must be a non-empty string or an object",
        other,
      ),
    }
  }

  /// `publicationYear` is a four-digit year, as a number or string.
  fn check_publication_year(&mut self, attributes: &Value) {
    match attributes.get("publicationYear") {
      None | Some(Value::Null) => self.missing("publicationYear"),
      Some(Value::Number(number)) => {
        if !number.as_i64().is_some_and(|year| (1000..=9999).contains(&year)) {
          self.violation(
            "publicationYear",
            "format",
            "publicationYear must be a four-digit year",
            attributes.get("publicationYear").unwrap_or(&Value::Null),
          );
        }
      },
      Some(Value::String(text)) => {
        let valid = text.trim().len() == 4 && text.trim().parse::<i32>().is_ok();
        if !valid {
          self.violation(
            "publicationYear",
            "format",
            "publicationYear must be a four-digit year",
            attributes.get("publicationYear").unwrap_or(&Value::Null),
          );
        }
      },
      Some(other) =>
        self.violation("publicationYear", "type", "publicationYear must be a year", other),
    }
  }

  /// `types.resourceTypeGeneral` is required and vocabulary-bound.
  fn check_types(&mut self, attributes: &Value) {
    match attributes.get("types") {
      None | Some(Value::Null) => self.missing("types"),
      Some(Value::Object(fields)) => match fields.get("resourceTypeGeneral").and_then(Value::as_str)
      {
        Some(general) => self.check_vocabulary(
          "types/resourceTypeGeneral",
          "resourceTypeGeneral",
          general,
          vocab::RESOURCE_TYPE_GENERAL,
        ),
        None => self.violation(
          "types/resourceTypeGeneral",
          "required",
          "resourceTypeGeneral is required",
          attributes.get("types").unwrap_or(&Value::Null),
        ),
      },
      Some(other) => self.violation("types", "type", "types must be an object", other),
    }
  }

  /// `schemaVersion` is pinned to the kernel-4 namespace.
  fn check_schema_version(&mut self, attributes: &Value) {
    match attributes.get("schemaVersion").and_then(Value::as_str) {
      None => self.missing("schemaVersion"),
      Some(version) if version == KERNEL_NAMESPACE => (),
      Some(version) => self.violation(
        "schemaVersion",
        "const",
        &format!("schemaVersion must be {KERNEL_NAMESPACE:?}"),
        &Value::String(version.to_string()),
      ),
    }
  }

  /// `dates` entries need a value and a vocabulary-bound dateType.
  fn check_dates(&mut self, attributes: &Value) {
    if let Some(entries) = self.array_field(attributes, "dates", false) {
      for (index, entry) in entries.iter().enumerate() {
        let path = format!("dates/{index}");
        let has_date =
          entry.get("date").and_then(Value::as_str).is_some_and(|date| !date.trim().is_empty());
        if !has_date {
          self.violation(&format!("{path}/date"), "required", "date value is required", entry);
        }
        match entry.get("dateType").and_then(Value::as_str) {
          Some(date_type) => self.check_vocabulary(
            &format!("{path}/dateType"),
            "dateType",
            date_type,
            vocab::DATE_TYPES,
          ),
          None => self.violation(
            &format!("{path}/dateType"),
            "required",
            "dateType is required",
            entry,
          ),
        }
      }
    }
  }

  /// `subjects` entries need subject text; classificationCode is welcome.
  fn check_subjects(&mut self, attributes: &Value) {
    if let Some(entries) = self.array_field(attributes, "subjects", false) {
      for (index, entry) in entries.iter().enumerate() {
        let has_text = entry
          .get("subject")
          .and_then(Value::as_str)
          .is_some_and(|subject| !subject.trim().is_empty());
        if !has_text {
          self.violation(
            &format!("subjects/{index}/subject"),
            "required",
            "subject text is required",
            entry,
          );
        }
      }
    }
  }

  /// `descriptions` entries need a vocabulary-bound descriptionType.
  fn check_descriptions(&mut self, attributes: &Value) {
    if let Some(entries) = self.array_field(attributes, "descriptions", false) {
      for (index, entry) in entries.iter().enumerate() {
        if let Some(description_type) = entry.get("descriptionType").and_then(Value::as_str) {
          self.check_vocabulary(
            &format!("descriptions/{index}/descriptionType"),
            "descriptionType",
            description_type,
            vocab::DESCRIPTION_TYPES,
          );
        }
      }
    }
  }

  /// `relatedIdentifiers` entries need both type fields from vocabulary.
  fn check_related_identifiers(&mut self, attributes: &Value) {
    if let Some(entries) = self.array_field(attributes, "relatedIdentifiers", false) {
      for (index, entry) in entries.iter().enumerate() {
        let path = format!("relatedIdentifiers/{index}");
        match entry.get("relationType").and_then(Value::as_str) {
          Some(relation) => self.check_vocabulary(
            &format!("{path}/relationType"),
            "relationType",
            relation,
            vocab::RELATION_TYPES,
          ),
          None => self.violation(
            &format!("{path}/relationType"),
            "required",
            "relationType is required",
            entry,
          ),
        }
        match entry.get("relatedIdentifierType").and_then(Value::as_str) {
          Some(identifier_type) => self.check_vocabulary(
            &format!("{path}/relatedIdentifierType"),
            "relatedIdentifierType",
            identifier_type,
            vocab::RELATED_IDENTIFIER_TYPES,
          ),
          None => self.violation(
            &format!("{path}/relatedIdentifierType"),
            "required",
            "relatedIdentifierType is required",
            entry,
          ),
        }
      }
    }
  }

  /// `fundingReferences` entries need a funder name.
  fn check_funding_references(&mut self, attributes: &Value) {
    if let Some(entries) = self.array_field(attributes, "fundingReferences", false) {
      for (index, entry) in entries.iter().enumerate() {
        let has_name = entry
          .get("funderName")
          .and_then(Value::as_str)
          .is_some_and(|name| !name.trim().is_empty());
        if !has_name {
          self.violation(
            &format!("fundingReferences/{index}/funderName"),
            "required",
            "funderName is required",
            entry,
          );
        }
      }
    }
  }

  /// `language`, when present, must be a string.
  fn check_language(&mut self, attributes: &Value) {
    if let Some(language) = attributes.get("language") {
      if !language.is_string() && !language.is_null() {
        self.violation("language", "type", "language must be a string code", language);
      }
    }
  }

  /// Strict mode: `identifiers` must be a non-empty array of
  /// identifier/identifierType pairs.
  fn check_identifiers(&mut self, attributes: &Value) {
    if let Some(entries) = self.array_field(attributes, "identifiers", true) {
      for (index, entry) in entries.iter().enumerate() {
        let path = format!("identifiers/{index}");
        let has_identifier = entry
          .get("identifier")
          .and_then(Value::as_str)
          .is_some_and(|identifier| !identifier.trim().is_empty());
        if !has_identifier {
          self.violation(
            &format!("{path}/identifier"),
            "required",
            "identifier is required",
            entry,
          );
        }
        if entry.get("identifierType").and_then(Value::as_str).is_none() {
          self.violation(
            &format!("{path}/identifierType"),
            "required",
            "identifierType is required",
            entry,
          );
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn minimal_document() -> Value {
    json!({
      "creators": [{ "name": "Researcher, Alice", "nameType": "Personal" }],
      "titles": [{ "title": "A dataset" }],
      "publisher": "GFZ Data Services",
      "publicationYear": 2024,
      "types": { "resourceType": "Dataset", "resourceTypeGeneral": "Dataset" },
      "schemaVersion": "http://datacite.org/schema/kernel-4",
    })
  }

  #[test]
  fn minimal_document_is_valid_without_strict_mode() {
    assert!(validate(&minimal_document(), false).is_ok());
  }

  #[test]
  fn every_missing_required_field_is_reported_at_once() {
    let failure = validate(&json!({}), false).unwrap_err();
    assert_eq!(failure.schema_version, "4.6");
    for field in
      ["creators", "titles", "publisher", "publicationYear", "types", "schemaVersion"]
    {
      assert!(
        failure.violations.iter().any(|violation| violation.path == format!("/{field}")),
        "expected a violation for {field}"
      );
    }
  }

  #[test]
  fn strict_mode_requires_identifiers() {
    let document = minimal_document();
    assert!(validate(&document, false).is_ok());

    let failure = validate(&document, true).unwrap_err();
    assert!(failure.violations.iter().any(|violation| violation.path == "/identifiers"));

    let mut with_identifiers = document;
    with_identifiers["identifiers"] =
      json!([{ "identifier": "10.5880/test.2024.001", "identifierType": "DOI" }]);
    assert!(validate(&with_identifiers, true).is_ok());
  }

  #[test]
  fn the_full_46_vocabulary_surface_is_accepted() {
    let mut document = minimal_document();
    document["publisher"] = json!({
      "name": "GFZ Data Services",
      "publisherIdentifierScheme": "re3data",
    });
    document["contributors"] =
      json!([{ "name": "Translator, Tom", "contributorType": "Translator" }]);
    document["relatedIdentifiers"] = json!([
      {
        "relatedIdentifier": "10.5880/other",
        "relationType": "IsPublishedIn",
        "relatedIdentifierType": "CSTR",
      },
      {
        "relatedIdentifier": "RRID:AB_90755",
        "relationType": "Collects",
        "relatedIdentifierType": "RRID",
      },
    ]);
    document["dates"] = json!([{ "date": "2020-01-01/2020-06-30", "dateType": "Coverage" }]);
    document["subjects"] =
      json!([{ "subject": "seismology", "classificationCode": "550" }]);
    assert!(validate(&document, false).is_ok());
  }

  #[test]
  fn vocabulary_violations_carry_the_enum_keyword() {
    let mut document = minimal_document();
    document["types"] = json!({ "resourceTypeGeneral": "Daataset" });
    document["contributors"] =
      json!([{ "name": "Helper, Hana", "contributorType": "BestFriend" }]);
    let failure = validate(&document, false).unwrap_err();
    let keywords: Vec<_> =
      failure.violations.iter().map(|violation| violation.keyword.as_str()).collect();
    assert!(keywords.contains(&"enum"));
    assert_eq!(
      failure.violations.iter().filter(|violation| violation.keyword == "enum").count(),
      2
    );
  }

  #[test]
  fn empty_title_text_is_a_violation() {
    let mut document = minimal_document();
    document["titles"] = json!([{ "title": "   " }]);
    let failure = validate(&document, false).unwrap_err();
    assert!(failure.violations.iter().any(|violation| violation.path == "/titles/0/title"));
  }

  #[test]
  fn wrong_schema_version_is_a_const_violation() {
    let mut document = minimal_document();
    document["schemaVersion"] = json!("http://datacite.org/schema/kernel-3");
    let failure = validate(&document, false).unwrap_err();
    assert_eq!(failure.violations[0].keyword, "const");
  }

  #[test]
  fn envelope_and_bare_attributes_validate_identically() {
    let bare = minimal_document();
    let envelope = json!({ "data": { "type": "dois", "attributes": bare } });
    assert!(validate(&envelope, false).is_ok());
  }

  #[test]
  fn is_valid_populates_the_error_list() {
    let mut errors = Vec::new();
    assert!(!is_valid(&json!({}), &mut errors, false));
    assert!(!errors.is_empty());
  }

  #[test]
  fn failure_serializes_with_the_client_shape() {
    let failure = validate(&json!({}), false).unwrap_err();
    let serialized = serde_json::to_value(&failure).unwrap();
    assert_eq!(serialized["schema_version"], "4.6");
    assert!(serialized["errors"].as_array().is_some());
    assert!(serialized["message"].as_str().is_some());
  }
}
