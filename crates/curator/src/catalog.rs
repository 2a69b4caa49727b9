//! Sqlite-backed storage collaborator.
//!
//! The catalog holds the reference entities that outlive any single
//! resource (persons, institutions, publishers) and the resources
//! themselves. It exists so that the importer can look entities up before
//! creating them, and so that the DOI suggestion engine can check which
//! identifiers are already taken.
//!
//! Lookup order for identifier-bearing entities is always canonical
//! identifier first, exact name second, creation last; re-running an import
//! with the same canonical identifiers therefore never duplicates rows.

use rusqlite::{params, Connection, OptionalExtension};

use crate::resource::{Publisher, Resource};

use super::*;

/// Storage handle over one sqlite connection.
pub struct Catalog {
  /// The underlying connection
  conn: Connection,
}

/// A stored person row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRecord {
  /// Row id
  pub id:          i64,
  /// Given name
  pub given_name:  Option<String>,
  /// Family name
  pub family_name: String,
  /// Canonical ORCID
  pub orcid:       Option<String>,
}

/// A stored institution row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionRecord {
  /// Row id
  pub id:   i64,
  /// Institution name
  pub name: String,
  /// Canonical ROR
  pub ror:  Option<String>,
}

impl Catalog {
  /// Opens an existing catalog or creates a new one at the specified path.
  ///
  /// Applies the schema migration on every open; the statements are
  /// idempotent.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    if let Some(parent) = path.as_ref().parent() {
      std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path.as_ref())?;
    conn.execute_batch(include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/migrations/init.sql")))?;
    Ok(Self { conn })
  }

  /// Opens a private in-memory catalog, used by tests.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/migrations/init.sql")))?;
    Ok(Self { conn })
  }

  /// Returns the default path for the catalog file.
  ///
  /// The path is constructed as follows:
  /// - On Unix: `~/.local/share/curator/curator.db`
  /// - On macOS: `~/Library/Application Support/curator/curator.db`
  /// - On Windows: `%APPDATA%\curator\curator.db`
  /// - Fallback: `./curator.db` in the current directory
  pub fn default_path() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("curator").join("curator.db")
  }

  /// Runs `f` inside one transaction, committing on success and rolling
  /// back on error.
  ///
  /// The importer wraps each document in this so a failure partway through
  /// cannot leave half a graph behind.
  pub fn within_transaction<T>(
    &mut self,
    f: impl FnOnce(&mut Catalog) -> Result<T>,
  ) -> Result<T> {
    self.conn.execute_batch("BEGIN IMMEDIATE")?;
    match f(self) {
      Ok(value) => {
        self.conn.execute_batch("COMMIT")?;
        Ok(value)
      },
      Err(err) => {
        let _ = self.conn.execute_batch("ROLLBACK");
        Err(err)
      },
    }
  }

  // --- persons -----------------------------------------------------------

  /// Finds a person by canonical ORCID.
  pub fn find_person_by_orcid(&self, orcid: &str) -> Result<Option<PersonRecord>> {
    let mut stmt = self.conn.prepare_cached(
      "SELECT id, given_name, family_name, orcid FROM persons WHERE orcid = ?1",
    )?;
    let record = stmt
      .query_row(params![orcid], |row| {
        Ok(PersonRecord {
          id:          row.get(0)?,
          given_name:  row.get(1)?,
          family_name: row.get(2)?,
          orcid:       row.get(3)?,
        })
      })
      .optional()?;
    Ok(record)
  }

  /// Finds a person by exact family and given name.
  pub fn find_person_by_name(
    &self,
    family_name: &str,
    given_name: Option<&str>,
  ) -> Result<Option<PersonRecord>> {
    let mut stmt = self.conn.prepare_cached(
      "SELECT id, given_name, family_name, orcid FROM persons
         WHERE family_name = ?1 AND given_name IS ?2",
    )?;
    let record = stmt
      .query_row(params![family_name, given_name], |row| {
        Ok(PersonRecord {
          id:          row.get(0)?,
          given_name:  row.get(1)?,
          family_name: row.get(2)?,
          orcid:       row.get(3)?,
        })
      })
      .optional()?;
    Ok(record)
  }

  /// Inserts a person row.
  pub fn insert_person(
    &mut self,
    given_name: Option<&str>,
    family_name: &str,
    orcid: Option<&str>,
  ) -> Result<i64> {
    let mut stmt = self.conn.prepare_cached(
      "INSERT INTO persons (given_name, family_name, orcid) VALUES (?1, ?2, ?3) RETURNING id",
    )?;
    let id = stmt.query_row(params![given_name, family_name, orcid], |row| row.get(0))?;
    Ok(id)
  }

  /// Looks a person up by canonical ORCID, then by exact name, creating the
  /// row only when both lookups miss.
  ///
  /// A name match without a stored ORCID adopts the incoming identifier, so
  /// later imports can match on it directly.
  pub fn ensure_person(
    &mut self,
    given_name: Option<&str>,
    family_name: &str,
    orcid: Option<&str>,
  ) -> Result<i64> {
    if let Some(orcid) = orcid {
      if let Some(existing) = self.find_person_by_orcid(orcid)? {
        trace!("reusing person {} for {orcid}", existing.id);
        return Ok(existing.id);
      }
    }
    if let Some(existing) = self.find_person_by_name(family_name, given_name)? {
      if existing.orcid.is_none() {
        if let Some(orcid) = orcid {
          debug!("attaching {orcid} to person {}", existing.id);
          self
            .conn
            .prepare_cached("UPDATE persons SET orcid = ?1 WHERE id = ?2")?
            .execute(params![orcid, existing.id])?;
        }
      }
      return Ok(existing.id);
    }
    self.insert_person(given_name, family_name, orcid)
  }

  /// Number of stored persons.
  pub fn person_count(&self) -> Result<i64> {
    let count = self.conn.query_row("SELECT COUNT(*) FROM persons", [], |row| row.get(0))?;
    Ok(count)
  }

  // --- institutions ------------------------------------------------------

  /// Finds an institution by canonical ROR.
  pub fn find_institution_by_ror(&self, ror: &str) -> Result<Option<InstitutionRecord>> {
    let mut stmt = self
      .conn
      .prepare_cached("SELECT id, name, ror FROM institutions WHERE ror = ?1")?;
    let record = stmt
      .query_row(params![ror], |row| {
        Ok(InstitutionRecord { id: row.get(0)?, name: row.get(1)?, ror: row.get(2)? })
      })
      .optional()?;
    Ok(record)
  }

  /// Finds an institution by exact name.
  pub fn find_institution_by_name(&self, name: &str) -> Result<Option<InstitutionRecord>> {
    let mut stmt = self
      .conn
      .prepare_cached("SELECT id, name, ror FROM institutions WHERE name = ?1")?;
    let record = stmt
      .query_row(params![name], |row| {
        Ok(InstitutionRecord { id: row.get(0)?, name: row.get(1)?, ror: row.get(2)? })
      })
      .optional()?;
    Ok(record)
  }

  /// Looks an institution up by canonical ROR, then by exact name, creating
  /// the row only when both lookups miss.
  pub fn ensure_institution(&mut self, name: &str, ror: Option<&str>) -> Result<i64> {
    if let Some(ror) = ror {
      if let Some(existing) = self.find_institution_by_ror(ror)? {
        return Ok(existing.id);
      }
    }
    if let Some(existing) = self.find_institution_by_name(name)? {
      return Ok(existing.id);
    }
    let mut stmt = self
      .conn
      .prepare_cached("INSERT INTO institutions (name, ror) VALUES (?1, ?2) RETURNING id")?;
    let id = stmt.query_row(params![name, ror], |row| row.get(0))?;
    Ok(id)
  }

  /// Number of stored institutions.
  pub fn institution_count(&self) -> Result<i64> {
    let count =
      self.conn.query_row("SELECT COUNT(*) FROM institutions", [], |row| row.get(0))?;
    Ok(count)
  }

  // --- publishers --------------------------------------------------------

  /// Finds a publisher id by exact name.
  pub fn find_publisher_by_name(&self, name: &str) -> Result<Option<i64>> {
    let mut stmt = self.conn.prepare_cached("SELECT id FROM publishers WHERE name = ?1")?;
    let id = stmt.query_row(params![name], |row| row.get(0)).optional()?;
    Ok(id)
  }

  /// Reuses a publisher by exact name or creates it.
  pub fn ensure_publisher(&mut self, publisher: &Publisher) -> Result<i64> {
    if let Some(id) = self.find_publisher_by_name(&publisher.name)? {
      return Ok(id);
    }
    let mut stmt = self.conn.prepare_cached(
      "INSERT INTO publishers (name, identifier, identifier_scheme, scheme_uri, language)
         VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
    )?;
    let id = stmt.query_row(
      params![
        publisher.name,
        publisher.identifier,
        publisher.identifier_scheme,
        publisher.scheme_uri,
        publisher.language,
      ],
      |row| row.get(0),
    )?;
    Ok(id)
  }

  /// Number of stored publishers.
  pub fn publisher_count(&self) -> Result<i64> {
    let count = self.conn.query_row("SELECT COUNT(*) FROM publishers", [], |row| row.get(0))?;
    Ok(count)
  }

  // --- resources ---------------------------------------------------------

  /// Persists a resource, serializing its metadata as JSON.
  pub fn save_resource(&mut self, resource: &Resource, created_by: &str) -> Result<i64> {
    let metadata = serde_json::to_string(resource)
      .map_err(|e| CuratorError::Transform(format!("unserializable resource: {e}")))?;
    let mut stmt = self.conn.prepare_cached(
      "INSERT INTO resources (doi, metadata, created_by) VALUES (?1, ?2, ?3) RETURNING id",
    )?;
    let id = stmt.query_row(params![resource.doi, metadata, created_by], |row| row.get(0))?;
    debug!("stored resource {id} (doi: {:?})", resource.doi);
    Ok(id)
  }

  /// Whether a DOI is already assigned to a stored resource.
  ///
  /// `exclude` skips one resource id, supporting "is this DOI free for this
  /// resource" checks during edits. Comparison is case-insensitive, as DOIs
  /// are.
  pub fn doi_exists(&self, doi: &str, exclude: Option<i64>) -> Result<bool> {
    let mut stmt = self.conn.prepare_cached(
      "SELECT COUNT(*) FROM resources
         WHERE doi IS NOT NULL AND LOWER(doi) = LOWER(?1) AND (?2 IS NULL OR id != ?2)",
    )?;
    let count: i64 = stmt.query_row(params![doi, exclude], |row| row.get(0))?;
    Ok(count > 0)
  }

  /// The most recently stored DOI, if any resource carries one.
  pub fn last_assigned_doi(&self) -> Result<Option<String>> {
    let mut stmt = self.conn.prepare_cached(
      "SELECT doi FROM resources WHERE doi IS NOT NULL ORDER BY id DESC LIMIT 1",
    )?;
    let doi = stmt.query_row([], |row| row.get(0)).optional()?;
    Ok(doi)
  }

  /// Loads a stored resource by DOI, returning its row id and metadata.
  pub fn resource_by_doi(&self, doi: &str) -> Result<Option<(i64, Resource)>> {
    let mut stmt = self.conn.prepare_cached(
      "SELECT id, metadata FROM resources
         WHERE doi IS NOT NULL AND LOWER(doi) = LOWER(?1)
         ORDER BY id LIMIT 1",
    )?;
    let row: Option<(i64, String)> = stmt
      .query_row(params![doi], |row| Ok((row.get(0)?, row.get(1)?)))
      .optional()?;
    match row {
      Some((id, metadata)) => {
        let resource = serde_json::from_str(&metadata)
          .map_err(|e| CuratorError::Transform(format!("corrupt stored resource {id}: {e}")))?;
        Ok(Some((id, resource)))
      },
      None => Ok(None),
    }
  }
}

#[cfg(test)]
mod tests {
  use tempfile::tempdir;

  use super::*;

  #[test]
  fn on_disk_catalogs_persist_across_reopens() {
    let dir = tempdir().unwrap();
    // Nested path: open creates missing parent directories.
    let path = dir.path().join("data").join("curator.db");

    {
      let mut catalog = Catalog::open(&path).unwrap();
      catalog.ensure_person(Some("Alice"), "Researcher", None).unwrap();
      let mut resource = crate::resource::Resource::new("dataset", 2026);
      resource.doi = Some("10.5880/test.2026.001".into());
      catalog.save_resource(&resource, "tests").unwrap();
    }

    let catalog = Catalog::open(&path).unwrap();
    assert_eq!(catalog.person_count().unwrap(), 1);
    assert!(catalog.doi_exists("10.5880/test.2026.001", None).unwrap());
    assert!(path.is_file());
  }

  #[test]
  fn reopening_reapplies_migrations_without_clobbering_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("curator.db");

    for _ in 0..2 {
      let mut catalog = Catalog::open(&path).unwrap();
      catalog.ensure_institution("GFZ Potsdam", Some("https://ror.org/04z8jg394")).unwrap();
    }

    let catalog = Catalog::open(&path).unwrap();
    assert_eq!(catalog.institution_count().unwrap(), 1);
  }

  #[test]
  fn default_path_lands_in_the_data_directory() {
    let path = Catalog::default_path();
    assert!(path.ends_with(Path::new("curator").join("curator.db")));
  }

  #[test]
  fn ensure_person_reuses_by_orcid_then_name() {
    let mut catalog = Catalog::open_in_memory().unwrap();
    let orcid = "https://orcid.org/0000-0002-1825-0097";

    let first = catalog.ensure_person(Some("Alice"), "Researcher", Some(orcid)).unwrap();
    let by_orcid = catalog.ensure_person(Some("A."), "Someone-Else", Some(orcid)).unwrap();
    assert_eq!(first, by_orcid);

    let by_name = catalog.ensure_person(Some("Alice"), "Researcher", None).unwrap();
    assert_eq!(first, by_name);

    let other = catalog.ensure_person(Some("Bob"), "Researcher", None).unwrap();
    assert_ne!(first, other);
    assert_eq!(catalog.person_count().unwrap(), 2);
  }

  #[test]
  fn name_match_adopts_an_incoming_orcid() {
    let mut catalog = Catalog::open_in_memory().unwrap();
    let id = catalog.ensure_person(Some("Alice"), "Researcher", None).unwrap();
    let orcid = "https://orcid.org/0000-0002-1825-0097";
    let again = catalog.ensure_person(Some("Alice"), "Researcher", Some(orcid)).unwrap();
    assert_eq!(id, again);
    let stored = catalog.find_person_by_orcid(orcid).unwrap().unwrap();
    assert_eq!(stored.id, id);
  }

  #[test]
  fn doi_existence_is_case_insensitive_and_supports_exclusion() {
    let mut catalog = Catalog::open_in_memory().unwrap();
    let mut resource = crate::resource::Resource::new("dataset", 2024);
    resource.doi = Some("10.5880/Test.2024.001".into());
    let id = catalog.save_resource(&resource, "tests").unwrap();

    assert!(catalog.doi_exists("10.5880/test.2024.001", None).unwrap());
    assert!(!catalog.doi_exists("10.5880/test.2024.001", Some(id)).unwrap());
    assert!(!catalog.doi_exists("10.5880/test.2024.002", None).unwrap());
  }

  #[test]
  fn transactions_roll_back_on_error() {
    let mut catalog = Catalog::open_in_memory().unwrap();
    let result: Result<()> = catalog.within_transaction(|catalog| {
      catalog.ensure_person(None, "Doomed", None)?;
      Err(CuratorError::Transform("abort".into()))
    });
    assert!(result.is_err());
    assert_eq!(catalog.person_count().unwrap(), 0);
  }
}
