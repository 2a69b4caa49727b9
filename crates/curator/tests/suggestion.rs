//! Catalog-backed DOI suggestion tests.

use anyhow::Result;
use curator::{
  catalog::Catalog,
  doi::{is_valid_doi_format, normalize_doi, suggest_next_doi},
  resource::Resource,
};

fn store_doi(catalog: &mut Catalog, doi: &str) -> Result<i64> {
  let mut resource = Resource::new("dataset", 2026);
  resource.doi = Some(doi.to_string());
  Ok(catalog.save_resource(&resource, "tests")?)
}

#[test]
fn suggestion_skips_dois_already_taken() -> Result<()> {
  let mut catalog = Catalog::open_in_memory()?;
  store_doi(&mut catalog, "10.5880/test.2026.005")?;
  store_doi(&mut catalog, "10.5880/test.2026.006")?;
  store_doi(&mut catalog, "10.5880/test.2026.007")?;

  let next = suggest_next_doi("10.5880/test.2026.005", &catalog)?;
  assert_eq!(next.as_deref(), Some("10.5880/test.2026.008"));
  Ok(())
}

#[test]
fn suggestion_follows_the_last_assigned_doi() -> Result<()> {
  let mut catalog = Catalog::open_in_memory()?;
  store_doi(&mut catalog, "10.5880/gfz.2.1.2024.001")?;
  store_doi(&mut catalog, "10.5880/gfz.2.1.2024.002")?;

  let last = catalog.last_assigned_doi()?.expect("a doi was stored");
  assert_eq!(last, "10.5880/gfz.2.1.2024.002");

  let next = suggest_next_doi(&last, &catalog)?;
  assert_eq!(next.as_deref(), Some("10.5880/gfz.2.1.2024.003"));
  Ok(())
}

#[test]
fn resolver_prefixed_input_suggests_like_bare_input() -> Result<()> {
  let catalog = Catalog::open_in_memory()?;
  let from_url = suggest_next_doi("https://doi.org/10.5880/fidgeo.2026.005", &catalog)?;
  let from_bare = suggest_next_doi("10.5880/fidgeo.2026.005", &catalog)?;
  assert_eq!(from_url, from_bare);
  assert_eq!(from_bare.as_deref(), Some("10.5880/fidgeo.2026.006"));
  Ok(())
}

#[test]
fn format_predicate_rejects_scheme_prefixed_forms() {
  assert!(!is_valid_doi_format("doi:10.5880/test"));
  assert!(is_valid_doi_format("https://doi.org/10.5880/test.001"));
  assert_eq!(normalize_doi("https://dx.doi.org/10.5880/a.b"), "10.5880/a.b");
}

#[test]
fn free_dois_for_a_specific_resource_respect_the_exclusion() -> Result<()> {
  let mut catalog = Catalog::open_in_memory()?;
  let id = store_doi(&mut catalog, "10.5880/test.2026.005")?;

  // The DOI is taken in general, but free for the resource that holds it.
  assert!(catalog.doi_exists("10.5880/test.2026.005", None)?);
  assert!(!catalog.doi_exists("10.5880/test.2026.005", Some(id))?);
  Ok(())
}
