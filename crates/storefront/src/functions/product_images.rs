//! Batch product image sync.
//!
//! Applies a name -> image list mapping to the catalog. Products are matched
//! by exact name; when several share a name only the oldest is updated.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::db::ProductRepository;

const BUILTIN_MAPPING: &str = include_str!("../../product_images.yaml");

/// One entry of the image mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ImageMapping {
    pub name: String,
    pub images: Vec<String>,
}

/// Errors loading the image mapping.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read image map {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid image map: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("image map entry {0} has an empty product name")]
    EmptyName(usize),
}

/// Parse a YAML image mapping.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or an entry has no name.
pub fn parse_mapping(yaml: &str) -> Result<Vec<ImageMapping>, MappingError> {
    let entries: Vec<ImageMapping> = serde_yaml::from_str(yaml)?;
    if let Some(index) = entries.iter().position(|e| e.name.trim().is_empty()) {
        return Err(MappingError::EmptyName(index));
    }
    Ok(entries)
}

/// The mapping compiled into the binary.
///
/// # Errors
///
/// Returns an error if the embedded file is malformed.
pub fn builtin_mapping() -> Result<Vec<ImageMapping>, MappingError> {
    parse_mapping(BUILTIN_MAPPING)
}

/// Load the mapping from `path`, or the built-in one when `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub async fn load_mapping(path: Option<&Path>) -> Result<Vec<ImageMapping>, MappingError> {
    let Some(path) = path else {
        return builtin_mapping();
    };

    let yaml = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| MappingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    parse_mapping(&yaml)
}

/// Result of a sync run. `updated + skipped + errors.len()` always equals the
/// number of mapping entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl SyncReport {
    /// Entries processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.updated + self.skipped + self.errors.len()
    }

    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Updated {} products, skipped {}, {} errors",
            self.updated,
            self.skipped,
            self.errors.len()
        )
    }
}

enum EntryOutcome {
    Updated,
    Skipped,
}

/// Applies image mappings to the product catalog.
#[derive(Clone)]
pub struct ProductImageSync {
    products: Arc<dyn ProductRepository>,
}

impl ProductImageSync {
    #[must_use]
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Apply every entry. Per-entry failures are collected, never fatal.
    #[instrument(skip_all, fields(entries = mapping.len()))]
    pub async fn run(&self, mapping: &[ImageMapping]) -> SyncReport {
        let mut report = SyncReport::default();

        for entry in mapping {
            match self.apply(entry).await {
                Ok(EntryOutcome::Updated) => report.updated += 1,
                Ok(EntryOutcome::Skipped) => report.skipped += 1,
                Err(message) => {
                    tracing::warn!(product = %entry.name, error = %message, "Image update failed");
                    report.errors.push(format!("{}: {message}", entry.name));
                }
            }
        }

        tracing::info!(
            updated = report.updated,
            skipped = report.skipped,
            errors = report.errors.len(),
            "Product image sync finished"
        );
        report
    }

    async fn apply(&self, entry: &ImageMapping) -> Result<EntryOutcome, String> {
        let matches = self
            .products
            .find_by_name(&entry.name)
            .await
            .map_err(|e| e.to_string())?;

        let Some(product) = matches.first() else {
            tracing::debug!(product = %entry.name, "No product with this name");
            return Ok(EntryOutcome::Skipped);
        };

        if matches.len() > 1 {
            tracing::warn!(
                product = %entry.name,
                count = matches.len(),
                chosen = %product.id,
                "Several products share this name; updating the first"
            );
        }

        let updated = self
            .products
            .update_images(product.id, &entry.images, Utc::now())
            .await
            .map_err(|e| e.to_string())?;

        Ok(if updated.is_some() {
            EntryOutcome::Updated
        } else {
            EntryOutcome::Skipped
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::MemoryProducts;

    fn entry(name: &str, images: &[&str]) -> ImageMapping {
        ImageMapping {
            name: name.to_owned(),
            images: images.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    #[test]
    fn test_builtin_mapping_parses() {
        let mapping = builtin_mapping().unwrap();
        assert!(!mapping.is_empty());
        assert!(mapping.iter().all(|e| !e.images.is_empty()));
    }

    #[test]
    fn test_parse_mapping_rejects_empty_name() {
        let err = parse_mapping("- name: ''\n  images: []\n").unwrap_err();
        assert!(matches!(err, MappingError::EmptyName(0)));
        assert!(matches!(
            parse_mapping("not: [a, list").unwrap_err(),
            MappingError::Parse(_)
        ));
    }

    #[tokio::test]
    async fn test_load_mapping_missing_file() {
        let err = load_mapping(Some(Path::new("/nonexistent/map.yaml")))
            .await
            .unwrap_err();
        assert!(matches!(err, MappingError::Read { .. }));
    }

    #[tokio::test]
    async fn test_counts_always_add_up() {
        let products = Arc::new(MemoryProducts::default());
        let ok = products.seed_named("Mango Sugar Scrub");
        products.seed_named("Broken Product");
        products.fail_image_updates_for("Broken Product");

        let mapping = [
            entry("Mango Sugar Scrub", &["https://cdn/a.jpg", "https://cdn/b.jpg"]),
            entry("Discontinued", &["https://cdn/c.jpg"]),
            entry("Broken Product", &["https://cdn/d.jpg"]),
        ];
        let report = ProductImageSync::new(products.clone()).run(&mapping).await;

        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("Broken Product: "));
        assert_eq!(report.total(), mapping.len());
        assert_eq!(
            products.get(ok).unwrap().image,
            ["https://cdn/a.jpg", "https://cdn/b.jpg"]
        );
    }

    #[tokio::test]
    async fn test_duplicate_names_update_first_only() {
        let products = Arc::new(MemoryProducts::default());
        let first = products.seed_named("Twin");
        let second = products.seed_named("Twin");

        let report = ProductImageSync::new(products.clone())
            .run(&[entry("Twin", &["https://cdn/twin.jpg"])])
            .await;

        assert_eq!(report.updated, 1);
        assert_eq!(products.get(first).unwrap().image, ["https://cdn/twin.jpg"]);
        assert!(products.get(second).unwrap().image.is_empty());
    }
}
