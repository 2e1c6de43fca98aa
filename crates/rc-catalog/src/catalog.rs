//! The zipcode-keyed catalog and its builder.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use crate::resource::{valid_coordinates, Category, Resource};

/// Errors raised while assembling a catalog.
///
/// Lookups never fail; only construction does.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate resource id {id} (zipcodes {first} and {second})")]
    DuplicateId {
        id: u32,
        first: String,
        second: String,
    },

    #[error("resource {id} has invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates { id: u32, lat: f64, lng: f64 },

    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable mapping from zipcode to an ordered list of resources.
///
/// Zipcodes are matched byte-for-byte. `" 30303"` and `"30303"` are different
/// keys, and no padding of short codes is attempted.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    by_zipcode: HashMap<String, Vec<Resource>>,
    /// id -> (zipcode, index into that zipcode's list)
    by_id: HashMap<u32, (String, usize)>,
}

impl ResourceCatalog {
    /// Start an empty builder.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Resources registered for `zipcode`, in insertion order.
    ///
    /// Unknown zipcodes yield an empty slice.
    #[must_use]
    pub fn lookup(&self, zipcode: &str) -> &[Resource] {
        self.by_zipcode
            .get(zipcode)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Find a resource by id, regardless of zipcode.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Resource> {
        let (zipcode, idx) = self.by_id.get(&id)?;
        self.by_zipcode.get(zipcode)?.get(*idx)
    }

    /// Known zipcodes, sorted.
    #[must_use]
    pub fn zipcodes(&self) -> Vec<&str> {
        let mut zips: Vec<&str> = self.by_zipcode.keys().map(String::as_str).collect();
        zips.sort_unstable();
        zips
    }

    /// Total number of resources across all zipcodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Number of resources per category across the catalog.
    #[must_use]
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for resource in self.by_zipcode.values().flatten() {
            *counts.entry(resource.category).or_insert(0) += 1;
        }
        counts
    }

    /// Load a catalog from JSON shaped as `{ "<zipcode>": [resource, ...] }`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Json`] for malformed input, or any builder
    /// error for duplicate ids and out-of-range coordinates.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        // BTreeMap keeps insertion deterministic across runs
        let raw: BTreeMap<String, Vec<Resource>> = serde_json::from_reader(reader)?;
        let mut builder = Self::builder();
        for (zipcode, resources) in raw {
            for resource in resources {
                builder = builder.insert(zipcode.clone(), resource);
            }
        }
        builder.build()
    }

    /// Load a catalog from a JSON file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be opened, otherwise
    /// the same errors as [`ResourceCatalog::from_json_reader`].
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }
}

/// Collects `(zipcode, resource)` pairs and validates them into a
/// [`ResourceCatalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: Vec<(String, Resource)>,
}

impl CatalogBuilder {
    /// Queue a resource under `zipcode`. Order within a zipcode is preserved.
    #[must_use]
    pub fn insert(mut self, zipcode: impl Into<String>, resource: Resource) -> Self {
        self.entries.push((zipcode.into(), resource));
        self
    }

    /// Validate and freeze the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two resources share an id and
    /// [`CatalogError::InvalidCoordinates`] if a resource is off the globe.
    pub fn build(self) -> Result<ResourceCatalog, CatalogError> {
        let mut catalog = ResourceCatalog::default();

        for (zipcode, resource) in self.entries {
            if !valid_coordinates(resource.lat, resource.lng) {
                return Err(CatalogError::InvalidCoordinates {
                    id: resource.id,
                    lat: resource.lat,
                    lng: resource.lng,
                });
            }
            if let Some((first, _)) = catalog.by_id.get(&resource.id) {
                return Err(CatalogError::DuplicateId {
                    id: resource.id,
                    first: first.clone(),
                    second: zipcode,
                });
            }

            catalog.push(zipcode, resource);
        }

        Ok(catalog)
    }
}

impl ResourceCatalog {
    fn push(&mut self, zipcode: String, resource: Resource) {
        let list = self.by_zipcode.entry(zipcode.clone()).or_default();
        self.by_id.insert(resource.id, (zipcode, list.len()));
        list.push(resource);
    }

    /// Insert without validation. Only for data whose validity is covered by tests.
    pub(crate) fn from_trusted(entries: impl IntoIterator<Item = (String, Resource)>) -> Self {
        let mut catalog = Self::default();
        for (zipcode, resource) in entries {
            catalog.push(zipcode, resource);
        }
        catalog
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any zipcode absent from the catalog yields an empty slice
        #[test]
        fn absent_zipcodes_are_empty(zip in "\\PC*") {
            let catalog = ResourceCatalog::placeholder();
            prop_assume!(!catalog.zipcodes().contains(&zip.as_str()));
            prop_assert!(catalog.lookup(&zip).is_empty());
        }
    }
}
