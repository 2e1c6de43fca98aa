//! Assistance resource catalog for Resource Connect
//!
//! A [`ResourceCatalog`] maps a zipcode string to the housing, food and
//! utility programs registered for it. It is built once (from the
//! [`ResourceCatalog::placeholder`] dataset or a JSON file) and never mutated
//! afterward, so it can be shared freely behind an `Arc`.

mod catalog;
pub use catalog::{CatalogBuilder, CatalogError, ResourceCatalog};

mod placeholder;

mod resource;
pub use resource::{valid_coordinates, Category, Resource, UnknownCategory};
