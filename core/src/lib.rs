//! Property types, item schemas and cross-field validation for software
//! package models.
//!
//! This crate describes installable packages inside a declarative
//! configuration model:
//!
//! - [`define_property_types`] — the `package_version`, `package_config`
//!   and `package_requires` pattern types.
//! - [`define_item_types`] — the `package-list` and `package` item-type
//!   descriptors with their property annotations.
//! - [`PackageValidator`] / [`validate_package`] — rules spanning several
//!   properties, such as a `release` that needs a `version`.
//! - [`Package`] / [`PackageList`] — the typed, serializable model.
//!
//! [`validate_properties`] strings these together the way a host model
//! does: per-property patterns first, item validators after.
//!
//! # Example
//!
//! ```
//! use package_model_core::*;
//!
//! let registry = PropertyTypeRegistry::with_defaults();
//! let package_type = define_item_types()
//!     .into_iter()
//!     .find(|t| t.id == PACKAGE_ITEM_TYPE)
//!     .unwrap();
//!
//! let package = Package::new("foo").with_requires(&["bar", "foobar", "bar"]);
//! let errors = validate_properties(&registry, &package_type, &package.properties());
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors[0].property_name, "requires");
//! ```

pub mod patterns;
mod schema;
mod types;
mod validate;

pub use patterns::{
    PropertyType, PropertyTypeRegistry, base_property_types, define_property_types,
};
pub use schema::{
    Collection, ItemType, PACKAGE_ITEM_TYPE, PACKAGE_LIST_ITEM_TYPE, Property,
    SOFTWARE_ITEM_TYPE, SchemaError, apply_defaults, define_item_types, package_item_type,
    package_list_item_type, validate_properties, verify_item_types,
};
pub use types::{ConfigPolicy, Package, PackageList};
pub use validate::{
    FieldError, ItemValidator, LATEST_VERSION, PackageValidator, Properties, validate_package,
};
