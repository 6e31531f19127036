//! Validation reports for package catalogs.
//!
//! One [`ItemOutcome`] is recorded per checked item (package list or
//! package), identified by a `list` or `list/package` path.

use package_model_core::{
    FieldError, ItemType, Properties, PropertyTypeRegistry, apply_defaults, validate_properties,
};
use serde::{Deserialize, Serialize};

use crate::config::DeprecatedPolicy;

/// Result of validating a single item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOutcome {
    /// Item type id (`package-list` or `package`).
    pub item_type: String,
    /// `list` for package lists, `list/package` for packages.
    pub path: String,
    pub errors: Vec<FieldError>,
    pub warnings: Vec<String>,
}

impl ItemOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Aggregated outcome of validating a catalog.
///
/// # Examples
///
/// ```
/// use package_model_core::{Package, PackageList};
/// use package_model_db::{CatalogSource, PackageCatalog, ValidationConfig};
///
/// let mut list = PackageList::new("web");
/// list.packages.push(Package::new("httpd").with_version("2.4.6"));
///
/// let catalog = PackageCatalog::from_lists(vec![list], CatalogSource::Multiple(vec![])).unwrap();
/// let report = catalog.validate(&ValidationConfig::default());
/// assert!(!report.is_ok());
/// assert_eq!(report.failures().next().unwrap().path, "web/httpd");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogReport {
    /// Outcomes of checked items, in catalog order.
    pub outcomes: Vec<ItemOutcome>,
    /// Paths of packages skipped by configuration.
    pub skipped: Vec<String>,
}

impl CatalogReport {
    /// Returns `true` if no item has errors.
    pub fn is_ok(&self) -> bool {
        self.outcomes.iter().all(ItemOutcome::is_ok)
    }

    /// Returns the total number of errors across all items.
    pub fn error_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.errors.len()).sum()
    }

    /// Returns the total number of warnings across all items.
    pub fn warning_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.warnings.len()).sum()
    }

    /// Iterates outcomes with at least one error.
    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }
}

/// Validates one item and applies the deprecated-property policy.
pub(crate) fn check_item(
    registry: &PropertyTypeRegistry,
    item_type: &ItemType,
    path: &str,
    properties: &Properties,
    deprecated: DeprecatedPolicy,
) -> ItemOutcome {
    let mut properties = properties.clone();
    apply_defaults(item_type, &mut properties);

    let mut errors = validate_properties(registry, item_type, &properties);
    let mut warnings = Vec::new();

    for name in item_type.deprecated_properties() {
        if !properties.contains_key(name) {
            continue;
        }
        let message = format!("Property \"{name}\" is deprecated");
        match deprecated {
            DeprecatedPolicy::Allow => {}
            DeprecatedPolicy::Warn => warnings.push(message),
            DeprecatedPolicy::Deny => errors.push(FieldError::new(name, message)),
        }
    }

    ItemOutcome {
        item_type: item_type.id.clone(),
        path: path.to_string(),
        errors,
        warnings,
    }
}
