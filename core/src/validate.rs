//! Cross-field validation of package properties.
//!
//! Single-field pattern checks (see [`patterns`](crate::patterns)) cannot
//! express relationships between properties, such as a `release` that only
//! makes sense alongside a `version`. [`PackageValidator`] covers those
//! relationships and reports at most one [`FieldError`] per call.
//!
//! # Examples
//!
//! ```
//! use package_model_core::*;
//!
//! let mut properties = Properties::new();
//! properties.insert("name".into(), "httpd".into());
//! properties.insert("version".into(), "2.4.6-93.el7".into());
//! assert!(validate_package(&properties).is_none());
//!
//! // A release alongside a version that already embeds one
//! properties.insert("release".into(), "93.el7".into());
//! let error = validate_package(&properties).unwrap();
//! assert_eq!(error.property_name, "release");
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resolved property values of a single item, keyed by property name.
///
/// Unset optional properties are simply absent.
pub type Properties = BTreeMap<String, String>;

/// Version token that tracks whatever the repository currently offers.
pub const LATEST_VERSION: &str = "latest";

/// A validation failure attributed to a single property.
///
/// Errors are values: validators return them, they never panic or abort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[error("{property_name}: {error_message}")]
pub struct FieldError {
    /// Property the error is reported against.
    pub property_name: String,
    /// Human-readable message shown to the operator.
    pub error_message: String,
}

impl FieldError {
    /// Error type name reported to the host model.
    pub const ERROR_TYPE: &'static str = "ValidationError";

    /// Creates an error against `property_name`.
    pub fn new(property_name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            error_message: error_message.into(),
        }
    }

    /// Returns the error type name, always [`FieldError::ERROR_TYPE`].
    pub fn error_type(&self) -> &'static str {
        Self::ERROR_TYPE
    }
}

/// A check run against the full property set of an item.
///
/// Implementations must be pure: the same input always produces the same
/// result, and no state is kept between calls.
pub trait ItemValidator: Send + Sync + std::fmt::Debug {
    /// Validates `properties`, returning the first violation found.
    fn validate(&self, properties: &Properties) -> Option<FieldError>;
}

/// Cross-field rules of the `package` item type.
///
/// Rules are evaluated in order and the first one that fires is returned:
///
/// 1. `version`/`release` coupling,
/// 2. `replaces` must differ from `name`,
/// 3. `requires` must not list `name` nor repeat a package.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageValidator;

impl ItemValidator for PackageValidator {
    fn validate(&self, properties: &Properties) -> Option<FieldError> {
        check_version_release(properties)
            .or_else(|| check_replaces(properties))
            .or_else(|| check_requires(properties))
    }
}

/// Validates package properties with [`PackageValidator`].
///
/// # Examples
///
/// ```
/// use package_model_core::*;
///
/// let mut properties = Properties::new();
/// properties.insert("name".into(), "foo".into());
/// properties.insert("replaces".into(), "foo".into());
///
/// let error = validate_package(&properties).unwrap();
/// assert_eq!(
///     error.error_message,
///     r#"Replacement of a modelled package "foo" with "foo" is not allowed."#
/// );
/// ```
pub fn validate_package(properties: &Properties) -> Option<FieldError> {
    PackageValidator.validate(properties)
}

fn check_version_release(properties: &Properties) -> Option<FieldError> {
    let release = properties.get("release");

    let Some(version) = properties.get("version") else {
        return release.map(|_| {
            FieldError::new(
                "release",
                "The property 'version' must be specified if a 'release' value is provided.",
            )
        });
    };

    let embeds_release = version.contains('-');
    let is_latest = version == LATEST_VERSION;

    match release {
        Some(_) if embeds_release => Some(FieldError::new(
            "release",
            "The property 'release' cannot be specified if the release is provided in the version.",
        )),
        // Message text is relied upon by existing consumers, keep as is.
        Some(_) if is_latest => Some(FieldError::new(
            "release",
            "The property 'release' cannot specified if 'version' is set to 'latest'",
        )),
        None if !embeds_release && !is_latest => Some(FieldError::new(
            "version",
            "Please define the release when the version is specified",
        )),
        _ => None,
    }
}

fn check_replaces(properties: &Properties) -> Option<FieldError> {
    let replaces = properties.get("replaces")?;
    let name = properties.get("name")?;

    if replaces != name {
        return None;
    }

    Some(FieldError::new(
        "replaces",
        format!("Replacement of a modelled package \"{replaces}\" with \"{name}\" is not allowed."),
    ))
}

fn check_requires(properties: &Properties) -> Option<FieldError> {
    let requires = properties.get("requires")?;
    let name = properties.get("name")?;

    let requirements: Vec<&str> = requires.split(',').collect();

    if requirements.contains(&name.as_str()) {
        return Some(FieldError::new(
            "requires",
            format!("Package \"{name}\" cannot require itself."),
        ));
    }

    let mut seen = HashSet::new();
    let duplicated: BTreeSet<&str> = requirements
        .iter()
        .copied()
        .filter(|requirement| !seen.insert(*requirement))
        .collect();

    if duplicated.is_empty() {
        return None;
    }

    let mut message = format!(
        "Package \"{name}\" has duplicated requirements. Duplicate package requires are : "
    );
    for duplicate in &duplicated {
        message.push_str(&format!("\"{duplicate}\" "));
    }

    Some(FieldError::new("requires", message))
}
