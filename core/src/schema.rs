//! Item-type descriptors for the `package` and `package-list` entities.
//!
//! An [`ItemType`] lists its properties with their [`PropertyType`](crate::PropertyType)
//! ids and update annotations, the child collections it owns and the
//! [`ItemValidator`]s that run once every property passed its own pattern.
//! The annotations are declarative: they describe how a host model treats
//! each property, nothing here enforces update channels.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::patterns::PropertyTypeRegistry;
use crate::validate::{FieldError, ItemValidator, PackageValidator, Properties};

/// Item type id of a single package.
pub const PACKAGE_ITEM_TYPE: &str = "package";

/// Item type id of a named collection of packages.
pub const PACKAGE_LIST_ITEM_TYPE: &str = "package-list";

/// Host item type both package entities extend.
pub const SOFTWARE_ITEM_TYPE: &str = "software-item";

/// Errors raised while checking descriptors against a type registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A property refers to a type id that is not registered.
    #[error("property \"{property}\" of {item_type} uses unknown property type \"{property_type}\"")]
    UnknownPropertyType {
        item_type: String,
        property: String,
        property_type: String,
    },
    /// A default value does not satisfy the property's own type.
    #[error("default \"{default}\" of property \"{property}\" of {item_type} is invalid")]
    InvalidDefault {
        item_type: String,
        property: String,
        default: String,
    },
}

/// A property declared on an item type.
///
/// # Examples
///
/// ```
/// use package_model_core::Property;
///
/// let epoch = Property::new("epoch", "integer").with_default("0");
/// assert_eq!(epoch.default.as_deref(), Some("0"));
/// assert!(!epoch.required);
/// assert!(epoch.updatable_rest);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    pub name: String,
    /// Id of the [`PropertyType`](crate::PropertyType) values must match.
    pub prop_type: String,
    pub prop_description: String,
    pub required: bool,
    pub default: Option<String>,
    /// Kept for compatibility only; new models should not set it.
    pub deprecated: bool,
    /// Whether the value may change after creation through the REST channel.
    pub updatable_rest: bool,
    /// Whether plugins may change the value after creation.
    pub updatable_plugin: bool,
    /// Whether the value is specific to a deployment site.
    pub site_specific: bool,
}

impl Property {
    /// Creates an optional, updatable property.
    pub fn new(name: &str, prop_type: &str) -> Self {
        Self {
            name: name.to_string(),
            prop_type: prop_type.to_string(),
            prop_description: String::new(),
            required: false,
            default: None,
            deprecated: false,
            updatable_rest: true,
            updatable_plugin: true,
            site_specific: false,
        }
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.prop_description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Forbids changes through REST after creation.
    pub fn not_updatable_rest(mut self) -> Self {
        self.updatable_rest = false;
        self
    }

    /// Forbids changes by plugins after creation.
    pub fn not_updatable_plugin(mut self) -> Self {
        self.updatable_plugin = false;
        self
    }
}

/// A child collection of items owned by an item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub name: String,
    /// Item type id of the collection's members.
    pub item_type: String,
}

/// Structural description of a model entity.
#[derive(Debug, Clone, Serialize)]
pub struct ItemType {
    pub id: String,
    pub item_description: String,
    /// Host item type this one extends.
    pub extend_item: String,
    pub properties: Vec<Property>,
    pub collections: Vec<Collection>,
    #[serde(skip_serializing)]
    pub validators: Vec<Arc<dyn ItemValidator>>,
}

impl ItemType {
    /// Looks up a declared property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Looks up a child collection by name.
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Names of properties flagged as deprecated.
    pub fn deprecated_properties(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|p| p.deprecated)
            .map(|p| p.name.as_str())
    }
}

/// Returns the item types in registration order: `package-list`, then
/// `package`.
///
/// # Examples
///
/// ```
/// use package_model_core::define_item_types;
///
/// let types = define_item_types();
/// assert_eq!(types[0].id, "package-list");
/// assert_eq!(types[1].id, "package");
/// assert!(types[1].property("name").unwrap().required);
/// ```
pub fn define_item_types() -> Vec<ItemType> {
    vec![package_list_item_type(), package_item_type()]
}

/// Returns the `package-list` item type.
pub fn package_list_item_type() -> ItemType {
    ItemType {
        id: PACKAGE_LIST_ITEM_TYPE.to_string(),
        item_description: "This item type represents a collection of software packages to install."
            .to_string(),
        extend_item: SOFTWARE_ITEM_TYPE.to_string(),
        properties: vec![
            Property::new("name", "basic_string")
                .with_description(
                    "Name of package collection. This property does not affect system state \
                     and so changes to it will not result in task creation.",
                )
                .required(),
            Property::new("version", "basic_string").with_description(
                "Version of package collection. This property does not affect system state \
                 and so changes to it will not result in task creation.",
            ),
        ],
        collections: vec![Collection {
            name: "packages".to_string(),
            item_type: PACKAGE_ITEM_TYPE.to_string(),
        }],
        validators: Vec::new(),
    }
}

/// Returns the `package` item type, carrying [`PackageValidator`].
pub fn package_item_type() -> ItemType {
    ItemType {
        id: PACKAGE_ITEM_TYPE.to_string(),
        item_description: "This item type represents a software package to install.".to_string(),
        extend_item: SOFTWARE_ITEM_TYPE.to_string(),
        properties: vec![
            Property::new("name", "basic_string")
                .with_description(
                    "Name of package to install/remove. Needs to match the filename of the \
                     underlying RPM.",
                )
                .required()
                .not_updatable_rest(),
            Property::new("version", "package_version")
                .with_description("Package version to install/remove."),
            Property::new("release", "any_string")
                .with_description("Release number of package to install/remove."),
            Property::new("epoch", "integer")
                .with_description("Epoch of package to install/remove.")
                .with_default("0"),
            Property::new("arch", "basic_string")
                .with_description("Architecture (cpu) of package to install/remove."),
            Property::new("config", "package_config").with_description(
                "Handling of pre-existing configuration files. Must be either 'keep' or 'replace'.",
            ),
            Property::new("repository", "any_string")
                .with_description(
                    "Defines a dependent repository which will be configured before \
                     installing the package",
                )
                .deprecated(),
            Property::new("replaces", "basic_string")
                .with_description("Name of the package to be replaced")
                .not_updatable_rest()
                .not_updatable_plugin(),
            Property::new("requires", "package_requires")
                .with_description(
                    "A valid package name or a comma-separated list of valid package names \
                     required by the package to be installed first.",
                )
                .not_updatable_rest()
                .not_updatable_plugin(),
        ],
        collections: Vec::new(),
        validators: vec![Arc::new(PackageValidator)],
    }
}

/// Checks that every property type and default of `item_types` is known to
/// `registry`.
///
/// # Errors
///
/// Returns the first [`SchemaError`] found.
pub fn verify_item_types(
    registry: &PropertyTypeRegistry,
    item_types: &[ItemType],
) -> Result<(), SchemaError> {
    for item_type in item_types {
        for property in &item_type.properties {
            let Some(property_type) = registry.get(&property.prop_type) else {
                return Err(SchemaError::UnknownPropertyType {
                    item_type: item_type.id.clone(),
                    property: property.name.clone(),
                    property_type: property.prop_type.clone(),
                });
            };
            if let Some(default) = &property.default {
                if !property_type.is_match(default) {
                    return Err(SchemaError::InvalidDefault {
                        item_type: item_type.id.clone(),
                        property: property.name.clone(),
                        default: default.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Fills in defaults for properties absent from `properties`.
///
/// # Examples
///
/// ```
/// use package_model_core::*;
///
/// let package = &define_item_types()[1];
/// let mut properties = Properties::new();
/// properties.insert("name".into(), "httpd".into());
/// apply_defaults(package, &mut properties);
/// assert_eq!(properties.get("epoch").map(String::as_str), Some("0"));
/// ```
pub fn apply_defaults(item_type: &ItemType, properties: &mut Properties) {
    for property in &item_type.properties {
        if let Some(default) = &property.default {
            properties
                .entry(property.name.clone())
                .or_insert_with(|| default.clone());
        }
    }
}

/// Validates `properties` the way a host model does on create/update.
///
/// Unknown and missing required properties are reported first, then each
/// value is checked against its property type. Item validators run only if
/// all of those passed, so they always see individually valid values.
///
/// # Examples
///
/// ```
/// use package_model_core::*;
///
/// let registry = PropertyTypeRegistry::with_defaults();
/// let package = &define_item_types()[1];
///
/// let mut properties = Properties::new();
/// properties.insert("name".into(), "foo".into());
/// properties.insert("release".into(), "rc3".into());
///
/// let errors = validate_properties(&registry, package, &properties);
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].property_name, "release");
///
/// properties.insert("version".into(), "1.2".into());
/// assert!(validate_properties(&registry, package, &properties).is_empty());
/// ```
pub fn validate_properties(
    registry: &PropertyTypeRegistry,
    item_type: &ItemType,
    properties: &Properties,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for name in properties.keys() {
        if item_type.property(name).is_none() {
            errors.push(FieldError::new(
                name.as_str(),
                format!("\"{name}\" is not an allowed property of {}", item_type.id),
            ));
        }
    }

    for property in &item_type.properties {
        match properties.get(&property.name) {
            None if property.required => errors.push(FieldError::new(
                property.name.as_str(),
                format!(
                    "ItemType \"{}\" is required to have a property with name \"{}\"",
                    item_type.id, property.name
                ),
            )),
            None => {}
            Some(value) => match registry.get(&property.prop_type) {
                Some(property_type) => {
                    if let Err(error) = property_type.check(&property.name, value) {
                        errors.push(error);
                    }
                }
                None => errors.push(FieldError::new(
                    property.name.as_str(),
                    format!("Property type \"{}\" is not registered", property.prop_type),
                )),
            },
        }
    }

    if errors.is_empty() {
        errors.extend(
            item_type
                .validators
                .iter()
                .filter_map(|validator| validator.validate(properties)),
        );
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package() -> ItemType {
        define_item_types().remove(1)
    }

    fn properties(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_item_types_registered() {
        let ids: Vec<String> = define_item_types().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["package-list", "package"]);
    }

    #[test]
    fn test_item_types_verify_against_defaults() {
        let registry = PropertyTypeRegistry::with_defaults();
        assert_eq!(verify_item_types(&registry, &define_item_types()), Ok(()));
    }

    #[test]
    fn test_verify_reports_unknown_type() {
        let registry = PropertyTypeRegistry::new();
        let err = verify_item_types(&registry, &define_item_types()).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownPropertyType {
                item_type: "package-list".into(),
                property: "name".into(),
                property_type: "basic_string".into(),
            }
        );
    }

    #[test]
    fn test_verify_reports_invalid_default() {
        let registry = PropertyTypeRegistry::with_defaults();
        let mut item = package();
        item.properties.push(Property::new("bad", "integer").with_default("zero"));
        assert!(matches!(
            verify_item_types(&registry, &[item]),
            Err(SchemaError::InvalidDefault { .. })
        ));
    }

    #[test]
    fn test_package_annotations() {
        let package = package();
        let name = package.property("name").unwrap();
        assert!(name.required);
        assert!(!name.updatable_rest);

        for restricted in ["replaces", "requires"] {
            let property = package.property(restricted).unwrap();
            assert!(!property.required);
            assert!(property.default.is_none());
            assert!(!property.updatable_rest);
            assert!(!property.updatable_plugin);
            assert!(!property.site_specific);
        }

        assert_eq!(package.property("epoch").unwrap().default.as_deref(), Some("0"));
        assert_eq!(package.deprecated_properties().collect::<Vec<_>>(), vec!["repository"]);
        assert_eq!(package.validators.len(), 1);
    }

    #[test]
    fn test_package_list_owns_packages() {
        let list = define_item_types().remove(0);
        assert_eq!(list.collection("packages").unwrap().item_type, "package");
        assert!(list.property("name").unwrap().required);
        assert!(!list.property("version").unwrap().required);
        assert!(list.validators.is_empty());
    }

    #[test]
    fn test_validate_properties_runs_item_validators_last() {
        let registry = PropertyTypeRegistry::with_defaults();
        let package = package();

        let props = properties(&[("name", "foo"), ("requires", "some_other_pkg,foo,bar,foobar")]);
        let errors = validate_properties(&registry, &package, &props);
        assert_eq!(
            errors,
            vec![FieldError::new("requires", r#"Package "foo" cannot require itself."#)]
        );
    }

    #[test]
    fn test_validate_properties_pattern_errors_suppress_item_validators() {
        let registry = PropertyTypeRegistry::with_defaults();
        let package = package();

        let props = properties(&[("name", "foo"), ("version", "1 2"), ("config", "discard")]);
        let errors = validate_properties(&registry, &package, &props);
        let names: Vec<&str> = errors.iter().map(|e| e.property_name.as_str()).collect();
        assert_eq!(names, vec!["version", "config"]);
    }

    #[test]
    fn test_validate_properties_unknown_and_missing() {
        let registry = PropertyTypeRegistry::with_defaults();
        let package = package();

        let props = properties(&[("colour", "blue")]);
        let errors = validate_properties(&registry, &package, &props);
        assert_eq!(
            errors,
            vec![
                FieldError::new("colour", "\"colour\" is not an allowed property of package"),
                FieldError::new(
                    "name",
                    "ItemType \"package\" is required to have a property with name \"name\""
                ),
            ]
        );
    }

    #[test]
    fn test_validate_properties_reports_unregistered_types() {
        let registry = PropertyTypeRegistry::new();
        let props = properties(&[("name", "foo"), ("config", "discard")]);

        let errors = validate_properties(&registry, &package(), &props);
        assert_eq!(
            errors,
            vec![
                FieldError::new("name", "Property type \"basic_string\" is not registered"),
                FieldError::new("config", "Property type \"package_config\" is not registered"),
            ]
        );
    }

    #[test]
    fn test_apply_defaults_keeps_explicit_values() {
        let package = package();
        let mut props = properties(&[("name", "foo"), ("epoch", "2")]);
        apply_defaults(&package, &mut props);
        assert_eq!(props["epoch"], "2");
        assert_eq!(props.len(), 2);
    }
}
