//! Named string-pattern property types.
//!
//! A [`PropertyType`] pairs a regular expression with the message reported
//! when a value does not match. The package types are defined by
//! [`define_property_types`]; the primitive types they build on, normally
//! supplied by the host model, come from [`base_property_types`].

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::FieldError;

/// Package name token accepted inside `requires` lists.
const PACKAGE_NAME_RE: &str = r"[a-zA-Z0-9\-\._]+";

/// A reusable string type defined by a pattern and a violation message.
///
/// # Examples
///
/// ```
/// use package_model_core::PropertyType;
///
/// let config = PropertyType::new("package_config", r"^(keep|replace)$", "Value must be \"keep\" or \"replace\".");
/// assert!(config.is_match("keep"));
/// assert!(!config.is_match("discard"));
/// ```
#[derive(Clone, Serialize)]
pub struct PropertyType {
    /// Identifier properties refer to (e.g. `package_version`).
    pub id: String,
    /// Source of the validating regular expression.
    pub regex: String,
    /// Message reported for values that do not match.
    pub regex_error_desc: String,
    #[serde(skip_serializing)]
    compiled: Regex,
}

impl PropertyType {
    /// Creates a property type from a pattern known to be valid.
    ///
    /// # Panics
    ///
    /// Panics if `regex` does not compile. Patterns are compile-time
    /// constants, so a failure is a programmer error.
    pub fn new(
        id: impl Into<String>,
        regex: impl Into<String>,
        regex_error_desc: impl Into<String>,
    ) -> Self {
        let regex = regex.into();
        let compiled = Regex::new(&regex).expect("static regex must compile");
        Self {
            id: id.into(),
            regex,
            regex_error_desc: regex_error_desc.into(),
            compiled,
        }
    }

    /// Returns `true` if `value` satisfies the pattern.
    pub fn is_match(&self, value: &str) -> bool {
        self.compiled.is_match(value)
    }

    /// Checks the value of `property_name` against the pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use package_model_core::define_property_types;
    ///
    /// let types = define_property_types();
    /// let requires = &types[2];
    /// assert!(requires.check("requires", "openssl,apr").is_ok());
    ///
    /// let error = requires.check("requires", "openssl,").unwrap_err();
    /// assert_eq!(error.property_name, "requires");
    /// ```
    pub fn check(&self, property_name: &str, value: &str) -> Result<(), FieldError> {
        if self.is_match(value) {
            Ok(())
        } else {
            Err(FieldError::new(property_name, self.regex_error_desc.clone()))
        }
    }
}

impl fmt::Debug for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyType")
            .field("id", &self.id)
            .field("regex", &self.regex)
            .finish_non_exhaustive()
    }
}

impl PartialEq for PropertyType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.regex == other.regex
            && self.regex_error_desc == other.regex_error_desc
    }
}

impl Eq for PropertyType {}

/// Returns the package property types, in registration order:
/// `package_version`, `package_config`, `package_requires`.
///
/// # Examples
///
/// ```
/// use package_model_core::define_property_types;
///
/// let ids: Vec<_> = define_property_types().into_iter().map(|t| t.id).collect();
/// assert_eq!(ids, ["package_version", "package_config", "package_requires"]);
/// ```
pub fn define_property_types() -> Vec<PropertyType> {
    vec![
        PropertyType::new(
            "package_version",
            r"^(latest|[a-zA-Z0-9\.\-_]+)$",
            "Value must be either \"latest\" or a valid alphanumeric package version number.",
        ),
        PropertyType::new(
            "package_config",
            r"^(keep|replace)$",
            "Value must be \"keep\" or \"replace\".",
        ),
        PropertyType::new(
            "package_requires",
            format!(r"^(({PACKAGE_NAME_RE})(,({PACKAGE_NAME_RE}))*)$"),
            "Value must be a comma separated list of package names.",
        ),
    ]
}

/// Returns the primitive property types the package schemas build on.
///
/// These mirror the types a host model registers for itself:
/// `basic_string`, `any_string` and `integer`.
pub fn base_property_types() -> Vec<PropertyType> {
    vec![
        PropertyType::new(
            "basic_string",
            r"^[a-zA-Z0-9\-\._]+$",
            "Value must be a string of alphanumeric characters, '.', '-' or '_'.",
        ),
        PropertyType::new("any_string", r"(?s)^.*$", "Value must be a string."),
        PropertyType::new("integer", r"^-?[0-9]+$", "Value must be an integer."),
    ]
}

/// Lookup table of property types by id.
///
/// Registration order is preserved for listing.
#[derive(Debug, Clone, Default)]
pub struct PropertyTypeRegistry {
    types: HashMap<String, PropertyType>,
    order: Vec<String>,
}

impl PropertyTypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the base types followed by the package
    /// types.
    ///
    /// # Examples
    ///
    /// ```
    /// use package_model_core::PropertyTypeRegistry;
    ///
    /// let registry = PropertyTypeRegistry::with_defaults();
    /// assert!(registry.get("integer").is_some());
    /// assert!(registry.get("package_version").is_some());
    /// assert!(registry.get("unknown").is_none());
    /// ```
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for property_type in base_property_types()
            .into_iter()
            .chain(define_property_types())
        {
            registry.register(property_type);
        }
        registry
    }

    /// Registers `property_type`, replacing any type with the same id.
    pub fn register(&mut self, property_type: PropertyType) {
        if !self.types.contains_key(&property_type.id) {
            self.order.push(property_type.id.clone());
        }
        self.types.insert(property_type.id.clone(), property_type);
    }

    /// Looks up a type by id.
    pub fn get(&self, id: &str) -> Option<&PropertyType> {
        self.types.get(id)
    }

    /// Iterates types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyType> {
        self.order.iter().filter_map(|id| self.types.get(id))
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no type is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package_type(id: &str) -> PropertyType {
        define_property_types()
            .into_iter()
            .find(|t| t.id == id)
            .unwrap()
    }

    #[test]
    fn test_property_types_registered() {
        let ids: Vec<String> = define_property_types().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["package_version", "package_config", "package_requires"]);
    }

    #[test]
    fn test_package_version_pattern() {
        let version = package_type("package_version");
        for valid in ["latest", "1.2", "2.4.6-93.el7", "1_0", "abc"] {
            assert!(version.is_match(valid), "{valid} should match");
        }
        for invalid in ["", "1.2 ", "1,2", "1.2+git", "latest!"] {
            assert!(!version.is_match(invalid), "{invalid} should not match");
        }
        assert_eq!(
            version.check("version", "1 2").unwrap_err().error_message,
            "Value must be either \"latest\" or a valid alphanumeric package version number."
        );
    }

    #[test]
    fn test_package_config_pattern() {
        let config = package_type("package_config");
        assert!(config.is_match("keep"));
        assert!(config.is_match("replace"));
        assert!(!config.is_match("Keep"));
        assert!(!config.is_match("keep "));
        assert_eq!(
            config.check("config", "discard").unwrap_err(),
            FieldError::new("config", "Value must be \"keep\" or \"replace\".")
        );
    }

    #[test]
    fn test_package_requires_pattern() {
        let requires = package_type("package_requires");
        for valid in ["httpd", "openssl,apr,apr-util", "lib_x.so,a-b"] {
            assert!(requires.is_match(valid), "{valid} should match");
        }
        for invalid in ["", ",httpd", "httpd,", "httpd,,apr", "httpd, apr", " httpd"] {
            assert!(!requires.is_match(invalid), "{invalid} should not match");
        }
        assert_eq!(
            requires.check("requires", "a,").unwrap_err().error_message,
            "Value must be a comma separated list of package names."
        );
    }

    #[test]
    fn test_base_types() {
        let registry = PropertyTypeRegistry::with_defaults();
        let integer = registry.get("integer").unwrap();
        assert!(integer.is_match("0"));
        assert!(integer.is_match("-3"));
        assert!(!integer.is_match("1.5"));

        let any = registry.get("any_string").unwrap();
        assert!(any.is_match("multi\nline value"));

        let basic = registry.get("basic_string").unwrap();
        assert!(basic.is_match("x86_64"));
        assert!(!basic.is_match("has space"));
    }

    #[test]
    fn test_registry_order_and_replace() {
        let mut registry = PropertyTypeRegistry::with_defaults();
        assert_eq!(registry.len(), 6);

        registry.register(PropertyType::new("integer", r"^[0-9]+$", "digits only"));
        assert_eq!(registry.len(), 6);
        assert!(!registry.get("integer").unwrap().is_match("-1"));

        let ids: Vec<&str> = registry.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "basic_string",
                "any_string",
                "integer",
                "package_version",
                "package_config",
                "package_requires",
            ]
        );
    }
}
