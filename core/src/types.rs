//! Typed package model.
//!
//! [`Package`] and [`PackageList`] are the serializable forms of the two
//! item types. Values are kept as the strings found in the document, and
//! keys the item type does not declare are kept in `extra`, so every
//! problem surfaces from [`validate_properties`](crate::validate_properties)
//! as a [`FieldError`](crate::FieldError) rather than as a parse failure.
//!
//! Scalars of any kind are accepted and rendered as strings. Unquoted YAML
//! numbers go through a float, so versions such as `1.10` should be quoted.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Properties;

/// Handling of configuration files already present on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigPolicy {
    /// Keep the existing files.
    Keep,
    /// Overwrite them with the packaged files.
    Replace,
}

impl ConfigPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Replace => "replace",
        }
    }
}

impl FromStr for ConfigPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keep" => Ok(Self::Keep),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown config policy: {other}")),
        }
    }
}

/// A single installable package.
///
/// # Examples
///
/// ```
/// use package_model_core::*;
///
/// let package = Package::new("httpd")
///     .with_version("2.4.6")
///     .with_release("93.el7")
///     .with_requires(&["openssl", "apr"]);
///
/// let properties = package.properties();
/// assert_eq!(properties["requires"], "openssl,apr");
/// assert!(!properties.contains_key("epoch"));
/// assert!(validate_package(&properties).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name, matching the artifact filename.
    #[serde(deserialize_with = "scalar::string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar::option", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "scalar::option", skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, deserialize_with = "scalar::option", skip_serializing_if = "Option::is_none")]
    pub epoch: Option<String>,
    #[serde(default, deserialize_with = "scalar::option", skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// `keep` or `replace`; see [`Package::config_policy`].
    #[serde(default, deserialize_with = "scalar::option", skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    /// Deprecated; accepted for compatibility.
    #[serde(default, deserialize_with = "scalar::option", skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    /// Name of the package this one supersedes.
    #[serde(default, deserialize_with = "scalar::option", skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
    /// Comma separated names of packages to install first.
    #[serde(default, deserialize_with = "scalar::option", skip_serializing_if = "Option::is_none")]
    pub requires: Option<String>,
    /// Keys not declared by the `package` item type.
    #[serde(flatten, deserialize_with = "scalar::map")]
    pub extra: Properties,
}

impl Package {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: None,
            release: None,
            epoch: None,
            arch: None,
            config: None,
            repository: None,
            replaces: None,
            requires: None,
            extra: Properties::new(),
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn with_release(mut self, release: &str) -> Self {
        self.release = Some(release.to_string());
        self
    }

    pub fn with_config(mut self, config: ConfigPolicy) -> Self {
        self.config = Some(config.as_str().to_string());
        self
    }

    pub fn with_replaces(mut self, replaces: &str) -> Self {
        self.replaces = Some(replaces.to_string());
        self
    }

    /// Sets `requires` from individual package names.
    pub fn with_requires(mut self, requires: &[&str]) -> Self {
        self.requires = Some(requires.join(","));
        self
    }

    /// Returns the `requires` entries in declaration order.
    ///
    /// # Examples
    ///
    /// ```
    /// use package_model_core::Package;
    ///
    /// let package = Package::new("foo").with_requires(&["bar", "baz"]);
    /// assert_eq!(package.requirements(), vec!["bar", "baz"]);
    /// assert!(Package::new("foo").requirements().is_empty());
    /// ```
    pub fn requirements(&self) -> Vec<&str> {
        self.requires
            .as_deref()
            .map(|r| r.split(',').collect())
            .unwrap_or_default()
    }

    /// Parsed `config`, or `None` if unset or not a known policy.
    pub fn config_policy(&self) -> Option<ConfigPolicy> {
        self.config.as_deref().and_then(|c| c.parse().ok())
    }

    /// Parsed `epoch`, defaulting to 0 when unset. `None` if not an integer.
    pub fn epoch_number(&self) -> Option<i64> {
        match &self.epoch {
            Some(epoch) => epoch.parse().ok(),
            None => Some(0),
        }
    }

    /// Returns `true` if a deprecated property is set.
    pub fn uses_deprecated(&self) -> bool {
        self.repository.is_some()
    }

    /// Renders the package as the property map validators consume.
    ///
    /// Unset optional properties are left out; undeclared keys from
    /// `extra` are included so they can be reported.
    pub fn properties(&self) -> Properties {
        let mut properties = self.extra.clone();
        properties.insert("name".to_string(), self.name.clone());

        let optional = [
            ("version", &self.version),
            ("release", &self.release),
            ("epoch", &self.epoch),
            ("arch", &self.arch),
            ("config", &self.config),
            ("repository", &self.repository),
            ("replaces", &self.replaces),
            ("requires", &self.requires),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                properties.insert(key.to_string(), value.clone());
            }
        }

        properties
    }
}

/// A named, optionally versioned collection of packages.
///
/// `name` and `version` are descriptive only.
///
/// # Examples
///
/// ```
/// use package_model_core::{Package, PackageList};
///
/// let mut list = PackageList::new("web");
/// list.packages.push(Package::new("httpd").with_version("latest"));
/// assert_eq!(list.package_count(), 1);
/// assert!(list.find("httpd").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageList {
    #[serde(deserialize_with = "scalar::string")]
    pub name: String,
    #[serde(default, deserialize_with = "scalar::option", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub packages: Vec<Package>,
    /// Keys not declared by the `package-list` item type.
    #[serde(flatten, deserialize_with = "scalar::map")]
    pub extra: Properties,
}

impl PackageList {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: None,
            packages: Vec::new(),
            extra: Properties::new(),
        }
    }

    /// Returns the number of packages in the collection.
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Finds a package by name.
    pub fn find(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Renders the collection's own properties (without its packages).
    pub fn properties(&self) -> Properties {
        let mut properties = self.extra.clone();
        properties.insert("name".to_string(), self.name.clone());
        if let Some(version) = &self.version {
            properties.insert("version".to_string(), version.clone());
        }
        properties
    }
}

/// Deserializers reading any scalar (string, number, bool) as a string.
mod scalar {
    use std::fmt;

    use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};

    use crate::Properties;

    struct Scalar(String);

    struct ScalarVisitor;

    impl Visitor<'_> for ScalarVisitor {
        type Value = Scalar;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Scalar, E> {
            Ok(Scalar(v.to_string()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Scalar, E> {
            Ok(Scalar(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Scalar, E> {
            Ok(Scalar(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Scalar, E> {
            Ok(Scalar(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Scalar, E> {
            Ok(Scalar(v.to_string()))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Scalar, E> {
            Ok(Scalar(v.to_string()))
        }
    }

    impl<'de> Deserialize<'de> for Scalar {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(ScalarVisitor)
        }
    }

    pub(super) fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Scalar::deserialize(deserializer).map(|s| s.0)
    }

    pub(super) fn option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        Option::<Scalar>::deserialize(deserializer).map(|s| s.map(|s| s.0))
    }

    struct MapVisitor;

    impl<'de> Visitor<'de> for MapVisitor {
        type Value = Properties;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of scalar values")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Properties, A::Error> {
            let mut properties = Properties::new();
            while let Some((key, value)) = access.next_entry::<String, Scalar>()? {
                properties.insert(key, value.0);
            }
            Ok(properties)
        }
    }

    pub(super) fn map<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Properties, D::Error> {
        deserializer.deserialize_map(MapVisitor)
    }
}
