//! Package document loading with builder pattern and fallback chains.
//!
//! Provides [`PackageCatalog`] for holding [`PackageList`] documents and
//! [`CatalogBuilder`] for constructing a catalog from multiple sources with
//! automatic fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use package_model_db::PackageCatalog;
//!
//! // Load every JSON/YAML document of a directory
//! let catalog = PackageCatalog::from_dir("model/packages/").unwrap();
//! assert!(catalog.get("web").is_some());
//!
//! // Load a single document
//! let catalog = PackageCatalog::from_file("web.yml").unwrap();
//!
//! // Use the builder for a fallback chain
//! let catalog = PackageCatalog::builder()
//!     .from_dir("model/packages/")
//!     .from_file("web.yml")
//!     .build()
//!     .unwrap();
//! ```
//!
//! Documents are format-detected by extension: `.json` is parsed as JSON,
//! `.yml` and `.yaml` as YAML.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use package_model_core::{
    ItemType, PackageList, Properties, PropertyTypeRegistry, package_item_type,
    package_list_item_type,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::ValidationConfig;
use crate::error::{CatalogError, Result};
use crate::report::{CatalogReport, ItemOutcome, check_item};

/// Describes where a [`PackageCatalog`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Loaded from a directory of package documents.
    Directory(PathBuf),
    /// Loaded from a single package document.
    File(PathBuf),
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<CatalogSource>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    fn detect(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("yml" | "yaml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parses a single package list document.
///
/// # Errors
///
/// Returns [`CatalogError::UnsupportedFormat`] for unknown extensions,
/// [`CatalogError::IoError`] if the file cannot be read, or a JSON/YAML error
/// if parsing fails.
pub fn load_document(path: impl AsRef<Path>) -> Result<PackageList> {
    let path = path.as_ref();
    let format =
        DocumentFormat::detect(path).ok_or_else(|| CatalogError::UnsupportedFormat(path.into()))?;

    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let list: PackageList = match format {
        DocumentFormat::Json => serde_json::from_reader(reader)?,
        DocumentFormat::Yaml => serde_yaml::from_reader(reader)?,
    };

    debug!(
        path = %path.display(),
        list = %list.name,
        packages = list.package_count(),
        "loaded package document"
    );
    Ok(list)
}

/// Collection of package lists keyed by list name.
///
/// Lists keep the order they were loaded in; directory loads are sorted by
/// file path so the order is stable.
///
/// # Examples
///
/// ```no_run
/// use package_model_db::{PackageCatalog, ValidationConfig};
///
/// let catalog = PackageCatalog::from_dir("model/packages/").unwrap();
/// println!("Loaded {} package lists", catalog.len());
///
/// let report = catalog.validate(&ValidationConfig::default());
/// for outcome in report.failures() {
///     println!("{}: {} error(s)", outcome.path, outcome.errors.len());
/// }
/// ```
#[derive(Debug)]
pub struct PackageCatalog {
    lists: Vec<PackageList>,
    source: CatalogSource,
}

impl PackageCatalog {
    /// Returns a new [`CatalogBuilder`] for configuring a fallback chain.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Creates a catalog from lists already in memory.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateList`] if two lists share a name.
    pub fn from_lists(lists: Vec<PackageList>, source: CatalogSource) -> Result<Self> {
        let mut seen = HashSet::new();
        for list in &lists {
            if !seen.insert(list.name.as_str()) {
                return Err(CatalogError::DuplicateList(list.name.clone()));
            }
        }
        Ok(Self { lists, source })
    }

    /// Loads every `*.json`, `*.yml` and `*.yaml` document of a directory.
    ///
    /// Files with other extensions are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::IoError`] if the directory cannot be read,
    /// a parse error if any document is invalid, or
    /// [`CatalogError::DuplicateList`] if two documents share a list name.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.is_file() && DocumentFormat::detect(&file_path).is_some() {
                files.push(file_path);
            }
        }
        files.sort();

        let lists = files
            .iter()
            .map(load_document)
            .collect::<Result<Vec<_>>>()?;

        info!(
            dir = %path.display(),
            lists = lists.len(),
            "loaded package directory"
        );
        Self::from_lists(lists, CatalogSource::Directory(path.to_path_buf()))
    }

    /// Loads a single package list document.
    ///
    /// # Errors
    ///
    /// See [`load_document`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let list = load_document(path)?;
        Self::from_lists(vec![list], CatalogSource::File(path.to_path_buf()))
    }

    /// Looks up a package list by name.
    pub fn get(&self, name: &str) -> Option<&PackageList> {
        self.lists.iter().find(|l| l.name == name)
    }

    /// Adds a list, replacing any existing list with the same name.
    pub fn insert(&mut self, list: PackageList) {
        match self.lists.iter_mut().find(|l| l.name == list.name) {
            Some(existing) => *existing = list,
            None => self.lists.push(list),
        }
    }

    /// Returns `true` if the catalog contains a list named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of package lists.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Returns `true` if the catalog holds no lists.
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Returns the total number of packages across all lists.
    pub fn package_count(&self) -> usize {
        self.lists.iter().map(PackageList::package_count).sum()
    }

    /// Iterates lists in load order.
    pub fn lists(&self) -> impl Iterator<Item = &PackageList> {
        self.lists.iter()
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Validates every list and package against the registered schemas.
    ///
    /// Packages excluded by `config` are listed in
    /// [`CatalogReport::skipped`]. Packages are checked in parallel unless
    /// `config.fail_fast` is set, in which case checking stops after the
    /// first item with errors.
    pub fn validate(&self, config: &ValidationConfig) -> CatalogReport {
        let registry = PropertyTypeRegistry::with_defaults();
        let list_type = package_list_item_type();
        let package_type = package_item_type();

        let mut report = CatalogReport::default();
        let mut work = Vec::new();

        for list in &self.lists {
            work.push(Work {
                item_type: &list_type,
                path: list.name.clone(),
                properties: list.properties(),
            });
            for package in &list.packages {
                let path = format!("{}/{}", list.name, package.name);
                if config.is_excluded(&package.name) {
                    debug!(package = %path, "skipping excluded package");
                    report.skipped.push(path);
                    continue;
                }
                work.push(Work {
                    item_type: &package_type,
                    path,
                    properties: package.properties(),
                });
            }
        }

        let check = |w: &Work<'_>| -> ItemOutcome {
            check_item(&registry, w.item_type, &w.path, &w.properties, config.deprecated)
        };

        if config.fail_fast {
            for w in &work {
                let outcome = check(w);
                let failed = !outcome.errors.is_empty();
                report.outcomes.push(outcome);
                if failed {
                    warn!(item = %w.path, "stopping at first failing item");
                    break;
                }
            }
        } else {
            report.outcomes = work.par_iter().map(check).collect();
        }

        info!(
            checked = report.outcomes.len(),
            skipped = report.skipped.len(),
            errors = report.error_count(),
            "validated package catalog"
        );
        report
    }
}

struct Work<'a> {
    item_type: &'a ItemType,
    path: String,
    properties: Properties,
}

/// Builder for constructing a [`PackageCatalog`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`CatalogError::NoSourcesAvailable`] is returned.
///
/// # Example
///
/// ```no_run
/// use package_model_db::PackageCatalog;
///
/// let catalog = PackageCatalog::builder()
///     .from_dir("/etc/package-model/")
///     .from_file("/opt/package-model/default.yml")
///     .build()
///     .unwrap();
/// ```
pub struct CatalogBuilder {
    sources: Vec<CatalogSource>,
}

impl CatalogBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Adds a directory of package documents as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::Directory(path.into()));
        self
    }

    /// Adds a single package document as a source.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::File(path.into()));
        self
    }

    /// Attempts to load from configured sources in order.
    ///
    /// Returns the first successfully loaded catalog. If all sources fail,
    /// returns [`CatalogError::NoSourcesAvailable`].
    pub fn build(self) -> Result<PackageCatalog> {
        if self.sources.is_empty() {
            return Err(CatalogError::NoSourcesAvailable);
        }

        let all_sources = self.sources.clone();

        for source in &self.sources {
            let result = match source {
                CatalogSource::Directory(path) => PackageCatalog::from_dir(path),
                CatalogSource::File(path) => PackageCatalog::from_file(path),
                CatalogSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut catalog) => {
                    catalog.source = CatalogSource::Multiple(all_sources);
                    return Ok(catalog);
                }
                Err(err) => warn!(?source, %err, "package source unavailable"),
            }
        }

        Err(CatalogError::NoSourcesAvailable)
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
