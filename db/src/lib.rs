//! Loading and validation of package collection documents.
//!
//! This crate reads [`PackageList`](package_model_core::PackageList)
//! documents from JSON or YAML files and validates every list and package
//! against the item types of `package-model-core`.
//!
//! # Quick start
//!
//! ```no_run
//! use package_model_db::{PackageCatalog, ValidationConfig};
//!
//! // Load documents from a directory
//! let catalog = PackageCatalog::from_dir("model/packages/").unwrap();
//!
//! // Use the builder for fallback chains
//! let catalog = PackageCatalog::builder()
//!     .from_dir("model/packages/")
//!     .from_file("packages.yml")
//!     .build()
//!     .unwrap();
//!
//! // Validate with a policy file
//! let config = ValidationConfig::load(".package-model.yml").unwrap();
//! let report = catalog.validate(&config);
//! println!("{} error(s)", report.error_count());
//! ```

mod config;
mod error;
mod loader;
mod report;

pub use config::{DeprecatedPolicy, ValidationConfig};
pub use error::{CatalogError, Result};
pub use loader::{CatalogBuilder, CatalogSource, PackageCatalog, load_document};
pub use report::{CatalogReport, ItemOutcome};
