use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use package_model_core::{
    ItemType, PACKAGE_ITEM_TYPE, Properties, PropertyType, PropertyTypeRegistry,
    define_item_types, validate_properties, verify_item_types,
};
use package_model_db::{
    CatalogReport, CatalogSource, PackageCatalog, ValidationConfig, load_document,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit status when inputs were read but did not validate.
const EXIT_INVALID: i32 = 2;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ExportFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "package-model")]
#[command(about = "Validate software package model documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate package list documents (JSON or YAML files, or directories of them).
    Validate(ValidateArgs),
    /// Validate a single item given as name=value properties.
    Check(CheckArgs),
    /// Print the registered property types and item types.
    Types(TypesArgs),
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Package documents and/or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Validation policy YAML file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Report format.
    #[arg(long, default_value = "text")]
    format: ReportFormat,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Property as name=value; repeat for each property.
    #[arg(long = "prop", value_name = "NAME=VALUE")]
    props: Vec<String>,
    /// Item type the properties belong to.
    #[arg(long, default_value = PACKAGE_ITEM_TYPE)]
    item_type: String,
}

#[derive(Debug, Args)]
struct TypesArgs {
    /// Output format.
    #[arg(long, default_value = "json")]
    format: ExportFormat,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Check(args) => run_check(args),
        Command::Types(args) => run_types(args),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_INVALID),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// validate command
// ---------------------------------------------------------------------------

fn run_validate(args: ValidateArgs) -> Result<bool, String> {
    let config = match &args.config {
        Some(path) => ValidationConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => ValidationConfig::default(),
    };
    debug!(?config, "validation policy");

    let catalog = load_catalog(&args.inputs)?;
    info!(
        lists = catalog.len(),
        packages = catalog.package_count(),
        "loaded package documents"
    );

    let report = catalog.validate(&config);
    match args.format {
        ReportFormat::Text => print!("{}", format_text_report(&report)),
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("Failed to serialize report: {e}"))?;
            println!("{json}");
        }
    }

    Ok(report.is_ok())
}

fn load_catalog(inputs: &[PathBuf]) -> Result<PackageCatalog, String> {
    let mut lists = Vec::new();
    let mut sources = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let catalog = PackageCatalog::from_dir(input)
                .map_err(|e| format!("Failed to load '{}': {e}", input.display()))?;
            lists.extend(catalog.lists().cloned());
            sources.push(CatalogSource::Directory(input.clone()));
        } else {
            let list = load_document(input)
                .map_err(|e| format!("Failed to load '{}': {e}", input.display()))?;
            lists.push(list);
            sources.push(CatalogSource::File(input.clone()));
        }
    }

    PackageCatalog::from_lists(lists, CatalogSource::Multiple(sources)).map_err(|e| e.to_string())
}

fn format_text_report(report: &CatalogReport) -> String {
    let mut out = String::new();

    for outcome in &report.outcomes {
        for error in &outcome.errors {
            out.push_str(&format!(
                "{}: {}: {}\n",
                outcome.path, error.property_name, error.error_message
            ));
        }
        for warning in &outcome.warnings {
            out.push_str(&format!("{}: warning: {warning}\n", outcome.path));
        }
    }

    out.push_str(&format!(
        "Validated {} item(s): {} error(s), {} warning(s), {} skipped.\n",
        report.outcomes.len(),
        report.error_count(),
        report.warning_count(),
        report.skipped.len()
    ));
    out
}

// ---------------------------------------------------------------------------
// check command
// ---------------------------------------------------------------------------

fn run_check(args: CheckArgs) -> Result<bool, String> {
    let item_type = define_item_types()
        .into_iter()
        .find(|t| t.id == args.item_type)
        .ok_or_else(|| format!("Unknown item type '{}'", args.item_type))?;

    let properties = parse_properties(&args.props)?;
    let registry = PropertyTypeRegistry::with_defaults();
    let errors = validate_properties(&registry, &item_type, &properties);

    if errors.is_empty() {
        println!("{} is valid.", item_type.id);
        return Ok(true);
    }

    for error in &errors {
        println!("{}: {}", error.property_name, error.error_message);
    }
    Ok(false)
}

fn parse_properties(raw: &[String]) -> Result<Properties, String> {
    let mut properties = Properties::new();
    for entry in raw {
        let (name, value) = entry
            .split_once('=')
            .ok_or_else(|| format!("Invalid property '{entry}', expected NAME=VALUE"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("Invalid property '{entry}', name is empty"));
        }
        if properties.insert(name.to_string(), value.to_string()).is_some() {
            return Err(format!("Property '{name}' given more than once"));
        }
    }
    Ok(properties)
}

// ---------------------------------------------------------------------------
// types command
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
struct TypeExport<'a> {
    property_types: Vec<&'a PropertyType>,
    item_types: &'a [ItemType],
}

fn run_types(args: TypesArgs) -> Result<bool, String> {
    let registry = PropertyTypeRegistry::with_defaults();
    let item_types = define_item_types();
    verify_item_types(&registry, &item_types).map_err(|e| e.to_string())?;

    let export = TypeExport {
        property_types: registry.iter().collect(),
        item_types: &item_types,
    };

    let raw = match args.format {
        ExportFormat::Json => serde_json::to_string_pretty(&export)
            .map_err(|e| format!("Failed to serialize types: {e}"))?,
        ExportFormat::Yaml => serde_yaml::to_string(&export)
            .map_err(|e| format!("Failed to serialize types: {e}"))?,
    };
    println!("{raw}");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_properties() {
        let props = parse_properties(&[
            "name=foo".to_string(),
            "requires=bar,baz".to_string(),
            "release=".to_string(),
        ])
        .unwrap();
        assert_eq!(props["name"], "foo");
        assert_eq!(props["requires"], "bar,baz");
        assert_eq!(props["release"], "");
    }

    #[test]
    fn test_parse_properties_rejects_bad_entries() {
        assert!(parse_properties(&["name".to_string()]).is_err());
        assert!(parse_properties(&["=foo".to_string()]).is_err());
        assert!(parse_properties(&["name=a".to_string(), "name=b".to_string()]).is_err());
    }

    #[test]
    fn test_format_text_report() {
        let report = CatalogReport {
            outcomes: vec![package_model_db::ItemOutcome {
                item_type: "package".into(),
                path: "web/foo".into(),
                errors: vec![package_model_core::FieldError::new("version", "bad")],
                warnings: vec!["Property \"repository\" is deprecated".into()],
            }],
            skipped: vec!["web/bar".into()],
        };
        assert_eq!(
            format_text_report(&report),
            "web/foo: version: bad\n\
             web/foo: warning: Property \"repository\" is deprecated\n\
             Validated 1 item(s): 1 error(s), 1 warning(s), 1 skipped.\n"
        );
    }
}
