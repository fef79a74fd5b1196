//! Schema Validator CLI
//!
//! Validates the registry itself (manifest issues, checksums, orphaned
//! artifacts) and registration documents against published schemas.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use agentry_schemas::config::RegistryToolConfig;
use agentry_schemas::manifest::ManifestIssue;
use agentry_schemas::{compat, validate, Catalog, SchemaRegistry};

#[derive(Parser)]
#[command(name = "schema-validator")]
#[command(about = "Validate registry contents and registration documents")]
struct Cli {
    /// Path to the registry root (overrides config)
    #[arg(short, long)]
    registry: Option<PathBuf>,

    /// Path to a config file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report structural issues in the manifest
    Manifest,

    /// Verify artifact checksums against the manifest
    Checksums {
        /// Restrict to one schema identifier
        #[arg(short, long)]
        schema: Option<String>,
    },

    /// Validate a registration document against a published schema
    Validate {
        /// Display class or schema identifier to validate against
        name: String,
        /// Path to the JSON document
        file: PathBuf,
        /// Schema version (defaults to latest)
        #[arg(short, long)]
        version: Option<String>,
    },

    /// Diff two published versions of one schema
    Diff {
        /// Schema identifier
        schema_id: String,
        /// Old version
        old: String,
        /// New version
        new: String,
    },

    /// Report artifact directories the manifest does not reference
    Orphans,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RegistryToolConfig::load_from(cli.config.as_deref()).unwrap_or_default();
    let root = cli.registry.unwrap_or_else(|| config.registry_path());

    let registry = SchemaRegistry::open(&root)?;

    match cli.command {
        Commands::Manifest => {
            let issues = registry.manifest_issues();
            if issues.is_empty() {
                println!("✅ Manifest is clean");
                return Ok(());
            }

            println!("⚠️  {} manifest issue(s):", issues.len());
            let mut stale = false;
            for issue in &issues {
                println!("  - {}", issue);
                if matches!(issue, ManifestIssue::StaleLatestPointer { .. }) {
                    stale = true;
                }
            }

            if stale && config.validation.fail_on_stale_latest {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Checksums { schema } => {
            let hydrated = registry.resolve();

            let mut checked = 0;
            let mut mismatches = 0;
            for (schema_id, version, entry) in hydrated.entries() {
                if let Some(filter) = &schema {
                    if schema_id != filter {
                        continue;
                    }
                }
                if !entry.is_loaded() {
                    println!("  ⚠️  {}/{} - not hydrated, skipped", schema_id, version);
                    continue;
                }
                checked += 1;
                match hydrated.verify(schema_id, version) {
                    Ok(()) => println!("  ✅ {}/{} - valid", schema_id, version),
                    Err(e) => {
                        println!("  ❌ {}/{} - {}", schema_id, version, e);
                        mismatches += 1;
                    }
                }
            }

            println!();
            if mismatches == 0 {
                println!("✅ {} checksum(s) verified", checked);
                Ok(())
            } else {
                println!("❌ {} checksum mismatch(es)", mismatches);
                std::process::exit(1);
            }
        }

        Commands::Validate {
            name,
            file,
            version,
        } => {
            let hydrated = registry.resolve();
            let catalog = Catalog::new(&hydrated);

            let record = match &version {
                Some(v) => catalog
                    .list()
                    .iter()
                    .find(|r| (r.class == name || r.schema_id == name) && r.version == *v),
                None => catalog
                    .latest_by_class(&name)
                    .or_else(|| catalog.latest_by_schema_id(&name)),
            };

            let Some(record) = record else {
                eprintln!("No schema found for '{}'", name);
                if let Some(suggestion) = catalog.suggest(&name) {
                    eprintln!("Did you mean '{}'?", suggestion);
                }
                std::process::exit(1);
            };

            let violations = validate::validate_file(&record.schema, &file)?;
            if violations.is_empty() {
                println!("✅ {:?} is valid against {}", file, record.title);
                Ok(())
            } else {
                println!("❌ {:?} failed validation against {}:", file, record.title);
                for violation in &violations {
                    println!("  └─ {}", violation);
                }
                std::process::exit(1);
            }
        }

        Commands::Diff {
            schema_id,
            old,
            new,
        } => {
            let hydrated = registry.resolve();

            let old_schema = hydrated
                .get(&schema_id, &old)
                .and_then(|e| e.schema())
                .ok_or_else(|| anyhow::anyhow!("{}/{} is not hydrated", schema_id, old))?;
            let new_schema = hydrated
                .get(&schema_id, &new)
                .and_then(|e| e.schema())
                .ok_or_else(|| anyhow::anyhow!("{}/{} is not hydrated", schema_id, new))?;

            let summary = compat::diff_documents(old_schema, new_schema);
            if summary.is_unchanged() {
                println!("✅ {}: {} and {} are identical", schema_id, old, new);
            } else {
                println!(
                    "🔍 {}: {} -> {} (+{} / -{})",
                    schema_id, old, new, summary.insertions, summary.deletions
                );
                println!();
                println!("{}", summary.unified);
            }
            Ok(())
        }

        Commands::Orphans => {
            let manifest = registry.manifest();

            // Version directories on disk: {schema_id}/versions/{version}
            let mut on_disk = BTreeSet::new();
            for entry in WalkDir::new(&root)
                .min_depth(3)
                .max_depth(3)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if !entry.path().is_dir() {
                    continue;
                }
                let rel = entry.path().strip_prefix(&root)?;
                let parts: Vec<_> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().to_string())
                    .collect();
                if parts.len() == 3 && parts[1] == "versions" {
                    on_disk.insert((parts[0].clone(), parts[2].clone()));
                }
            }

            let mut referenced = BTreeSet::new();
            for (schema_id, set) in &manifest.schemas {
                for version in set.published.keys() {
                    referenced.insert((schema_id.clone(), version.clone()));
                }
            }

            let orphaned: Vec<_> = on_disk.difference(&referenced).collect();
            let missing: Vec<_> = referenced.difference(&on_disk).collect();

            if orphaned.is_empty() && missing.is_empty() {
                println!("✅ Disk and manifest agree");
                return Ok(());
            }

            if !orphaned.is_empty() {
                println!("⚠️  {} orphaned artifact dir(s):", orphaned.len());
                for (schema_id, version) in &orphaned {
                    println!("  - {}/versions/{}", schema_id, version);
                }
            }
            if !missing.is_empty() {
                println!("⚠️  {} manifest entr(ies) without artifacts:", missing.len());
                for (schema_id, version) in &missing {
                    println!("  - {}/versions/{}", schema_id, version);
                }
            }
            std::process::exit(1);
        }
    }
}
