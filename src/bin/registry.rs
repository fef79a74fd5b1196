//! Schema Registry CLI
//!
//! Commands for inspecting and exporting from a content-addressed registry.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use agentry_schemas::config::{OutputFormat, RegistryToolConfig};
use agentry_schemas::{Catalog, SchemaRegistry};

#[derive(Parser)]
#[command(name = "schema-registry")]
#[command(about = "Content-addressed, versioned schema registry")]
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
    /// List all published schema versions
    List,

    /// Print a schema document by content id (ipfs://<cid>)
    Get {
        /// Content-derived identifier
        id: String,
    },

    /// Print the latest schema for a class or schema identifier
    Latest {
        /// Display class (e.g. "Agent") or schema identifier (e.g. "agent")
        name: String,
    },

    /// Show one schema identifier's versions and hydration status
    Show {
        /// Schema identifier
        schema_id: String,
    },

    /// Show hydration status for every entry
    Status,

    /// Export a hydrated version's artifacts to a directory
    Export {
        /// Schema identifier
        schema_id: String,
        /// Version (defaults to the latest pointer)
        #[arg(short, long)]
        version: Option<String>,
        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
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
    let hydrated = registry.resolve();
    let catalog = Catalog::new(&hydrated);

    match cli.command {
        Commands::List => {
            if catalog.list().is_empty() {
                println!("No schemas published yet.");
            } else {
                println!("📚 Published schemas:");
                for record in catalog.list() {
                    let marker = if record.is_latest { " (latest)" } else { "" };
                    println!(
                        "  {} [{}] {} {}{}",
                        record.title,
                        record.class,
                        record.id,
                        record.timestamp.format("%Y-%m-%d"),
                        marker
                    );
                }
            }
            Ok(())
        }

        Commands::Get { id } => {
            if let Some(record) = catalog.get_by_id(&id) {
                let rendered = match config.export.output_format {
                    OutputFormat::Pretty => serde_json::to_string_pretty(&record.schema)?,
                    OutputFormat::Compact => serde_json::to_string(&record.schema)?,
                };
                println!("{}", rendered);
                Ok(())
            } else {
                eprintln!("Schema '{}' not found", id);
                std::process::exit(1);
            }
        }

        Commands::Latest { name } => {
            let record = catalog
                .latest_by_class(&name)
                .or_else(|| catalog.latest_by_schema_id(&name));

            if let Some(record) = record {
                println!("📦 {} ({})", record.title, record.id);
                println!("{}", serde_json::to_string_pretty(&record.schema)?);
                Ok(())
            } else {
                eprintln!("No latest version found for '{}'", name);
                if let Some(suggestion) = catalog.suggest(&name) {
                    eprintln!("Did you mean '{}'?", suggestion);
                }
                std::process::exit(1);
            }
        }

        Commands::Show { schema_id } => {
            let set = hydrated
                .schemas
                .get(&schema_id)
                .ok_or_else(|| anyhow::anyhow!("Schema '{}' not found", schema_id))?;

            println!("📦 Schema: {}", schema_id);
            println!("🔖 Latest pointer: {}", set.latest);
            println!();
            println!("📄 Versions:");
            for (version, entry) in &set.versions {
                let marker = if *version == set.latest { " (latest)" } else { "" };
                match entry.failure() {
                    None => println!("  ✅ {} {} {}{}", version, entry.cid, entry.checksum, marker),
                    Some(reason) => println!("  ❌ {} - {}{}", version, reason, marker),
                }
            }
            Ok(())
        }

        Commands::Status => {
            println!("🔍 Hydration status:");
            for (schema_id, version, entry) in hydrated.entries() {
                match entry.failure() {
                    None => println!("  ✅ {}/{} - loaded", schema_id, version),
                    Some(reason) => println!("  ❌ {}/{} - {}", schema_id, version, reason),
                }
            }
            println!();
            println!(
                "{} loaded, {} failed",
                hydrated.loaded_count(),
                hydrated.failed_count()
            );

            if config.validation.verify_checksums {
                let mismatches = hydrated.verify_all();
                if mismatches.is_empty() {
                    println!("🔒 All checksums valid");
                } else {
                    for e in &mismatches {
                        println!("  ❌ {}", e);
                    }
                    println!("❌ {} checksum mismatch(es)", mismatches.len());
                }
            }
            Ok(())
        }

        Commands::Export {
            schema_id,
            version,
            output,
        } => {
            let version = match version {
                Some(v) => v,
                None => {
                    hydrated
                        .schemas
                        .get(&schema_id)
                        .ok_or_else(|| anyhow::anyhow!("Schema '{}' not found", schema_id))?
                        .latest
                        .clone()
                }
            };

            hydrated.export(&schema_id, &version, &output, config.export.include_meta)?;
            println!("✅ Exported {}/{} to {:?}", schema_id, version, output);
            Ok(())
        }
    }
}
