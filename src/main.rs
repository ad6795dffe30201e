//! inventory-enrich: asset and data inventory enrichment tool
//!
//! Discovers supporting assets, suggests data classifications and resolves
//! baseline SBOMs for software assets.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use inventory_enrich::{
    cli::{self, BaselineQuery, EnrichOptions, OutputTarget},
    config::{AppConfig, OutputFormat},
    enrichment::EnrichmentDirection,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "inventory-enrich")]
#[command(author)]
#[command(version)]
#[command(about = "Asset and data inventory enrichment", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Enrichment succeeded
    1  Enrichment reported errors or an error occurred

EXAMPLES:
    # Discover assets and classify data in both directions
    inventory-enrich enrich --assets assets.json --records records.json

    # Resolve baseline SBOMs from a local directory
    inventory-enrich enrich --assets assets.json --direction assets-to-data \\
        --baseline-dir ./baseline-sboms

    # Print the dependency tree of an SBOM
    inventory-enrich tree app.cdx.json -o summary")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Direction argument; `both` runs the two directions concurrently
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    DataToAssets,
    AssetsToData,
    Both,
}

impl DirectionArg {
    const fn into_direction(self) -> Option<EnrichmentDirection> {
        match self {
            Self::DataToAssets => Some(EnrichmentDirection::DataToAssets),
            Self::AssetsToData => Some(EnrichmentDirection::AssetsToData),
            Self::Both => None,
        }
    }
}

/// Output and baseline flags shared by several subcommands
#[derive(Parser)]
struct CommonArgs {
    /// Output format (overrides the config file)
    #[arg(short, long)]
    output: Option<OutputFormat>,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Directory holding the baseline index.json
    #[arg(long, conflicts_with = "baseline_url")]
    baseline_dir: Option<PathBuf>,

    /// URL of the baseline index document
    #[arg(long, env = "INVENTORY_ENRICH_BASELINE_URL")]
    baseline_url: Option<String>,
}

/// Arguments for the `enrich` subcommand
#[derive(Parser)]
struct EnrichArgs {
    /// JSON file with an array of assets
    #[arg(long)]
    assets: Option<PathBuf>,

    /// JSON file with an array of data records
    #[arg(long)]
    records: Option<PathBuf>,

    /// Enrichment direction
    #[arg(short, long, value_enum, default_value = "both")]
    direction: DirectionArg,

    /// YAML file with additional classification rules
    #[arg(long)]
    rules_file: Option<PathBuf>,

    /// Fail the run when the baseline index cannot be loaded
    #[arg(long)]
    fail_on_baseline_error: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run asset discovery, classification and SBOM resolution
    Enrich(EnrichArgs),

    /// Print the dependency forest of a CycloneDX or SPDX document
    Tree {
        /// Path to the SBOM
        sbom: PathBuf,

        /// Maximum tree depth (0 = unlimited)
        #[arg(long, default_value_t = 0)]
        max_depth: usize,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List the active classification rules
    Rules {
        /// YAML file with additional classification rules
        #[arg(long)]
        rules_file: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List or search baseline SBOMs
    Baselines {
        /// Case-insensitive text matched against name and description
        #[arg(long)]
        search: Option<String>,

        /// Only baselines of this ecosystem
        #[arg(long)]
        ecosystem: Option<String>,

        /// Only baselines of this category
        #[arg(long)]
        category: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .inventory-enrich.yaml in the current directory
    Init,
    /// Print the JSON Schema of the config file format
    Schema,
}

/// Translate shared flags into config overrides.
fn overrides(common: &CommonArgs) -> inventory_enrich::AppConfigBuilder {
    let mut builder = AppConfig::builder();
    if let Some(format) = common.output {
        builder = builder.output_format(format);
    }
    if let Some(ref dir) = common.baseline_dir {
        builder = builder.baseline_directory(dir.clone());
    }
    if let Some(ref url) = common.baseline_url {
        builder = builder.baseline_url(url.clone());
    }
    builder
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let load = |overrides: &AppConfig| {
        let (config, loaded_from) =
            AppConfig::from_file_with_overrides(cli.config.as_deref(), overrides);
        if let Some(path) = loaded_from {
            tracing::debug!("Loaded config from {}", path.display());
        }
        config
    };

    match cli.command {
        Commands::Enrich(args) => {
            let config = load(
                &overrides(&args.common)
                    .rules_file(args.rules_file.clone())
                    .fail_on_baseline_error(args.fail_on_baseline_error)
                    .build(),
            );
            let options = EnrichOptions {
                assets: args.assets,
                records: args.records,
                direction: args.direction.into_direction(),
                output_file: args.common.output_file,
                quiet: cli.quiet,
            };
            let success = cli::run_enrich(options, &config).await?;
            if !success {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Tree {
            sbom,
            max_depth,
            common,
        } => {
            let config = load(&overrides(&common).max_depth(max_depth).build());
            let target = OutputTarget::from_option(common.output_file);
            cli::run_tree(&sbom, &config, &target, cli.quiet)
        }

        Commands::Rules { rules_file, common } => {
            let config = load(&overrides(&common).rules_file(rules_file).build());
            let target = OutputTarget::from_option(common.output_file);
            cli::run_rules(&config, &target, cli.quiet)
        }

        Commands::Baselines {
            search,
            ecosystem,
            category,
            common,
        } => {
            let config = load(&overrides(&common).build());
            let query = BaselineQuery {
                ecosystem,
                category,
                search,
            };
            let target = OutputTarget::from_option(common.output_file);
            cli::run_baselines(&query, &config, &target, cli.quiet).await
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) =
                    inventory_enrich::config::load_or_default(cli.config.as_deref());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(())
            }
            ConfigAction::Path => {
                let search_paths: [Option<String>; 3] = [
                    std::env::current_dir()
                        .ok()
                        .map(|p| p.display().to_string()),
                    ::dirs::config_dir()
                        .map(|p| p.join("inventory-enrich").display().to_string()),
                    ::dirs::home_dir().map(|p| p.display().to_string()),
                ];
                eprintln!("Config file search paths (in order):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {path}");
                }
                eprintln!();
                match inventory_enrich::config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(())
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".inventory-enrich.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = inventory_enrich::config::generate_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(())
            }
            ConfigAction::Schema => {
                println!("{}", inventory_enrich::config::generate_json_schema());
                Ok(())
            }
        },
    }
}
