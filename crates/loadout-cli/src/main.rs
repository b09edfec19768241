//! loadout - compile reference resolver
//!
//! Usage:
//!   loadout resolve app.csproj            # Print resolved compile options
//!   loadout resolve app.csproj -f json    # Machine-readable output
//!   loadout graph app.csproj              # Print the reference tree

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loadout_core::prelude::*;

#[derive(Parser)]
#[command(name = "loadout")]
#[command(about = "Compile reference resolver for lockfile-based projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a project's compile configuration
    Resolve {
        /// Path to the project descriptor
        project: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Explicit config file (defaults to loadout.toml discovery)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the transitive project reference tree
    Graph {
        /// Path to the project descriptor
        project: PathBuf,

        /// Explicit config file (defaults to loadout.toml discovery)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loadout=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    run_cli(cli.command)
}

fn run_cli(command: Commands) -> Result<()> {
    match command {
        Commands::Resolve {
            project,
            format,
            config,
        } => run_resolve(&project, format, config.as_deref()),
        Commands::Graph { project, config } => run_graph(&project, config.as_deref()),
    }
}

fn load_config(project: &Path, config: Option<&Path>) -> Result<ResolverConfig> {
    match config {
        Some(path) => ResolverConfig::load_file(path),
        None => {
            let project_dir = project.parent().unwrap_or_else(|| Path::new("."));
            ResolverConfig::discover(project_dir)
        }
    }
}

fn run_resolve(project: &Path, format: OutputFormat, config: Option<&Path>) -> Result<()> {
    let config = load_config(project, config)?;
    let resolver = ProjectResolver::new(config, Diagnostics::default());
    let resolved = resolver
        .resolve(project)
        .with_context(|| format!("Failed to resolve {}", project.display()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&*resolved)?);
        }
        OutputFormat::Table => print_table(&resolved),
    }
    Ok(())
}

fn print_table(resolved: &ResolvedProject) {
    println!(
        "{} {}",
        style("Project").bold(),
        resolved.descriptor_path.display()
    );

    println!("{} ({})", style("Sources").bold(), resolved.sources.len());
    for source in &resolved.sources {
        println!("  {}", source.display());
    }

    println!(
        "{} ({})",
        style("References").bold(),
        resolved.ancestors.len()
    );
    for ancestor in &resolved.ancestors {
        println!(
            "  {} {} {}",
            ancestor.descriptor_path.display(),
            style("->").dim(),
            ancestor.output_binary.display()
        );
    }

    println!("{} ({})", style("Binaries").bold(), resolved.binaries.len());
    for binary in &resolved.binaries {
        println!("  {}", binary.display());
    }
}

fn run_graph(project: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(project, config)?;
    let resolver = ProjectResolver::new(config, Diagnostics::default());
    let resolved = resolver
        .resolve(project)
        .with_context(|| format!("Failed to resolve {}", project.display()))?;

    println!("{}", resolved.descriptor_path.display());
    for reference in &resolved.references {
        print_tree(reference, 1);
    }
    Ok(())
}

fn print_tree(node: &ProjectReference, depth: usize) {
    println!(
        "{}{} ({} binaries)",
        "  ".repeat(depth),
        node.descriptor_path.display(),
        node.binaries.len()
    );
    for child in &node.references {
        print_tree(child, depth + 1);
    }
}
