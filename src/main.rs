//! Thunderbird add-on report generator CLI

use addon_reports::{build_registry, build_reports, BuildOptions, SUPPORTED_ESR};
use clap::{Parser, Subcommand};
use colored::*;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "addon-reports")]
#[command(about = "Generate Thunderbird add-on compatibility reports", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate all enabled reports and the index page
    Build {
        /// Catalog dump (JSON array of add-ons)
        #[arg(short, long, default_value = "data/xall.json")]
        catalog: PathBuf,

        /// Directory the HTML files are written to
        #[arg(short, long, default_value = "../add-on-reports")]
        output: PathBuf,

        /// Report template (embedded default if omitted)
        #[arg(long)]
        template: Option<PathBuf>,

        /// Index template (embedded default if omitted)
        #[arg(long)]
        index_template: Option<PathBuf>,

        /// Curated exception lists (JSON5)
        #[arg(long)]
        lists: Option<PathBuf>,

        /// Alternative add-on list
        #[arg(long)]
        alternatives: Option<PathBuf>,

        /// Base directory for relative extension source paths
        #[arg(long)]
        source_root: Option<PathBuf>,

        /// Supported ESR releases
        #[arg(long, value_delimiter = ',')]
        releases: Option<Vec<u32>>,

        /// Only generate these reports
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,
    },

    /// List report groups and reports
    List {
        /// Supported ESR releases
        #[arg(long, value_delimiter = ',')]
        releases: Option<Vec<u32>>,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            catalog,
            output,
            template,
            index_template,
            lists,
            alternatives,
            source_root,
            releases,
            only,
        } => {
            println!("{}", "Thunderbird Add-on Reports".bold().blue());
            println!("{}", "=".repeat(50).blue());
            println!();

            let options = BuildOptions {
                catalog_path: catalog,
                output_dir: output,
                report_template: template,
                index_template,
                curated_lists: lists,
                alternatives,
                source_root,
                releases: releases.unwrap_or_else(|| SUPPORTED_ESR.to_vec()),
                only,
                now: None,
            };

            match build_reports(&options) {
                Ok(summary) => {
                    for outcome in &summary.reports {
                        match &outcome.result {
                            Ok(rows) => println!("  {} {} ({})", "✓".green(), outcome.name, rows),
                            Err(err) => println!("  {} {}: {}", "✗".red(), outcome.name, err),
                        }
                    }
                    println!();
                    println!("Index: {}", summary.index_path.display());

                    let failed = summary.failed().count();
                    if failed > 0 {
                        eprintln!("{}", format!("{} report(s) failed", failed).red().bold());
                        std::process::exit(1);
                    }
                    println!("{}", "✅ All reports generated".green().bold());
                }
                Err(e) => {
                    eprintln!("{}", "❌ Build failed!".red().bold());
                    eprintln!("{}", format!("Error: {:#}", e).red());
                    std::process::exit(1);
                }
            }
        }

        Commands::List { releases } => {
            let options = BuildOptions {
                releases: releases.unwrap_or_else(|| SUPPORTED_ESR.to_vec()),
                ..Default::default()
            };
            let registry = match build_registry(&options) {
                Ok(registry) => registry,
                Err(e) => {
                    eprintln!("{}", format!("Error: {:#}", e).red());
                    std::process::exit(1);
                }
            };

            for group in registry.groups() {
                println!("{}", group.header.bold().blue());
                for report in registry.reports_in(&group.id) {
                    let name = if report.enabled {
                        report.name.green()
                    } else {
                        report.name.dimmed()
                    };
                    println!("  {}", name);
                    println!("    {}", report.header.dimmed());
                }
                println!();
            }
        }
    }
}
