//! Thunderbird Add-on Compatibility Reports
//!
//! Classifies every add-on of an ATN catalog dump against the supported ESR
//! releases and renders one static HTML report per classification, plus an
//! index page grouping the reports by release.

pub mod analyzer;
pub mod error;
pub mod models;
pub mod parser;
pub mod report;
pub mod utils;

pub use analyzer::{ClassifierContext, Rule, SharedRule};
pub use error::ReportError;
pub use models::{Badge, BadgeBase, BadgeKind, CatalogEntry, CuratedLists, RowData, SUPPORTED_ESR};
pub use report::{BuildSummary, ReportRegistry, ReportRenderer};

use anyhow::Result;
use chrono::{DateTime, Utc};
use models::AlternativeData;
use report::{BadgeRegistry, IndexBuilder};
use std::path::PathBuf;
use tracing::{info, warn};

/// Inputs and knobs of one report build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Catalog dump produced by the download pipeline.
    pub catalog_path: PathBuf,
    pub output_dir: PathBuf,
    /// Embedded templates are used when unset.
    pub report_template: Option<PathBuf>,
    pub index_template: Option<PathBuf>,
    /// Replaces the embedded curated lists.
    pub curated_lists: Option<PathBuf>,
    /// Alternative add-on list; no alternatives are shown when unset.
    pub alternatives: Option<PathBuf>,
    /// Base for relative `localExtensionDir` paths.
    pub source_root: Option<PathBuf>,
    pub releases: Vec<u32>,
    /// Generate only these reports; all when empty.
    pub only: Vec<String>,
    /// Reference time; the wall clock when unset.
    pub now: Option<DateTime<Utc>>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/xall.json"),
            output_dir: PathBuf::from("../add-on-reports"),
            report_template: None,
            index_template: None,
            curated_lists: None,
            alternatives: None,
            source_root: None,
            releases: SUPPORTED_ESR.to_vec(),
            only: Vec::new(),
            now: None,
        }
    }
}

/// Load the inputs, generate every enabled report and the index.
pub fn build_reports(options: &BuildOptions) -> Result<BuildSummary> {
    let lists = match &options.curated_lists {
        Some(path) => parser::load_curated_lists(path)?,
        None => parser::default_curated_lists()?,
    };

    let alternatives = match &options.alternatives {
        Some(path) => parser::load_alternatives(path).unwrap_or_else(|err| {
            warn!("Continuing without alternatives: {:#}", err);
            AlternativeData::new()
        }),
        None => AlternativeData::new(),
    };

    let mut catalog = parser::load_catalog(&options.catalog_path)?;

    let mut ctx = ClassifierContext::new(lists, alternatives, options.now.unwrap_or_else(Utc::now))
        .with_releases(&options.releases);
    if let Some(root) = &options.source_root {
        ctx = ctx.with_source_root(root);
    }

    let registry = build_registry(options)?;

    let mut renderer = ReportRenderer::new(BadgeRegistry::standard());
    if let Some(path) = &options.report_template {
        renderer = renderer.with_template(path);
    }
    let mut index = IndexBuilder::new();
    if let Some(path) = &options.index_template {
        index = index.with_template(path);
    }

    info!("Generating reports...");
    let summary = index.run(&registry, &renderer, &mut catalog, &ctx, &options.output_dir)?;
    info!(
        "{} reports written, {} failed",
        summary.succeeded().count(),
        summary.failed().count()
    );
    Ok(summary)
}

/// Standard registry for the configured releases, narrowed to `only`.
pub fn build_registry(options: &BuildOptions) -> Result<ReportRegistry> {
    let mut registry = ReportRegistry::standard(&options.releases)?;
    if !options.only.is_empty() {
        for name in registry.enable_only(&options.only) {
            warn!("Unknown report '{}'", name);
        }
    }
    Ok(registry)
}
