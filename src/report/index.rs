//! Running every enabled report and writing the navigation page

use super::generator::ReportRenderer;
use super::registry::{ReportDefinition, ReportGroup, ReportRegistry};
use super::template::{Template, DEFAULT_INDEX_TEMPLATE};
use crate::analyzer::ClassifierContext;
use crate::models::CatalogEntry;
use crate::utils::helpers::escape_html;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// What happened to one report during a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub name: String,
    pub group: String,
    /// Row count, or the rendering error.
    pub result: Result<usize, String>,
}

#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub reports: Vec<ReportOutcome>,
    pub index_path: PathBuf,
}

impl BuildSummary {
    pub fn succeeded(&self) -> impl Iterator<Item = &ReportOutcome> {
        self.reports.iter().filter(|r| r.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ReportOutcome> {
        self.reports.iter().filter(|r| r.result.is_err())
    }

    pub fn rows(&self, name: &str) -> Option<usize> {
        self.reports
            .iter()
            .find(|r| r.name == name)
            .and_then(|r| r.result.as_ref().ok().copied())
    }
}

/// Accumulates index sections while reports are generated.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    sections: Vec<String>,
    template_path: Option<PathBuf>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    pub fn push_group(&mut self, group: &ReportGroup) {
        self.sections.push(format!(
            "<h1><a name=\"group{}\"></a>{}</h1>",
            escape_html(&group.id),
            group.header
        ));
    }

    pub fn push_report(&mut self, report: &ReportDefinition, rows: Option<usize>) {
        let link = match rows {
            Some(rows) => format!("<a href=\"{0}.html\">{0}</a> ({1})", report.name, rows),
            None => format!("{} (failed)", report.name),
        };
        self.sections.push(format!(
            "<p>{}</p><blockquote><p>{}</p></blockquote>",
            link, report.header
        ));
    }

    pub fn render(&self, ctx: &ClassifierContext) -> Result<String> {
        let template = Template::load_or(self.template_path.as_deref(), DEFAULT_INDEX_TEMPLATE)?;
        let date = ctx.now.format("%Y-%m-%d").to_string();
        let index = self.sections.join("");
        Ok(template.fill(&[("__date__", date.as_str()), ("__index__", index.as_str())]))
    }

    /// Generate every enabled report, group by group in declaration order,
    /// then write `<out_dir>/index.html`.
    ///
    /// A failing report is logged, listed as failed and skipped; only a
    /// failure to write the index aborts the build.
    pub fn run(
        mut self,
        registry: &ReportRegistry,
        renderer: &ReportRenderer,
        catalog: &mut [CatalogEntry],
        ctx: &ClassifierContext,
        out_dir: &Path,
    ) -> Result<BuildSummary> {
        let mut summary = BuildSummary::default();

        for group in registry.groups() {
            self.push_group(group);
            for report in registry.reports_in(&group.id).filter(|r| r.enabled) {
                info!("  -> {}", report.name);
                let result = renderer.generate(catalog, report, ctx, out_dir);
                if let Err(err) = &result {
                    error!("Report {} failed: {:#}", report.name, err);
                }
                self.push_report(report, result.as_ref().ok().copied());
                summary.reports.push(ReportOutcome {
                    name: report.name.clone(),
                    group: group.id.clone(),
                    result: result.map_err(|err| format!("{:#}", err)),
                });
            }
        }

        let html = self.render(ctx)?;
        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
        let index_path = out_dir.join("index.html");
        fs::write(&index_path, html)
            .with_context(|| format!("Failed to write {}", index_path.display()))?;
        summary.index_path = index_path;

        Ok(summary)
    }
}
