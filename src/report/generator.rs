//! Rendering one report: rows, badge statistics, template substitution

use super::badges::{BadgeDescriptor, BadgeRegistry};
use super::registry::ReportDefinition;
use super::template::{Template, DEFAULT_REPORT_TEMPLATE};
use crate::analyzer::ClassifierContext;
use crate::error::ReportError;
use crate::models::{
    Alternative, BadgeKind, CatalogEntry, CompatibilityIndex, ParsedArtifact, ReleaseLabel, RowData,
};
use crate::utils::helpers::escape_html;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Visible length of the add-on name column.
const NAME_WIDTH: usize = 38;

/// Experiment API names listed in a version cell tooltip.
const MAX_LISTED_APIS: usize = 14;

/// Output of rendering one report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub rows: usize,
    /// Badge counts, most frequent first; ties keep first-seen order.
    pub stats: Vec<(BadgeKind, usize)>,
    pub html: String,
}

/// Renders reports over a popularity-sorted catalog.
pub struct ReportRenderer {
    badges: BadgeRegistry,
    template_path: Option<PathBuf>,
}

impl ReportRenderer {
    pub fn new(badges: BadgeRegistry) -> Self {
        Self {
            badges,
            template_path: None,
        }
    }

    /// Read the report template from `path` instead of the embedded one.
    /// The file is read anew for every report.
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = Some(path.into());
        self
    }

    pub fn badges(&self) -> &BadgeRegistry {
        &self.badges
    }

    /// Render `report` and write it to `<out_dir>/<name>.html`. Returns the
    /// row count.
    pub fn generate(
        &self,
        catalog: &mut [CatalogEntry],
        report: &ReportDefinition,
        ctx: &ClassifierContext,
        out_dir: &Path,
    ) -> Result<usize> {
        let rendered = self
            .render(catalog, report, ctx)
            .with_context(|| format!("Failed to render report {}", report.name))?;

        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;
        let path = out_dir.join(format!("{}.html", report.name));
        fs::write(&path, &rendered.html)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("{}: {} rows", report.name, rendered.rows);
        Ok(rendered.rows)
    }

    /// Classify every entry with the report's rule and fill the template.
    pub fn render(
        &self,
        catalog: &mut [CatalogEntry],
        report: &ReportDefinition,
        ctx: &ClassifierContext,
    ) -> Result<RenderedReport, ReportError> {
        let template = Template::load_or(self.template_path.as_deref(), DEFAULT_REPORT_TEMPLATE)?;
        assign_ranks(catalog);

        let mut rows = Vec::new();
        let mut seen: Vec<BadgeKind> = Vec::new();
        let mut counts: Vec<usize> = Vec::new();
        for entry in catalog.iter() {
            let row = report.rule.row_data(entry, ctx);
            if !row.include {
                debug!("Skip {}", entry.slug);
                continue;
            }
            rows.push(self.render_row(entry, &row, ctx)?);
            for badge in &row.badges {
                match seen.iter().position(|kind| *kind == badge.kind) {
                    Some(i) => counts[i] += 1,
                    None => {
                        seen.push(badge.kind.clone());
                        counts.push(1);
                    }
                }
            }
        }

        let mut stats: Vec<(BadgeKind, usize)> = seen.into_iter().zip(counts).collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1));

        let count = rows.len().to_string();
        let date = ctx.now.format("%Y-%m-%d").to_string();
        let table = std::iter::once(header_row(&ctx.releases))
            .chain(rows.iter().cloned())
            .collect::<Vec<_>>()
            .join("\n");
        let stats_html = self.render_stats(&stats)?;

        let html = template.fill(&[
            ("__header__", report.header.as_str()),
            ("__description__", report.description.as_str()),
            ("__count__", count.as_str()),
            ("__date__", date.as_str()),
            ("__table__", table.as_str()),
            ("__stats__", stats_html.as_str()),
        ]);

        Ok(RenderedReport {
            rows: rows.len(),
            stats,
            html,
        })
    }

    fn render_stats(&self, stats: &[(BadgeKind, usize)]) -> Result<String, ReportError> {
        if stats.is_empty() {
            return Ok(String::new());
        }
        let mut lines = vec![
            "<h3>Statistics</h3>".to_string(),
            "<table class='statstable'>".to_string(),
        ];
        for (kind, count) in stats {
            lines.push(format!(
                "<tr><td style=\"text-align: right\">{}</td><td>{}</td></tr>",
                count,
                self.badges.render_kind(kind)?
            ));
        }
        lines.push("</table>".to_string());
        Ok(lines.join("\n"))
    }

    fn render_row(
        &self,
        entry: &CatalogEntry,
        row: &RowData,
        ctx: &ClassifierContext,
    ) -> Result<String, ReportError> {
        let current = entry.data(ReleaseLabel::Current);
        let uploaded = current
            .and_then(ParsedArtifact::uploaded)
            .and_then(|ts| ts.split('T').next())
            .unwrap_or_default();

        let badges = row
            .badges
            .iter()
            .map(|badge| self.badges.render(badge))
            .collect::<Result<Vec<_>, _>>()?
            .join("<br>");

        let mut cells = vec![
            cell(&entry.rank().map(|r| r.to_string()).unwrap_or_default()),
            cell(&entry.id.to_string()),
            format!(
                "<td style=\"text-align: left\" valign=\"top\">{}{}</td>",
                name_link(entry),
                ctx.alternatives
                    .get(&entry.guid)
                    .map(alternative_links)
                    .unwrap_or_default()
            ),
            cell(&entry.average_daily_users.to_string()),
        ];
        cells.extend(
            ctx.releases
                .iter()
                .map(|&release| cell(&version_cell(entry, ReleaseLabel::Esr(release)))),
        );
        cells.push(cell(uploaded));
        cells.push(cell(&version_cell(entry, ReleaseLabel::Current)));
        cells.push(cell(&escape_html(current.map(ParsedArtifact::atn_min).unwrap_or("*"))));
        cells.push(cell(&escape_html(current.map(ParsedArtifact::strict_max).unwrap_or("*"))));
        cells.push(cell(&escape_html(current.map(ParsedArtifact::atn_max).unwrap_or("*"))));
        cells.push(format!(
            "<td style=\"text-align: right; font-style: italic\" valign=\"top\">{}</td>",
            badges
        ));

        Ok(format!("<tr>\n  {}\n</tr>", cells.join("\n  ")))
    }
}

/// Annotate every entry with its 1-based position. Entries without a
/// compatibility index get an empty one.
pub fn assign_ranks(catalog: &mut [CatalogEntry]) {
    for (index, entry) in catalog.iter_mut().enumerate() {
        let xpilib = entry.xpilib.get_or_insert_with(|| {
            error!("Compatibility data missing: {}", entry.slug);
            CompatibilityIndex::default()
        });
        xpilib.rank = Some(index + 1);
    }
}

fn cell(content: &str) -> String {
    format!("<td style=\"text-align: right\" valign=\"top\">{}</td>", content)
}

fn header_row(releases: &[u32]) -> String {
    let mut columns: Vec<String> = ["Rank", "ID", "Name", "Average Daily Users"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    columns.extend(releases.iter().map(u32::to_string));
    columns.extend(
        ["Current Upload", "Current", "ATN Min", "Strict Max", "ATN Max", "Status"]
            .iter()
            .map(|c| c.to_string()),
    );
    let columns: Vec<String> = columns.iter().map(|c| format!("<th>{}</th>", c)).collect();
    format!("<tr>{}</tr>", columns.join(""))
}

fn name_link(entry: &CatalogEntry) -> String {
    let name: String = entry.display_name().chars().take(NAME_WIDTH).collect();
    format!(
        "<a id=\"{}-{}\" href=\"{}\">{}</a>",
        entry.id,
        escape_html(&entry.slug),
        escape_html(&entry.url),
        escape_html(&name)
    )
}

fn alternative_links(alternatives: &[Alternative]) -> String {
    alternatives
        .iter()
        .map(|alt| match &alt.link {
            Some(link) => format!(
                "<br> &#8627; <a href=\"{}\">{}</a>",
                escape_html(link),
                escape_html(&alt.name)
            ),
            None => format!("<br> &#8627; {}", escape_html(&alt.name)),
        })
        .collect()
}

/// Version string plus the packaging badges of the artifact serving `label`.
fn version_cell(entry: &CatalogEntry, label: ReleaseLabel) -> String {
    let Some(resolved) = entry.resolve(label) else {
        return String::new();
    };
    let mut parts = vec![escape_html(resolved.version)];
    parts.extend(artifact_badges(resolved.data).iter().map(|b| b.to_html(None)));
    parts.join("<br>")
}

fn artifact_badges(data: &ParsedArtifact) -> Vec<BadgeDescriptor> {
    let mut badges = Vec::new();

    let (kind, description) = match (data.mext, data.legacy) {
        (true, false) => ("MX", "MailExtension (manifest.json)"),
        (true, true) => ("WE", "Legacy WebExtension (manifest.json)"),
        _ => ("RDF", "Legacy Extension (install.rdf)"),
    };
    badges.push(
        BadgeDescriptor::new("T", kind, "purple")
            .with_tooltip(format!("Extension Type:\n - {} : {}", kind, description)),
    );

    if data.legacy {
        let (kind, description) = if data.is_xul_legacy() {
            ("XUL", "XUL overlay (requires restart)")
        } else {
            ("BS", "Bootstrap")
        };
        badges.push(
            BadgeDescriptor::new("L", kind, "green")
                .with_tooltip(format!("Legacy Type:\n - {} : {}", kind, description)),
        );
    }

    if data.has_theme_experiment() {
        badges.push(BadgeDescriptor::new("E", "Theme", "blue").with_tooltip("Theme Experiment"));
    }

    if data.experiment {
        let names = &data.experiment_schema_names;
        let kind = if names.iter().any(|n| n == "WindowListener") {
            "WL"
        } else if names.iter().any(|n| n == "BootstrapLoader") {
            "BL"
        } else {
            "+"
        };
        let mut tooltip = String::from("Experiment APIs: ");
        for name in names.iter().take(MAX_LISTED_APIS) {
            tooltip.push_str("\n - ");
            tooltip.push_str(name);
        }
        if names.len() > MAX_LISTED_APIS + 1 {
            tooltip.push_str("\n ...");
        }
        badges.push(BadgeDescriptor::new("E", kind, "blue").with_tooltip(tooltip));
    }

    badges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::testing::{context, entry, pure_artifact};
    use crate::analyzer::{LostRule, Rule, SharedRule};
    use crate::models::{ArtifactManifest, Badge, BadgeBase};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use test_case::test_case;

    struct FixedRule(Vec<(u64, Vec<Badge>)>);

    impl Rule for FixedRule {
        fn row_data(&self, entry: &CatalogEntry, _ctx: &ClassifierContext) -> RowData {
            self.0
                .iter()
                .find(|(id, _)| *id == entry.id)
                .map(|(_, badges)| RowData::included(badges.clone()))
                .unwrap_or_default()
        }
    }

    fn definition(rule: SharedRule) -> ReportDefinition {
        ReportDefinition::new("test-report", "general", "Test header", rule)
    }

    #[test]
    fn test_ranks_follow_catalog_order() {
        let mut catalog = vec![entry(10, &[]), entry(20, &[]), entry(30, &[])];
        catalog[1].xpilib = None;
        assign_ranks(&mut catalog);
        let ranks: Vec<_> = catalog.iter().map(|e| e.rank()).collect();
        assert_eq!(ranks, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_stats_sorted_with_stable_ties() {
        let rule = FixedRule(vec![
            (1, vec![Badge::new(BadgeBase::Wip), Badge::new(BadgeBase::Pure)]),
            (2, vec![Badge::new(BadgeBase::Contacted), Badge::new(BadgeBase::Pure)]),
            (3, vec![Badge::new(BadgeBase::Unknown)]),
        ]);
        let report = definition(Arc::new(rule));
        let renderer = ReportRenderer::new(BadgeRegistry::standard());
        let ctx = context();
        let mut catalog = vec![entry(1, &[]), entry(2, &[]), entry(3, &[]), entry(4, &[])];

        let first = renderer.render(&mut catalog, &report, &ctx).unwrap();
        assert_eq!(first.rows, 3);
        let order: Vec<_> = first.stats.iter().map(|(k, n)| (k.base, *n)).collect();
        assert_eq!(
            order,
            vec![
                (BadgeBase::Pure, 2),
                (BadgeBase::Wip, 1),
                (BadgeBase::Contacted, 1),
                (BadgeBase::Unknown, 1),
            ]
        );

        let second = renderer.render(&mut catalog, &report, &ctx).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_template_substitution() {
        let report = definition(Arc::new(FixedRule(vec![(1, Vec::new())])))
            .with_description("Only one");
        let renderer = ReportRenderer::new(BadgeRegistry::standard());
        let mut catalog = vec![entry(1, &[("128", "2.0", pure_artifact())])];

        let html = renderer.render(&mut catalog, &report, &context()).unwrap().html;
        assert!(html.contains("<h2>Test header</h2>"));
        assert!(html.contains("<p>Only one</p>"));
        assert!(html.contains("<b>1</b> (generated on 2024-06-15)"));
        assert!(html.contains("<a id=\"1-addon-1\" href=\"https://addons.thunderbird.net/addon/addon-1/\">Add-on 1</a>"));
        assert!(html.contains("2.0<br><img src='https://img.shields.io/badge/T-MX-purple.svg'"));
        assert!(!html.contains("__table__"));
        assert!(!html.contains("<h3>Statistics</h3>"));
    }

    #[test]
    fn test_unknown_badge_fails_report() {
        let rule = FixedRule(vec![(1, vec![Badge::new(BadgeBase::StatusBarApi)])]);
        let renderer = ReportRenderer::new(BadgeRegistry::empty());
        let err = renderer
            .render(&mut vec![entry(1, &[])], &definition(Arc::new(rule)), &context())
            .unwrap_err();
        assert!(matches!(err, ReportError::UnknownBadge(_)));
    }

    #[test]
    fn test_name_truncated_and_alternatives_listed() {
        let mut ctx = context();
        ctx.alternatives.insert(
            "addon-1@example.org",
            Alternative {
                name: "Better <Tool>".to_string(),
                link: Some("https://example.org/better".to_string()),
            },
        );
        let mut e = entry(1, &[]);
        e.name.insert("en-US".to_string(), Some("A".repeat(50)));

        let report = definition(Arc::new(FixedRule(vec![(1, Vec::new())])));
        let html = ReportRenderer::new(BadgeRegistry::standard())
            .render(&mut vec![e], &report, &ctx)
            .unwrap()
            .html;
        assert!(html.contains(&format!(">{}</a>", "A".repeat(38))));
        assert!(html.contains("<br> &#8627; <a href=\"https://example.org/better\">Better &lt;Tool&gt;</a>"));
    }

    #[test_case(true, false, None, false, false, &[], &["MX"] ; "mail extension")]
    #[test_case(true, true, None, false, false, &[], &["WE", "BS"] ; "legacy webextension")]
    #[test_case(false, true, Some("xul"), false, false, &[], &["RDF", "XUL"] ; "xul overlay")]
    #[test_case(false, true, Some("bootstrap"), false, false, &[], &["RDF", "BS"] ; "bootstrapped")]
    #[test_case(false, false, None, false, false, &[], &["RDF"] ; "plain rdf")]
    #[test_case(true, false, None, true, false, &[], &["MX", "Theme"] ; "theme experiment")]
    #[test_case(true, false, None, false, true, &["WindowListener", "Tabs"], &["MX", "WL"] ; "window listener")]
    #[test_case(true, false, None, false, true, &["BootstrapLoader"], &["MX", "BL"] ; "bootstrap loader")]
    #[test_case(true, false, None, false, true, &["BootstrapLoader", "WindowListener"], &["MX", "WL"] ; "window listener wins")]
    #[test_case(true, false, None, false, true, &[], &["MX", "+"] ; "other experiment")]
    #[test_case(true, false, None, true, true, &["Foo"], &["MX", "Theme", "+"] ; "theme and experiment")]
    fn test_version_cell_badges(
        mext: bool,
        legacy: bool,
        legacy_type: Option<&str>,
        theme: bool,
        experiment: bool,
        schemas: &[&str],
        expected: &[&str],
    ) {
        let data = ParsedArtifact {
            mext,
            legacy,
            legacy_type: legacy_type.map(str::to_string),
            experiment,
            experiment_schema_names: schemas.iter().map(|s| s.to_string()).collect(),
            manifest: theme.then(|| ArtifactManifest {
                theme_experiment: Some(serde_json::json!({ "stylesheet": "theme.css" })),
                ..Default::default()
            }),
            ..Default::default()
        };
        let rights: Vec<String> = artifact_badges(&data).into_iter().map(|b| b.right).collect();
        assert_eq!(rights, expected);
    }

    #[test]
    fn test_experiment_tooltip_truncation() {
        let mut data = pure_artifact();
        data.experiment = true;
        data.experiment_schema_names = (0..16).map(|i| format!("Api{}", i)).collect();
        let badges = artifact_badges(&data);
        let tooltip = badges.last().unwrap().tooltip.clone().unwrap();
        assert_eq!(badges.last().unwrap().right, "+");
        assert!(tooltip.contains(" - Api13"));
        assert!(!tooltip.contains(" - Api14"));
        assert!(tooltip.ends_with("\n ..."));

        data.experiment_schema_names.truncate(15);
        data.experiment_schema_names.push("WindowListener".to_string());
        data.experiment_schema_names.remove(0);
        let tooltip = artifact_badges(&data).pop().unwrap().tooltip.unwrap();
        assert!(!tooltip.ends_with("..."));
    }

    #[test]
    fn test_lost_report_render() {
        let report = definition(Arc::new(LostRule::new(102, 115)));
        let mut catalog = vec![
            entry(1, &[("102", "1.0", pure_artifact())]),
            entry(2, &[("102", "1.0", pure_artifact()), ("115", "2.0", pure_artifact())]),
        ];
        let rendered = ReportRenderer::new(BadgeRegistry::standard())
            .render(&mut catalog, &report, &context())
            .unwrap();
        assert_eq!(rendered.rows, 1);
    }
}
