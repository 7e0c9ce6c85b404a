//! Report definitions and the standard report catalog
//!
//! Rules that feed other rules are built first and handed to their
//! dependents as [`SharedRule`] handles, so the dependency graph can only
//! point backwards and is acyclic by construction.

use crate::analyzer::*;
use crate::error::ReportError;
use crate::models::{group_header, BadgeBase, Capability};
use std::collections::HashSet;
use std::sync::Arc;

pub const GENERAL_GROUP: &str = "general";

/// A named report: which group it is listed under and which rule selects
/// its rows.
#[derive(Clone)]
pub struct ReportDefinition {
    pub name: String,
    pub group: String,
    pub header: String,
    pub description: String,
    pub enabled: bool,
    pub rule: SharedRule,
}

impl ReportDefinition {
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        header: impl Into<String>,
        rule: SharedRule,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            header: header.into(),
            description: String::new(),
            enabled: true,
            rule,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportGroup {
    pub id: String,
    pub header: String,
}

/// Groups and reports in declaration order.
#[derive(Clone, Default)]
pub struct ReportRegistry {
    groups: Vec<ReportGroup>,
    reports: Vec<ReportDefinition>,
}

impl ReportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(
        &mut self,
        id: impl Into<String>,
        header: impl Into<String>,
    ) -> Result<(), ReportError> {
        let id = id.into();
        if self.groups.iter().any(|g| g.id == id) {
            return Err(ReportError::DuplicateGroup(id));
        }
        self.groups.push(ReportGroup {
            id,
            header: header.into(),
        });
        Ok(())
    }

    pub fn register(&mut self, report: ReportDefinition) -> Result<(), ReportError> {
        if self.get(&report.name).is_some() {
            return Err(ReportError::DuplicateReport(report.name));
        }
        if !self.groups.iter().any(|g| g.id == report.group) {
            return Err(ReportError::UnknownGroup {
                report: report.name,
                group: report.group,
            });
        }
        self.reports.push(report);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ReportDefinition> {
        self.reports.iter().find(|r| r.name == name)
    }

    pub fn groups(&self) -> &[ReportGroup] {
        &self.groups
    }

    pub fn reports(&self) -> &[ReportDefinition] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Reports of `group`, enabled or not, in declaration order.
    pub fn reports_in<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a ReportDefinition> {
        self.reports.iter().filter(move |r| r.group == group)
    }

    /// Disable every report not named in `names`. Returns the names that
    /// matched no report.
    pub fn enable_only(&mut self, names: &[String]) -> Vec<String> {
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        for report in &mut self.reports {
            report.enabled = wanted.contains(report.name.as_str());
        }
        names
            .iter()
            .filter(|name| self.get(name).is_none())
            .cloned()
            .collect()
    }

    /// The full report catalog for `releases`.
    ///
    /// Groups: newest release, `general`, then the older releases newest
    /// first. The oldest release only serves as the baseline of the first
    /// lost report and has no group of its own.
    pub fn standard(releases: &[u32]) -> Result<Self, ReportError> {
        let mut releases = releases.to_vec();
        releases.sort_unstable();
        releases.dedup();

        let mut registry = Self::new();
        let oldest = releases.first().copied();
        let second = releases.get(1).copied().or(oldest);
        let newest = releases.last().copied();

        // Shared dependencies.
        let wrong_order: SharedRule = Arc::new(WrongOrderRule);
        let reduced: SharedRule = Arc::new(
            VersionWindowRule::new(WindowMismatch::Reduced).with_extras(vec![
                Annotation::Discontinued,
                Annotation::ThemeExperiment,
                Annotation::Pure,
                Annotation::Contacted,
                Annotation::PendingPr,
                Annotation::Requires(Capability::Filter),
            ]),
        );
        let pure_with_limit: SharedRule = Arc::new(
            PureWithUpperLimitRule::new()
                .with_extras(vec![Annotation::Discontinued, Annotation::Contacted]),
        );
        let unbounded: SharedRule = Arc::new(UnboundedExperimentRule::new().with_extras(
            newest
                .map(|rn| {
                    vec![
                        Annotation::Discontinued,
                        Annotation::KnownCompatible(rn),
                        Annotation::PendingPr,
                        Annotation::Investigated,
                        Annotation::Contacted,
                    ]
                })
                .unwrap_or_default(),
        ));
        let no_limit = Annotation::linked(
            &unbounded,
            BadgeBase::NoLimitExperiment,
            "experiments-without-upper-limit",
        );
        let pure_link = Annotation::linked(
            &pure_with_limit,
            BadgeBase::Pure,
            "pure-webext-with-upper-limit",
        );

        if let Some(rn) = newest {
            let group = rn.to_string();
            registry.add_group(&group, group_header(rn))?;
            registry.register_release(&releases, rn, &no_limit, &pure_link)?;

            registry.register(ReportDefinition::new(
                "missing-messagesUpdate-permission",
                &group,
                format!(
                    "Extensions using <i>messages.update()</i> in Thunderbird {}, without requesting the <i>messagesUpdate</i> permission.",
                    rn
                ),
                Arc::new(MissingPermissionRule::messages_update(rn)),
            ))?;
            registry.register(ReportDefinition::new(
                format!("valid-{}-according-to-strict-max-but-atn-value-reduced", rn),
                &group,
                format!(
                    "Extensions whose strict_max_version allows installation in Thunderbird {}, but ATN value has been lowered to signal incompatibility (which is ignored during install and app upgrade).",
                    rn
                ),
                Arc::new(
                    ManuallyLoweredRule::new(rn, SharedRule::clone(&reduced))
                        .with_extras(vec![
                            Annotation::ThemeExperiment,
                            Annotation::Pure,
                            Annotation::Discontinued,
                        ])
                        .with_chain(StatusChain::new(vec![
                            Annotation::PendingPr,
                            Annotation::Contacted,
                            Annotation::BreakingApiChange,
                        ])),
                ),
            ))?;
            registry.register(ReportDefinition::new(
                "experiments-without-upper-limit",
                &group,
                "Experiments without upper limit in ATN.",
                SharedRule::clone(&unbounded),
            ))?;
            registry.register(ReportDefinition::new(
                "lost-pure-webext-with-upper-limit",
                &group,
                "Lost pure WebExtensions with an unnecessary max_version_setting (excluding theme_experiments).",
                Arc::new(
                    LostPureWithUpperLimitRule::new(rn)
                        .with_extras(vec![Annotation::KnownCompatible(rn)])
                        .with_chain(StatusChain::new(vec![
                            Annotation::Investigated,
                            Annotation::PendingPr,
                            Annotation::Contacted,
                            Annotation::BreakingApiChange,
                        ])),
                ),
            ))?;
        }

        registry.add_group(GENERAL_GROUP, "General reports")?;
        let general: Vec<(&str, String, SharedRule)> = vec![
            (
                "all",
                format!("All Extensions compatible with TB{} or newer.", label(oldest)),
                Arc::new(AnyReleaseRule) as SharedRule,
            ),
            (
                "wrong-order",
                "Extension with wrong upper limit setting in older versions, which will lead to the wrong version reported compatible by ATN.".to_string(),
                SharedRule::clone(&wrong_order),
            ),
            (
                "purge-candidates",
                format!("All Extensions not compatible with TB{}, which should be purged from ATN.", label(second)),
                Arc::new(PurgeCandidateRule) as SharedRule,
            ),
            (
                "parsing-error",
                "Extensions whose XPI files could not be parsed properly and are excluded from analysis.".to_string(),
                Arc::new(ParsingErrorRule) as SharedRule,
            ),
            (
                "recent-activity",
                "Extensions updated within the last 2 weeks.".to_string(),
                Arc::new(FreshnessRule::recent_activity()) as SharedRule,
            ),
            (
                "recent-addition",
                "Extensions created within the last year.".to_string(),
                Arc::new(FreshnessRule::recent_addition()) as SharedRule,
            ),
            (
                "requested-permissions",
                "Extensions requesting WebExtension permissions.".to_string(),
                Arc::new(RequestedPermissionsRule) as SharedRule,
            ),
            (
                "max-atn-value-raised-above-max-xpi-value",
                "Extensions whose max version has been raised in ATN above the XPI value (excluding legacy extensions).".to_string(),
                Arc::new(
                    VersionWindowRule::new(WindowMismatch::Raised)
                        .with_extras(vec![Annotation::Discontinued]),
                ) as SharedRule,
            ),
            (
                "max-atn-value-reduced-below-max-xpi-value",
                "Extensions whose max version has been reduced in ATN below the XPI value, which is ignored during install and app upgrade (excluding legacy).".to_string(),
                reduced,
            ),
            (
                "pure-webext-with-upper-limit",
                "Pure WebExtensions with an unnecessary max_version_setting (excluding theme_experiments).".to_string(),
                pure_with_limit,
            ),
            (
                "latest-current-mismatch",
                "Extensions, where the latest upload is for an older release, which will fail to install in current ESR (current = defined current in ATN) from within the add-on manager.".to_string(),
                Arc::new(LatestCurrentMismatchRule::new(wrong_order)) as SharedRule,
            ),
        ];
        for (name, header, rule) in general {
            registry.register(ReportDefinition::new(name, GENERAL_GROUP, header, rule))?;
        }

        // Older releases, newest first; the oldest has no group.
        for &release in releases.iter().rev().skip(1) {
            if Some(release) == oldest {
                break;
            }
            registry.add_group(release.to_string(), group_header(release))?;
            registry.register_release(&releases, release, &no_limit, &pure_link)?;
        }

        Ok(registry)
    }

    /// `atn-tb<release>` and the lost report leading into `release`, with the
    /// badge profile of the release's generation (0 = newest).
    fn register_release(
        &mut self,
        releases: &[u32],
        release: u32,
        no_limit: &Annotation,
        pure_link: &Annotation,
    ) -> Result<(), ReportError> {
        let Some(position) = releases.iter().position(|&r| r == release) else {
            return Ok(());
        };
        let generation = releases.len() - 1 - position;
        let group = release.to_string();

        let compatible_extras = match generation {
            0 => vec![
                Annotation::Experiment,
                Annotation::Requires(Capability::Filter),
                Annotation::Requires(Capability::Attachment),
                Annotation::Requires(Capability::RecipientChanged),
                Annotation::Discontinued,
            ],
            1 => vec![
                Annotation::Experiment,
                Annotation::Requires(Capability::Filter),
                Annotation::Investigated,
                Annotation::Requires(Capability::Attachment),
                Annotation::Requires(Capability::RecipientChanged),
                Annotation::PendingPr,
                Annotation::Discontinued,
            ],
            _ => Vec::new(),
        };
        self.register(ReportDefinition::new(
            format!("atn-tb{}", release),
            &group,
            format!(
                "Extensions compatible with Thunderbird {}, as seen by ATN.",
                release
            ),
            Arc::new(CompatibleRule::new(release).with_extras(compatible_extras)),
        ))?;

        let Some(previous) = position.checked_sub(1).map(|p| releases[p]) else {
            return Ok(());
        };
        let lost = LostRule::new(previous, release);
        let lost = match generation {
            0 => lost
                .honoring_ignore_list()
                .with_leading(vec![Annotation::Discontinued])
                .with_chain(
                    StatusChain::new(vec![
                        Annotation::Investigated,
                        Annotation::PendingPr,
                        Annotation::ContactedLinked,
                        Annotation::BreakingApiChange,
                        Annotation::Wip,
                    ])
                    .or_unknown(),
                )
                .with_extras(vec![
                    no_limit.clone(),
                    Annotation::Requires(Capability::Attachment),
                    Annotation::Requires(Capability::RecipientChanged),
                    Annotation::ThemeExperiment,
                ]),
            1 => lost
                .honoring_ignore_list()
                .with_leading(vec![Annotation::Discontinued])
                .with_chain(
                    StatusChain::new(vec![
                        Annotation::Investigated,
                        Annotation::PendingPr,
                        Annotation::Contacted,
                        Annotation::Wip,
                    ])
                    .or_unknown(),
                )
                .with_extras(vec![
                    Annotation::Requires(Capability::Filter),
                    pure_link.clone(),
                    no_limit.clone(),
                    Annotation::Requires(Capability::Attachment),
                    Annotation::Requires(Capability::RecipientChanged),
                    Annotation::ThemeExperiment,
                ]),
            2 => lost
                .with_leading(vec![
                    Annotation::AlternativeAvailable,
                    Annotation::Discontinued,
                    Annotation::Contacted,
                ])
                .with_chain(StatusChain::default().or_unknown()),
            3 => lost.with_chain(StatusChain::new(vec![Annotation::AlternativeAvailable]).or_unknown()),
            _ => lost,
        };
        self.register(ReportDefinition::new(
            format!("lost-tb{}-to-tb{}", previous, release),
            &group,
            format!(
                "Extensions which have been lost from TB{} to TB{}, as seen by ATN.",
                previous, release
            ),
            Arc::new(lost),
        ))
    }
}

fn label(release: Option<u32>) -> String {
    release
        .map(|r| r.to_string())
        .unwrap_or_else(|| "*".to_string())
}
