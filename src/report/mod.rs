//! Report registry, rendering and the index page

pub mod badges;
pub mod generator;
pub mod index;
pub mod registry;
pub mod template;

pub use badges::{BadgeDescriptor, BadgeRegistry};
pub use generator::{assign_ranks, RenderedReport, ReportRenderer};
pub use index::{BuildSummary, IndexBuilder, ReportOutcome};
pub use registry::{ReportDefinition, ReportGroup, ReportRegistry, GENERAL_GROUP};
pub use template::Template;
