//! Fluent builder API for seeding runs.
//!
//! The [`ScenarioBuilder`] sequences every generator against one set of
//! injected collaborators and collects what was created.

mod scenario;

pub use scenario::{ScenarioBuilder, ScenarioMetrics, ScenarioResult, ScenarioSummary};
