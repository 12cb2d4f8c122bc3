//! Seed data generation for the Green social app.
//!
//! Provisions test users and fills the store with posts, comments, likes,
//! circles with memberships, and help requests with answer comments. Every
//! write goes through the collaborator traits from the `social` crate, so a
//! run can target Postgres, Firebase, or an in-memory store.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seed_data::prelude::*;
//!
//! let services = Backend::from_env()?.connect().await?;
//! let mut rng = StdRng::seed_from_u64(12345);
//!
//! let result = ScenarioBuilder::new()
//!     .with_users(3)
//!     .with_posts(10)
//!     .build(&services, &mut rng)
//!     .await;
//! ```

pub mod api;
pub mod builders;
pub mod config;
pub mod content;
pub mod db;
pub mod generators;
pub mod report;
pub mod sampling;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::builders::{ScenarioBuilder, ScenarioMetrics, ScenarioResult, ScenarioSummary};
    pub use crate::config::SeedConfig;
    pub use crate::db::{Backend, SeedServices};
    pub use crate::generators::{
        CircleGenerator, EngagementGenerator, HelpGenerator, PostGenerator, UserProvisioner,
    };
    pub use crate::report::{Outcome, SeedError, UnitFailure, UnitKind};
    pub use crate::sampling::sample_distinct;
}
