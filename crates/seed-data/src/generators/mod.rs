//! Entity generators for seed data.
//!
//! - [`UserProvisioner`]: Create auth principals and their profiles
//! - [`PostGenerator`]: Create posts, cascading into comments and likes
//! - [`EngagementGenerator`]: Create comments and likes on a post
//! - [`CircleGenerator`]: Create circles with memberships
//! - [`HelpGenerator`]: Create help requests with answer comments

pub mod circle;
pub mod engagement;
pub mod help;
pub mod post;
pub mod user;

pub use circle::{CircleBatch, CircleGenConfig, CircleGenerator, DEFAULT_CIRCLE_CATEGORIES};
pub use engagement::{EngagementGenConfig, EngagementGenerator};
pub use help::{DEFAULT_HELP_CATEGORIES, HelpBatch, HelpGenConfig, HelpGenerator};
pub use post::{DEFAULT_TAGS, PostBatch, PostGenConfig, PostGenerator};
pub use user::{UserGenConfig, UserProvisioner};
