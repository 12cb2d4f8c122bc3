//! Configuration types for seed data generation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Run volumes and pacing for a seeding run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Number of users to provision.
    pub user_count: usize,

    /// Number of posts to create (each cascades comments and likes).
    pub post_count: usize,

    /// Number of circles to create (each cascades memberships).
    pub circle_count: usize,

    /// Number of help requests to create (each cascades answer comments).
    pub help_post_count: usize,

    /// Delay after each post cycle, in milliseconds.
    pub post_pacing_ms: u64,

    /// Seed for the random number generator.
    pub seed: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            user_count: 3,
            post_count: 10,
            circle_count: 8,
            help_post_count: 10,
            post_pacing_ms: 500,
            seed: 12345,
        }
    }
}

impl SeedConfig {
    pub fn post_pacing(&self) -> Duration {
        Duration::from_millis(self.post_pacing_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_volumes() {
        let config = SeedConfig::default();
        assert_eq!(config.user_count, 3);
        assert_eq!(config.post_count, 10);
        assert_eq!(config.circle_count, 8);
        assert_eq!(config.help_post_count, 10);
        assert_eq!(config.post_pacing(), Duration::from_millis(500));
    }
}
