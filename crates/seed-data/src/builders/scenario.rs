//! Fluent builder for a complete seeding run.

use std::fmt;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::info;

use social::models::{
    Circle, CircleMembership, Comment, HelpComment, HelpPost, Like, Post, UserProfile,
};

use crate::config::SeedConfig;
use crate::db::SeedServices;
use crate::generators::{
    CircleGenConfig, CircleGenerator, EngagementGenConfig, EngagementGenerator, HelpGenConfig,
    HelpGenerator, PostGenConfig, PostGenerator, UserGenConfig, UserProvisioner,
};
use crate::report::{UnitFailure, UnitKind};

/// Everything created by one run, plus the units that failed.
#[derive(Debug, Default)]
pub struct ScenarioResult {
    pub users: Vec<UserProfile>,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub likes: Vec<Like>,
    pub circles: Vec<Circle>,
    pub memberships: Vec<CircleMembership>,
    pub help_posts: Vec<HelpPost>,
    pub help_comments: Vec<HelpComment>,
    /// Failed units in the order they happened.
    pub failures: Vec<UnitFailure>,
    /// Metrics from the run (populated if metrics tracking enabled).
    pub metrics: Option<ScenarioMetrics>,
}

impl ScenarioResult {
    /// Per-entity counts for logging.
    pub fn summary(&self) -> ScenarioSummary {
        ScenarioSummary {
            users: self.users.len(),
            posts: self.posts.len(),
            comments: self.comments.len(),
            likes: self.likes.len(),
            circles: self.circles.len(),
            memberships: self.memberships.len(),
            help_posts: self.help_posts.len(),
            help_comments: self.help_comments.len(),
            failures: self.failures.len(),
        }
    }

    /// Number of recorded failures of one kind.
    pub fn failures_of(&self, unit: UnitKind) -> usize {
        self.failures.iter().filter(|f| f.unit == unit).count()
    }
}

/// Record counts of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScenarioSummary {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
    pub likes: usize,
    pub circles: usize,
    pub memberships: usize,
    pub help_posts: usize,
    pub help_comments: usize,
    pub failures: usize,
}

impl fmt::Display for ScenarioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} users, {} posts, {} comments, {} likes, {} circles, {} memberships, \
             {} help posts, {} help comments, {} failures",
            self.users,
            self.posts,
            self.comments,
            self.likes,
            self.circles,
            self.memberships,
            self.help_posts,
            self.help_comments,
            self.failures
        )
    }
}

/// Timing metrics from a run.
#[derive(Debug, Clone)]
pub struct ScenarioMetrics {
    /// Time spent provisioning users (milliseconds).
    pub users_time_ms: u64,
    /// Time spent on posts, including their comments, likes, and pacing.
    pub posts_time_ms: u64,
    /// Time spent on circles and memberships.
    pub circles_time_ms: u64,
    /// Time spent on help requests and their comments.
    pub help_time_ms: u64,
    /// Wall time for the whole run.
    pub total_time_ms: u64,
    /// Successful record writes across all entity kinds.
    pub records_created: usize,
}

/// Builder for a complete seeding run.
///
/// Phases run strictly in order: users, posts (with comments and likes),
/// circles (with memberships), help requests (with comments). Nothing is
/// rolled back when a unit fails.
///
/// # Example
///
/// ```rust,ignore
/// let result = ScenarioBuilder::new()
///     .with_users(3)
///     .with_posts(10)
///     .with_circles(8)
///     .with_help_posts(10)
///     .build(&services, &mut rng)
///     .await;
/// ```
pub struct ScenarioBuilder {
    user_count: usize,
    user_config: UserGenConfig,

    post_count: usize,
    post_config: PostGenConfig,
    engagement_config: EngagementGenConfig,

    circle_count: usize,
    circle_config: CircleGenConfig,

    help_post_count: usize,
    help_config: HelpGenConfig,

    track_metrics: bool,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioBuilder {
    /// Creates a builder with the default run volumes.
    pub fn new() -> Self {
        Self::from_config(&SeedConfig::default())
    }

    /// Creates a builder with volumes and pacing taken from `config`.
    pub fn from_config(config: &SeedConfig) -> Self {
        Self {
            user_count: config.user_count,
            user_config: UserGenConfig::default(),
            post_count: config.post_count,
            post_config: PostGenConfig {
                pacing: config.post_pacing(),
                ..Default::default()
            },
            engagement_config: EngagementGenConfig::default(),
            circle_count: config.circle_count,
            circle_config: CircleGenConfig::default(),
            help_post_count: config.help_post_count,
            help_config: HelpGenConfig::default(),
            track_metrics: false,
        }
    }

    /// Sets the number of users to provision.
    pub fn with_users(mut self, count: usize) -> Self {
        self.user_count = count;
        self
    }

    /// Sets the number of posts to create.
    pub fn with_posts(mut self, count: usize) -> Self {
        self.post_count = count;
        self
    }

    /// Sets the number of circles to create.
    pub fn with_circles(mut self, count: usize) -> Self {
        self.circle_count = count;
        self
    }

    /// Sets the number of help requests to create.
    pub fn with_help_posts(mut self, count: usize) -> Self {
        self.help_post_count = count;
        self
    }

    /// Sets the delay after each post cycle. `Duration::ZERO` disables it.
    pub fn with_post_pacing(mut self, pacing: Duration) -> Self {
        self.post_config.pacing = pacing;
        self
    }

    pub fn with_user_config(mut self, config: UserGenConfig) -> Self {
        self.user_config = config;
        self
    }

    /// Replaces the post configuration, including its pacing.
    pub fn with_post_config(mut self, config: PostGenConfig) -> Self {
        self.post_config = config;
        self
    }

    pub fn with_engagement_config(mut self, config: EngagementGenConfig) -> Self {
        self.engagement_config = config;
        self
    }

    pub fn with_circle_config(mut self, config: CircleGenConfig) -> Self {
        self.circle_config = config;
        self
    }

    pub fn with_help_config(mut self, config: HelpGenConfig) -> Self {
        self.help_config = config;
        self
    }

    /// Enables timing metrics on the result.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.track_metrics = enabled;
        self
    }

    /// Runs every phase against the given collaborators.
    ///
    /// Per-unit failures never abort the run; they are collected in
    /// [`ScenarioResult::failures`].
    pub async fn build(self, services: &SeedServices, rng: &mut impl Rng) -> ScenarioResult {
        let run_start = Instant::now();
        let mut result = ScenarioResult::default();

        // Users
        let phase_start = Instant::now();
        let users = UserProvisioner::with_config(
            services.identity.clone(),
            services.store.clone(),
            self.user_config,
        )
        .provision(self.user_count, rng)
        .await;
        result.users = users.created;
        result.failures.extend(users.failures);
        let users_time = phase_start.elapsed();

        // Posts, cascading comments and likes
        let phase_start = Instant::now();
        let engagement =
            EngagementGenerator::with_config(services.store.clone(), self.engagement_config);
        let posts = PostGenerator::with_config(services.store.clone(), engagement, self.post_config)
            .generate(&result.users, self.post_count, rng)
            .await;
        result.posts = posts.posts;
        result.comments = posts.comments;
        result.likes = posts.likes;
        result.failures.extend(posts.failures);
        let posts_time = phase_start.elapsed();

        // Circles, cascading memberships
        let phase_start = Instant::now();
        let circles = CircleGenerator::with_config(services.store.clone(), self.circle_config)
            .generate(&result.users, self.circle_count, rng)
            .await;
        result.circles = circles.circles;
        result.memberships = circles.memberships;
        result.failures.extend(circles.failures);
        let circles_time = phase_start.elapsed();

        // Help requests, cascading help comments
        let phase_start = Instant::now();
        let help = HelpGenerator::with_config(services.store.clone(), self.help_config)
            .generate(&result.users, self.help_post_count, rng)
            .await;
        result.help_posts = help.help_posts;
        result.help_comments = help.help_comments;
        result.failures.extend(help.failures);
        let help_time = phase_start.elapsed();

        if self.track_metrics {
            let summary = result.summary();
            result.metrics = Some(ScenarioMetrics {
                users_time_ms: users_time.as_millis() as u64,
                posts_time_ms: posts_time.as_millis() as u64,
                circles_time_ms: circles_time.as_millis() as u64,
                help_time_ms: help_time.as_millis() as u64,
                total_time_ms: run_start.elapsed().as_millis() as u64,
                records_created: summary.users
                    + summary.posts
                    + summary.comments
                    + summary.likes
                    + summary.circles
                    + summary.memberships
                    + summary.help_posts
                    + summary.help_comments,
            });
        }

        info!("Scenario finished: {}", result.summary());
        result
    }
}
