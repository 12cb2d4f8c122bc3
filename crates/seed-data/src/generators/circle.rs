//! Circle (interest group) generation with memberships.

use std::ops::RangeInclusive;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, WeightedIndex};
use tracing::{debug, info, warn};

use social::models::{Circle, CircleMembership, MembershipRole, UserProfile};
use social::store::put_record;
use social::{DocKey, DocumentStore};

use crate::content::{ContentFaker, picsum_url, token};
use crate::report::{Outcome, UnitFailure, UnitKind, record_failure};
use crate::sampling::sample_distinct;

/// Default circle categories.
pub const DEFAULT_CIRCLE_CATEGORIES: [&str; 10] = [
    "study", "hobbies", "campus", "career", "life", "feelings", "gaming", "music", "movies",
    "travel",
];

const ROLES: [MembershipRole; 2] = [MembershipRole::Member, MembershipRole::Admin];

/// Configuration for circle generation.
#[derive(Debug, Clone)]
pub struct CircleGenConfig {
    pub categories: Vec<String>,
    pub description_max_chars: usize,
    /// Seed value for the stored member count; not reconciled with actual
    /// membership rows.
    pub member_count_seed: RangeInclusive<u32>,
    pub cover_width: u32,
    pub cover_height: u32,
    /// Membership target is drawn from `min_members..=min(max_members, users)`.
    pub min_members: usize,
    pub max_members: usize,
    /// Relative weights for (member, admin).
    pub role_weights: [u32; 2],
}

impl Default for CircleGenConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CIRCLE_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            description_max_chars: 200,
            member_count_seed: 5..=50,
            cover_width: 800,
            cover_height: 300,
            min_members: 5,
            max_members: 20,
            role_weights: [3, 1],
        }
    }
}

/// Circles created in one run, with their memberships.
#[derive(Debug, Default)]
pub struct CircleBatch {
    pub circles: Vec<Circle>,
    pub memberships: Vec<CircleMembership>,
    pub failures: Vec<UnitFailure>,
}

/// Generates circles and their memberships.
pub struct CircleGenerator {
    store: Arc<dyn DocumentStore>,
    content: ContentFaker,
    config: CircleGenConfig,
}

impl CircleGenerator {
    /// Creates a new circle generator with default configuration.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, CircleGenConfig::default())
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(store: Arc<dyn DocumentStore>, config: CircleGenConfig) -> Self {
        Self {
            store,
            content: ContentFaker::new(),
            config,
        }
    }

    /// Creates `count` circles, each followed by a batch of memberships.
    pub async fn generate(
        &self,
        users: &[UserProfile],
        count: usize,
        rng: &mut impl Rng,
    ) -> CircleBatch {
        let mut batch = CircleBatch::default();

        if users.is_empty() {
            if count > 0 {
                warn!("No users available, skipping {} circles", count);
            }
            return batch;
        }

        info!("Generating {} circles...", count);

        for _ in 0..count {
            let Some(creator) = users.choose(rng) else {
                break;
            };
            let mut circle = self.build_circle(creator, rng);

            match put_record(self.store.as_ref(), DocKey::Auto, &circle).await {
                Ok(id) => circle.id = id,
                Err(e) => {
                    batch.failures.push(record_failure(
                        UnitKind::Circle,
                        format!("creator {}", creator.id),
                        e,
                    ));
                    continue;
                }
            }
            debug!(circle_id = %circle.id, name = %circle.name, "Created circle");

            let target = self.membership_target(users.len(), rng);
            let members = self.add_members(&circle.id, users, target, rng).await;

            batch.memberships.extend(members.created);
            batch.failures.extend(members.failures);
            batch.circles.push(circle);
        }

        info!(
            "Generated {} circles, {} memberships",
            batch.circles.len(),
            batch.memberships.len()
        );
        batch
    }

    /// Adds up to `target` distinct users to a circle.
    ///
    /// Clamps to the number of available users; `users` is not modified.
    pub async fn add_members(
        &self,
        circle_id: &str,
        users: &[UserProfile],
        target: usize,
        rng: &mut impl Rng,
    ) -> Outcome<CircleMembership> {
        let mut outcome = Outcome::new();
        let roles = match WeightedIndex::new(self.config.role_weights) {
            Ok(dist) => Some(dist),
            Err(e) => {
                warn!("Invalid role weights {:?}: {e}", self.config.role_weights);
                None
            }
        };

        for user in sample_distinct(users, target, rng) {
            let role = roles
                .as_ref()
                .map_or(MembershipRole::Member, |dist| ROLES[dist.sample(rng)]);
            let membership = CircleMembership {
                user_id: user.id.clone(),
                circle_id: circle_id.to_string(),
                role,
            };

            match put_record(
                self.store.as_ref(),
                DocKey::named(membership.key()),
                &membership,
            )
            .await
            {
                Ok(_) => {
                    debug!(circle_id, user_id = %user.id, role = role.as_str(), "Added member");
                    outcome.push(membership);
                }
                Err(e) => outcome.fail(UnitKind::Membership, membership.key(), e),
            }
        }

        outcome
    }

    /// Draws how many members a new circle should get.
    fn membership_target(&self, available: usize, rng: &mut impl Rng) -> usize {
        let min = self.config.min_members;
        let upper = self.config.max_members.min(available).max(min);
        rng.gen_range(min..=upper)
    }

    /// Builds an unsaved circle.
    fn build_circle(&self, creator: &UserProfile, rng: &mut impl Rng) -> Circle {
        let category = self
            .config
            .categories
            .choose(rng)
            .cloned()
            .unwrap_or_default();
        let word = self.content.word(rng);

        Circle {
            id: String::new(),
            name: format!("{category} Circle - {word}"),
            description: self.content.text(self.config.description_max_chars, rng),
            category,
            creator_id: creator.id.clone(),
            member_count: rng.gen_range(self.config.member_count_seed.clone()),
            is_private: rng.r#gen(),
            cover_image_url: picsum_url(
                self.config.cover_width,
                self.config.cover_height,
                token(rng),
            ),
        }
    }
}
