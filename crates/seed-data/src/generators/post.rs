//! Post generation with cascading comments and likes.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use social::DocKey;
use social::DocumentStore;
use social::models::{Byline, Comment, Like, Post, UserProfile, Visibility};
use social::store::put_record;

use crate::content::{ContentFaker, picsum_url, token};
use crate::generators::engagement::EngagementGenerator;
use crate::report::{UnitFailure, UnitKind, record_failure};
use crate::sampling::sample_distinct;

/// Default tag vocabulary.
pub const DEFAULT_TAGS: [&str; 10] = [
    "study",
    "life",
    "feelings",
    "rant",
    "help",
    "sharing",
    "campus",
    "career",
    "entertainment",
    "tech",
];

/// Configuration for post generation.
#[derive(Debug, Clone)]
pub struct PostGenConfig {
    /// Tag vocabulary; each post draws distinct tags from it.
    pub tags: Vec<String>,
    pub tags_per_post: RangeInclusive<usize>,
    pub images_per_post: RangeInclusive<usize>,
    pub image_width: RangeInclusive<u32>,
    pub image_height: RangeInclusive<u32>,
    /// Sentences per post body.
    pub sentences: RangeInclusive<usize>,
    pub like_seed: RangeInclusive<u32>,
    pub share_seed: RangeInclusive<u32>,
    /// Comments created on each post right after it is stored.
    pub comments_per_post: RangeInclusive<usize>,
    /// Likes requested on each post right after it is stored.
    pub likes_per_post: RangeInclusive<usize>,
    /// Delay after each post cycle to throttle store requests.
    pub pacing: Duration,
}

impl Default for PostGenConfig {
    fn default() -> Self {
        Self {
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            tags_per_post: 1..=3,
            images_per_post: 0..=3,
            image_width: 800..=1200,
            image_height: 600..=800,
            sentences: 3..=8,
            like_seed: 0..=100,
            share_seed: 0..=10,
            comments_per_post: 0..=10,
            likes_per_post: 0..=20,
            pacing: Duration::from_millis(500),
        }
    }
}

/// Posts created in one run, with the comments and likes they cascaded.
#[derive(Debug, Default)]
pub struct PostBatch {
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub likes: Vec<Like>,
    pub failures: Vec<UnitFailure>,
}

/// Generates posts authored by provisioned users.
pub struct PostGenerator {
    store: Arc<dyn DocumentStore>,
    engagement: EngagementGenerator,
    content: ContentFaker,
    config: PostGenConfig,
}

impl PostGenerator {
    /// Creates a new post generator with default configuration.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let engagement = EngagementGenerator::new(store.clone());
        Self::with_config(store, engagement, PostGenConfig::default())
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(
        store: Arc<dyn DocumentStore>,
        engagement: EngagementGenerator,
        config: PostGenConfig,
    ) -> Self {
        Self {
            store,
            engagement,
            content: ContentFaker::new(),
            config,
        }
    }

    /// Creates `count` posts, each followed by its comments and likes.
    ///
    /// Each post's in-memory `comment_count` ends up equal to the number of
    /// counter increments that succeeded, matching the stored value.
    pub async fn generate(
        &self,
        users: &[UserProfile],
        count: usize,
        rng: &mut impl Rng,
    ) -> PostBatch {
        let mut batch = PostBatch::default();

        if users.is_empty() {
            if count > 0 {
                warn!("No users available, skipping {} posts", count);
            }
            return batch;
        }

        info!("Generating {} posts...", count);

        for _ in 0..count {
            let Some(author) = users.choose(rng) else {
                break;
            };
            let mut post = self.build_post(author, rng);

            match put_record(self.store.as_ref(), DocKey::Auto, &post).await {
                Ok(id) => post.id = id,
                Err(e) => {
                    batch.failures.push(record_failure(
                        UnitKind::Post,
                        format!("author {}", author.id),
                        e,
                    ));
                    continue;
                }
            }
            debug!(
                post_id = %post.id,
                author_id = %author.id,
                visibility = post.visibility.as_str(),
                "Created post"
            );

            let num_comments = rng.gen_range(self.config.comments_per_post.clone());
            let comments = self
                .engagement
                .generate_comments(&post.id, users, num_comments, rng)
                .await;
            let counted = comments.len() - comments.failures_of(UnitKind::CommentCounter);
            post.comment_count += counted as u32;

            let num_likes = rng.gen_range(self.config.likes_per_post.clone());
            let likes = self
                .engagement
                .generate_likes(&post.id, users, num_likes, rng)
                .await;

            batch.comments.extend(comments.created);
            batch.likes.extend(likes.created);
            batch.failures.extend(comments.failures);
            batch.failures.extend(likes.failures);
            batch.posts.push(post);

            if !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }
        }

        info!(
            "Generated {} posts, {} comments, {} likes",
            batch.posts.len(),
            batch.comments.len(),
            batch.likes.len()
        );
        batch
    }

    /// Builds an unsaved post with seeded counters.
    fn build_post(&self, author: &UserProfile, rng: &mut impl Rng) -> Post {
        let num_images = rng.gen_range(self.config.images_per_post.clone());
        let image_urls = (0..num_images)
            .map(|_| {
                let width = rng.gen_range(self.config.image_width.clone());
                let height = rng.gen_range(self.config.image_height.clone());
                picsum_url(width, height, token(rng))
            })
            .collect();

        let num_tags = rng.gen_range(self.config.tags_per_post.clone());
        let tags = sample_distinct(&self.config.tags, num_tags, rng)
            .into_iter()
            .cloned()
            .collect();

        let sentences = rng.gen_range(self.config.sentences.clone());
        let visibility = Visibility::ALL[rng.gen_range(0..Visibility::ALL.len())];

        Post {
            id: String::new(),
            content: self.content.paragraph(sentences, rng),
            image_urls,
            tags,
            visibility,
            byline: Byline::new(&author.id, &author.nickname, rng.r#gen()),
            like_count: rng.gen_range(self.config.like_seed.clone()),
            // Comments are generated right after and increment this
            comment_count: 0,
            share_count: rng.gen_range(self.config.share_seed.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use social::MemoryStore;
    use social::models::{ANONYMOUS_LABEL, COMMENT_COUNT_FIELD, collections};

    fn users(n: usize) -> Vec<UserProfile> {
        (0..n)
            .map(|i| UserProfile {
                id: format!("user{i}"),
                email: format!("test_user_{i}@example.com"),
                nickname: format!("Nick {i}"),
                bio: String::new(),
                avatar_url: String::new(),
                is_anonymous: false,
            })
            .collect()
    }

    fn paced(store: &Arc<MemoryStore>, pacing: Duration) -> PostGenerator {
        PostGenerator::with_config(
            store.clone(),
            EngagementGenerator::new(store.clone()),
            PostGenConfig {
                pacing,
                ..Default::default()
            },
        )
    }

    fn unpaced(store: &Arc<MemoryStore>) -> PostGenerator {
        paced(store, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_generate_posts() {
        let store = Arc::new(MemoryStore::new());
        let users = users(3);
        let ids: HashSet<_> = users.iter().map(|u| u.id.clone()).collect();
        let mut rng = rand::thread_rng();

        let batch = unpaced(&store).generate(&users, 10, &mut rng).await;

        assert_eq!(batch.posts.len(), 10);
        assert!(batch.failures.is_empty());
        assert_eq!(store.count(collections::POSTS), 10);

        for post in &batch.posts {
            assert!(ids.contains(&post.byline.author_id));
            assert!((1..=3).contains(&post.tags.len()));
            let unique: HashSet<_> = post.tags.iter().collect();
            assert_eq!(unique.len(), post.tags.len());
            assert!(post.tags.iter().all(|t| DEFAULT_TAGS.contains(&t.as_str())));
            assert!(post.image_urls.len() <= 3);
            assert!(post.like_count <= 100);
            assert!(post.share_count <= 10);
            if post.byline.is_anonymous {
                assert_eq!(post.byline.author_display_name, ANONYMOUS_LABEL);
            }
        }
    }

    #[tokio::test]
    async fn test_comment_count_matches_children() {
        let store = Arc::new(MemoryStore::new());
        let mut rng = rand::thread_rng();

        let batch = unpaced(&store).generate(&users(4), 8, &mut rng).await;

        for post in &batch.posts {
            let children = batch.comments.iter().filter(|c| c.post_id == post.id).count();
            assert_eq!(post.comment_count as usize, children);

            let stored = store.get(collections::POSTS, &post.id).unwrap();
            assert_eq!(stored[COMMENT_COUNT_FIELD], children as u64);
        }

        for like in &batch.likes {
            assert!(batch.posts.iter().any(|p| p.id == like.post_id));
        }
    }

    #[tokio::test]
    async fn test_no_users() {
        let store = Arc::new(MemoryStore::new());
        let mut rng = rand::thread_rng();

        let batch = unpaced(&store).generate(&[], 10, &mut rng).await;

        assert!(batch.posts.is_empty());
        assert!(batch.failures.is_empty());
        assert_eq!(store.write_counts(), (0, 0));
    }

    #[tokio::test]
    async fn test_single_user_likes_degrade() {
        let store = Arc::new(MemoryStore::new());
        let mut rng = rand::thread_rng();

        let batch = unpaced(&store).generate(&users(1), 5, &mut rng).await;

        assert_eq!(batch.posts.len(), 5);
        assert!(batch.likes.len() <= 5);
        assert!(batch.failures.is_empty());
    }

    #[tokio::test]
    async fn test_failed_post_skips_cascade() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next(social::StoreOp::Put, collections::POSTS, 10);
        let mut rng = rand::thread_rng();

        let batch = unpaced(&store).generate(&users(3), 10, &mut rng).await;

        assert!(batch.posts.is_empty());
        assert_eq!(batch.failures.len(), 10);
        assert!(batch.failures.iter().all(|f| f.unit == UnitKind::Post));
        assert_eq!(store.count(collections::COMMENTS), 0);
        assert_eq!(store.count(collections::LIKES), 0);
    }

    #[tokio::test]
    async fn test_pacing_between_posts() {
        let store = Arc::new(MemoryStore::new());
        let mut rng = rand::thread_rng();

        let start = std::time::Instant::now();
        let batch = paced(&store, Duration::from_millis(20))
            .generate(&users(2), 3, &mut rng)
            .await;

        assert_eq!(batch.posts.len(), 3);
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_failed_post_is_not_paced() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next(social::StoreOp::Put, collections::POSTS, 3);
        let mut rng = rand::thread_rng();

        let start = std::time::Instant::now();
        let batch = paced(&store, Duration::from_millis(500))
            .generate(&users(2), 3, &mut rng)
            .await;

        assert!(batch.posts.is_empty());
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
