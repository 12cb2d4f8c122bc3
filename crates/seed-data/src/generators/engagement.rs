//! Comment and like generation for posts.

use std::ops::RangeInclusive;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use social::models::{Byline, COMMENT_COUNT_FIELD, Comment, Like, Post, Record, UserProfile};
use social::store::put_record;
use social::{DocKey, DocumentStore};

use crate::content::ContentFaker;
use crate::report::{Outcome, UnitKind};
use crate::sampling::sample_distinct;

/// Configuration for comment generation.
#[derive(Debug, Clone)]
pub struct EngagementGenConfig {
    /// Sentences per comment body.
    pub comment_sentences: RangeInclusive<usize>,
    /// Seed value for each comment's like count.
    pub comment_like_seed: RangeInclusive<u32>,
}

impl Default for EngagementGenConfig {
    fn default() -> Self {
        Self {
            comment_sentences: 1..=3,
            comment_like_seed: 0..=15,
        }
    }
}

/// Creates comments and likes on posts.
pub struct EngagementGenerator {
    store: Arc<dyn DocumentStore>,
    content: ContentFaker,
    config: EngagementGenConfig,
}

impl EngagementGenerator {
    /// Creates a new engagement generator with default configuration.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, EngagementGenConfig::default())
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(store: Arc<dyn DocumentStore>, config: EngagementGenConfig) -> Self {
        Self {
            store,
            content: ContentFaker::new(),
            config,
        }
    }

    /// Creates `count` top-level comments on a post.
    ///
    /// Each stored comment is followed by a +1 on the post's comment count.
    /// A failed comment write skips the increment; a failed increment is
    /// recorded as a [`UnitKind::CommentCounter`] failure and the comment
    /// still counts as created.
    pub async fn generate_comments(
        &self,
        post_id: &str,
        users: &[UserProfile],
        count: usize,
        rng: &mut impl Rng,
    ) -> Outcome<Comment> {
        let mut outcome = Outcome::new();

        for _ in 0..count {
            let Some(author) = users.choose(rng) else {
                break;
            };

            let sentences = rng.gen_range(self.config.comment_sentences.clone());
            let mut comment = Comment {
                id: String::new(),
                content: self.content.paragraph(sentences, rng),
                post_id: post_id.to_string(),
                parent_id: None,
                byline: Byline::new(&author.id, &author.nickname, rng.r#gen()),
                like_count: rng.gen_range(self.config.comment_like_seed.clone()),
            };

            match put_record(self.store.as_ref(), DocKey::Auto, &comment).await {
                Ok(id) => comment.id = id,
                Err(e) => {
                    outcome.fail(UnitKind::Comment, format!("post {post_id}"), e);
                    continue;
                }
            }

            if let Err(e) = self
                .store
                .increment(Post::COLLECTION, post_id, COMMENT_COUNT_FIELD, 1)
                .await
            {
                outcome.fail(
                    UnitKind::CommentCounter,
                    format!("post {post_id}, comment {}", comment.id),
                    e,
                );
            }

            debug!(post_id, comment_id = %comment.id, "Created comment");
            outcome.push(comment);
        }

        outcome
    }

    /// Creates likes on a post from up to `count` distinct users.
    ///
    /// Fewer likes are created when there are fewer users than requested.
    /// The caller's user list is left untouched.
    pub async fn generate_likes(
        &self,
        post_id: &str,
        users: &[UserProfile],
        count: usize,
        rng: &mut impl Rng,
    ) -> Outcome<Like> {
        let mut outcome = Outcome::new();

        for user in sample_distinct(users, count, rng) {
            let like = Like {
                user_id: user.id.clone(),
                post_id: post_id.to_string(),
            };

            match put_record(self.store.as_ref(), DocKey::named(like.key()), &like).await {
                Ok(_) => {
                    debug!(post_id, user_id = %user.id, "Created like");
                    outcome.push(like);
                }
                Err(e) => outcome.fail(UnitKind::Like, like.key(), e),
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use social::models::{ANONYMOUS_LABEL, collections};
    use social::{Document, MemoryStore, StoreOp};

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

    async fn seeded_post(store: &MemoryStore) -> String {
        store
            .put(
                collections::POSTS,
                DocKey::Auto,
                Document::new().set(COMMENT_COUNT_FIELD, 0),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_comments_increment_parent() {
        let store = Arc::new(MemoryStore::new());
        let post_id = seeded_post(&store).await;
        let engagement = EngagementGenerator::new(store.clone());
        let users = users(4);
        let mut rng = rand::thread_rng();

        let outcome = engagement
            .generate_comments(&post_id, &users, 6, &mut rng)
            .await;

        assert_eq!(outcome.len(), 6);
        assert_eq!(store.count(collections::COMMENTS), 6);
        assert_eq!(
            store.get(collections::POSTS, &post_id).unwrap()[COMMENT_COUNT_FIELD],
            6
        );

        for comment in &outcome.created {
            assert_eq!(comment.post_id, post_id);
            assert!(comment.parent_id.is_none());
            assert!(comment.like_count <= 15);
            let author = users.iter().find(|u| u.id == comment.byline.author_id).unwrap();
            if comment.byline.is_anonymous {
                assert_eq!(comment.byline.author_display_name, ANONYMOUS_LABEL);
            } else {
                assert_eq!(comment.byline.author_display_name, author.nickname);
            }
        }
    }

    #[tokio::test]
    async fn test_failed_comment_does_not_increment() {
        let store = Arc::new(MemoryStore::new());
        let post_id = seeded_post(&store).await;
        store.fail_next(StoreOp::Put, collections::COMMENTS, 2);
        let engagement = EngagementGenerator::new(store.clone());
        let mut rng = rand::thread_rng();

        let outcome = engagement
            .generate_comments(&post_id, &users(3), 5, &mut rng)
            .await;

        assert_eq!(outcome.len(), 3);
        assert_eq!(outcome.failures_of(UnitKind::Comment), 2);
        assert_eq!(
            store.get(collections::POSTS, &post_id).unwrap()[COMMENT_COUNT_FIELD],
            3
        );
    }

    #[tokio::test]
    async fn test_failed_increment_is_tolerated() {
        let store = Arc::new(MemoryStore::new());
        let post_id = seeded_post(&store).await;
        store.fail_next(StoreOp::Increment, collections::POSTS, 1);
        let engagement = EngagementGenerator::new(store.clone());
        let mut rng = rand::thread_rng();

        let outcome = engagement
            .generate_comments(&post_id, &users(3), 4, &mut rng)
            .await;

        // Comment rows exist, the counter drifted by one
        assert_eq!(outcome.len(), 4);
        assert_eq!(outcome.failures_of(UnitKind::CommentCounter), 1);
        assert_eq!(store.count(collections::COMMENTS), 4);
        assert_eq!(
            store.get(collections::POSTS, &post_id).unwrap()[COMMENT_COUNT_FIELD],
            3
        );
    }

    #[tokio::test]
    async fn test_likes_are_distinct_and_clamped() {
        let store = Arc::new(MemoryStore::new());
        let engagement = EngagementGenerator::new(store.clone());
        let users = users(5);
        let before = users.clone();
        let mut rng = rand::thread_rng();

        let outcome = engagement.generate_likes("p1", &users, 20, &mut rng).await;

        assert_eq!(outcome.len(), 5);
        let pairs: HashSet<_> = outcome
            .created
            .iter()
            .map(|l| (l.user_id.clone(), l.post_id.clone()))
            .collect();
        assert_eq!(pairs.len(), 5);
        assert_eq!(store.count(collections::LIKES), 5);
        assert!(store.get(collections::LIKES, "user0_p1").is_some());

        // Sampling leaves the caller's list intact
        assert_eq!(users, before);
    }

    #[tokio::test]
    async fn test_no_users_no_engagement() {
        let store = Arc::new(MemoryStore::new());
        let engagement = EngagementGenerator::new(store.clone());
        let mut rng = rand::thread_rng();

        let comments = engagement.generate_comments("p1", &[], 5, &mut rng).await;
        let likes = engagement.generate_likes("p1", &[], 5, &mut rng).await;

        assert!(comments.is_empty() && comments.failures.is_empty());
        assert!(likes.is_empty() && likes.failures.is_empty());
        assert_eq!(store.write_counts(), (0, 0));
    }
}
