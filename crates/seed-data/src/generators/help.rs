//! Help request generation with answer comments.

use std::ops::RangeInclusive;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use social::models::{Byline, COMMENT_COUNT_FIELD, HelpComment, HelpPost, Record, UserProfile};
use social::store::put_record;
use social::{DocKey, DocumentStore};

use crate::content::ContentFaker;
use crate::report::{Outcome, UnitFailure, UnitKind, record_failure};

/// Default help request categories.
pub const DEFAULT_HELP_CATEGORIES: [&str; 8] = [
    "study", "life", "feelings", "tech", "career", "health", "legal", "finance",
];

/// Configuration for help request generation.
#[derive(Debug, Clone)]
pub struct HelpGenConfig {
    pub categories: Vec<String>,
    /// Words in each title.
    pub title_words: usize,
    pub content_max_chars: usize,
    pub reward: RangeInclusive<u32>,
    pub views: RangeInclusive<u32>,
    pub like_seed: RangeInclusive<u32>,
    pub comments_per_post: RangeInclusive<usize>,
    pub comment_sentences: RangeInclusive<usize>,
    pub comment_like_seed: RangeInclusive<u32>,
}

impl Default for HelpGenConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_HELP_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            title_words: 6,
            content_max_chars: 500,
            reward: 0..=100,
            views: 10..=200,
            like_seed: 0..=50,
            comments_per_post: 1..=8,
            comment_sentences: 1..=4,
            comment_like_seed: 0..=10,
        }
    }
}

/// Help requests created in one run, with their comments.
#[derive(Debug, Default)]
pub struct HelpBatch {
    pub help_posts: Vec<HelpPost>,
    pub help_comments: Vec<HelpComment>,
    pub failures: Vec<UnitFailure>,
}

/// Generates help requests and their answer comments.
pub struct HelpGenerator {
    store: Arc<dyn DocumentStore>,
    content: ContentFaker,
    config: HelpGenConfig,
}

impl HelpGenerator {
    /// Creates a new help generator with default configuration.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, HelpGenConfig::default())
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(store: Arc<dyn DocumentStore>, config: HelpGenConfig) -> Self {
        Self {
            store,
            content: ContentFaker::new(),
            config,
        }
    }

    /// Creates `count` help requests, each followed by its comments.
    pub async fn generate(
        &self,
        users: &[UserProfile],
        count: usize,
        rng: &mut impl Rng,
    ) -> HelpBatch {
        let mut batch = HelpBatch::default();

        if users.is_empty() {
            if count > 0 {
                warn!("No users available, skipping {} help posts", count);
            }
            return batch;
        }

        info!("Generating {} help posts...", count);

        for _ in 0..count {
            let Some(author) = users.choose(rng) else {
                break;
            };
            let mut help = self.build_help_post(author, rng);

            match put_record(self.store.as_ref(), DocKey::Auto, &help).await {
                Ok(id) => help.id = id,
                Err(e) => {
                    batch.failures.push(record_failure(
                        UnitKind::HelpPost,
                        format!("author {}", author.id),
                        e,
                    ));
                    continue;
                }
            }
            debug!(help_id = %help.id, category = %help.category, "Created help post");

            let num_comments = rng.gen_range(self.config.comments_per_post.clone());
            let comments = self
                .generate_comments(&help.id, users, num_comments, rng)
                .await;
            let counted = comments.len() - comments.failures_of(UnitKind::HelpCommentCounter);
            help.comment_count += counted as u32;

            batch.help_comments.extend(comments.created);
            batch.failures.extend(comments.failures);
            batch.help_posts.push(help);
        }

        info!(
            "Generated {} help posts, {} help comments",
            batch.help_posts.len(),
            batch.help_comments.len()
        );
        batch
    }

    /// Creates `count` comments on a help request.
    ///
    /// Same counter semantics as post comments: a stored comment is followed
    /// by a +1 on the help post's comment count, and a failed increment is
    /// recorded without discarding the comment.
    pub async fn generate_comments(
        &self,
        help_id: &str,
        users: &[UserProfile],
        count: usize,
        rng: &mut impl Rng,
    ) -> Outcome<HelpComment> {
        let mut outcome = Outcome::new();

        for _ in 0..count {
            let Some(author) = users.choose(rng) else {
                break;
            };

            let sentences = rng.gen_range(self.config.comment_sentences.clone());
            let mut comment = HelpComment {
                id: String::new(),
                content: self.content.paragraph(sentences, rng),
                help_id: help_id.to_string(),
                byline: Byline::new(&author.id, &author.nickname, rng.r#gen()),
                like_count: rng.gen_range(self.config.comment_like_seed.clone()),
                is_answer: rng.r#gen(),
            };

            match put_record(self.store.as_ref(), DocKey::Auto, &comment).await {
                Ok(id) => comment.id = id,
                Err(e) => {
                    outcome.fail(UnitKind::HelpComment, format!("help post {help_id}"), e);
                    continue;
                }
            }

            if let Err(e) = self
                .store
                .increment(HelpPost::COLLECTION, help_id, COMMENT_COUNT_FIELD, 1)
                .await
            {
                outcome.fail(
                    UnitKind::HelpCommentCounter,
                    format!("help post {help_id}, comment {}", comment.id),
                    e,
                );
            }

            debug!(help_id, comment_id = %comment.id, "Created help comment");
            outcome.push(comment);
        }

        outcome
    }

    fn build_help_post(&self, author: &UserProfile, rng: &mut impl Rng) -> HelpPost {
        let category = self
            .config
            .categories
            .choose(rng)
            .cloned()
            .unwrap_or_default();

        HelpPost {
            id: String::new(),
            title: self.content.sentence(self.config.title_words, rng),
            content: self.content.text(self.config.content_max_chars, rng),
            category,
            byline: Byline::new(&author.id, &author.nickname, rng.r#gen()),
            solved: rng.r#gen(),
            reward: rng.gen_range(self.config.reward.clone()),
            views: rng.gen_range(self.config.views.clone()),
            like_count: rng.gen_range(self.config.like_seed.clone()),
            comment_count: 0,
        }
    }
}
