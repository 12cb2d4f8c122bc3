//! Stored entity records.
//!
//! Each record serializes to the camelCase document the app reads. Ids are
//! assigned by the store or the identity provider, so they are carried on the
//! in-memory record but never written into the document body.

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::store::Document;

/// Display name written for anonymous authors.
pub const ANONYMOUS_LABEL: &str = "Anonymous";

/// Collection names.
pub mod collections {
    pub const USERS: &str = "users";
    pub const POSTS: &str = "posts";
    pub const COMMENTS: &str = "comments";
    pub const LIKES: &str = "likes";
    pub const CIRCLES: &str = "circles";
    pub const CIRCLE_MEMBERS: &str = "circleMembers";
    pub const HELP_POSTS: &str = "helpPosts";
    pub const HELP_COMMENTS: &str = "helpComments";
}

/// Counter field incremented on posts and help posts for each child comment.
pub const COMMENT_COUNT_FIELD: &str = "commentCount";

/// A record that can be written to a document collection.
pub trait Record: Serialize {
    const COLLECTION: &'static str;

    /// Fields set to the write time by the store.
    const SERVER_TIMESTAMPS: &'static [&'static str] = &["createdAt"];

    fn to_document(&self) -> Result<Document, StoreError> {
        let document = Document::from_record(self)?;
        Ok(Self::SERVER_TIMESTAMPS
            .iter()
            .fold(document, |doc, field| doc.server_timestamp(*field)))
    }
}

/// Post visibility options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Followers,
    Private,
}

impl Visibility {
    pub const ALL: [Visibility; 3] = [Visibility::Public, Visibility::Followers, Visibility::Private];

    /// Returns the stored string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Followers => "followers",
            Visibility::Private => "private",
        }
    }
}

/// Circle membership roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    Member,
    Admin,
}

impl MembershipRole {
    /// Returns the stored string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Member => "member",
            MembershipRole::Admin => "admin",
        }
    }
}

/// Author attribution shared by posts, comments, help posts and help comments.
///
/// The display name is captured at creation time and never kept in sync with
/// later nickname changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Byline {
    pub author_id: String,
    pub author_display_name: String,
    pub is_anonymous: bool,
}

impl Byline {
    pub fn new(author_id: &str, nickname: &str, is_anonymous: bool) -> Self {
        let author_display_name = if is_anonymous {
            ANONYMOUS_LABEL.to_string()
        } else {
            nickname.to_string()
        };

        Self {
            author_id: author_id.to_string(),
            author_display_name,
            is_anonymous,
        }
    }
}

/// User profile stored under the principal id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip)]
    pub id: String,
    pub email: String,
    pub nickname: String,
    pub bio: String,
    pub avatar_url: String,
    pub is_anonymous: bool,
}

impl Record for UserProfile {
    const COLLECTION: &'static str = collections::USERS;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(skip)]
    pub id: String,
    pub content: String,
    pub image_urls: Vec<String>,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    #[serde(flatten)]
    pub byline: Byline,
    pub like_count: u32,
    pub comment_count: u32,
    pub share_count: u32,
}

impl Record for Post {
    const COLLECTION: &'static str = collections::POSTS;
    const SERVER_TIMESTAMPS: &'static [&'static str] = &["createdAt", "updatedAt"];
}

/// Top-level comment on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(skip)]
    pub id: String,
    pub content: String,
    pub post_id: String,
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub byline: Byline,
    pub like_count: u32,
}

impl Record for Comment {
    const COLLECTION: &'static str = collections::COMMENTS;
}

/// A like, keyed by user and post so a pair can only like once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub user_id: String,
    pub post_id: String,
}

impl Like {
    /// Composite document id.
    pub fn key(&self) -> String {
        format!("{}_{}", self.user_id, self.post_id)
    }
}

impl Record for Like {
    const COLLECTION: &'static str = collections::LIKES;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub creator_id: String,
    pub member_count: u32,
    pub is_private: bool,
    pub cover_image_url: String,
}

impl Record for Circle {
    const COLLECTION: &'static str = collections::CIRCLES;
}

/// Circle membership, keyed by user and circle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleMembership {
    pub user_id: String,
    pub circle_id: String,
    pub role: MembershipRole,
}

impl CircleMembership {
    /// Composite document id.
    pub fn key(&self) -> String {
        format!("{}_{}", self.user_id, self.circle_id)
    }
}

impl Record for CircleMembership {
    const COLLECTION: &'static str = collections::CIRCLE_MEMBERS;
    const SERVER_TIMESTAMPS: &'static [&'static str] = &["joinedAt"];
}

/// Help request thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpPost {
    #[serde(skip)]
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(flatten)]
    pub byline: Byline,
    pub solved: bool,
    pub reward: u32,
    pub views: u32,
    pub like_count: u32,
    pub comment_count: u32,
}

impl Record for HelpPost {
    const COLLECTION: &'static str = collections::HELP_POSTS;
    const SERVER_TIMESTAMPS: &'static [&'static str] = &["createdAt", "updatedAt"];
}

/// Answer comment on a help request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpComment {
    #[serde(skip)]
    pub id: String,
    pub content: String,
    pub help_id: String,
    #[serde(flatten)]
    pub byline: Byline,
    pub like_count: u32,
    pub is_answer: bool,
}

impl Record for HelpComment {
    const COLLECTION: &'static str = collections::HELP_COMMENTS;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_byline_hides_nickname() {
        let byline = Byline::new("u1", "Alice", true);
        assert_eq!(byline.author_display_name, ANONYMOUS_LABEL);
        assert_eq!(byline.author_id, "u1");

        let byline = Byline::new("u1", "Alice", false);
        assert_eq!(byline.author_display_name, "Alice");
    }

    #[test]
    fn test_post_document_shape() {
        let post = Post {
            id: "p1".into(),
            content: "hello".into(),
            image_urls: vec![],
            tags: vec!["tech".into()],
            visibility: Visibility::Followers,
            byline: Byline::new("u1", "Alice", false),
            like_count: 3,
            comment_count: 0,
            share_count: 1,
        };

        let doc = post.to_document().unwrap();
        let fields = doc.values();

        assert!(fields.get("id").is_none());
        assert_eq!(fields["visibility"], "followers");
        assert_eq!(fields["authorDisplayName"], "Alice");
        assert_eq!(fields["isAnonymous"], false);
        assert_eq!(fields["commentCount"], 0);
        assert_eq!(doc.server_timestamp_fields(), ["createdAt", "updatedAt"]);
    }

    #[test]
    fn test_composite_keys() {
        let like = Like {
            user_id: "u1".into(),
            post_id: "p1".into(),
        };
        assert_eq!(like.key(), "u1_p1");

        let membership = CircleMembership {
            user_id: "u2".into(),
            circle_id: "c9".into(),
            role: MembershipRole::Admin,
        };
        assert_eq!(membership.key(), "u2_c9");
        let doc = membership.to_document().unwrap();
        assert_eq!(doc.values()["role"], "admin");
        assert_eq!(doc.server_timestamp_fields(), ["joinedAt"]);
    }

    #[test]
    fn test_comment_is_top_level() {
        let comment = Comment {
            id: String::new(),
            content: "nice".into(),
            post_id: "p1".into(),
            parent_id: None,
            byline: Byline::new("u1", "Alice", true),
            like_count: 0,
        };
        let doc = comment.to_document().unwrap();
        assert!(doc.values()["parentId"].is_null());
        assert_eq!(doc.values()["authorDisplayName"], ANONYMOUS_LABEL);
    }
}
