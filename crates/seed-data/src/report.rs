//! Per-unit outcomes.
//!
//! Every record write is its own unit of work. A failed unit is logged and
//! recorded here, and the run moves on to the next one.

use std::fmt;

use thiserror::Error;
use tracing::warn;

use social::{IdentityError, StoreError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
}

/// The kind of unit a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    User,
    Post,
    Comment,
    /// Increment of a post's comment count after its comment was stored.
    CommentCounter,
    Like,
    Circle,
    Membership,
    HelpPost,
    HelpComment,
    /// Increment of a help post's comment count after its comment was stored.
    HelpCommentCounter,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitKind::User => "user",
            UnitKind::Post => "post",
            UnitKind::Comment => "comment",
            UnitKind::CommentCounter => "comment counter",
            UnitKind::Like => "like",
            UnitKind::Circle => "circle",
            UnitKind::Membership => "circle membership",
            UnitKind::HelpPost => "help post",
            UnitKind::HelpComment => "help comment",
            UnitKind::HelpCommentCounter => "help comment counter",
        };
        f.write_str(name)
    }
}

/// A failed unit of work.
#[derive(Debug)]
pub struct UnitFailure {
    pub unit: UnitKind,
    /// Identifies the record, e.g. the login id or parent post id.
    pub context: String,
    pub error: SeedError,
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.unit, self.context, self.error)
    }
}

/// Records created by one generator call, plus the units that failed.
#[derive(Debug)]
pub struct Outcome<T> {
    pub created: Vec<T>,
    pub failures: Vec<UnitFailure>,
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> Outcome<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: T) {
        self.created.push(record);
    }

    /// Logs and records a failed unit.
    pub fn fail(&mut self, unit: UnitKind, context: impl Into<String>, error: impl Into<SeedError>) {
        self.failures.push(record_failure(unit, context, error));
    }

    /// Number of recorded failures of one kind.
    pub fn failures_of(&self, unit: UnitKind) -> usize {
        self.failures.iter().filter(|f| f.unit == unit).count()
    }

    pub fn len(&self) -> usize {
        self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
    }
}

/// Logs a failed unit and wraps it for reporting.
pub fn record_failure(
    unit: UnitKind,
    context: impl Into<String>,
    error: impl Into<SeedError>,
) -> UnitFailure {
    let failure = UnitFailure {
        unit,
        context: context.into(),
        error: error.into(),
    };
    warn!("Failed to create {failure}");
    failure
}
