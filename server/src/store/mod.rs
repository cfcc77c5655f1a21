//! Persistence for todos.
//!
//! The store owns identity and timestamps: it generates ids on insert and
//! stamps `updatedAt` on every write, so callers only ever hand it a
//! `TodoDraft`.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Duration, DurationRound, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{PatchTodo, Todo, TodoDraft};
use crate::query::TodoQuery;

pub use memory::InMemoryTodoStore;
pub use sqlite::SqliteTodoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persists a new todo with a fresh id and `createdAt == updatedAt`.
    async fn insert(&self, draft: TodoDraft) -> Result<Todo, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Todo>, StoreError>;

    /// Overwrites the mutable fields of `id` and re-stamps `updatedAt`.
    /// Returns `None` when no such todo exists.
    async fn replace(&self, id: Uuid, draft: TodoDraft) -> Result<Option<Todo>, StoreError>;

    /// Applies `patch` to the current state of `id` and re-stamps
    /// `updatedAt`, with no other write to that todo in between.
    /// Returns `None` when no such todo exists.
    async fn patch(&self, id: Uuid, patch: PatchTodo) -> Result<Option<Todo>, StoreError>;

    /// Returns whether a todo was removed.
    async fn remove(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn scan(&self, query: &TodoQuery) -> Result<Vec<Todo>, StoreError>;

    /// Cheapest possible round trip, used by the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Hands out write timestamps at microsecond precision. Each tick is
/// strictly later than the previous one, so every mutation advances
/// `updatedAt` and no two writes to the same store share a stamp.
#[derive(Debug, Default)]
pub(crate) struct StampClock {
    last: Option<DateTime<Utc>>,
}

impl StampClock {
    pub(crate) fn starting_after(last: Option<DateTime<Utc>>) -> Self {
        Self { last }
    }

    pub(crate) fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let now = now.duration_trunc(Duration::microseconds(1)).unwrap_or(now);
        let stamp = match self.last {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last = Some(stamp);
        stamp
    }
}
