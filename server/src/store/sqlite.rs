//! SQLite-backed store.
//!
//! Timestamps are stored as integer microseconds since the epoch so that
//! `ORDER BY updated_at` is a plain integer comparison. `seq` is an
//! AUTOINCREMENT key, which SQLite never hands out twice; it doubles as the
//! insertion-order tie-break.
//!
//! rusqlite blocks, so every call runs on tokio's blocking pool with the
//! connection mutex held for its whole duration.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{
    functions::FunctionFlags, params, params_from_iter, types::Value, Connection,
    OptionalExtension, Row, TransactionBehavior,
};
use uuid::Uuid;

use super::{StampClock, StoreError, TodoStore};
use crate::model::{PatchTodo, Todo, TodoDraft};
use crate::query::TodoQuery;

const COLUMNS: &str = "id, title, description, completed, due_date, created_at, updated_at";

/// Unicode-aware replacement for SQLite's `lower()`, which only folds ASCII.
/// Matches the folding `TodoQuery` applies to the search text.
const LOWER_FN: &str = "unicode_lower";

pub struct SqliteTodoStore {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    conn: Connection,
    clock: StampClock,
}

impl SqliteTodoStore {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.create_scalar_function(
            LOWER_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|text| text.to_lowercase())),
        )?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS todos (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                description TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                due_date TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS todos_updated_at ON todos (updated_at, seq);",
        )?;
        let last: Option<i64> =
            conn.query_row("SELECT MAX(updated_at) FROM todos", [], |row| row.get(0))?;
        let clock = StampClock::starting_after(last.map(from_micros).transpose()?);
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner { conn, clock })),
        })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(":memory:")
    }

    /// Runs `op` against the locked connection on the blocking pool.
    async fn with_inner<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Inner) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut guard = inner
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            op(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("sqlite task failed: {e}")))?
    }
}

/// A row as SQLite returns it, before any parsing.
struct RawTodo {
    id: String,
    title: String,
    description: Option<String>,
    completed: bool,
    due_date: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl RawTodo {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            completed: row.get(3)?,
            due_date: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl TryFrom<RawTodo> for Todo {
    type Error = StoreError;

    fn try_from(raw: RawTodo) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&raw.id)
            .map_err(|e| StoreError::Corrupt(format!("id {:?}: {e}", raw.id)))?;
        let due_date = raw
            .due_date
            .map(|date| {
                date.parse::<NaiveDate>()
                    .map_err(|e| StoreError::Corrupt(format!("due date {date:?}: {e}")))
            })
            .transpose()?;
        Ok(Todo {
            id,
            title: raw.title,
            description: raw.description,
            completed: raw.completed,
            due_date,
            created_at: from_micros(raw.created_at)?,
            updated_at: from_micros(raw.updated_at)?,
        })
    }
}

fn from_micros(micros: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp {micros} out of range")))
}

fn select_one(conn: &Connection, id: Uuid) -> Result<Option<Todo>, StoreError> {
    let raw = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM todos WHERE id = ?1"),
            [id.to_string()],
            RawTodo::read,
        )
        .optional()?;
    raw.map(Todo::try_from).transpose()
}

/// Overwrites the mutable columns of `id`. Returns whether a row matched.
fn write_draft(
    conn: &Connection,
    id: Uuid,
    draft: &TodoDraft,
    updated_at: DateTime<Utc>,
) -> Result<bool, StoreError> {
    let changed = conn.execute(
        "UPDATE todos
         SET title = ?2, description = ?3, completed = ?4, due_date = ?5, updated_at = ?6
         WHERE id = ?1",
        params![
            id.to_string(),
            draft.title,
            draft.description,
            draft.completed,
            draft.due_date.map(|date| date.to_string()),
            updated_at.timestamp_micros(),
        ],
    )?;
    Ok(changed > 0)
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn insert(&self, draft: TodoDraft) -> Result<Todo, StoreError> {
        self.with_inner(move |inner| {
            let id = Uuid::new_v4();
            let now = inner.clock.tick();
            inner.conn.execute(
                &format!("INSERT INTO todos ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                params![
                    id.to_string(),
                    draft.title,
                    draft.description,
                    draft.completed,
                    draft.due_date.map(|date| date.to_string()),
                    now.timestamp_micros(),
                    now.timestamp_micros(),
                ],
            )?;
            Ok(Todo {
                id,
                title: draft.title,
                description: draft.description,
                completed: draft.completed,
                due_date: draft.due_date,
                created_at: now,
                updated_at: now,
            })
        })
        .await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        self.with_inner(move |inner| select_one(&inner.conn, id)).await
    }

    async fn replace(&self, id: Uuid, draft: TodoDraft) -> Result<Option<Todo>, StoreError> {
        self.with_inner(move |inner| {
            let Inner { conn, clock } = inner;
            if !write_draft(conn, id, &draft, clock.tick())? {
                return Ok(None);
            }
            select_one(conn, id)
        })
        .await
    }

    async fn patch(&self, id: Uuid, patch: PatchTodo) -> Result<Option<Todo>, StoreError> {
        self.with_inner(move |inner| {
            let Inner { conn, clock } = inner;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let Some(current) = select_one(&tx, id)? else {
                return Ok(None);
            };
            write_draft(&tx, id, &patch.apply(current.draft()), clock.tick())?;
            let todo = select_one(&tx, id)?;
            tx.commit()?;
            Ok(todo)
        })
        .await
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        self.with_inner(move |inner| {
            let removed = inner.conn.execute("DELETE FROM todos WHERE id = ?1", [id.to_string()])?;
            Ok(removed > 0)
        })
        .await
    }

    async fn scan(&self, query: &TodoQuery) -> Result<Vec<Todo>, StoreError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(completed) = query.completed {
            clauses.push("completed = ?".to_string());
            values.push(Value::Integer(i64::from(completed)));
        }
        if let Some(needle) = query.needle() {
            clauses.push(format!("instr({LOWER_FN}(title), ?) > 0"));
            values.push(Value::Text(needle.to_string()));
        }
        let filter = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        values.push(Value::Integer(i64::from(query.size)));
        values.push(Value::Integer(
            i64::try_from(query.offset()).unwrap_or(i64::MAX),
        ));

        let sql = format!(
            "SELECT {COLUMNS} FROM todos {filter}
             ORDER BY updated_at {}, seq ASC
             LIMIT ? OFFSET ?",
            query.order.as_sql()
        );
        tracing::trace!(%sql, "scanning todos");

        self.with_inner(move |inner| {
            let mut stmt = inner.conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(values), RawTodo::read)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(Todo::try_from).collect()
        })
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.with_inner(|inner| {
            inner.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}
