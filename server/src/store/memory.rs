use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StampClock, StoreError, TodoStore};
use crate::model::{PatchTodo, Todo, TodoDraft};
use crate::query::TodoQuery;

#[derive(Debug)]
struct Row {
    seq: u64,
    todo: Todo,
}

#[derive(Debug, Default)]
struct Table {
    next_seq: u64,
    clock: StampClock,
    rows: HashMap<Uuid, Row>,
}

/// Process-local store. Clones share the same table.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTodoStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn overwrite(todo: &mut Todo, draft: TodoDraft, clock: &mut StampClock) {
    todo.title = draft.title;
    todo.description = draft.description;
    todo.completed = draft.completed;
    todo.due_date = draft.due_date;
    todo.updated_at = clock.tick();
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn insert(&self, draft: TodoDraft) -> Result<Todo, StoreError> {
        let mut table = self.table.write().await;
        let mut id = Uuid::new_v4();
        while table.rows.contains_key(&id) {
            id = Uuid::new_v4();
        }
        let now = table.clock.tick();
        let todo = Todo {
            id,
            title: draft.title,
            description: draft.description,
            completed: draft.completed,
            due_date: draft.due_date,
            created_at: now,
            updated_at: now,
        };
        let seq = table.next_seq;
        table.next_seq += 1;
        table.rows.insert(
            id,
            Row {
                seq,
                todo: todo.clone(),
            },
        );
        Ok(todo)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).map(|row| row.todo.clone()))
    }

    async fn replace(&self, id: Uuid, draft: TodoDraft) -> Result<Option<Todo>, StoreError> {
        let mut table = self.table.write().await;
        let Table { rows, clock, .. } = &mut *table;
        let Some(row) = rows.get_mut(&id) else {
            return Ok(None);
        };
        overwrite(&mut row.todo, draft, clock);
        Ok(Some(row.todo.clone()))
    }

    async fn patch(&self, id: Uuid, patch: PatchTodo) -> Result<Option<Todo>, StoreError> {
        let mut table = self.table.write().await;
        let Table { rows, clock, .. } = &mut *table;
        let Some(row) = rows.get_mut(&id) else {
            return Ok(None);
        };
        let draft = patch.apply(row.todo.draft());
        overwrite(&mut row.todo, draft, clock);
        Ok(Some(row.todo.clone()))
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn scan(&self, query: &TodoQuery) -> Result<Vec<Todo>, StoreError> {
        let table = self.table.read().await;
        Ok(query.apply(table.rows.values().map(|row| (row.seq, &row.todo))))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn draft(title: &str) -> TodoDraft {
        TodoDraft {
            title: title.to_string(),
            description: None,
            completed: false,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_equal_timestamps() {
        let store = InMemoryTodoStore::new();
        let todo = store.insert(draft("Buy milk")).await.unwrap();
        assert_eq!(todo.created_at, todo.updated_at);
        assert_eq!(store.get(todo.id).await.unwrap(), Some(todo));
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let store = InMemoryTodoStore::new();
        let a = store.insert(draft("a")).await.unwrap();
        let b = store.insert(draft("b")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn replace_advances_updated_at_and_keeps_created_at() {
        let store = InMemoryTodoStore::new();
        let todo = store.insert(draft("old")).await.unwrap();
        let replaced = store
            .replace(
                todo.id,
                TodoDraft {
                    title: "new".to_string(),
                    description: Some("d".to_string()),
                    completed: true,
                    due_date: NaiveDate::from_ymd_opt(2030, 1, 1),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.id, todo.id);
        assert_eq!(replaced.title, "new");
        assert_eq!(replaced.created_at, todo.created_at);
        assert!(replaced.updated_at > todo.updated_at);
    }

    #[tokio::test]
    async fn replace_missing_is_none() {
        let store = InMemoryTodoStore::new();
        assert!(store.replace(Uuid::nil(), draft("x")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remove_is_hard_delete() {
        let store = InMemoryTodoStore::new();
        let todo = store.insert(draft("gone")).await.unwrap();
        assert!(store.remove(todo.id).await.unwrap());
        assert!(!store.remove(todo.id).await.unwrap());
        assert!(store.get(todo.id).await.unwrap().is_none());
        assert!(store.scan(&TodoQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn patch_keeps_absent_fields() {
        let store = InMemoryTodoStore::new();
        let todo = store.insert(draft("keep me")).await.unwrap();
        let patch: PatchTodo = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        let patched = store.patch(todo.id, patch).await.unwrap().unwrap();
        assert_eq!(patched.title, "keep me");
        assert!(patched.completed);
        assert!(patched.updated_at > todo.updated_at);
        assert!(store
            .patch(Uuid::nil(), PatchTodo::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn scan_sees_latest_update_first() {
        let store = InMemoryTodoStore::new();
        let first = store.insert(draft("first")).await.unwrap();
        store.insert(draft("second")).await.unwrap();
        store.replace(first.id, draft("first again")).await.unwrap();

        let page = store.scan(&TodoQuery::default()).await.unwrap();
        let titles: Vec<_> = page.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["first again", "second"]);
    }
}
