//! Todo use cases: validation, existence checks and defaulting on top of a
//! `TodoStore`.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::TodoError;
use crate::model::{CreateTodo, PatchTodo, Todo, UpdateTodo};
use crate::query::TodoQuery;
use crate::store::TodoStore;

/// Stateless between calls; all state lives in the store it was built with.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip_all)]
    pub async fn create(&self, input: CreateTodo) -> Result<Todo, TodoError> {
        input.validate()?;
        let todo = self.store.insert(input.into_draft()).await?;
        tracing::debug!(id = %todo.id, "todo created");
        Ok(todo)
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_all(&self, query: &TodoQuery) -> Result<Vec<Todo>, TodoError> {
        Ok(self.store.scan(query).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Todo, TodoError> {
        self.store.get(id).await?.ok_or(TodoError::NotFound(id))
    }

    #[tracing::instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateTodo) -> Result<Todo, TodoError> {
        input.validate()?;
        let todo = self
            .store
            .replace(id, input.into_draft())
            .await?
            .ok_or(TodoError::NotFound(id))?;
        tracing::debug!("todo replaced");
        Ok(todo)
    }

    /// Applies only the fields present in `input`. `updatedAt` moves even
    /// when the patch is empty. The store merges the patch into the current
    /// record, so concurrent patches to different fields all land.
    #[tracing::instrument(skip(self, input))]
    pub async fn patch(&self, id: Uuid, input: PatchTodo) -> Result<Todo, TodoError> {
        input.validate()?;
        let todo = self
            .store
            .patch(id, input)
            .await?
            .ok_or(TodoError::NotFound(id))?;
        tracing::debug!("todo patched");
        Ok(todo)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), TodoError> {
        if self.store.remove(id).await? {
            tracing::debug!("todo deleted");
            Ok(())
        } else {
            Err(TodoError::NotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::model::TodoDraft;
    use crate::store::{InMemoryTodoStore, StoreError};

    fn service() -> TodoService {
        TodoService::new(Arc::new(InMemoryTodoStore::new()))
    }

    fn create(title: &str) -> CreateTodo {
        CreateTodo {
            title: title.to_string(),
            description: None,
            completed: None,
            due_date: None,
        }
    }

    fn patch(json: &str) -> PatchTodo {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn create_defaults_and_stamps() {
        let todo = service().create(create("Buy milk")).await.unwrap();
        assert_eq!(todo.title, "Buy milk");
        assert!(!todo.completed);
        assert_eq!(todo.created_at, todo.updated_at);
    }

    #[tokio::test]
    async fn create_rejects_blank_title_before_storing() {
        let service = service();
        let err = service.create(create("")).await.unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)));
        let all = service.find_all(&TodoQuery::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn buy_milk_then_patch_completed() {
        let service = service();
        let created = service.create(create("Buy milk")).await.unwrap();
        let patched = service
            .patch(created.id, patch(r#"{"completed":true}"#))
            .await
            .unwrap();
        assert_eq!(patched.id, created.id);
        assert_eq!(patched.title, "Buy milk");
        assert!(patched.completed);
        assert_eq!(patched.created_at, created.created_at);
        assert!(patched.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn empty_patch_still_advances_updated_at() {
        let service = service();
        let created = service.create(create("Idle")).await.unwrap();
        let patched = service.patch(created.id, patch("{}")).await.unwrap();
        assert_eq!(patched.draft(), created.draft());
        assert!(patched.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_replaces_every_mutable_field() {
        let service = service();
        let created = service
            .create(CreateTodo {
                title: "Old".to_string(),
                description: Some("old description".to_string()),
                completed: Some(true),
                due_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            })
            .await
            .unwrap();
        let updated = service
            .update(
                created.id,
                UpdateTodo {
                    title: "New".to_string(),
                    description: None,
                    completed: None,
                    due_date: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(
            updated.draft(),
            TodoDraft {
                title: "New".to_string(),
                description: None,
                completed: false,
                due_date: None,
            }
        );
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let service = service();
        let id = Uuid::new_v4();
        assert!(matches!(service.find_by_id(id).await, Err(TodoError::NotFound(x)) if x == id));
        assert!(matches!(
            service
                .update(
                    id,
                    UpdateTodo {
                        title: "x".to_string(),
                        description: None,
                        completed: None,
                        due_date: None,
                    }
                )
                .await,
            Err(TodoError::NotFound(_))
        ));
        assert!(matches!(
            service.patch(id, patch("{}")).await,
            Err(TodoError::NotFound(_))
        ));
        assert!(matches!(service.delete(id).await, Err(TodoError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_then_lookup_fails() {
        let service = service();
        let created = service.create(create("Temporary")).await.unwrap();
        service.delete(created.id).await.unwrap();
        assert!(matches!(
            service.find_by_id(created.id).await,
            Err(TodoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn find_all_filters_completed_newest_first() {
        let service = service();
        for (title, completed) in [("a", true), ("b", false), ("c", true), ("d", false)] {
            service
                .create(CreateTodo {
                    completed: Some(completed),
                    ..create(title)
                })
                .await
                .unwrap();
        }
        let query = TodoQuery::new(Some(true), None, 0, 20, None).unwrap();
        let done = service.find_all(&query).await.unwrap();
        let titles: Vec<_> = done.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["c", "a"]);
    }

    /// Delegates to an in-memory store but stalls every read, widening any
    /// gap between a read and the write that depends on it.
    #[derive(Default)]
    struct SlowReads(InMemoryTodoStore);

    #[async_trait]
    impl TodoStore for SlowReads {
        async fn insert(&self, draft: TodoDraft) -> Result<Todo, StoreError> {
            self.0.insert(draft).await
        }
        async fn get(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.0.get(id).await
        }
        async fn replace(&self, id: Uuid, draft: TodoDraft) -> Result<Option<Todo>, StoreError> {
            self.0.replace(id, draft).await
        }
        async fn patch(&self, id: Uuid, patch: PatchTodo) -> Result<Option<Todo>, StoreError> {
            self.0.patch(id, patch).await
        }
        async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
            self.0.remove(id).await
        }
        async fn scan(&self, query: &TodoQuery) -> Result<Vec<Todo>, StoreError> {
            self.0.scan(query).await
        }
        async fn ping(&self) -> Result<(), StoreError> {
            self.0.ping().await
        }
    }

    #[tokio::test]
    async fn concurrent_patches_to_different_fields_both_apply() {
        let service = TodoService::new(Arc::new(SlowReads::default()));
        let created = service.create(create("old")).await.unwrap();

        let (renamed, completed) = tokio::join!(
            service.patch(created.id, patch(r#"{"title":"new"}"#)),
            service.patch(created.id, patch(r#"{"completed":true}"#)),
        );
        renamed.unwrap();
        completed.unwrap();

        let todo = service.find_by_id(created.id).await.unwrap();
        assert_eq!(todo.title, "new");
        assert!(todo.completed);
    }

    struct DownStore;

    #[async_trait]
    impl TodoStore for DownStore {
        async fn insert(&self, _: TodoDraft) -> Result<Todo, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn get(&self, _: Uuid) -> Result<Option<Todo>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn replace(&self, _: Uuid, _: TodoDraft) -> Result<Option<Todo>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn patch(&self, _: Uuid, _: PatchTodo) -> Result<Option<Todo>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn remove(&self, _: Uuid) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn scan(&self, _: &TodoQuery) -> Result<Vec<Todo>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn store_failures_surface_as_storage_errors() {
        let service = TodoService::new(Arc::new(DownStore));
        assert!(matches!(
            service.create(create("x")).await,
            Err(TodoError::Storage(_))
        ));
        assert!(matches!(
            service.find_all(&TodoQuery::default()).await,
            Err(TodoError::Storage(_))
        ));
    }
}
