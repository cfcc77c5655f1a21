//! Todo entity and the request payloads that create or mutate it.
//!
//! # Design
//! `Todo` is what the store hands out and what the API serializes. The
//! request types (`CreateTodo`, `UpdateTodo`, `PatchTodo`) never touch the
//! store directly: each one validates itself and then folds into a
//! `TodoDraft`, the set of mutable fields the store persists.
//!
//! Patch field presence is explicit. `title` and `completed` cannot be
//! cleared, so a plain `Option` is enough (absent or `null` leaves them
//! alone). `description` and `dueDate` are nullable, so they use
//! `Option<Option<T>>`: absent leaves the field alone, `null` clears it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::TodoError;

pub const TITLE_MAX_CHARS: usize = 120;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Copy of the mutable fields, the starting point for a patch.
    pub fn draft(&self) -> TodoDraft {
        TodoDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            completed: self.completed,
            due_date: self.due_date,
        }
    }
}

/// The mutable fields of a todo. Identity and timestamps belong to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<NaiveDate>,
}

impl CreateTodo {
    pub fn validate(&self) -> Result<(), TodoError> {
        validate_title(&self.title)?;
        validate_description(self.description.as_deref())
    }

    pub fn into_draft(self) -> TodoDraft {
        TodoDraft {
            title: self.title,
            description: self.description,
            completed: self.completed.unwrap_or(false),
            due_date: self.due_date,
        }
    }
}

/// Full replacement. Every mutable field is overwritten, so an omitted
/// `completed` becomes `false` and omitted optional fields are cleared.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    pub title: String,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub due_date: Option<NaiveDate>,
}

impl UpdateTodo {
    pub fn validate(&self) -> Result<(), TodoError> {
        validate_title(&self.title)?;
        validate_description(self.description.as_deref())
    }

    pub fn into_draft(self) -> TodoDraft {
        TodoDraft {
            title: self.title,
            description: self.description,
            completed: self.completed.unwrap_or(false),
            due_date: self.due_date,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTodo {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl PatchTodo {
    pub fn validate(&self) -> Result<(), TodoError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(description) = &self.description {
            validate_description(description.as_deref())?;
        }
        Ok(())
    }

    /// Overlay the fields present in this patch onto `draft`.
    pub fn apply(self, mut draft: TodoDraft) -> TodoDraft {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(completed) = self.completed {
            draft.completed = completed;
        }
        if let Some(due_date) = self.due_date {
            draft.due_date = due_date;
        }
        draft
    }
}

/// A key that is present always yields `Some`; `null` becomes `Some(None)`.
/// Missing keys fall back to `#[serde(default)]`, i.e. `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_title(title: &str) -> Result<(), TodoError> {
    if title.trim().is_empty() {
        return Err(TodoError::Validation("title is required".to_string()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(TodoError::Validation(format!(
            "title must not exceed {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), TodoError> {
    match description {
        Some(description) if description.chars().count() > DESCRIPTION_MAX_CHARS => {
            Err(TodoError::Validation(format!(
                "description must not exceed {DESCRIPTION_MAX_CHARS} characters"
            )))
        }
        _ => Ok(()),
    }
}
