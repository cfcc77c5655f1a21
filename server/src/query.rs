//! Filter, sort and pagination for todo listings.
//!
//! A `TodoQuery` is built once per request and then evaluated by a store.
//! The in-memory store runs it as a predicate-and-comparator pipeline
//! (`apply`); the SQLite store translates the same fields into a WHERE
//! clause. Both agree on the ordering: `updatedAt` in the requested
//! direction, ties broken by insertion order, oldest first.

use std::cmp::Ordering;

use crate::error::TodoError;
use crate::model::Todo;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 1000;
pub const DEFAULT_SORT: &str = "updatedAt,desc";

/// Direction of the `updatedAt` ordering, the only supported sort key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

impl SortOrder {
    /// Reads a `"<field>,<direction>"` directive. Anything that does not
    /// name `updatedAt` together with `asc` sorts newest first.
    pub fn parse(directive: Option<&str>) -> Self {
        match directive {
            Some(directive) if directive.contains("updatedAt") && directive.contains("asc") => {
                SortOrder::Ascending
            }
            _ => SortOrder::Descending,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoQuery {
    pub completed: Option<bool>,
    needle: Option<String>,
    pub page: u32,
    pub size: u32,
    pub order: SortOrder,
}

impl Default for TodoQuery {
    fn default() -> Self {
        Self {
            completed: None,
            needle: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            order: SortOrder::default(),
        }
    }
}

impl TodoQuery {
    /// Builds a query from raw listing parameters. A blank `text` is the same
    /// as no text filter; `size` must be at least one and is capped at
    /// `MAX_PAGE_SIZE`.
    pub fn new(
        completed: Option<bool>,
        text: Option<&str>,
        page: u32,
        size: u32,
        sort: Option<&str>,
    ) -> Result<Self, TodoError> {
        if size == 0 {
            return Err(TodoError::Validation(
                "size must be at least 1".to_string(),
            ));
        }
        let needle = text
            .filter(|text| !text.trim().is_empty())
            .map(str::to_lowercase);
        Ok(Self {
            completed,
            needle,
            page,
            size: size.min(MAX_PAGE_SIZE),
            order: SortOrder::parse(sort),
        })
    }

    /// Lower-cased title substring, if the query filters on text.
    pub fn needle(&self) -> Option<&str> {
        self.needle.as_deref()
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        if let Some(completed) = self.completed {
            if todo.completed != completed {
                return false;
            }
        }
        match &self.needle {
            Some(needle) => todo.title.to_lowercase().contains(needle.as_str()),
            None => true,
        }
    }

    /// Orders `(insertion sequence, todo)` pairs.
    pub fn compare(&self, a: (u64, &Todo), b: (u64, &Todo)) -> Ordering {
        let by_time = match self.order {
            SortOrder::Ascending => a.1.updated_at.cmp(&b.1.updated_at),
            SortOrder::Descending => b.1.updated_at.cmp(&a.1.updated_at),
        };
        by_time.then(a.0.cmp(&b.0))
    }

    /// Runs filter, sort and pagination over `(insertion sequence, todo)`
    /// pairs and returns owned copies of the selected page.
    pub fn apply<'a, I>(&self, records: I) -> Vec<Todo>
    where
        I: IntoIterator<Item = (u64, &'a Todo)>,
    {
        let mut selected: Vec<(u64, &Todo)> = records
            .into_iter()
            .filter(|(_, todo)| self.matches(todo))
            .collect();
        selected.sort_by(|a, b| self.compare(*a, *b));

        let offset = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        selected
            .into_iter()
            .skip(offset)
            .take(self.size as usize)
            .map(|(_, todo)| todo.clone())
            .collect()
    }
}
