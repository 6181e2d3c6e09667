//! Pure filtering and counter derivation over a todo list.
//!
//! Nothing here talks to the network. Callers pass the reference date
//! explicitly so results are reproducible at any point in time.

use chrono::{Duration, NaiveDate};

use crate::types::{Priority, Todo};

/// Completion status filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

/// Category filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(i64),
}

/// Due-date window filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DueFilter {
    #[default]
    All,
    /// Due exactly today
    Today,
    /// Due within the next 7 days, past-due included
    Week,
    /// Due within the next 30 days, past-due included
    Month,
    /// Past due and still open
    Overdue,
}

/// The dashboard's current filter selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    /// Case-insensitive match against title or description
    pub search: String,
    pub status: StatusFilter,
    /// `None` means all priorities
    pub priority: Option<Priority>,
    pub category: CategoryFilter,
    pub due: DueFilter,
}

impl Filters {
    /// Whether `todo` passes every active criterion
    pub fn matches(&self, todo: &Todo, today: NaiveDate) -> bool {
        if !self.search.is_empty() {
            let query = self.search.to_lowercase();
            let in_title = todo.title.to_lowercase().contains(&query);
            let in_description = todo.description.to_lowercase().contains(&query);
            if !in_title && !in_description {
                return false;
            }
        }

        match self.status {
            StatusFilter::All => {}
            StatusFilter::Pending => {
                if todo.completed {
                    return false;
                }
            }
            StatusFilter::Completed => {
                if !todo.completed {
                    return false;
                }
            }
        }

        if let Some(priority) = self.priority {
            if todo.priority != priority {
                return false;
            }
        }

        if let CategoryFilter::Only(id) = self.category {
            if todo.category_id != Some(id) {
                return false;
            }
        }

        match self.due {
            DueFilter::All => {}
            DueFilter::Today => {
                if todo.due_date != today {
                    return false;
                }
            }
            DueFilter::Week => {
                if todo.due_date > today + Duration::days(7) {
                    return false;
                }
            }
            DueFilter::Month => {
                if todo.due_date > today + Duration::days(30) {
                    return false;
                }
            }
            DueFilter::Overdue => {
                if !todo.is_overdue(today) {
                    return false;
                }
            }
        }

        true
    }
}

/// Select the todos passing `filters`, preserving input order
pub fn apply<'a>(todos: &'a [Todo], filters: &Filters, today: NaiveDate) -> Vec<&'a Todo> {
    todos
        .iter()
        .filter(|todo| filters.matches(todo, today))
        .collect()
}

/// Dashboard counters derived from the unfiltered todo list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
}

/// Compute counters over the whole list, ignoring any filter selection
pub fn stats(todos: &[Todo], today: NaiveDate) -> Stats {
    let mut stats = Stats {
        total: todos.len(),
        ..Stats::default()
    };

    for todo in todos {
        if todo.completed {
            stats.completed += 1;
        } else {
            stats.pending += 1;
            if todo.is_overdue(today) {
                stats.overdue += 1;
            }
        }
    }

    stats
}
