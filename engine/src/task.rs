//! Task tracker payload.

use crate::{Entity, EntityStore, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Task priority, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    /// Numeric rank used for sorting (`Low` = 0).
    pub fn rank(&self) -> i64 {
        *self as i64
    }
}

/// Where a task is in its workflow, declared in workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Review,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Position in the workflow (`Pending` = 0).
    pub fn rank(&self) -> i64 {
        *self as i64
    }

    /// Completed and cancelled tasks are closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}

/// Statuses compare by workflow rank, so sorting follows the workflow
/// rather than the alphabet.
impl From<TaskStatus> for FieldValue {
    fn from(status: TaskStatus) -> Self {
        FieldValue::Int(status.rank())
    }
}

/// Priority filters compare by rank so they line up with priority sorting.
impl From<Priority> for FieldValue {
    fn from(priority: Priority) -> Self {
        FieldValue::Int(priority.rank())
    }
}

/// A unit of work in the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub assignee: Option<String>,
    pub tags: Vec<String>,
}

impl Task {
    /// A new pending, unassigned task without tags.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority,
            status: TaskStatus::Pending,
            assignee: None,
            tags: Vec::new(),
        }
    }

    /// Add a tag unless already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.has_tag(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

impl Entity for Task {
    const FIELDS: &'static [&'static str] =
        &["title", "description", "priority", "status", "assignee", "tags"];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "title" => Some(self.title.as_str().into()),
            "description" => Some(self.description.as_str().into()),
            "priority" => Some(self.priority.into()),
            "status" => Some(self.status.into()),
            "assignee" => Some(self.assignee.clone().into()),
            "tags" => Some(self.tags.clone().into()),
            _ => None,
        }
    }
}

/// Aggregate counts over a task store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub open: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
}

impl TaskStats {
    /// Compute statistics for every task in the store.
    pub fn collect(store: &EntityStore<Task>) -> Self {
        let by_status: BTreeMap<String, usize> = store
            .count_by_key(|t| t.status)
            .into_iter()
            .map(|(status, count)| (status.as_str().to_string(), count))
            .collect();
        let by_priority = store
            .count_by_key(|t| t.priority)
            .into_iter()
            .map(|(priority, count)| (priority.as_str().to_string(), count))
            .collect();
        let open = store
            .count_by_key(|t| t.status.is_closed())
            .get(&false)
            .copied()
            .unwrap_or(0);

        Self {
            total: by_status.values().sum(),
            open,
            by_status,
            by_priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Filter, PageRequest, SortKey};

    fn seeded() -> EntityStore<Task> {
        let store = EntityStore::new();
        let auth = store.create(Task::new(
            "Implement user authentication",
            "Add JWT-based authentication system",
            Priority::High,
        ));
        store.create(Task::new("Write docs", "Usage guide", Priority::Low));
        store.create(Task::new("Fix crash on start", "Null config", Priority::Critical));

        store.update(auth.id(), |t| {
            t.status = TaskStatus::InProgress;
            t.assignee = Some("Alice".into());
            t.add_tag("security");
        });
        store
    }

    #[test]
    fn new_task_defaults() {
        let task = Task::new("t", "d", Priority::Medium);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.assignee, None);
        assert!(task.tags.is_empty());
    }

    #[test]
    fn tags_are_unique() {
        let mut task = Task::new("t", "d", Priority::Medium);
        task.add_tag("backend");
        task.add_tag("backend");
        assert_eq!(task.tags, vec!["backend".to_string()]);
        assert!(task.has_tag("backend"));
        assert!(!task.has_tag("frontend"));
    }

    #[test]
    fn filter_by_priority_and_status() {
        let store = seeded();

        let high_in_progress = store.filter(
            &Filter::new()
                .eq_opt("priority", Some(Priority::High))
                .eq_opt("status", Some(TaskStatus::InProgress)),
        );
        assert_eq!(high_in_progress.len(), 1);
        assert_eq!(high_in_progress[0].payload().assignee.as_deref(), Some("Alice"));

        let any_pending = store.filter(
            &Filter::new()
                .eq_opt("priority", None::<Priority>)
                .eq("status", TaskStatus::Pending),
        );
        assert_eq!(any_pending.len(), 2);
    }

    #[test]
    fn unassigned_tasks_match_null() {
        let store = seeded();
        let unassigned = store.filter(&Filter::new().eq("assignee", FieldValue::Null));
        assert_eq!(unassigned.len(), 2);
    }

    #[test]
    fn filter_by_tag() {
        let store = seeded();
        let tagged = store.filter(&Filter::new().includes("tags", "security"));
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].payload().title, "Implement user authentication");
    }

    #[test]
    fn sort_by_priority_rank() {
        let store = seeded();
        let page = store.paginate(
            &Filter::new(),
            &SortKey::desc("priority"),
            PageRequest::default(),
        );
        let priorities: Vec<_> = page.items.iter().map(|r| r.payload().priority).collect();
        assert_eq!(
            priorities,
            vec![Priority::Critical, Priority::High, Priority::Low]
        );
    }

    #[test]
    fn sort_by_status_follows_workflow() {
        let store = seeded();
        store.update(2, |t| t.status = TaskStatus::Cancelled);
        store.update(3, |t| t.status = TaskStatus::Review);
        store.create(Task::new("Ship it", "", Priority::Medium));

        let page = store.paginate(
            &Filter::new(),
            &SortKey::by("status"),
            PageRequest::default(),
        );
        let statuses: Vec<_> = page.items.iter().map(|r| r.payload().status).collect();
        assert_eq!(
            statuses,
            vec![
                TaskStatus::Pending,
                TaskStatus::InProgress,
                TaskStatus::Review,
                TaskStatus::Cancelled,
            ]
        );
    }

    #[test]
    fn stats() {
        let store = seeded();
        store.update(2, |t| t.status = TaskStatus::Completed);

        let stats = TaskStats::collect(&store);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.open, 2);
        assert_eq!(stats.by_status["in_progress"], 1);
        assert_eq!(stats.by_status["completed"], 1);
        assert_eq!(stats.by_status["pending"], 1);
        assert_eq!(stats.by_priority["critical"], 1);
        assert!(!stats.by_priority.contains_key("medium"));
    }

    #[test]
    fn serializes_snake_case_enums() {
        let task = Task::new("t", "d", Priority::Critical);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["priority"], "critical");
        assert_eq!(json["status"], "pending");
    }
}
