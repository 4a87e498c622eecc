use std::fmt;

use tracing::debug;

/// A task description, trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task(String);

impl Task {
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pending tasks in insertion order. Lives for the session only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    items: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the trimmed text. Returns false when there was nothing to add.
    pub fn add(&mut self, text: &str) -> bool {
        match Task::parse(text) {
            Some(task) => {
                self.items.push(task);
                debug!(count = self.items.len(), "task added");
                true
            }
            None => {
                debug!("ignoring empty task text");
                false
            }
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<Task> {
        if index >= self.items.len() {
            debug!(index, count = self.items.len(), "remove index out of range");
            return None;
        }
        let removed = self.items.remove(index);
        debug!(index, count = self.items.len(), "task removed");
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.items.iter()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.items.iter().map(|task| task.0.clone()).collect()
    }
}
