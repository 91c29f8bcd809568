//! Nested task progress reporting over `tracing`.
//!
//! Model construction is a sequence of long streamed passes. `TaskProgress`
//! keeps a stack of open tasks, counts items per task, and logs start and
//! finish lines (with the count and elapsed time) at info level.

use std::time::Instant;

#[derive(Debug)]
struct Task {
    name: String,
    unit: Option<String>,
    count: u64,
    started: Instant,
}

/// Stack of open tasks.
#[derive(Debug, Default)]
pub struct TaskProgress {
    tasks: Vec<Task>,
}

impl TaskProgress {
    pub fn new() -> Self {
        TaskProgress::default()
    }

    /// Open a task with no item counter.
    pub fn start(&mut self, name: impl Into<String>) {
        self.open(name.into(), None);
    }

    /// Open a task that counts items, e.g. `("Loading entities", "entities loaded")`.
    pub fn start_counted(&mut self, name: impl Into<String>, unit: impl Into<String>) {
        self.open(name.into(), Some(unit.into()));
    }

    fn open(&mut self, name: String, unit: Option<String>) {
        tracing::info!(depth = self.tasks.len(), "{}...", name);
        self.tasks.push(Task {
            name,
            unit,
            count: 0,
            started: Instant::now(),
        });
    }

    /// Count one item against the innermost task.
    pub fn progress(&mut self) {
        if let Some(task) = self.tasks.last_mut() {
            task.count += 1;
        }
    }

    /// Close the innermost task, returning its item count.
    pub fn finish(&mut self) -> u64 {
        let Some(task) = self.tasks.pop() else {
            return 0;
        };
        let elapsed_ms = task.started.elapsed().as_millis() as u64;
        match task.unit {
            Some(unit) => tracing::info!(
                depth = self.tasks.len(),
                elapsed_ms,
                "{} done: {} {}",
                task.name,
                task.count,
                unit
            ),
            None => tracing::info!(depth = self.tasks.len(), elapsed_ms, "{} done", task.name),
        }
        task.count
    }

    /// Close every task opened above `depth` after a failure, innermost first.
    pub fn abort_to(&mut self, depth: usize) {
        while self.tasks.len() > depth {
            let Some(task) = self.tasks.pop() else {
                break;
            };
            tracing::warn!(
                depth = self.tasks.len(),
                "{} aborted after {} items",
                task.name,
                task.count
            );
        }
    }

    /// Number of open tasks.
    pub fn depth(&self) -> usize {
        self.tasks.len()
    }
}
