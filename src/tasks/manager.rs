//! Tracks in-flight requests and collects their results.

use std::collections::HashMap;
use std::sync::mpsc::{self, TryRecvError};

use super::{BackgroundTask, TaskCompletion, TaskId, TaskOutcome, TaskType, TaskUpdate};

pub struct BackgroundTaskManager {
    tasks: HashMap<TaskId, BackgroundTask>,
    /// Order in which tasks were added, for display.
    task_order: Vec<TaskId>,
}

impl BackgroundTaskManager {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            task_order: Vec::new(),
        }
    }

    /// Register a new task. Returns its id and the sender the worker reports on.
    pub fn register_task(&mut self, task_type: TaskType) -> (TaskId, mpsc::Sender<TaskUpdate>) {
        let (tx, rx) = mpsc::channel();
        let task = BackgroundTask::new(task_type, rx);
        let id = task.id;

        self.tasks.insert(id, task);
        self.task_order.push(id);

        (id, tx)
    }

    /// Run `job` on a worker thread. Returns `None` if a task of the same
    /// type is still running.
    pub fn spawn<F>(&mut self, task_type: TaskType, job: F) -> Option<TaskId>
    where
        F: FnOnce() -> TaskOutcome + Send + 'static,
    {
        if self.is_running(task_type) {
            return None;
        }

        let (id, tx) = self.register_task(task_type);
        std::thread::spawn(move || {
            let _ = tx.send(TaskUpdate::Started);
            let outcome = job();
            let _ = tx.send(TaskUpdate::Finished(outcome));
        });

        Some(id)
    }

    /// Check if a task of the given type is already running.
    pub fn is_running(&self, task_type: TaskType) -> bool {
        self.tasks.values().any(|t| t.task_type == task_type)
    }

    /// Drain all task channels. A worker that hung up without a result
    /// completes with [`TaskOutcome::lost`].
    pub fn poll_updates(&mut self) -> Vec<TaskCompletion> {
        let mut completed = Vec::new();

        for id in self.task_order.clone() {
            let Some(task) = self.tasks.get_mut(&id) else {
                continue;
            };

            loop {
                match task.receiver.try_recv() {
                    Ok(TaskUpdate::Started) => task.sent = true,
                    Ok(TaskUpdate::Finished(outcome)) => {
                        completed.push(TaskCompletion {
                            id,
                            task_type: task.task_type,
                            outcome,
                        });
                        break;
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        tracing::error!(task = task.task_type.display_name(), "worker exited without a result");
                        completed.push(TaskCompletion {
                            id,
                            task_type: task.task_type,
                            outcome: TaskOutcome::lost(task.task_type),
                        });
                        break;
                    }
                }
            }
        }

        for info in &completed {
            self.tasks.remove(&info.id);
            self.task_order.retain(|id| *id != info.id);
        }

        completed
    }

    /// Get all running tasks for display, oldest first.
    pub fn running_tasks(&self) -> Vec<&BackgroundTask> {
        self.task_order
            .iter()
            .filter_map(|id| self.tasks.get(id))
            .collect()
    }

    pub fn has_running_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }
}

impl Default for BackgroundTaskManager {
    fn default() -> Self {
        Self::new()
    }
}
