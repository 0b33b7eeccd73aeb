//! In-memory task registry implementing the approval state machine.
//!
//! ```text
//!            approve                 
//! pending ──────────► completed (terminal)
//!    │
//!    └─────reject───► rejected  (terminal)
//! ```
//!
//! Every operation is total over {pending, completed, rejected, absent}:
//! conflicts and unknown ids come back as a [`TaskView`], never as errors.
//! A task id lives in at most one partition.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use serde::Serialize;

use crate::agents::AgentError;
use crate::models::task::{CompletedTask, PendingTask, TaskOutcome, TaskStatus, TaskView};
use crate::workflow::PlanExecutor;

const NOT_PENDING: &str = "Task ID not found in pending plans";
const DOES_NOT_EXIST: &str = "Task ID does not exist";
const APPROVE_REJECTED: &str = "Cannot approve a task that was already rejected.";
const ALREADY_EXECUTED: &str = "Task was already approved and executed.";
const REJECT_COMPLETED: &str = "Task was already approved and executed. Cannot reject it.";
const ALREADY_REJECTED: &str = "Task was already rejected.";
const REJECTED_NOW: &str = "Task has been rejected and removed from queue";
const REJECTED_NOTICE: &str = "This task was explicitly rejected and will not be executed.";

#[derive(Default)]
struct Partitions {
    pending: HashMap<String, PendingTask>,
    approved: HashMap<String, CompletedTask>,
    rejected: HashMap<String, PendingTask>,
}

enum Lookup {
    Pending(PendingTask),
    Completed(CompletedTask),
    Rejected,
    Absent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistryCounts {
    pub pending: usize,
    pub completed: usize,
    pub rejected: usize,
}

pub struct TaskRegistry {
    partitions: RwLock<Partitions>,
    /// Held across approve/reject so a task executes at most once.
    task_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            partitions: RwLock::new(Partitions::default()),
            task_locks: Mutex::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Partitions> {
        self.partitions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Partitions> {
        self.partitions.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn task_lock(&self, task_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.task_locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(task_id.to_string()).or_default().clone()
    }

    /// Drop the map entry once nobody but `lock` and the map refers to it.
    ///
    /// Call only after every partition change for the task is written, so a
    /// caller that creates a fresh lock afterwards sees the final state.
    fn release_task_lock(&self, task_id: &str, lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.task_locks.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = locks
            .get(task_id)
            .is_some_and(|held| Arc::ptr_eq(held, lock) && Arc::strong_count(lock) <= 2);
        if idle {
            locks.remove(task_id);
        }
    }

    fn lookup(&self, task_id: &str) -> Lookup {
        let partitions = self.read();
        if let Some(task) = partitions.approved.get(task_id) {
            Lookup::Completed(task.clone())
        } else if let Some(task) = partitions.pending.get(task_id) {
            Lookup::Pending(task.clone())
        } else if partitions.rejected.contains_key(task_id) {
            Lookup::Rejected
        } else {
            Lookup::Absent
        }
    }

    /// Store a new plan awaiting approval.
    pub fn create(&self, task: PendingTask) -> TaskView {
        let view = TaskView::pending(&task);
        tracing::info!("[Registry] Created pending task {}", task.task_id);
        self.write().pending.insert(task.task_id.clone(), task);
        view
    }

    /// Record a run that completed without going through approval.
    pub fn record_completed(&self, task: CompletedTask) -> TaskView {
        let view = TaskView::completed(&task);
        self.write().approved.insert(task.task_id.clone(), task);
        view
    }

    /// pending → completed, running the plan through `executor`.
    ///
    /// If execution fails the task stays pending and the error is returned.
    pub async fn approve(
        &self,
        task_id: &str,
        executor: &PlanExecutor,
    ) -> Result<TaskView, AgentError> {
        // Settled and unknown ids never take a per-task lock.
        if let Err(view) = approvable(task_id, self.lookup(task_id)) {
            return Ok(view);
        }

        let lock = self.task_lock(task_id);
        let guard = lock.lock().await;
        let outcome = self.approve_locked(task_id, executor).await;
        drop(guard);
        self.release_task_lock(task_id, &lock);
        outcome
    }

    async fn approve_locked(
        &self,
        task_id: &str,
        executor: &PlanExecutor,
    ) -> Result<TaskView, AgentError> {
        let task = match approvable(task_id, self.lookup(task_id)) {
            Ok(task) => task,
            Err(view) => return Ok(view),
        };

        tracing::info!("[Registry] Approving {}: executing planned steps only", task_id);
        let started = Instant::now();
        let result = executor
            .execute(&task.original_request, &task.plan.steps)
            .await?;

        let completed = CompletedTask {
            task_id: task.task_id,
            original_request: task.original_request,
            created_at: task.created_at,
            duration_seconds: round_seconds(started.elapsed().as_secs_f64()),
            outcome: TaskOutcome::Steps { result },
        };
        let view = TaskView::completed(&completed);
        let mut partitions = self.write();
        partitions.pending.remove(task_id);
        partitions.approved.insert(task_id.to_string(), completed);
        Ok(view)
    }

    /// pending → rejected. Completed tasks cannot be rejected.
    pub async fn reject(&self, task_id: &str) -> TaskView {
        if let Err(view) = rejectable(task_id, self.lookup(task_id)) {
            return view;
        }

        let lock = self.task_lock(task_id);
        let guard = lock.lock().await;
        let view = match rejectable(task_id, self.lookup(task_id)) {
            Err(view) => view,
            Ok(()) => {
                let mut partitions = self.write();
                if let Some(task) = partitions.pending.remove(task_id) {
                    partitions.rejected.insert(task_id.to_string(), task);
                }
                tracing::info!("[Registry] Rejected task {}", task_id);
                TaskView::notice(task_id, TaskStatus::Rejected, REJECTED_NOW)
            }
        };
        drop(guard);
        self.release_task_lock(task_id, &lock);
        view
    }

    pub fn query(&self, task_id: &str) -> TaskView {
        match self.lookup(task_id) {
            Lookup::Completed(task) => TaskView::completed(&task),
            Lookup::Pending(task) => TaskView::pending(&task),
            Lookup::Rejected => TaskView::notice(task_id, TaskStatus::Rejected, REJECTED_NOTICE),
            Lookup::Absent => TaskView::not_found(task_id, DOES_NOT_EXIST),
        }
    }

    pub fn counts(&self) -> RegistryCounts {
        let partitions = self.read();
        RegistryCounts {
            pending: partitions.pending.len(),
            completed: partitions.approved.len(),
            rejected: partitions.rejected.len(),
        }
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The pending task to run, or the view explaining why nothing runs.
fn approvable(task_id: &str, found: Lookup) -> Result<PendingTask, TaskView> {
    match found {
        Lookup::Pending(task) => Ok(task),
        Lookup::Completed(task) => Err(TaskView::completed(&task).with_detail(ALREADY_EXECUTED)),
        Lookup::Rejected => Err(TaskView::notice(task_id, TaskStatus::Rejected, APPROVE_REJECTED)),
        Lookup::Absent => Err(TaskView::not_found(task_id, NOT_PENDING)),
    }
}

fn rejectable(task_id: &str, found: Lookup) -> Result<(), TaskView> {
    match found {
        Lookup::Pending(_) => Ok(()),
        Lookup::Completed(_) => Err(TaskView::notice(task_id, TaskStatus::Completed, REJECT_COMPLETED)),
        Lookup::Rejected => Err(TaskView::notice(task_id, TaskStatus::Rejected, ALREADY_REJECTED)),
        Lookup::Absent => Err(TaskView::not_found(task_id, NOT_PENDING)),
    }
}

/// Round to two decimals for reporting.
pub(crate) fn round_seconds(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}
