use super::queue::TimerQueue;
use super::task::{NewTask, RESULT_HISTORY, ScheduledTask, TaskExecutionResult, TaskUpdate};
use crate::clock::Clock;
use crate::history::ActionLog;
use crate::storage::{self, SCHEDULED_TASKS, Storage};
use chrono::{DateTime, Utc};
use helm_common::protocol::{BrowserAction, new_id};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tracing::{debug, info};

/// Recurring task definitions, their timers and recent execution results.
///
/// A task has an armed timer exactly when it is active. Definitions are
/// persisted after every change; results only live in memory.
pub struct TaskScheduler {
    tasks: Vec<ScheduledTask>,
    results: HashMap<String, VecDeque<TaskExecutionResult>>,
    timers: TimerQueue,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    history: ActionLog,
}

impl TaskScheduler {
    /// Load saved tasks and re-arm the active ones one interval from now.
    pub fn load(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>, history: ActionLog) -> Self {
        let tasks: Vec<ScheduledTask> =
            storage::load_json(&*storage, SCHEDULED_TASKS).unwrap_or_default();

        let mut scheduler = Self {
            tasks,
            results: HashMap::new(),
            timers: TimerQueue::new(),
            storage,
            clock,
            history,
        };

        let now = scheduler.clock.now();
        let mut armed = 0;
        for i in 0..scheduler.tasks.len() {
            if !scheduler.tasks[i].is_active {
                continue;
            }
            let due = scheduler.tasks[i].next_run_after(now);
            scheduler.tasks[i].next_run = Some(due);
            scheduler.timers.arm(&scheduler.tasks[i].id, due);
            armed += 1;
        }
        if armed > 0 {
            debug!("Re-armed {} scheduled task(s)", armed);
            scheduler.persist();
        }
        scheduler
    }

    pub fn create(&mut self, new: NewTask) -> ScheduledTask {
        let now = self.clock.now();
        let mut task = ScheduledTask {
            id: new_id(),
            name: new.name,
            description: new.description,
            interval: new.interval,
            command: new.command,
            is_active: true,
            last_run: None,
            next_run: None,
            created_at: now,
        };
        let due = task.next_run_after(now);
        task.next_run = Some(due);
        self.timers.arm(&task.id, due);

        info!(
            "Task \"{}\" scheduled to run every {} minute(s)",
            task.name,
            task.interval_minutes()
        );
        self.tasks.push(task.clone());
        self.persist();
        task
    }

    /// Snapshot of every task in creation order.
    pub fn list(&self) -> Vec<ScheduledTask> {
        self.tasks.clone()
    }

    pub fn get(&self, id: &str) -> Option<ScheduledTask> {
        self.find(id).map(|i| self.tasks[i].clone())
    }

    pub fn update(&mut self, id: &str, update: TaskUpdate) -> Option<ScheduledTask> {
        let index = self.find(id)?;
        self.timers.disarm(id);

        let now = self.clock.now();
        let task = &mut self.tasks[index];
        let was_active = task.is_active;
        let old_minutes = task.interval_minutes();

        if let Some(name) = update.name {
            task.name = name;
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(interval) = update.interval {
            task.interval = interval;
        }
        if let Some(command) = update.command {
            task.command = command;
        }
        if let Some(is_active) = update.is_active {
            task.is_active = is_active;
        }

        let interval_changed = task.interval_minutes() != old_minutes;
        let resumed = task.is_active && !was_active;
        let stale = task.next_run.is_none_or(|next| next <= now);
        if interval_changed || resumed || (task.is_active && stale) {
            task.next_run = Some(task.next_run_after(now));
        }

        if task.is_active
            && let Some(due) = task.next_run
        {
            self.timers.arm(id, due);
        }

        let task = self.tasks[index].clone();
        self.persist();
        Some(task)
    }

    /// Flip between active and paused.
    pub fn toggle(&mut self, id: &str) -> Option<ScheduledTask> {
        let is_active = self.tasks[self.find(id)?].is_active;
        self.update(
            id,
            TaskUpdate {
                is_active: Some(!is_active),
                ..TaskUpdate::default()
            },
        )
    }

    /// Remove a task together with its timer and results.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.find(id) else {
            return false;
        };
        self.timers.disarm(id);
        let task = self.tasks.remove(index);
        self.results.remove(id);
        self.persist();
        info!("Deleted task \"{}\"", task.name);
        true
    }

    /// Results for a task, oldest first. Empty for unknown ids.
    pub fn results(&self, id: &str) -> Vec<TaskExecutionResult> {
        self.results
            .get(id)
            .map(|results| results.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Run a task now. An active task's timer restarts from this run.
    pub fn execute(&mut self, id: &str) -> Option<TaskExecutionResult> {
        let index = self.find(id)?;
        let now = self.clock.now();

        let task = &mut self.tasks[index];
        task.last_run = Some(now);
        task.next_run = Some(task.next_run_after(now));
        let task = task.clone();

        self.timers.disarm(id);
        if task.is_active
            && let Some(due) = task.next_run
        {
            self.timers.arm(id, due);
        }
        self.persist();

        info!("Executing task: {}", task.name);
        let action = BrowserAction::navigate(format!("Automated task: {}", task.name), now)
            .with_details(task.command.clone());
        let result = TaskExecutionResult {
            task_id: task.id.clone(),
            success: true,
            message: format!("Task \"{}\" executed successfully", task.name),
            actions: vec![action],
            timestamp: now,
        };

        self.history.append(&result.actions);
        let results = self.results.entry(task.id).or_default();
        results.push_back(result.clone());
        while results.len() > RESULT_HISTORY {
            results.pop_front();
        }

        Some(result)
    }

    /// Fire every timer that is due now. Each task fires at most once per
    /// call; missed periods are not replayed.
    pub fn run_due(&mut self) -> Vec<TaskExecutionResult> {
        let now = self.clock.now();
        let mut fired = Vec::new();
        while let Some(id) = self.timers.pop_due(now) {
            if let Some(result) = self.execute(&id) {
                fired.push(result);
            }
        }
        fired
    }

    /// Earliest due time across armed timers.
    pub fn next_due(&mut self) -> Option<DateTime<Utc>> {
        self.timers.peek_due()
    }

    pub fn is_armed(&self, id: &str) -> bool {
        self.timers.is_armed(id)
    }

    pub fn history(&self) -> &ActionLog {
        &self.history
    }

    fn find(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn persist(&self) {
        storage::persist(&*self.storage, SCHEDULED_TASKS, &self.tasks);
    }
}

/// Handle shared by command processing and the timer runtime.
///
/// Changes made through this handle wake the runtime so it can recompute
/// how long to sleep.
#[derive(Clone)]
pub struct SharedScheduler {
    inner: Arc<Mutex<TaskScheduler>>,
    wake: Arc<Notify>,
}

impl SharedScheduler {
    pub fn new(scheduler: TaskScheduler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, TaskScheduler> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the scheduler and wake the runtime afterwards.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut TaskScheduler) -> R) -> R {
        let out = f(&mut self.lock());
        self.wake.notify_one();
        out
    }

    pub fn create(&self, new: NewTask) -> ScheduledTask {
        self.with_mut(|scheduler| scheduler.create(new))
    }

    pub fn list(&self) -> Vec<ScheduledTask> {
        self.lock().list()
    }

    pub fn get(&self, id: &str) -> Option<ScheduledTask> {
        self.lock().get(id)
    }

    pub fn update(&self, id: &str, update: TaskUpdate) -> Option<ScheduledTask> {
        self.with_mut(|scheduler| scheduler.update(id, update))
    }

    pub fn toggle(&self, id: &str) -> Option<ScheduledTask> {
        self.with_mut(|scheduler| scheduler.toggle(id))
    }

    pub fn delete(&self, id: &str) -> bool {
        self.with_mut(|scheduler| scheduler.delete(id))
    }

    pub fn results(&self, id: &str) -> Vec<TaskExecutionResult> {
        self.lock().results(id)
    }

    pub fn execute(&self, id: &str) -> Option<TaskExecutionResult> {
        self.with_mut(|scheduler| scheduler.execute(id))
    }

    pub fn is_armed(&self, id: &str) -> bool {
        self.lock().is_armed(id)
    }

    pub(crate) fn run_due(&self) -> Vec<TaskExecutionResult> {
        self.lock().run_due()
    }

    pub(crate) fn next_due(&self) -> Option<DateTime<Utc>> {
        self.lock().next_due()
    }

    pub(crate) fn wake(&self) -> &Notify {
        &self.wake
    }
}
