//! Recurring tasks: definitions, timers and execution history.

pub mod queue;
pub mod runtime;
pub mod service;
pub mod task;

pub use runtime::SchedulerRuntime;
pub use service::{SharedScheduler, TaskScheduler};
pub use task::{
    NewTask, ScheduledTask, TaskExecutionResult, TaskState, TaskUpdate, interval_spec,
    normalize_interval,
};
