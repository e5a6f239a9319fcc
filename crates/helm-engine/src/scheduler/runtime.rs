use super::service::SharedScheduler;
use crate::clock::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Longest single sleep, so wall-clock jumps are picked up eventually.
const MAX_WAIT: Duration = Duration::from_secs(60);

/// Background task that fires scheduled tasks when their timers come due.
pub struct SchedulerRuntime;

impl SchedulerRuntime {
    pub fn spawn(
        scheduler: SharedScheduler,
        clock: Arc<dyn Clock>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Scheduler runtime started");
            loop {
                for result in scheduler.run_due() {
                    debug!(task = %result.task_id, "{}", result.message);
                }

                let wait = match scheduler.next_due() {
                    Some(due) => (due - clock.now())
                        .to_std()
                        .unwrap_or(Duration::ZERO)
                        .min(MAX_WAIT),
                    None => MAX_WAIT,
                };

                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(wait) => {}
                    _ = scheduler.wake().notified() => {}
                }
            }
            info!("Scheduler runtime stopped");
        })
    }
}
