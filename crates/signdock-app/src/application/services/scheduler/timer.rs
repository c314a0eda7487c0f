use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use signdock_domain::schedule::CronExpression;
use signdock_domain::shared::{Clock, TaskId};

/// Invoked with the scheduled instant each time a timer fires.
pub type FireCallback = Arc<dyn Fn(DateTime<Utc>) -> BoxFuture<'static, ()> + Send + Sync>;

/// A live trigger for one task.
pub trait TaskTimer: Send + Sync {
    /// Stops future firings. In-flight callbacks are not interrupted.
    fn disarm(&self);

    fn is_armed(&self) -> bool;
}

/// Creates armed timers. Swapped for a controllable implementation in tests.
pub trait TimerFactory: Send + Sync {
    fn arm(&self, task_id: &TaskId, cron: &CronExpression, on_fire: FireCallback)
        -> Box<dyn TaskTimer>;
}

/// How late a trigger may fire before it is reported.
fn late_tolerance() -> chrono::Duration {
    chrono::Duration::seconds(5)
}

/// Sleeps on the tokio timer until the next cron instant, then fires.
pub struct TokioCronTimerFactory {
    tz: Tz,
    clock: Arc<dyn Clock>,
}

impl TokioCronTimerFactory {
    pub fn new(tz: Tz, clock: Arc<dyn Clock>) -> Self {
        Self { tz, clock }
    }
}

impl TimerFactory for TokioCronTimerFactory {
    fn arm(
        &self,
        task_id: &TaskId,
        cron: &CronExpression,
        on_fire: FireCallback,
    ) -> Box<dyn TaskTimer> {
        let task_id = task_id.clone();
        let cron = cron.clone();
        let tz = self.tz;
        let clock = Arc::clone(&self.clock);

        info!("➕ Arming timer for task '{}' ({})", task_id, cron);

        let handle = tokio::spawn(async move {
            let mut cursor = clock.now();
            loop {
                let Some(next) = cron.next_after(cursor, tz) else {
                    error!(
                        "❌ No upcoming trigger for task '{}' ({}), timer exits",
                        task_id, cron
                    );
                    break;
                };

                debug!(
                    "Next run for task '{}': {}",
                    task_id,
                    next.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S %Z")
                );

                // The tokio timer is monotonic while `next` is wall time; re-check
                // after each wake in case the wall clock moved backwards.
                loop {
                    let wait = (next - clock.now()).to_std().unwrap_or_default();
                    if wait.is_zero() {
                        break;
                    }
                    tokio::time::sleep(wait).await;
                }

                let now = clock.now();
                if now - next > late_tolerance() {
                    warn!(
                        "⚠️ Task '{}' trigger for {} is {} seconds late, missed instants are skipped",
                        task_id,
                        next,
                        (now - next).num_seconds()
                    );
                }
                // One fire per wake: a forward clock jump never replays the backlog.
                cursor = next.max(now);

                info!("⏰ Task '{}' triggered for {}", task_id, next);

                // Fire and forget: the next instant is computed without waiting for the run.
                let fire = on_fire(next);
                let id = task_id.clone();
                tokio::spawn(async move {
                    if AssertUnwindSafe(fire).catch_unwind().await.is_err() {
                        error!("❌ Task '{}' run panicked, timer stays armed", id);
                    }
                });
            }
        });

        Box::new(TokioTaskTimer { handle })
    }
}

struct TokioTaskTimer {
    handle: JoinHandle<()>,
}

impl TaskTimer for TokioTaskTimer {
    fn disarm(&self) {
        self.handle.abort();
    }

    fn is_armed(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for TokioTaskTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
