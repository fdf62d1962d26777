use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use courier_core::{DeliveryFailure, Frequency};

/// A deferred send: one boxed future per (user, message, channel) triple.
///
/// Resolves to `None` on success or the failure to report. Owned by exactly
/// one scheduler and dropped after execution.
pub type BatchTask = BoxFuture<'static, Option<DeliveryFailure>>;

struct Inner {
    cadence: Frequency,
    pending: Mutex<VecDeque<BatchTask>>,
    /// Serialises flushes: overlapping `run` calls queue up here instead of
    /// interleaving.
    flush_lock: tokio::sync::Mutex<()>,
}

impl Inner {
    fn add_task(&self, task: BatchTask) {
        let mut pending = self.pending.lock().unwrap();
        pending.push_back(task);
        debug!(cadence = %self.cadence, pending = pending.len(), "task enqueued");
    }
}

/// Accumulates tasks for one cadence and executes them as a single batch.
///
/// Insertion order is execution order. Tasks enqueued while a flush is in
/// progress wait for the next cycle — the pending queue is taken atomically
/// at flush start.
pub struct BatchScheduler {
    inner: Arc<Inner>,
}

impl BatchScheduler {
    pub fn new(cadence: Frequency) -> Self {
        Self {
            inner: Arc::new(Inner {
                cadence,
                pending: Mutex::new(VecDeque::new()),
                flush_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn cadence(&self) -> Frequency {
        self.inner.cadence
    }

    /// Append a task to the pending batch.
    ///
    /// Returns a [`SchedulerHandle`] so the task itself can enqueue
    /// follow-up work; anything added mid-flush lands in the next cycle,
    /// which keeps chained tasks from growing a flush unboundedly.
    pub fn add_task(&self, task: BatchTask) -> SchedulerHandle {
        self.inner.add_task(task);
        self.handle()
    }

    /// A cloneable enqueue-only handle to this scheduler.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of tasks waiting for the next flush.
    pub fn pending_len(&self) -> usize {
        self.inner.pending.lock().unwrap().len()
    }

    /// Execute every task that was pending at flush start, in FIFO order.
    ///
    /// Each task's failure is collected rather than propagated, so one bad
    /// send never aborts the rest of the batch. Concurrent `run` calls are
    /// serialised; the later caller sees whatever queued up in the meantime.
    pub async fn run(&self) -> Vec<DeliveryFailure> {
        let _guard = self.inner.flush_lock.lock().await;

        let batch: Vec<BatchTask> = {
            let mut pending = self.inner.pending.lock().unwrap();
            pending.drain(..).collect()
        };
        if batch.is_empty() {
            debug!(cadence = %self.inner.cadence, "flush with empty batch");
            return Vec::new();
        }

        debug!(cadence = %self.inner.cadence, count = batch.len(), "flushing batch");
        let mut failures = Vec::new();
        for task in batch {
            if let Some(failure) = task.await {
                warn!(
                    cadence = %self.inner.cadence,
                    user_id = %failure.user_id,
                    error = %failure.error,
                    "batched delivery failed"
                );
                failures.push(failure);
            }
        }
        failures
    }
}

/// Enqueue-only view of a [`BatchScheduler`], safe to hand to tasks.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Arc<Inner>,
}

impl SchedulerHandle {
    pub fn add_task(&self, task: BatchTask) -> SchedulerHandle {
        self.inner.add_task(task);
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn recording(log: Arc<Mutex<Vec<u32>>>, id: u32) -> BatchTask {
        Box::pin(async move {
            log.lock().unwrap().push(id);
            None
        })
    }

    fn failing(user_id: &str) -> BatchTask {
        let user_id = user_id.to_string();
        Box::pin(async move {
            Some(DeliveryFailure {
                user_id,
                error: "boom".to_string(),
            })
        })
    }

    #[tokio::test]
    async fn tasks_run_in_insertion_order() {
        let scheduler = BatchScheduler::new(Frequency::Daily);
        let log = Arc::new(Mutex::new(Vec::new()));
        for id in 0..5 {
            scheduler.add_task(recording(log.clone(), id));
        }

        let failures = scheduler.run().await;
        assert!(failures.is_empty());
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(scheduler.pending_len(), 0);
    }

    #[tokio::test]
    async fn a_failing_task_does_not_abort_the_batch() {
        let scheduler = BatchScheduler::new(Frequency::Daily);
        let log = Arc::new(Mutex::new(Vec::new()));
        scheduler.add_task(failing("u1"));
        scheduler.add_task(recording(log.clone(), 7));

        let failures = scheduler.run().await;
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].user_id, "u1");
        assert_eq!(*log.lock().unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn flushing_an_empty_batch_is_a_no_op() {
        let scheduler = BatchScheduler::new(Frequency::Weekly);
        assert!(scheduler.run().await.is_empty());
        assert!(scheduler.run().await.is_empty());
    }

    #[tokio::test]
    async fn tasks_chained_from_a_running_task_wait_for_the_next_cycle() {
        let scheduler = BatchScheduler::new(Frequency::Daily);
        let counter = Arc::new(AtomicUsize::new(0));

        let handle = scheduler.handle();
        let chained_counter = counter.clone();
        scheduler.add_task(Box::pin(async move {
            chained_counter.fetch_add(1, Ordering::SeqCst);
            let follow_up = chained_counter.clone();
            handle.add_task(Box::pin(async move {
                follow_up.fetch_add(1, Ordering::SeqCst);
                None
            }));
            None
        }));

        scheduler.run().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending_len(), 1);

        scheduler.run().await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.pending_len(), 0);
    }

    #[tokio::test]
    async fn concurrent_flushes_never_double_run_a_task() {
        let scheduler = BatchScheduler::new(Frequency::Daily);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let c = counter.clone();
            scheduler.add_task(Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                c.fetch_add(1, Ordering::SeqCst);
                None
            }));
        }

        let (first, second) = tokio::join!(scheduler.run(), scheduler.run());
        assert!(first.is_empty() && second.is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
