//! Bounded-concurrency task runner.

use std::future::Future;

use futures::future::join_all;
use tokio::sync::Semaphore;

/// Runs futures with at most `ceiling` in flight at once.
///
/// Waiters are admitted in submission order (tokio's semaphore is fair). A
/// task that returns an error value does not affect the others: its permit is
/// released as soon as it completes.
#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Semaphore,
    ceiling: usize,
}

impl ConcurrencyLimiter {
    /// A ceiling of zero would never admit anything and is raised to one.
    pub fn new(ceiling: usize) -> Self {
        let ceiling = ceiling.max(1);
        Self {
            semaphore: Semaphore::new(ceiling),
            ceiling,
        }
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Wait for a free slot, then run `task` to completion.
    pub async fn run<F: Future>(&self, task: F) -> F::Output {
        // The semaphore is owned by the limiter and never closed.
        let _permit = self.semaphore.acquire().await.ok();
        task.await
    }

    /// Run every task under the ceiling and return the outputs in input order.
    pub async fn run_all<I>(&self, tasks: I) -> Vec<<I::Item as Future>::Output>
    where
        I: IntoIterator,
        I::Item: Future,
    {
        join_all(tasks.into_iter().map(|task| self.run(task))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[test]
    fn test_zero_ceiling_is_clamped() {
        assert_eq!(ConcurrencyLimiter::new(0).ceiling(), 1);
        assert_eq!(ConcurrencyLimiter::new(5).ceiling(), 5);
    }

    #[tokio::test]
    async fn test_never_exceeds_ceiling() {
        let limiter = ConcurrencyLimiter::new(3);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks = (0..12).map(|i| {
            let running = running.clone();
            let peak = peak.clone();
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5 + (i % 4) * 3)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                i
            }
        });

        let outputs = limiter.run_all(tasks).await;

        assert_eq!(outputs, (0..12).collect::<Vec<_>>());
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_admits_in_submission_order() {
        let limiter = ConcurrencyLimiter::new(1);
        let started = Arc::new(Mutex::new(Vec::new()));

        let tasks = (0..5).map(|i| {
            let started = started.clone();
            async move {
                started.lock().unwrap().push(i);
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        });
        limiter.run_all(tasks).await;

        assert_eq!(*started.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_failed_task_frees_its_slot() {
        let limiter = ConcurrencyLimiter::new(1);

        let tasks = (0..3).map(|i| async move {
            if i == 0 {
                Err(format!("task {} failed", i))
            } else {
                Ok(i)
            }
        });
        let outputs = limiter.run_all(tasks).await;

        assert!(outputs[0].is_err());
        assert_eq!(outputs[1], Ok(1));
        assert_eq!(outputs[2], Ok(2));
    }
}
