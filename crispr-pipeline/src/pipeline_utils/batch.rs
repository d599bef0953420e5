//! Bounded concurrent execution for one scheduling round

use futures::{stream::FuturesUnordered, Future, StreamExt};
use tokio::sync::Semaphore;

/// Context provided to each item in a batch
#[derive(Debug, Clone, Copy)]
pub struct BatchContext {
    /// Scheduling iteration (for logging)
    pub iteration: usize,
    /// Item number (1-indexed for display)
    pub item_number: usize,
    /// Total number of items in this batch
    pub total_items: usize,
}

/// Execute items concurrently, at most `concurrency` at a time, and wait for
/// all of them
///
/// Unlike a fail-fast batch, every item runs to completion: the executor
/// reports its own success or failure inside `R`. Futures are polled on the
/// current task, so they may borrow from the caller.
///
/// # Returns
/// Results in input order.
pub async fn execute_settled<T, F, Fut, R>(
    iteration: usize,
    items: Vec<T>,
    concurrency: usize,
    executor: F,
) -> Vec<R>
where
    F: Fn(T, BatchContext) -> Fut,
    Fut: Future<Output = R>,
{
    let total = items.len();
    let sem = Semaphore::new(concurrency.max(1));
    let mut running = FuturesUnordered::new();

    for (idx, item) in items.into_iter().enumerate() {
        let ctx = BatchContext {
            iteration,
            item_number: idx + 1,
            total_items: total,
        };
        let sem = &sem;
        let fut = executor(item, ctx);

        running.push(async move {
            // The semaphore lives for the whole call and is never closed
            let _permit = sem.acquire().await.ok();
            (idx, fut.await)
        });
    }

    let mut results: Vec<(usize, R)> = Vec::with_capacity(total);
    while let Some(result) = running.next().await {
        results.push(result);
    }

    results.sort_by_key(|(idx, _)| *idx);
    results.into_iter().map(|(_, r)| r).collect()
}
