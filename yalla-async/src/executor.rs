//! Bounded-concurrency fan-out (C8): `run_parallel` admits up to
//! `max_concurrent` operations at once, preserves submission order in its
//! result, and fails fast — once any operation rejects, queued-but-not-yet-
//! started operations are cancelled (currently in-flight ones are allowed
//! to reach a terminal state first).

use crate::error::AsyncError;
use crate::promise::{pending, CancellationToken, Promise};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Result of one unit of work submitted to [`AsyncExecutor::run_parallel`].
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub exit_code: i32,
    pub duration_ms: u128,
    pub output: Option<String>,
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A unit of work: given its cooperative cancellation token, produces an
/// outcome or a rejection.
pub type Operation = Box<dyn FnOnce(CancellationToken) -> BoxFuture<Result<OperationOutcome, AsyncError>> + Send>;

/// Wraps a plain async closure as a boxed [`Operation`].
pub fn operation<F, Fut>(f: F) -> Operation
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<OperationOutcome, AsyncError>> + Send + 'static,
{
    Box::new(move |token| Box::pin(f(token)))
}

pub struct AsyncExecutor {
    max_concurrent: usize,
}

impl AsyncExecutor {
    pub fn new(max_concurrent: usize) -> Self {
        Self { max_concurrent: max_concurrent.max(1) }
    }

    /// Submits every operation, returning one promise per submission
    /// (ordered by submission index) immediately; each promise settles as
    /// its own operation completes, times out, or is cancelled.
    pub fn run_parallel(
        &self,
        operations: Vec<Operation>,
        async_timeout: Option<Duration>,
    ) -> Vec<Promise<OperationOutcome>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let abort = Arc::new(AtomicBool::new(false));
        let total = operations.len();
        let mut promises = Vec::with_capacity(total);

        let mut pairs = Vec::with_capacity(total);
        for op in operations {
            let (promise, resolver) = pending::<OperationOutcome>();
            promises.push(promise);
            pairs.push((op, resolver));
        }

        for (index, (op, resolver)) in pairs.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let abort_check = Arc::clone(&abort);
            let abort_set = Arc::clone(&abort);

            let handle = tokio::spawn(async move {
                let permit = semaphore.acquire_owned().await;
                let Ok(permit) = permit else {
                    return Err(AsyncError::Cancelled);
                };
                if abort_check.load(Ordering::SeqCst) {
                    drop(permit);
                    return Err(AsyncError::Cancelled);
                }

                let token = CancellationToken::new();
                let start = Instant::now();
                let fut = op(token.clone());
                let result = match async_timeout {
                    Some(duration) => match tokio::time::timeout(duration, fut).await {
                        Ok(inner) => inner,
                        Err(_) => {
                            token.cancel();
                            Err(AsyncError::Timeout)
                        }
                    },
                    None => fut.await,
                };
                drop(permit);
                result.map(|mut outcome| {
                    outcome.duration_ms = start.elapsed().as_millis();
                    outcome
                })
            });

            // A separate supervisor task joins the handle so a panic inside
            // `op` surfaces as `AsyncError::Join` rather than leaving the
            // promise pending forever.
            tokio::spawn(async move {
                match handle.await {
                    Ok(Ok(outcome)) => resolver.resolve(outcome),
                    Ok(Err(error)) => {
                        abort_set.store(true, Ordering::SeqCst);
                        resolver.reject(error);
                    }
                    Err(join_error) => {
                        abort_set.store(true, Ordering::SeqCst);
                        resolver.reject(AsyncError::Join(Arc::new(join_error)));
                    }
                }
                tracing::trace!(index, "operation settled");
            });
        }

        promises
    }

    /// Awaits every promise from [`run_parallel`] and collapses them into a
    /// single ordered result: `Ok` only if every operation fulfilled,
    /// otherwise an aggregate rejection naming which indices failed.
    pub async fn await_all(
        promises: Vec<Promise<OperationOutcome>>,
    ) -> Result<Vec<OperationOutcome>, AsyncError> {
        let mut results = Vec::with_capacity(promises.len());
        let mut failures = Vec::new();
        for (index, promise) in promises.into_iter().enumerate() {
            match promise.wait(None).await {
                Ok(outcome) => results.push(outcome),
                Err(error) => failures.push((index, error)),
            }
        }
        if failures.is_empty() {
            Ok(results)
        } else {
            Err(AsyncError::Aggregate(failures))
        }
    }
}
