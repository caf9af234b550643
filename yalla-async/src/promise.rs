//! `Promise<T>` state machine (C8): `Pending -> Fulfilled`/`Rejected`,
//! `then`/`catch`/`on_progress` callbacks firing in insertion order,
//! callbacks registered after the terminal state fire immediately.

use crate::error::AsyncError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

enum State<T> {
    Pending,
    Fulfilled(T),
    Rejected(AsyncError),
}

type ThenCallback<T> = Box<dyn FnOnce(&T) + Send>;
type CatchCallback = Box<dyn FnOnce(&AsyncError) + Send>;
type ProgressCallback = Box<dyn Fn(&str) + Send + Sync>;

struct Inner<T> {
    state: State<T>,
    thens: Vec<ThenCallback<T>>,
    catches: Vec<CatchCallback>,
    progress: Vec<ProgressCallback>,
}

/// A value eventually produced (or failed) by an async unit of work.
pub struct Promise<T> {
    inner: Arc<Mutex<Inner<T>>>,
    notify: Arc<Notify>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner), notify: Arc::clone(&self.notify) }
    }
}

/// The producing side: whoever runs the unit of work holds this and calls
/// `resolve`/`reject`/`emit_progress` exactly once (resolve/reject), any
/// number of times (progress).
pub struct PromiseResolver<T> {
    inner: Arc<Mutex<Inner<T>>>,
    notify: Arc<Notify>,
}

/// A cooperative cancellation signal (§4.8): checked by the running
/// operation at its own safe points, never preempted.
#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Creates a promise/resolver pair in the `Pending` state.
pub fn pending<T>() -> (Promise<T>, PromiseResolver<T>) {
    let inner = Arc::new(Mutex::new(Inner {
        state: State::Pending,
        thens: Vec::new(),
        catches: Vec::new(),
        progress: Vec::new(),
    }));
    let notify = Arc::new(Notify::new());
    (
        Promise { inner: Arc::clone(&inner), notify: Arc::clone(&notify) },
        PromiseResolver { inner, notify },
    )
}

impl<T> PromiseResolver<T> {
    pub fn resolve(self, value: T) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !matches!(guard.state, State::Pending) {
            return;
        }
        let thens = std::mem::take(&mut guard.thens);
        guard.state = State::Fulfilled(value);
        for callback in thens {
            if let State::Fulfilled(ref value) = guard.state {
                callback(value);
            }
        }
        drop(guard);
        self.notify.notify_waiters();
    }

    pub fn reject(self, error: AsyncError) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !matches!(guard.state, State::Pending) {
            return;
        }
        let catches = std::mem::take(&mut guard.catches);
        guard.state = State::Rejected(error);
        for callback in catches {
            if let State::Rejected(ref error) = guard.state {
                callback(error);
            }
        }
        drop(guard);
        self.notify.notify_waiters();
    }

    pub fn emit_progress(&self, message: &str) {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        for callback in &guard.progress {
            callback(message);
        }
    }
}

impl<T: Send + 'static> Promise<T> {
    /// Registers a callback for fulfillment. Fires immediately if the
    /// promise is already fulfilled; never fires if it rejects.
    pub fn then(&self, callback: impl FnOnce(&T) + Send + 'static) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match &guard.state {
            State::Fulfilled(value) => callback(value),
            State::Pending => guard.thens.push(Box::new(callback)),
            State::Rejected(_) => {}
        }
    }

    /// Registers a callback for rejection. Fires immediately if the
    /// promise has already rejected; never fires if it fulfills.
    pub fn catch(&self, callback: impl FnOnce(&AsyncError) + Send + 'static) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match &guard.state {
            State::Rejected(error) => callback(error),
            State::Pending => guard.catches.push(Box::new(callback)),
            State::Fulfilled(_) => {}
        }
    }

    pub fn on_progress(&self, callback: impl Fn(&str) + Send + Sync + 'static) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.progress.push(Box::new(callback));
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.inner.lock().unwrap_or_else(|e| e.into_inner()).state, State::Pending)
    }
}

impl<T: Clone + Send + 'static> Promise<T> {
    /// Blocks until terminal state, or until `timeout` elapses. On timeout
    /// the promise is not retroactively rejected (it may still settle on
    /// its own); the caller receives [`AsyncError::Timeout`] and is
    /// expected to cancel the in-flight unit via its own token.
    pub async fn wait(&self, timeout: Option<Duration>) -> Result<T, AsyncError> {
        loop {
            {
                let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
                match &guard.state {
                    State::Fulfilled(value) => return Ok(value.clone()),
                    State::Rejected(error) => return Err(error.clone()),
                    State::Pending => {}
                }
            }
            let notified = self.notify.notified();
            match timeout {
                Some(duration) => {
                    if tokio::time::timeout(duration, notified).await.is_err() {
                        return Err(AsyncError::Timeout);
                    }
                }
                None => notified.await,
            }
        }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let label = match &guard.state {
            State::Pending => "Pending",
            State::Fulfilled(_) => "Fulfilled",
            State::Rejected(_) => "Rejected",
        };
        write!(f, "Promise({label})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn resolve_fulfills_and_wait_returns_value() {
        let (promise, resolver) = pending::<i32>();
        resolver.resolve(7);
        assert_eq!(promise.wait(None).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn reject_rejects_and_wait_returns_error() {
        let (promise, resolver) = pending::<i32>();
        resolver.reject(AsyncError::Cancelled);
        assert!(promise.wait(None).await.is_err());
    }

    #[tokio::test]
    async fn then_registered_before_resolution_fires_once_settled() {
        let (promise, resolver) = pending::<i32>();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        promise.then(move |v| seen_clone.store(*v as usize, Ordering::SeqCst));
        resolver.resolve(9);
        assert_eq!(seen.load(Ordering::SeqCst), 9);
    }

    #[tokio::test]
    async fn then_registered_after_resolution_fires_immediately() {
        let (promise, resolver) = pending::<i32>();
        resolver.resolve(3);
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        promise.then(move |v| seen_clone.store(*v as usize, Ordering::SeqCst));
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn wait_with_timeout_errors_if_never_settled() {
        let (promise, _resolver) = pending::<i32>();
        let result = promise.wait(Some(Duration::from_millis(10))).await;
        assert!(matches!(result, Err(AsyncError::Timeout)));
    }

    #[tokio::test]
    async fn cancellation_token_reflects_cancel_call() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }
}
