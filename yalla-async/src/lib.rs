//! Async executor and promise primitives (C8): bounded-concurrency fan-out
//! over independent units of work, each resolving to an
//! [`OperationOutcome`].

pub mod error;
pub mod executor;
pub mod promise;

pub use error::AsyncError;
pub use executor::{operation, AsyncExecutor, Operation, OperationOutcome};
pub use promise::{pending, CancellationToken, Promise, PromiseResolver};
