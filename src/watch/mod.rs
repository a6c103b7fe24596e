//! Watch registration and the digest scheduler
//!
//! A [`Watch`] aggregates the observers of every path an expression reads and
//! reports at most one change per poll. The [`WatchManager`] owns all watches,
//! subscribers and async callbacks and drives them to convergence:
//!
//! ```text
//! register ─► initial notification queued
//!                      │
//! flush() ─► poll watches (registration order) ─► queue (one slot per watch)
//!                      │
//!                      ▼
//!            async callbacks ─► listeners ─► subscribers
//!                      │
//!                      └─► repeat until a poll finds nothing,
//!                          or abort at `max_digest_iterations`
//! ```
//!
//! # Ordering
//!
//! - Watches and subscribers are served in registration order.
//! - Within one iteration listeners run before subscribers, which run before
//!   the next poll.
//! - A watch that triggers again while its notification is pending keeps its
//!   queue position and delivers the newest value.
//! - Async callbacks scheduled while draining run in the next iteration.
//!
//! # Failure isolation
//!
//! Errors returned by, and panics raised in, any callback are caught and
//! forwarded to the [`ErrorSink`]; the rest of the iteration still runs.

mod callback;
mod manager;
mod queue;
mod watcher;

#[cfg(test)]
mod queue_test;

pub use callback::CallbackOutput;
pub use callback::CallbackResult;
pub use callback::ErrorSink;
pub use callback::ManualScheduler;
pub use callback::Scheduler;
pub use callback::TracingErrorSink;
#[cfg(test)]
pub use callback::MockErrorSink;
#[cfg(test)]
pub use callback::MockScheduler;
pub use manager::WatchHandle;
pub use manager::WatchManager;
pub use manager::WatchManagerBuilder;
pub use watcher::*;
