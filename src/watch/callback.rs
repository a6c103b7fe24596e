//! Callback shapes and the host capabilities injected into the manager.

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use parking_lot::Mutex;
use tracing::error;

use crate::BoxError;
use crate::Error;
use crate::Value;

pub type CallbackResult = std::result::Result<(), BoxError>;

/// Return types accepted from listeners, subscribers and async callbacks
pub trait CallbackOutput {
    fn into_result(self) -> CallbackResult;
}

impl CallbackOutput for () {
    fn into_result(self) -> CallbackResult {
        Ok(())
    }
}

impl<E: Into<BoxError>> CallbackOutput for std::result::Result<(), E> {
    fn into_result(self) -> CallbackResult {
        self.map_err(Into::into)
    }
}

/// `(new_value, old_value, root)`
pub(crate) type SharedListener = Arc<Mutex<dyn FnMut(&Value, &Value, &Value) -> CallbackResult + Send>>;
pub(crate) type SharedSubscriber = Arc<Mutex<dyn FnMut() -> CallbackResult + Send>>;
pub(crate) type AsyncFn = Box<dyn FnOnce() -> CallbackResult + Send>;

pub(crate) fn shared_listener<F, R>(mut listener: F) -> SharedListener
where
    F: FnMut(&Value, &Value, &Value) -> R + Send + 'static,
    R: CallbackOutput,
{
    Arc::new(Mutex::new(move |new: &Value, old: &Value, root: &Value| {
        listener(new, old, root).into_result()
    }))
}

pub(crate) fn shared_subscriber<F, R>(mut subscriber: F) -> SharedSubscriber
where
    F: FnMut() -> R + Send + 'static,
    R: CallbackOutput,
{
    Arc::new(Mutex::new(move || subscriber().into_result()))
}

pub(crate) fn async_fn<F, R>(callback: F) -> AsyncFn
where
    F: FnOnce() -> R + Send + 'static,
    R: CallbackOutput,
{
    Box::new(move || callback().into_result())
}

/// Receives callback failures caught during a digest. Must not panic.
#[cfg_attr(test, automock)]
pub trait ErrorSink: Send + Sync {
    fn report(
        &self,
        error: &Error,
    );
}

/// Logs every reported failure at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(
        &self,
        error: &Error,
    ) {
        error!(label = error.callback_label().unwrap_or("-"), "{}", error);
    }
}

/// Host capability to run [`WatchManager::deliver`](crate::WatchManager::deliver)
/// on a later tick.
///
/// Called at most once per pending delivery, never while the manager holds
/// its internal locks.
#[cfg_attr(test, automock)]
pub trait Scheduler: Send + Sync {
    fn schedule_delivery(&self);
}

/// Never schedules anything; the host drives every digest through `flush`
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualScheduler;

impl Scheduler for ManualScheduler {
    fn schedule_delivery(&self) {}
}
