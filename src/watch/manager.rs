//! Watch Manager: the digest scheduler
//!
//! Owns every registered watch, subscriber and async callback together with
//! the pending-notification queue, and drives them to a stable state.
//!
//! # Digest
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            ▼                                              │
//!   Idle ─► Polling ──(no pending work)──► Idle             │
//!            │                                              │
//!            │ iteration += 1 (abort past the ceiling)      │
//!            ▼                                              │
//!         Draining: async callbacks ─► queued listeners     │
//!                   ─► subscribers (if a watch fired) ──────┘
//! ```
//!
//! Every callback runs with no internal lock held, so callbacks may register,
//! unregister, mutate the graph or schedule async callbacks freely. Work
//! created while draining is picked up by the next iteration.

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Weak;
use std::time::Instant;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::callback::async_fn;
use super::callback::shared_listener;
use super::callback::shared_subscriber;
use super::callback::AsyncFn;
use super::callback::SharedListener;
use super::callback::SharedSubscriber;
use super::queue::NotificationQueue;
use super::queue::QueueItem;
use super::CallbackOutput;
use super::CallbackResult;
use super::ErrorSink;
use super::ManualScheduler;
use super::Scheduler;
use super::TracingErrorSink;
use super::Watch;
use super::WatchId;
use super::WatchKind;
use crate::CachingParser;
use crate::CallbackError;
use crate::Descriptor;
use crate::DivergenceError;
use crate::Error;
use crate::ExpressionParser;
use crate::Path;
use crate::PathExpressionParser;
use crate::Result;
use crate::UsageError;
use crate::Value;
use crate::WatchConfig;

struct WatchEntry {
    watch: Arc<Mutex<Watch>>,
    listener: SharedListener,
}

struct SubscriberEntry {
    label: String,
    callback: SharedSubscriber,
}

struct AsyncCallback {
    label: String,
    callback: AsyncFn,
}

/// Mutable scheduler state, guarded by one lock that is never held while a
/// callback runs.
struct DigestState {
    /// Registration order is delivery order
    watches: IndexMap<WatchId, WatchEntry>,
    subscribers: IndexMap<u64, SubscriberEntry>,
    queue: NotificationQueue,
    async_queue: VecDeque<AsyncCallback>,
    /// Iterations run since the digest last settled
    iteration: u32,
    /// Callback labels of the most recent iterations, oldest first
    traces: VecDeque<Vec<String>>,
    last_iteration_at: Option<Instant>,
    delivery_scheduled: bool,
}

impl DigestState {
    fn new() -> Self {
        Self {
            watches: IndexMap::new(),
            subscribers: IndexMap::new(),
            queue: NotificationQueue::new(),
            async_queue: VecDeque::new(),
            iteration: 0,
            traces: VecDeque::new(),
            last_iteration_at: None,
            delivery_scheduled: false,
        }
    }

    fn has_pending_work(&self) -> bool {
        !self.queue.is_empty() || !self.async_queue.is_empty()
    }

    fn settle(&mut self) {
        self.iteration = 0;
        self.traces.clear();
        self.last_iteration_at = None;
    }
}

struct WatchManagerInner {
    state: Mutex<DigestState>,

    /// Set while `flush` or `deliver` runs
    digesting: AtomicBool,

    /// Next watch ID (monotonically increasing)
    next_watch_id: AtomicU64,

    /// Next subscriber ID (monotonically increasing)
    next_subscriber_id: AtomicU64,

    parser: Arc<dyn ExpressionParser>,
    error_sink: Arc<dyn ErrorSink>,
    scheduler: Arc<dyn Scheduler>,
    config: WatchConfig,
}

impl WatchManagerInner {
    fn unregister_watch(
        &self,
        id: WatchId,
    ) {
        let entry = {
            let mut state = self.state.lock();
            state.queue.cancel(id);
            state.watches.shift_remove(&id)
        };
        if let Some(entry) = entry {
            entry.watch.lock().dispose();
            trace!(watch_id = %id, "Watch unregistered");
        }
    }

    fn unregister_subscriber(
        &self,
        id: u64,
    ) {
        if let Some(entry) = self.state.lock().subscribers.shift_remove(&id) {
            trace!(subscriber_id = id, label = %entry.label, "Subscriber unregistered");
        }
    }
}

/// Marks a digest as running for as long as it lives
struct DigestGuard<'a>(&'a AtomicBool);

impl<'a> DigestGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| UsageError::ReentrantDigest)?;
        Ok(Self(flag))
    }
}

impl Drop for DigestGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Labels of the callbacks invoked in one iteration, capped in length
struct IterationTrace {
    labels: Vec<String>,
    limit: usize,
}

impl IterationTrace {
    fn new(limit: usize) -> Self {
        Self {
            labels: Vec::new(),
            limit,
        }
    }

    fn record(
        &mut self,
        label: &str,
    ) {
        if self.labels.len() < self.limit {
            self.labels.push(label.to_string());
        }
    }
}

/// Handle returned by every registration.
///
/// Unregistering is explicit and idempotent; dropping the handle keeps the
/// registration alive. Handles for constant expressions are no-ops.
#[derive(Debug, Clone)]
pub struct WatchHandle {
    target: HandleTarget,
    manager: Weak<WatchManagerInner>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandleTarget {
    Noop,
    Watch(WatchId),
    Subscriber(u64),
}

impl WatchHandle {
    fn noop() -> Self {
        Self {
            target: HandleTarget::Noop,
            manager: Weak::new(),
        }
    }

    /// Stop delivering to this registration. Safe to call from inside any
    /// callback; an item already being delivered is unaffected.
    pub fn unregister(&self) {
        let Some(inner) = self.manager.upgrade() else {
            return;
        };
        match self.target {
            HandleTarget::Noop => {}
            HandleTarget::Watch(id) => inner.unregister_watch(id),
            HandleTarget::Subscriber(id) => inner.unregister_subscriber(id),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.target == HandleTarget::Noop
    }

    pub fn watch_id(&self) -> Option<WatchId> {
        match self.target {
            HandleTarget::Watch(id) => Some(id),
            _ => None,
        }
    }
}

/// Builds a [`WatchManager`] with injected host capabilities
pub struct WatchManagerBuilder {
    config: WatchConfig,
    parser: Option<Arc<dyn ExpressionParser>>,
    error_sink: Option<Arc<dyn ErrorSink>>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl WatchManagerBuilder {
    pub fn parser(
        mut self,
        parser: Arc<dyn ExpressionParser>,
    ) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn error_sink(
        mut self,
        error_sink: Arc<dyn ErrorSink>,
    ) -> Self {
        self.error_sink = Some(error_sink);
        self
    }

    pub fn scheduler(
        mut self,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn build(self) -> Result<WatchManager> {
        self.config.validate()?;

        let parser = self.parser.unwrap_or_else(|| Arc::new(PathExpressionParser));
        let parser: Arc<dyn ExpressionParser> = if self.config.cache_expressions {
            Arc::new(CachingParser::new(parser))
        } else {
            parser
        };

        let inner = WatchManagerInner {
            state: Mutex::new(DigestState::new()),
            digesting: AtomicBool::new(false),
            next_watch_id: AtomicU64::new(1),
            next_subscriber_id: AtomicU64::new(1),
            parser,
            error_sink: self.error_sink.unwrap_or_else(|| Arc::new(TracingErrorSink)),
            scheduler: self.scheduler.unwrap_or_else(|| Arc::new(ManualScheduler)),
            config: self.config,
        };

        Ok(WatchManager { inner: Arc::new(inner) })
    }
}

/// Polling change-propagation scheduler
///
/// Cheap to clone; clones share one registry, which lets callbacks capture
/// the manager they are registered with.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use parking_lot::Mutex;
/// use d_watch::{Value, WatchManager};
///
/// let manager = WatchManager::default();
/// let scope = Value::object_from([("a", 1)]);
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = seen.clone();
/// manager
///     .watch(&scope, "a", move |new: &Value, _old: &Value, _root: &Value| sink.lock().push(new.clone()))
///     .unwrap();
///
/// scope.as_object().unwrap().set("a", 5);
/// manager.flush().unwrap();
///
/// assert_eq!(*seen.lock(), vec![Value::from(5)]);
/// ```
#[derive(Clone)]
pub struct WatchManager {
    inner: Arc<WatchManagerInner>,
}

impl Default for WatchManager {
    fn default() -> Self {
        // Default configuration always validates
        match WatchManager::builder(WatchConfig::default()).build() {
            Ok(manager) => manager,
            Err(e) => unreachable!("default watch config rejected: {e}"),
        }
    }
}

impl WatchManager {
    pub fn new(config: WatchConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: WatchConfig) -> WatchManagerBuilder {
        WatchManagerBuilder {
            config,
            parser: None,
            error_sink: None,
            scheduler: None,
        }
    }

    /// Watch an expression on `root` by reference/value identity.
    ///
    /// The listener receives `(new_value, old_value, root)`. The first digest
    /// after registration always delivers once with `new_value == old_value`.
    /// Constant expressions are delivered that one time and return a no-op
    /// handle.
    pub fn watch<F, R>(
        &self,
        root: &Value,
        expression: &str,
        listener: F,
    ) -> Result<WatchHandle>
    where
        F: FnMut(&Value, &Value, &Value) -> R + Send + 'static,
        R: CallbackOutput,
    {
        self.watch_expression(root, expression, WatchKind::Reference, shared_listener(listener))
    }

    /// Watch an expression structurally: nested mutation below the value
    /// fires, replacement with an equal structure does not.
    pub fn watch_deep<F, R>(
        &self,
        root: &Value,
        expression: &str,
        listener: F,
    ) -> Result<WatchHandle>
    where
        F: FnMut(&Value, &Value, &Value) -> R + Send + 'static,
        R: CallbackOutput,
    {
        self.watch_expression(root, expression, WatchKind::Deep, shared_listener(listener))
    }

    /// Watch several raw paths as one watch.
    ///
    /// The value handed to the listener is an array of the path values in
    /// the order given.
    pub fn watch_paths<F, R>(
        &self,
        root: &Value,
        paths: &[&str],
        listener: F,
    ) -> Result<WatchHandle>
    where
        F: FnMut(&Value, &Value, &Value) -> R + Send + 'static,
        R: CallbackOutput,
    {
        let parsed = paths
            .iter()
            .map(|text| Path::parse(text))
            .collect::<Result<Vec<Path>>>()?;
        let label = format!("[{}]", paths.join(", "));

        Ok(self.register(
            root,
            label,
            Descriptor::from_paths(parsed),
            WatchKind::Reference,
            shared_listener(listener),
        ))
    }

    /// Watch the identity and top-level shape of a collection.
    ///
    /// With `path == None` the target itself is the collection. Adding,
    /// removing or replacing a top-level entry fires; mutation further down
    /// does not. The old value is a shallow copy of the previous shape.
    pub fn watch_collection<F, R>(
        &self,
        target: &Value,
        path: Option<&str>,
        listener: F,
    ) -> Result<WatchHandle>
    where
        F: FnMut(&Value, &Value, &Value) -> R + Send + 'static,
        R: CallbackOutput,
    {
        let path = match path {
            Some(text) => Path::parse(text)?,
            None => Path::root(),
        };
        let label = if path.is_root() {
            "<collection>".to_string()
        } else {
            path.to_string()
        };

        Ok(self.register(
            target,
            label,
            Descriptor::path(path),
            WatchKind::Collection,
            shared_listener(listener),
        ))
    }

    /// Register a callback run once per iteration in which any watch fired,
    /// after every listener of that iteration.
    ///
    /// `label` names the subscriber in divergence traces.
    pub fn subscribe<F, R>(
        &self,
        label: impl Into<String>,
        subscriber: F,
    ) -> WatchHandle
    where
        F: FnMut() -> R + Send + 'static,
        R: CallbackOutput,
    {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let label = label.into();
        trace!(subscriber_id = id, label = %label, "Subscriber registered");

        self.inner.state.lock().subscribers.insert(
            id,
            SubscriberEntry {
                label,
                callback: shared_subscriber(subscriber),
            },
        );

        WatchHandle {
            target: HandleTarget::Subscriber(id),
            manager: Arc::downgrade(&self.inner),
        }
    }

    /// Schedule a one-shot callback that runs before any listener of the
    /// next iteration. Callbacks scheduled while draining wait for the
    /// iteration after.
    pub fn eval_async<F, R>(
        &self,
        label: impl Into<String>,
        callback: F,
    ) where
        F: FnOnce() -> R + Send + 'static,
        R: CallbackOutput,
    {
        let schedule = {
            let mut state = self.inner.state.lock();
            state.async_queue.push_back(AsyncCallback {
                label: label.into(),
                callback: async_fn(callback),
            });
            self.claim_delivery(&mut state)
        };
        self.schedule_if(schedule);
    }

    /// Poll and drain until no work is left.
    ///
    /// # Errors
    /// - [`UsageError::ReentrantDigest`] when a digest is already running.
    /// - [`DivergenceError`] when the iteration ceiling is reached; pending
    ///   work is discarded and the next digest starts clean.
    pub fn flush(&self) -> Result<()> {
        let _guard = DigestGuard::enter(&self.inner.digesting)?;
        self.inner.state.lock().delivery_scheduled = false;
        debug!("Digest started");

        loop {
            self.poll_watches();

            let pending = self.inner.state.lock().has_pending_work();
            if !pending {
                let iterations = {
                    let mut state = self.inner.state.lock();
                    let iterations = state.iteration;
                    state.settle();
                    iterations
                };
                debug!(iterations, "Digest settled");
                return Ok(());
            }

            self.begin_iteration()?;
            self.drain();
        }
    }

    /// Run one draining iteration without polling.
    ///
    /// This is what a [`Scheduler`] invokes on its tick. Chained deliveries
    /// count toward the iteration ceiling until one leaves no pending work or
    /// the host stays idle longer than `quiescence_timeout_ms`.
    pub fn deliver(&self) -> Result<()> {
        let guard = DigestGuard::enter(&self.inner.digesting)?;

        {
            let mut state = self.inner.state.lock();
            state.delivery_scheduled = false;
            let quiet = state
                .last_iteration_at
                .is_some_and(|at| at.elapsed() > self.inner.config.quiescence_timeout());
            if quiet {
                trace!(iteration = state.iteration, "Quiescence timeout elapsed, resetting iteration counter");
                state.settle();
            }
            if !state.has_pending_work() {
                state.settle();
                return Ok(());
            }
        }

        self.begin_iteration()?;
        self.drain();

        let schedule = {
            let mut state = self.inner.state.lock();
            if state.has_pending_work() {
                !std::mem::replace(&mut state.delivery_scheduled, true)
            } else {
                state.settle();
                false
            }
        };

        drop(guard);
        self.schedule_if(schedule);
        Ok(())
    }

    /// Dispose every watch and forget every subscriber and pending callback.
    ///
    /// Watch ids keep increasing afterwards.
    pub fn dispose_all(&self) {
        let watches = {
            let mut state = self.inner.state.lock();
            let watches = std::mem::take(&mut state.watches);
            state.subscribers.clear();
            state.queue.clear();
            state.async_queue.clear();
            state.settle();
            state.delivery_scheduled = false;
            watches
        };

        let count = watches.len();
        for (_, entry) in watches {
            entry.watch.lock().dispose();
        }
        debug!(watches = count, "All watches disposed");
    }

    /// Number of registered watches
    pub fn watch_count(&self) -> usize {
        self.inner.state.lock().watches.len()
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.state.lock().subscribers.len()
    }

    /// Queued notifications plus pending async callbacks
    pub fn pending_count(&self) -> usize {
        let state = self.inner.state.lock();
        state.queue.len() + state.async_queue.len()
    }

    /// Iterations counted toward the divergence ceiling
    pub fn iteration(&self) -> u32 {
        self.inner.state.lock().iteration
    }

    pub fn is_digesting(&self) -> bool {
        self.inner.digesting.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &WatchConfig {
        &self.inner.config
    }

    fn watch_expression(
        &self,
        root: &Value,
        expression: &str,
        kind: WatchKind,
        listener: SharedListener,
    ) -> Result<WatchHandle> {
        let descriptor = self.inner.parser.prepare(expression)?;
        Ok(self.register(root, expression.to_string(), descriptor, kind, listener))
    }

    fn register(
        &self,
        root: &Value,
        label: String,
        descriptor: Descriptor,
        kind: WatchKind,
        listener: SharedListener,
    ) -> WatchHandle {
        if !descriptor.is_observable() {
            let value = descriptor.evaluate(root);
            trace!(label = %label, "Constant expression queued");
            let schedule = {
                let mut state = self.inner.state.lock();
                state.queue.push_anonymous(QueueItem {
                    watch_id: None,
                    label,
                    listener,
                    new_value: value.clone(),
                    old_value: value,
                    root: root.clone(),
                    initial: true,
                });
                self.claim_delivery(&mut state)
            };
            self.schedule_if(schedule);
            return WatchHandle::noop();
        }

        let id = WatchId(self.inner.next_watch_id.fetch_add(1, Ordering::Relaxed));
        let watch = Watch::new(id, root, label.clone(), descriptor, kind);
        let current = watch.current_value();
        trace!(watch_id = %id, label = %label, ?kind, "Watch registered");

        let schedule = {
            let mut state = self.inner.state.lock();
            state.watches.insert(
                id,
                WatchEntry {
                    watch: Arc::new(Mutex::new(watch)),
                    listener: listener.clone(),
                },
            );
            state.queue.push_watch(
                id,
                QueueItem {
                    watch_id: Some(id),
                    label,
                    listener,
                    new_value: current.clone(),
                    old_value: current,
                    root: root.clone(),
                    initial: true,
                },
            );
            self.claim_delivery(&mut state)
        };
        self.schedule_if(schedule);

        WatchHandle {
            target: HandleTarget::Watch(id),
            manager: Arc::downgrade(&self.inner),
        }
    }

    /// True if the caller must ask the scheduler for a delivery. A running
    /// digest picks new work up by itself.
    fn claim_delivery(
        &self,
        state: &mut DigestState,
    ) -> bool {
        if state.delivery_scheduled || self.inner.digesting.load(Ordering::Acquire) {
            return false;
        }
        state.delivery_scheduled = true;
        true
    }

    fn schedule_if(
        &self,
        schedule: bool,
    ) {
        if schedule {
            trace!("Delivery scheduled");
            self.inner.scheduler.schedule_delivery();
        }
    }

    /// Polling phase: every watch in registration order
    fn poll_watches(&self) {
        let watches: Vec<(WatchId, Arc<Mutex<Watch>>, SharedListener)> = self
            .inner
            .state
            .lock()
            .watches
            .iter()
            .map(|(id, entry)| (*id, entry.watch.clone(), entry.listener.clone()))
            .collect();

        for (id, watch, listener) in watches {
            let polled = {
                let mut watch = watch.lock();
                watch
                    .poll()
                    .map(|change| (change, watch.label().to_string(), watch.root().clone()))
            };
            let Some((change, label, root)) = polled else {
                continue;
            };

            let mut state = self.inner.state.lock();
            if !state.watches.contains_key(&id) {
                continue;
            }
            trace!(watch_id = %id, label = %label, "Watch changed");
            let superseded = state.queue.push_watch(
                id,
                QueueItem {
                    watch_id: Some(id),
                    label,
                    listener,
                    new_value: change.new_value,
                    old_value: change.old_value,
                    root,
                    initial: false,
                },
            );
            if superseded {
                trace!(watch_id = %id, "Pending notification superseded");
            }
        }
    }

    /// Count one iteration, or abort the digest at the ceiling
    fn begin_iteration(&self) -> Result<()> {
        let max = self.inner.config.max_digest_iterations;
        let mut state = self.inner.state.lock();

        if state.iteration >= max {
            let trace: Vec<Vec<String>> = state.traces.drain(..).collect();
            state.queue.clear();
            state.async_queue.clear();
            state.settle();
            state.delivery_scheduled = false;
            warn!(iterations = max, ?trace, "Digest aborted: iteration ceiling reached");
            return Err(DivergenceError { iterations: max, trace }.into());
        }

        state.iteration += 1;
        state.last_iteration_at = Some(Instant::now());
        Ok(())
    }

    /// Draining phase: async callbacks, then queued listeners, then
    /// subscribers if any watch notification was delivered.
    fn drain(&self) {
        let (callbacks, items) = {
            let mut state = self.inner.state.lock();
            let callbacks: Vec<AsyncCallback> = state.async_queue.drain(..).collect();
            (callbacks, state.queue.take_all())
        };
        let mut trace = IterationTrace::new(self.inner.config.trace_entries_per_iteration);

        for AsyncCallback { label, callback } in callbacks {
            trace.record(&label);
            self.run_isolated(&label, callback);
        }

        let mut notified = false;
        for item in items {
            if let Some(id) = item.watch_id {
                // Unregistered after this drain started
                let registered = self.inner.state.lock().watches.contains_key(&id);
                if !registered {
                    continue;
                }
                notified = true;
            }
            trace.record(&item.label);
            trace!(watch_id = ?item.watch_id, label = %item.label, "Delivering notification");
            let listener = item.listener.clone();
            self.run_isolated(&item.label, || {
                let mut listener = listener.lock();
                (&mut *listener)(&item.new_value, &item.old_value, &item.root)
            });
        }

        if notified {
            let subscribers: Vec<(u64, String, SharedSubscriber)> = self
                .inner
                .state
                .lock()
                .subscribers
                .iter()
                .map(|(id, entry)| (*id, entry.label.clone(), entry.callback.clone()))
                .collect();

            for (id, label, callback) in subscribers {
                let subscribed = self.inner.state.lock().subscribers.contains_key(&id);
                if !subscribed {
                    continue;
                }
                trace.record(&label);
                self.run_isolated(&label, || {
                    let mut callback = callback.lock();
                    (&mut *callback)()
                });
            }
        }

        let mut state = self.inner.state.lock();
        state.traces.push_back(trace.labels);
        while state.traces.len() > self.inner.config.trace_depth {
            state.traces.pop_front();
        }
        debug!(iteration = state.iteration, "Digest iteration drained");
    }

    /// Run one callback; failures and panics go to the error sink
    fn run_isolated<F>(
        &self,
        label: &str,
        callback: F,
    ) where
        F: FnOnce() -> CallbackResult,
    {
        let failure = match panic::catch_unwind(AssertUnwindSafe(callback)) {
            Ok(Ok(())) => return,
            Ok(Err(source)) => CallbackError::Failed {
                label: label.to_string(),
                source,
            },
            Err(payload) => CallbackError::Panicked {
                label: label.to_string(),
                message: panic_message(payload.as_ref()),
            },
        };
        debug!(label, "Callback failed, continuing digest");
        self.inner.error_sink.report(&Error::Callback(failure));
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl fmt::Debug for WatchManager {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("WatchManager")
            .field("watches", &state.watches.len())
            .field("subscribers", &state.subscribers.len())
            .field("pending", &(state.queue.len() + state.async_queue.len()))
            .field("iteration", &state.iteration)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
