//! End-to-end digest scenarios through the public API only.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use d_watch::deep_copy;
use d_watch::deep_equals;
use d_watch::Error;
use d_watch::ErrorSink;
use d_watch::Scheduler;
use d_watch::Value;
use d_watch::WatchConfig;
use d_watch::WatchManager;
use parking_lot::Mutex;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    fn push(
        &self,
        entry: impl Into<String>,
    ) {
        self.0.lock().push(entry.into());
    }

    fn joined(&self) -> String {
        self.0.lock().concat()
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock())
    }
}

/// Collects every reported failure
#[derive(Default)]
struct CollectingSink(Mutex<Vec<String>>);

impl ErrorSink for CollectingSink {
    fn report(
        &self,
        error: &Error,
    ) {
        self.0.lock().push(error.to_string());
    }
}

/// Queues delivery requests so the test can play the host's tick loop
#[derive(Default)]
struct TickScheduler(AtomicUsize);

impl TickScheduler {
    fn take(&self) -> usize {
        self.0.swap(0, Ordering::SeqCst)
    }
}

impl Scheduler for TickScheduler {
    fn schedule_delivery(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn set(
    target: &Value,
    key: &str,
    value: impl Into<Value>,
) {
    target.as_object().unwrap().set(key, value);
}

#[test]
fn test_two_watches_deliver_in_order() {
    enable_logger();
    let manager = WatchManager::default();
    let scope = Value::object_from([("a", 1), ("b", 1)]);
    let log = Log::default();
    let a = log.clone();
    manager
        .watch(&scope, "a", move |_: &Value, _: &Value, _: &Value| a.push("a"))
        .unwrap();
    let b = log.clone();
    manager
        .watch(&scope, "b", move |_: &Value, _: &Value, _: &Value| b.push("b"))
        .unwrap();

    set(&scope, "a", 2);
    set(&scope, "b", 2);
    manager.flush().unwrap();

    assert_eq!(log.joined(), "ab");
}

#[test]
fn test_constant_watch_delivers_its_value() {
    enable_logger();
    let manager = WatchManager::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let handle = manager
        .watch(&Value::object(), "5", move |new: &Value, old: &Value, _: &Value| {
            sink.lock().push((new.clone(), old.clone()))
        })
        .unwrap();
    handle.unregister();
    manager.flush().unwrap();

    assert!(handle.is_noop());
    assert_eq!(*seen.lock(), vec![(Value::from(5), Value::from(5))]);
}

#[test]
fn test_derived_values_settle_across_iterations() {
    enable_logger();
    let manager = WatchManager::default();
    let scope = Value::object_from([
        ("price", Value::from(10)),
        ("quantity", Value::from(2)),
        ("total", Value::from(0)),
        ("label", Value::from("")),
    ]);

    let target = scope.clone();
    manager
        .watch_paths(&scope, &["price", "quantity"], move |new: &Value, _: &Value, _: &Value| {
            let values = new.as_array().unwrap().items();
            let total = values[0].as_number().unwrap() * values[1].as_number().unwrap();
            set(&target, "total", total);
        })
        .unwrap();
    let target = scope.clone();
    manager
        .watch(&scope, "total", move |new: &Value, _: &Value, _: &Value| {
            set(&target, "label", format!("total: {}", new.as_number().unwrap()));
        })
        .unwrap();

    manager.flush().unwrap();
    assert_eq!(scope.as_object().unwrap().get("label"), Value::from("total: 20"));

    set(&scope, "quantity", 5);
    manager.flush().unwrap();
    assert_eq!(scope.as_object().unwrap().get("label"), Value::from("total: 50"));
    assert_eq!(manager.iteration(), 0);
}

#[test]
fn test_deep_watch_sees_nested_edits_of_a_document() {
    enable_logger();
    let manager = WatchManager::default();
    let document = Value::object_from([(
        "settings",
        Value::object_from([("theme", Value::object_from([("dark", false)]))]),
    )]);
    let history = Arc::new(Mutex::new(Vec::new()));
    let sink = history.clone();
    manager
        .watch_deep(&document, "settings", move |new: &Value, old: &Value, _: &Value| {
            sink.lock().push((deep_copy(new), old.clone()));
        })
        .unwrap();
    manager.flush().unwrap();

    let theme = document.get_path(&"settings.theme".parse().unwrap());
    set(&theme, "dark", true);
    manager.flush().unwrap();

    let history = history.lock();
    assert_eq!(history.len(), 2);
    let (new, old) = &history[1];
    assert_eq!(new.get_path(&"theme.dark".parse().unwrap()), Value::from(true));
    assert_eq!(old.get_path(&"theme.dark".parse().unwrap()), Value::from(false));
    assert!(!deep_equals(new, old));
}

#[test]
fn test_always_mutating_subscriber_diverges_then_recovers() {
    enable_logger();
    let manager = WatchManager::default();
    let scope = Value::object_from([("n", 0)]);
    manager
        .watch(&scope, "n", |_: &Value, _: &Value, _: &Value| {})
        .unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let target = scope.clone();
    let handle = manager.subscribe("increment", move || {
        counted.fetch_add(1, Ordering::SeqCst);
        let n = target.as_object().unwrap().get("n").as_number().unwrap();
        set(&target, "n", n + 1.0);
    });

    let err = manager.flush().unwrap_err();
    assert!(matches!(err, Error::Divergence(_)));
    assert!(err.to_string().contains("increment"));
    assert_eq!(calls.load(Ordering::SeqCst), 100);

    handle.unregister();
    manager.flush().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 100);
}

#[test]
fn test_failures_reach_the_sink_without_stopping_the_digest() {
    enable_logger();
    let sink = Arc::new(CollectingSink::default());
    let manager = WatchManager::builder(WatchConfig::default())
        .error_sink(sink.clone())
        .build()
        .unwrap();
    let scope = Value::object_from([("a", 1)]);
    let log = Log::default();

    manager
        .watch(&scope, "a", |_: &Value, _: &Value, _: &Value| Err::<(), _>("listener failed"))
        .unwrap();
    let after = log.clone();
    manager
        .watch(&scope, "a", move |_: &Value, _: &Value, _: &Value| after.push("second"))
        .unwrap();

    manager.flush().unwrap();

    assert_eq!(log.take(), vec!["second"]);
    let reports = sink.0.lock();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains("listener failed"));
}

#[test]
fn test_host_tick_loop_drives_deliveries() {
    enable_logger();
    let scheduler = Arc::new(TickScheduler::default());
    let manager = WatchManager::builder(WatchConfig::default())
        .scheduler(scheduler.clone())
        .build()
        .unwrap();
    let scope = Value::object_from([("a", 1)]);
    let log = Log::default();

    let listener_log = log.clone();
    let inner = manager.clone();
    manager
        .watch(&scope, "a", move |_: &Value, _: &Value, _: &Value| {
            listener_log.push("listener");
            let async_log = listener_log.clone();
            inner.eval_async("follow-up", move || async_log.push("follow-up"));
        })
        .unwrap();
    assert_eq!(scheduler.take(), 1);

    let mut ticks = 0;
    while scheduler.take() > 0 || ticks == 0 {
        manager.deliver().unwrap();
        ticks += 1;
    }

    assert_eq!(ticks, 2);
    assert_eq!(log.take(), vec!["listener", "follow-up"]);
    assert_eq!(manager.pending_count(), 0);
}

#[test]
fn test_config_can_be_loaded_and_applied() {
    let config = WatchConfig::load(None).unwrap();
    let manager = WatchManager::new(config).unwrap();

    assert_eq!(manager.config().max_digest_iterations, 100);
}
