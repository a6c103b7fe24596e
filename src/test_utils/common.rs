use std::sync::Arc;

use parking_lot::Mutex;

use crate::Value;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

/// Shared, ordered record of callback invocations
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &self,
        entry: impl Into<String>,
    ) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn joined(&self) -> String {
        self.0.lock().concat()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Captures `(new, old)` pairs handed to a listener
#[derive(Debug, Clone, Default)]
pub struct Deliveries(Arc<Mutex<Vec<(Value, Value)>>>);

impl Deliveries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener(&self) -> impl FnMut(&Value, &Value, &Value) + Send + 'static {
        let sink = self.0.clone();
        move |new: &Value, old: &Value, _root: &Value| sink.lock().push((new.clone(), old.clone()))
    }

    pub fn all(&self) -> Vec<(Value, Value)> {
        self.0.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn last(&self) -> Option<(Value, Value)> {
        self.0.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Set `key` on an object value
pub fn set(
    target: &Value,
    key: &str,
    value: impl Into<Value>,
) {
    target
        .as_object()
        .expect("target is an object")
        .set(key, value);
}
