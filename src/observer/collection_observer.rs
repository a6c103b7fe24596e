use indexmap::IndexMap;

use crate::same_value;
use crate::PathSegment;
use crate::Value;

/// Entries that differ between two polls of one container
#[derive(Debug, Default, Clone)]
pub struct CollectionDelta {
    pub added: IndexMap<PathSegment, Value>,
    pub removed: IndexMap<PathSegment, Value>,
    pub changed: IndexMap<PathSegment, Value>,
}

impl CollectionDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Watches the top-level membership of one object or array.
///
/// Objects are diffed by key, ignoring order; arrays are diffed by index, so
/// a shift shows up as `changed` slots plus `added`/`removed` at the tail.
#[derive(Debug)]
pub struct CollectionObserver {
    /// None once closed or when the value is not a container
    live: Option<Value>,
    snapshot: IndexMap<PathSegment, Value>,
}

impl CollectionObserver {
    pub fn new(value: &Value) -> Self {
        if !value.is_container() {
            return Self {
                live: None,
                snapshot: IndexMap::new(),
            };
        }
        Self {
            live: Some(value.clone()),
            snapshot: value.container_entries().into_iter().collect(),
        }
    }

    pub fn poll(&mut self) -> Option<CollectionDelta> {
        let live = self.live.as_ref()?;
        let current: IndexMap<PathSegment, Value> = live.container_entries().into_iter().collect();

        let mut delta = CollectionDelta::default();
        for (key, value) in &current {
            match self.snapshot.get(key) {
                None => {
                    delta.added.insert(key.clone(), value.clone());
                }
                Some(previous) if !same_value(previous, value) => {
                    delta.changed.insert(key.clone(), value.clone());
                }
                Some(_) => {}
            }
        }
        for (key, value) in &self.snapshot {
            if !current.contains_key(key) {
                delta.removed.insert(key.clone(), value.clone());
            }
        }

        self.snapshot = current;
        if delta.is_empty() {
            None
        } else {
            Some(delta)
        }
    }

    pub fn close(&mut self) {
        self.live = None;
        self.snapshot.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.live.is_none()
    }

    pub fn value(&self) -> Option<&Value> {
        self.live.as_ref()
    }
}
