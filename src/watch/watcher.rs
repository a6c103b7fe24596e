use std::fmt;

use tracing::trace;

use crate::deep_copy;
use crate::deep_equals;
use crate::same_value;
use crate::shallow_copy;
use crate::DeepObserverTree;
use crate::Descriptor;
use crate::PathObserver;
use crate::Value;

/// Unique watch identifier; never reused while a manager is alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(pub u64);

impl fmt::Display for WatchId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

/// How a watch observes its paths and decides that its value changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchKind {
    /// Same-value comparison of the recomputed value against the last one
    Reference,
    /// Whole-subtree observation; structural comparison against a retained deep copy
    Deep,
    /// Identity plus top-level shape of a collection; old value is a shallow copy
    Collection,
}

/// A value change reported by [`Watch::poll`]
#[derive(Debug, Clone)]
pub struct Change {
    pub new_value: Value,
    pub old_value: Value,
}

/// Aggregates the observers of every path one expression reads into a
/// single "did the value change" decision.
pub struct Watch {
    id: WatchId,
    root: Value,
    label: String,
    descriptor: Descriptor,
    kind: WatchKind,
    observers: Vec<PathObserver>,
    /// One per observer for `Deep` and `Collection` watches, empty otherwise
    trees: Vec<DeepObserverTree>,
    last_value: Value,
    disposed: bool,
}

impl Watch {
    pub fn new(
        id: WatchId,
        root: &Value,
        label: impl Into<String>,
        descriptor: Descriptor,
        kind: WatchKind,
    ) -> Self {
        let observers: Vec<PathObserver> = descriptor
            .paths()
            .iter()
            .map(|path| PathObserver::new(root, path.clone()))
            .collect();

        let trees = match kind {
            WatchKind::Reference => Vec::new(),
            WatchKind::Deep => observers
                .iter()
                .map(|observer| DeepObserverTree::new(observer.last_value()))
                .collect(),
            WatchKind::Collection => observers
                .iter()
                .map(|observer| DeepObserverTree::shallow(observer.last_value()))
                .collect(),
        };

        let current = descriptor.evaluate(root);
        let last_value = retain(kind, &current);

        Self {
            id,
            root: root.clone(),
            label: label.into(),
            descriptor,
            kind,
            observers,
            trees,
            last_value,
            disposed: false,
        }
    }

    pub fn id(&self) -> WatchId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> WatchKind {
        self.kind
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Live value of the expression
    pub fn current_value(&self) -> Value {
        self.descriptor.evaluate(&self.root)
    }

    /// Poll every observer; any number of path changes collapse into at most
    /// one reported change.
    pub fn poll(&mut self) -> Option<Change> {
        if self.disposed {
            return None;
        }

        let mut fired = false;
        for (index, observer) in self.observers.iter_mut().enumerate() {
            match observer.poll() {
                Some(replaced) => {
                    fired = true;
                    if let Some(tree) = self.trees.get_mut(index) {
                        tree.reset(&replaced);
                    }
                }
                None => {
                    if let Some(tree) = self.trees.get_mut(index) {
                        fired |= tree.poll();
                    }
                }
            }
        }

        if !fired {
            return None;
        }

        let value = self.descriptor.evaluate(&self.root);
        let changed = match self.kind {
            WatchKind::Reference => !same_value(&value, &self.last_value),
            WatchKind::Deep => !deep_equals(&value, &self.last_value),
            WatchKind::Collection => true,
        };

        if !changed {
            trace!(watch_id = %self.id, label = %self.label, "Paths fired without a value change");
            return None;
        }

        let old_value = std::mem::replace(&mut self.last_value, retain(self.kind, &value));
        Some(Change {
            new_value: value,
            old_value,
        })
    }

    /// Close every observer; idempotent
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for observer in &mut self.observers {
            observer.close();
        }
        for tree in &mut self.trees {
            tree.close();
        }
        self.observers.clear();
        self.trees.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// What a watch keeps as its last value
fn retain(
    kind: WatchKind,
    value: &Value,
) -> Value {
    match kind {
        WatchKind::Reference => value.clone(),
        WatchKind::Deep => deep_copy(value),
        WatchKind::Collection => shallow_copy(value),
    }
}

impl fmt::Debug for Watch {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Watch")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("paths", &self.descriptor.paths())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
