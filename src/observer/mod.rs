//! Polling observers over the host value graph.
//!
//! - [`PathObserver`] detects replacement of the value at one path.
//! - [`CollectionObserver`] detects top-level membership changes of one container.
//! - [`DeepObserverTree`] composes collection observers over a whole subtree.
//!
//! None of them intercept mutation; every change is found by diffing on `poll`.

mod collection_observer;
mod deep_tree;
mod path_observer;

#[cfg(test)]
mod path_observer_test;

pub use collection_observer::*;
pub use deep_tree::*;
pub use path_observer::*;
