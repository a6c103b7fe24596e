//! # d-watch
//!
//! A polling change-propagation engine. Register watches over paths in a
//! mutable object graph, mutate the graph however you like, then call
//! [`WatchManager::flush`]: every changed watch is delivered once, in
//! registration order, and the digest repeats until nothing changes or the
//! divergence ceiling is hit.
//!
//! - [`value`](crate::Value): the observed host graph and its equality/copy utilities
//! - [`expression`](crate::ExpressionParser): expression compiler contract
//! - [`observer`](crate::PathObserver): path, collection and deep observers
//! - [`watch`](crate::WatchManager): watches and the digest scheduler

mod config;
mod constants;
mod errors;
mod expression;
mod observer;
mod value;
mod watch;

pub use config::*;
pub use errors::*;
pub use expression::*;
pub use observer::*;
pub use value::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
