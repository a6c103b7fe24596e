//! the test_utils folder here will share helpers between unit tests
mod common;

pub use common::*;
