//! Expression compiler contract.
//!
//! The engine consumes expressions only through [`ExpressionParser::prepare`],
//! which turns expression text into a [`Descriptor`]: whether the expression is
//! observable, which paths it reads, and a getter computing its value from a
//! root. [`PathExpressionParser`] is a minimal implementation covering
//! literals and single property paths; hosts with a real expression language
//! plug in their own parser.

mod parser;


pub use parser::*;

use std::fmt;
use std::sync::Arc;

use crate::Path;
use crate::Value;

pub type Getter = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Compiled form of one expression. Immutable once produced.
#[derive(Clone)]
pub struct Descriptor {
    is_observable: bool,
    paths: Vec<Path>,
    get: Getter,
}

impl Descriptor {
    /// Observable iff `paths` is non-empty
    pub fn new(
        paths: Vec<Path>,
        get: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            is_observable: !paths.is_empty(),
            paths,
            get: Arc::new(get),
        }
    }

    /// Non-observable expression that always evaluates to `value`
    pub fn constant(value: Value) -> Self {
        Self {
            is_observable: false,
            paths: Vec::new(),
            get: Arc::new(move |_| value.clone()),
        }
    }

    /// Reads a single path
    pub fn path(path: Path) -> Self {
        let read = path.clone();
        Self::new(vec![path], move |root| root.get_path(&read))
    }

    /// Reads several paths; the value is a fresh array of the path values in order
    pub fn from_paths(paths: Vec<Path>) -> Self {
        let reads = paths.clone();
        Self::new(paths, move |root| {
            Value::array_from(reads.iter().map(|path| root.get_path(path)))
        })
    }

    pub fn is_observable(&self) -> bool {
        self.is_observable
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn evaluate(
        &self,
        root: &Value,
    ) -> Value {
        (self.get)(root)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("is_observable", &self.is_observable)
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}
