use crate::same_value;
use crate::Path;
use crate::Value;

/// Watches one property path below one root value.
///
/// Polling is the only operation that mutates `last_value`.
#[derive(Debug)]
pub struct PathObserver {
    /// None once closed
    root: Option<Value>,
    path: Path,
    last_value: Value,
}

impl PathObserver {
    pub fn new(
        root: &Value,
        path: Path,
    ) -> Self {
        let last_value = root.get_path(&path);
        Self {
            root: Some(root.clone()),
            path,
            last_value,
        }
    }

    /// Re-read the path; returns the new value when it differs from the last
    /// one under same-value semantics.
    pub fn poll(&mut self) -> Option<Value> {
        let root = self.root.as_ref()?;
        let current = root.get_path(&self.path);
        if same_value(&current, &self.last_value) {
            return None;
        }
        self.last_value = current.clone();
        Some(current)
    }

    /// Release the root; later polls report nothing
    pub fn close(&mut self) {
        self.root = None;
    }

    pub fn is_closed(&self) -> bool {
        self.root.is_none()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_value(&self) -> &Value {
        &self.last_value
    }
}
