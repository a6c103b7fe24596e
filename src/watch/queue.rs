use indexmap::IndexMap;

use super::callback::SharedListener;
use super::WatchId;
use crate::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum QueueKey {
    Watch(WatchId),
    Anonymous(u64),
}

/// One pending listener invocation
pub(crate) struct QueueItem {
    /// None for constant expressions
    pub(crate) watch_id: Option<WatchId>,
    pub(crate) label: String,
    pub(crate) listener: SharedListener,
    pub(crate) new_value: Value,
    pub(crate) old_value: Value,
    pub(crate) root: Value,
    /// First delivery after registration
    pub(crate) initial: bool,
}

/// Pending notifications in FIFO order, at most one per watch.
///
/// A watch that triggers again before its item is delivered keeps the
/// original queue position and takes the newest payload.
#[derive(Default)]
pub(crate) struct NotificationQueue {
    items: IndexMap<QueueKey, QueueItem>,
    next_anonymous: u64,
}

impl NotificationQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue an item that never supersedes and is never superseded
    pub(crate) fn push_anonymous(
        &mut self,
        item: QueueItem,
    ) {
        let key = QueueKey::Anonymous(self.next_anonymous);
        self.next_anonymous += 1;
        self.items.insert(key, item);
    }

    /// Queue an item for a watch, replacing any pending one in place.
    ///
    /// Returns true if an earlier item was superseded.
    pub(crate) fn push_watch(
        &mut self,
        watch_id: WatchId,
        mut item: QueueItem,
    ) -> bool {
        item.watch_id = Some(watch_id);
        let key = QueueKey::Watch(watch_id);
        match self.items.get_mut(&key) {
            Some(pending) => {
                if pending.initial {
                    // An undelivered first notification stays a first notification
                    item.old_value = item.new_value.clone();
                    item.initial = true;
                } else {
                    item.old_value = std::mem::take(&mut pending.old_value);
                }
                *pending = item;
                true
            }
            None => {
                self.items.insert(key, item);
                false
            }
        }
    }

    /// Drop the pending item of a watch, if any
    pub(crate) fn cancel(
        &mut self,
        watch_id: WatchId,
    ) -> bool {
        self.items.shift_remove(&QueueKey::Watch(watch_id)).is_some()
    }

    /// Take every pending item in delivery order
    pub(crate) fn take_all(&mut self) -> Vec<QueueItem> {
        std::mem::take(&mut self.items).into_values().collect()
    }

    pub(crate) fn contains(
        &self,
        watch_id: WatchId,
    ) -> bool {
        self.items.contains_key(&QueueKey::Watch(watch_id))
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}
