use super::callback::shared_listener;
use super::queue::NotificationQueue;
use super::queue::QueueItem;
use super::WatchId;
use crate::Value;

fn item(
    label: &str,
    new_value: i32,
    old_value: i32,
    initial: bool,
) -> QueueItem {
    QueueItem {
        watch_id: None,
        label: label.to_string(),
        listener: shared_listener(|_: &Value, _: &Value, _: &Value| {}),
        new_value: Value::from(new_value),
        old_value: Value::from(old_value),
        root: Value::Undefined,
        initial,
    }
}

fn labels(items: &[QueueItem]) -> Vec<&str> {
    items.iter().map(|item| item.label.as_str()).collect()
}

#[test]
fn test_items_drain_in_fifo_order() {
    let mut queue = NotificationQueue::new();
    queue.push_watch(WatchId(2), item("w2", 1, 1, false));
    queue.push_anonymous(item("constant", 5, 5, true));
    queue.push_watch(WatchId(1), item("w1", 1, 1, false));

    let items = queue.take_all();

    assert_eq!(labels(&items), vec!["w2", "constant", "w1"]);
    assert!(queue.is_empty());
}

#[test]
fn test_supersession_keeps_position_and_takes_newest_payload() {
    let mut queue = NotificationQueue::new();
    queue.push_watch(WatchId(1), item("w1", 2, 1, false));
    queue.push_watch(WatchId(2), item("w2", 1, 0, false));

    let superseded = queue.push_watch(WatchId(1), item("w1-again", 3, 2, false));

    assert!(superseded);
    assert_eq!(queue.len(), 2);
    let items = queue.take_all();
    assert_eq!(labels(&items), vec!["w1-again", "w2"]);
    // first-seen old value, last-seen new value
    assert_eq!(items[0].new_value, Value::from(3));
    assert_eq!(items[0].old_value, Value::from(1));
    assert_eq!(items[0].watch_id, Some(WatchId(1)));
}

#[test]
fn test_superseding_an_initial_item_stays_initial() {
    let mut queue = NotificationQueue::new();
    queue.push_watch(WatchId(1), item("w1", 1, 1, true));

    queue.push_watch(WatchId(1), item("w1", 4, 1, false));

    let items = queue.take_all();
    assert_eq!(items.len(), 1);
    assert!(items[0].initial);
    assert_eq!(items[0].new_value, Value::from(4));
    assert_eq!(items[0].old_value, Value::from(4));
}

#[test]
fn test_anonymous_items_never_supersede() {
    let mut queue = NotificationQueue::new();
    queue.push_anonymous(item("a", 1, 1, true));
    queue.push_anonymous(item("a", 1, 1, true));

    assert_eq!(queue.len(), 2);
}

#[test]
fn test_cancel_removes_only_that_watch() {
    let mut queue = NotificationQueue::new();
    queue.push_watch(WatchId(1), item("w1", 1, 1, false));
    queue.push_watch(WatchId(2), item("w2", 1, 1, false));

    assert!(queue.cancel(WatchId(1)));
    assert!(!queue.cancel(WatchId(1)));

    assert!(!queue.contains(WatchId(1)));
    assert!(queue.contains(WatchId(2)));
    assert_eq!(labels(&queue.take_all()), vec!["w2"]);
}

#[test]
fn test_requeue_after_cancel_goes_to_the_back() {
    let mut queue = NotificationQueue::new();
    queue.push_watch(WatchId(1), item("w1", 1, 1, false));
    queue.push_watch(WatchId(2), item("w2", 1, 1, false));
    queue.cancel(WatchId(1));
    queue.push_watch(WatchId(1), item("w1", 1, 1, false));

    assert_eq!(labels(&queue.take_all()), vec!["w2", "w1"]);
}

#[test]
fn test_clear_empties_queue() {
    let mut queue = NotificationQueue::new();
    queue.push_watch(WatchId(1), item("w1", 1, 1, false));
    queue.push_anonymous(item("c", 1, 1, true));

    queue.clear();

    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
}
