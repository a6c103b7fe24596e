use super::*;
use crate::Path;
use crate::Value;

fn path(text: &str) -> Path {
    Path::parse(text).unwrap()
}

#[test]
fn test_poll_reports_nothing_without_change() {
    let root = Value::object_from([("a", 1)]);
    let mut observer = PathObserver::new(&root, path("a"));

    assert_eq!(observer.last_value(), &Value::from(1));
    assert!(observer.poll().is_none());
}

#[test]
fn test_poll_reports_new_value_once() {
    let root = Value::object_from([("a", 1)]);
    let mut observer = PathObserver::new(&root, path("a"));

    root.as_object().unwrap().set("a", 2);

    assert_eq!(observer.poll(), Some(Value::from(2)));
    assert!(observer.poll().is_none());
}

#[test]
fn test_poll_ignores_change_and_revert_between_polls() {
    let root = Value::object_from([("a", 1)]);
    let mut observer = PathObserver::new(&root, path("a"));

    let obj = root.as_object().unwrap();
    obj.set("a", 5);
    obj.set("a", 1);

    assert!(observer.poll().is_none());
}

#[test]
fn test_nan_over_nan_is_not_a_change() {
    let root = Value::object_from([("a", f64::NAN)]);
    let mut observer = PathObserver::new(&root, path("a"));

    root.as_object().unwrap().set("a", f64::NAN);

    assert!(observer.poll().is_none());
}

#[test]
fn test_missing_intermediate_segments_read_as_undefined() {
    let root = Value::object();
    let mut observer = PathObserver::new(&root, path("a.b.c"));
    assert!(observer.last_value().is_undefined());

    root.as_object()
        .unwrap()
        .set("a", Value::object_from([("b", Value::object_from([("c", 3)]))]));

    assert_eq!(observer.poll(), Some(Value::from(3)));

    root.as_object().unwrap().remove("a");
    assert_eq!(observer.poll(), Some(Value::Undefined));
}

#[test]
fn test_nested_replacement_is_seen_through_path() {
    let root = Value::object_from([("a", Value::object_from([("b", Value::object_from([("c", 3)]))]))]);
    let mut observer = PathObserver::new(&root, path("a.b.c"));

    root.get_path(&path("a.b")).as_object().unwrap().set("c", 5);

    assert_eq!(observer.poll(), Some(Value::from(5)));
}

#[test]
fn test_closed_observer_never_reports() {
    let root = Value::object_from([("a", 1)]);
    let mut observer = PathObserver::new(&root, path("a"));

    observer.close();
    root.as_object().unwrap().set("a", 2);

    assert!(observer.is_closed());
    assert!(observer.poll().is_none());
}
