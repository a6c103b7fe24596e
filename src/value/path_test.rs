use super::*;
use crate::Error;
use crate::UsageError;

#[test]
fn test_parse_dotted_path() {
    let path = Path::parse("a.b.c").unwrap();
    assert_eq!(
        path.segments(),
        &[
            PathSegment::Key("a".into()),
            PathSegment::Key("b".into()),
            PathSegment::Key("c".into()),
        ]
    );
}

#[test]
fn test_parse_bracket_segments() {
    let path = Path::parse("items[2].name[\"first name\"]").unwrap();
    assert_eq!(
        path.segments(),
        &[
            PathSegment::Key("items".into()),
            PathSegment::Index(2),
            PathSegment::Key("name".into()),
            PathSegment::Key("first name".into()),
        ]
    );
}

#[test]
fn test_parse_empty_is_root() {
    assert!(Path::parse("").unwrap().is_root());
    assert!(Path::parse("   ").unwrap().is_root());
}

#[test]
fn test_parse_rejects_malformed_paths() {
    for text in ["a.", ".a", "a..b", "a[", "a[x]", "a b", "1a", "a + b"] {
        let result = Path::parse(text);
        assert!(
            matches!(result, Err(Error::Usage(UsageError::InvalidPath { .. }))),
            "expected {text:?} to be rejected"
        );
    }
}

#[test]
fn test_display_round_trips_through_parse() {
    let text = "a.b[3][\"x y\"]";
    let path: Path = text.parse().unwrap();

    assert_eq!(path.to_string(), text);
    assert_eq!(Path::parse(&path.to_string()).unwrap(), path);
}

#[test]
fn test_child_appends_segment() {
    let path = Path::parse("a").unwrap().child(PathSegment::Index(0));
    assert_eq!(path.to_string(), "a[0]");
    assert_eq!(path.len(), 2);
}
