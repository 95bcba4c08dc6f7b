use brixx::{PatternMatcher, Value};
use serde_json::json;

#[derive(Debug, Clone, PartialEq)]
struct Handler(&'static str);

#[test]
fn test_query_returns_every_covered_pattern() {
    let a = Handler("A");
    let b = Handler("B");
    let mut matcher = PatternMatcher::new();
    matcher.add(&Value::from(json!({"foo": "bar"})), a.clone());
    matcher.add(&Value::from(json!({"baz": "zee"})), b.clone());

    let res = matcher.find(&Value::from(json!({"foo": "bar", "baz": "zee"})));
    assert_eq!(res.len(), 2);
    assert!(res.contains(&&a));
    assert!(res.contains(&&b));

    assert!(matcher.remove(&Value::from(json!({"foo": "bar"})), None));
    assert!(matcher
        .find(&Value::from(json!({"foo": "bar"})))
        .is_empty());
    assert_eq!(
        matcher.find(&Value::from(json!({"foo": "bar", "baz": "zee"}))),
        vec![&b]
    );
}

#[test]
fn test_scalar_patterns() {
    let mut matcher = PatternMatcher::new();
    matcher.add(&Value::from("save"), Handler("save"));

    assert!(matcher.exists(&Value::from("save")));
    assert_eq!(matcher.find(&Value::from("save")), vec![&Handler("save")]);
    assert!(matcher.find(&Value::from("load")).is_empty());
}

#[test]
fn test_duplicates_are_kept_and_removed_one_at_a_time() {
    let mut matcher = PatternMatcher::new();
    let pattern = Value::from(json!({"role": "admin"}));
    matcher.add(&pattern, Handler("dup"));
    matcher.add(&pattern, Handler("dup"));

    assert_eq!(matcher.find(&pattern).len(), 2);
    assert!(matcher.remove(&pattern, Some(&Handler("dup"))));
    assert_eq!(matcher.find(&pattern).len(), 1);
    assert!(matcher.exists(&pattern));
}
