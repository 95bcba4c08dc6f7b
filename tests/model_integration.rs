use brixx::{factory, json_map, Error, Factory, Mixin, Model, Object, Record, Value};
use serde_json::json;

fn create_widget() -> Factory {
    factory(
        [Model::mixin()],
        Some(
            Mixin::new()
                .with("name", "Widget")
                .with("idAttribute", "_id")
                .with(
                    "defaults",
                    Value::from(json!({"_id": null, "width": 5, "height": 2})),
                )
                .with_method("area", |this, _| {
                    let width = this.get("width").and_then(Value::as_f64).unwrap_or(0.0);
                    let height = this.get("height").and_then(Value::as_f64).unwrap_or(0.0);
                    Ok(Value::from(width * height))
                }),
        ),
    )
}

fn record(object: &Object) -> Record<'_> {
    Record::view(object).expect("object should be a record")
}

#[test]
fn test_has_a_name_and_custom_to_string() {
    let widget = create_widget().create_default().unwrap();

    assert_eq!(widget.get("name"), Some(&Value::from("Widget")));
    assert_eq!(
        record(&widget).to_string(),
        r#"Widget { name: "Widget", _id: null, width: 5, height: 2 }"#
    );
}

#[test]
fn test_default_properties_and_no_id() {
    let widget = create_widget().create_default().unwrap();

    assert_eq!(widget.get("_id"), Some(&Value::Null));
    assert!(!record(&widget).has_id());
    assert_eq!(widget.get("width"), Some(&Value::from(5)));
    assert_eq!(widget.get("height"), Some(&Value::from(2)));
}

#[test]
fn test_can_set_zero_id() {
    let widget = create_widget()
        .create(Some(&json_map(json!({"_id": 0}))))
        .unwrap();

    assert_eq!(widget.get("_id"), Some(&Value::from(0)));
    assert!(record(&widget).has_id());
}

#[test]
fn test_define_properties_on_initialization() {
    let widget = create_widget()
        .create(Some(&json_map(json!({"width": 4, "height": 4, "depth": 4}))))
        .unwrap();

    assert_eq!(widget.get("width"), Some(&Value::from(4)));
    assert_eq!(widget.get("height"), Some(&Value::from(4)));
    assert!(widget.get("depth").is_none());

    let widget = record(&widget).set(&json_map(json!({"height": 8}))).unwrap();
    assert_eq!(widget.get("width"), Some(&Value::from(4)));
    assert_eq!(widget.get("height"), Some(&Value::from(8)));
}

#[test]
fn test_is_mostly_immutable() {
    let mut widget = create_widget().create_default().unwrap();
    let mut widget2 = record(&widget).set(&json_map(json!({"width": 2}))).unwrap();

    assert_eq!(widget.get("width"), Some(&Value::from(5)));
    assert_eq!(widget2.get("width"), Some(&Value::from(2)));

    match widget2.set("height", 10) {
        Err(err @ Error::Immutability { .. }) => {
            assert!(err
                .to_string()
                .contains("Cannot set by reference on an immutable record"));
        }
        other => panic!("Expected immutability error, got {:?}", other),
    }
    assert!(matches!(
        widget.set("width", 1),
        Err(Error::Immutability { .. })
    ));
    assert_eq!(widget2.get("height"), Some(&Value::from(2)));
}

#[test]
fn test_cannot_set_undefined_keys() {
    let widget = create_widget().create_default().unwrap();

    let err = record(&widget)
        .set(&json_map(json!({"area": 45})))
        .unwrap_err();
    assert!(matches!(
        &err,
        Error::UndefinedKey { key, type_name } if key == "area" && type_name == "Widget"
    ));
    assert_eq!(err.to_string(), r#"Cannot set undefined key "area" on Widget"#);
}

#[test]
fn test_diff() {
    let create = create_widget();
    let widget = create.create_default().unwrap();
    let widget2 = record(&widget).set(&json_map(json!({"height": 10}))).unwrap();
    let widget3 = create
        .create(Some(&json_map(json!({"width": 16, "depth": 2}))))
        .unwrap();

    assert!(record(&widget).diff(&widget).is_none());

    let Value::Object(plain) =
        Value::from(json!({"name": "Widget", "_id": null, "width": 5, "height": 2}))
    else {
        panic!("Expected object");
    };
    assert!(record(&widget).diff(&plain).is_none());

    let diff1 = record(&widget).diff(&widget2).unwrap();
    assert_eq!(diff1.len(), 1);
    assert_eq!(diff1[0].key, "height");
    assert_eq!(diff1[0].ours, Value::from(2));
    assert_eq!(diff1[0].theirs, Value::from(10));

    let diff2 = record(&widget).diff(&widget3).unwrap();
    assert_eq!(diff2.len(), 1);
    assert_eq!(diff2[0].key, "width");
    assert_eq!(diff2[0].ours, Value::from(5));
    assert_eq!(diff2[0].theirs, Value::from(16));
}

#[test]
fn test_defined_methods_survive_set() {
    let widget = create_widget().create_default().unwrap();
    assert_eq!(widget.call("area", &[]).unwrap(), Value::from(10));

    let widget2 = record(&widget).set(&json_map(json!({"height": 10}))).unwrap();
    assert_eq!(widget2.call("area", &[]).unwrap(), Value::from(50));
}

#[test]
fn test_to_json_has_only_fields() {
    let widget = create_widget().create_default().unwrap();
    let attrs = record(&widget).to_json();

    assert_eq!(attrs["width"], json!(5));
    assert_eq!(attrs["height"], json!(2));
    assert!(attrs.get("area").is_none());
}

#[test]
fn test_usable_as_plain_object() {
    let widget = create_widget()
        .create(Some(&json_map(json!({"width": 4, "height": 4, "depth": 4}))))
        .unwrap();
    let widget = record(&widget).set(&json_map(json!({"height": 6}))).unwrap();

    let keys: Vec<&str> = widget.keys().collect();
    assert_eq!(keys, vec!["name", "_id", "width", "height"]);
    for key in keys {
        assert!(widget.has_own(key));
    }
    assert_eq!(widget.get("width"), Some(&Value::from(4)));
    assert_eq!(widget.get("height"), Some(&Value::from(6)));
    assert!(widget.get("depth").is_none());
}

#[test]
fn test_json_representation_ignores_later_properties() {
    let widget = create_widget().create_default().unwrap();
    let mut widget = record(&widget).set(&json_map(json!({"height": 6}))).unwrap();
    widget.set("foo", "bar").unwrap();

    assert_eq!(
        record(&widget).to_json_string(),
        r#"{"name":"Widget","_id":null,"width":5,"height":6}"#
    );
    assert_eq!(
        serde_json::to_string(&record(&widget).to_json()).unwrap(),
        r#"{"name":"Widget","_id":null,"width":5,"height":6}"#
    );
}

#[test]
fn test_set_reruns_every_initializer() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let f = factory(
        [
            Model::mixin(),
            Mixin::new().on_initialize(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        ],
        Some(
            Mixin::new()
                .with("name", "Counter")
                .with("defaults", Value::from(json!({"id": 1}))),
        ),
    );

    let first = f.create_default().unwrap();
    record(&first).set(&json_map(json!({"id": 2}))).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}
