use edgewise::store::Selection;
use edgewise::{MapperError, Value};

use crate::integration::support::{mapper, Envelope, Labelled, Payload, Shaped, Tnode};

#[test]
fn write_then_scan_round_trips_scalar_fields() {
    let mapper = mapper();
    let mut record = Tnode::new("tnode-1", "hello!");
    record.count = 42;
    record.tags = vec!["a".to_string(), "b".to_string()];
    record.extra = Some("more".to_string());
    record.scratch = "never stored".to_string();

    let node = mapper.write(&record).unwrap();
    assert!(!node.is_empty());

    let mut out = Tnode::default();
    mapper.scan("tnode-1", &mut out).unwrap();

    assert_eq!(out.field1, "hello!");
    assert_eq!(out.count, 42);
    assert!(!out.flag);
    assert_eq!(out.tags, record.tags);
    assert_eq!(out.extra.as_deref(), Some("more"));
    // ignored and inline fields are not read back
    assert_eq!(out.scratch, "");
    assert_eq!(out.sub.hihi, "");
}

#[test]
fn inline_prefix_fields_flatten_onto_parent() {
    let mapper = mapper();
    mapper.write(&Tnode::new("tnode-inline", "x")).unwrap();

    let found = mapper
        .fetch_values("tnode-inline", &["sub_f4".into(), "f4".into(), "sub".into()])
        .unwrap()
        .unwrap();
    assert_eq!(
        found.property("sub_f4"),
        Some(&Value::Str("hi!".to_string()))
    );
    assert_eq!(found.property("f4"), None);
    assert_eq!(found.property("sub"), None);
}

#[test]
fn reserved_edges_are_written() {
    let mapper = mapper();
    mapper.write(&Tnode::new("tnode-reserved", "x")).unwrap();

    let found = mapper
        .fetch_values("tnode-reserved", &["_type".into(), "_identity".into()])
        .unwrap()
        .unwrap();
    assert_eq!(found.property("_type"), Some(&Value::Str("tnode".to_string())));
    assert_eq!(
        found.property("_identity"),
        Some(&Value::Str("tnode-reserved".to_string()))
    );
}

#[test]
fn empty_string_is_rejected_and_nothing_is_written() {
    let mapper = mapper();
    let record = Tnode::new("tnode-empty", "");

    let err = mapper.write(&record).unwrap_err();
    assert!(err.is_empty_value(), "unexpected error: {err}");
    assert!(err.to_string().starts_with("setEdge:"));

    assert!(mapper.fetch("tnode-empty").unwrap().is_empty());
}

#[test]
fn zero_values_are_written() {
    let mapper = mapper();
    let record = Tnode::new("tnode-zero", "z");
    mapper.write(&record).unwrap();

    let found = mapper
        .fetch_values("tnode-zero", &["count".into(), "flag".into()])
        .unwrap()
        .unwrap();
    assert_eq!(found.property("count"), Some(&Value::Int(0)));
    assert_eq!(found.property("flag"), Some(&Value::Bool(false)));
}

#[test]
fn quoted_strings_survive_the_store() {
    let mapper = mapper();
    let record = Tnode::new("say \"cheese\"", "\"this has quotes!\"");
    let node = mapper.write(&record).unwrap();

    mapper.purge_cache();
    assert_eq!(mapper.fetch("say \"cheese\"").unwrap(), node);

    let mut out = Tnode::default();
    mapper.scan("say \"cheese\"", &mut out).unwrap();
    assert_eq!(out.field1, "\"this has quotes!\"");
}

#[test]
fn omitempty_skips_missing_values() {
    let mapper = mapper();
    mapper.write(&Tnode::new("tnode-omit", "o")).unwrap();

    let found = mapper
        .fetch_values("tnode-omit", &["extra".into(), "f1".into()])
        .unwrap()
        .unwrap();
    assert_eq!(found.property("extra"), None);
    assert!(found.property("f1").is_some());
}

#[test]
fn map_fields_round_trip_as_bytes() {
    let mapper = mapper();
    let mut record = Tnode::new("tnode-meta", "m");
    record.meta.insert("waifu".to_string(), "you".to_string());
    mapper.write(&record).unwrap();

    let found = mapper
        .fetch_values("tnode-meta", &["meta".into()])
        .unwrap()
        .unwrap();
    assert!(matches!(found.property("meta"), Some(Value::Bytes(_))));

    let mut out = Tnode::default();
    mapper.scan("tnode-meta", &mut out).unwrap();
    assert_eq!(out.meta, record.meta);
}

#[test]
fn nested_record_fields_are_skipped() {
    let mapper = mapper();
    let record = Labelled {
        id: "labelled-1".to_string(),
        payload: Payload {
            name: "inner".to_string(),
            weight: 5,
        },
        note: None,
    };
    mapper.write(&record).unwrap();

    let found = mapper
        .fetch_values(
            "labelled-1",
            &["payload".into(), "label".into(), "note".into(), "id".into()],
        )
        .unwrap()
        .unwrap();
    assert_eq!(found.property("payload"), None);
    assert_eq!(found.property("label"), None);
    // skip_serializing_if reads as omitempty
    assert_eq!(found.property("note"), None);
    assert!(found.property("id").is_some());
}

#[test]
fn rewritten_identity_resolves_to_newest_node() {
    let mapper = mapper();
    let record = Tnode::new("tnode-rw", "first");
    mapper.write(&record).unwrap();
    let newest = mapper.write(&record).unwrap();

    let hit = mapper.fetch("tnode-rw").unwrap();
    mapper.purge_cache();
    let miss = mapper.fetch("tnode-rw").unwrap();
    assert_eq!(hit, newest);
    assert_eq!(miss, hit);
}

#[test]
fn payload_and_type_tag_capabilities() {
    let mapper = mapper();
    let record = Envelope::new(
        "env-1",
        "Parcel",
        Payload {
            name: "box".to_string(),
            weight: 3,
        },
    );
    let node = mapper.write(&record).unwrap();

    let found = mapper
        .fetch_values(
            "env-1",
            &[Selection::uid(), "_type".into(), "label".into(), "weight".into()],
        )
        .unwrap()
        .unwrap();
    assert_eq!(found.uid, node.uid());
    assert_eq!(found.property("_type"), Some(&Value::Str("parcel".to_string())));
    assert_eq!(found.property("label"), Some(&Value::Str("box".to_string())));
    assert_eq!(found.property("weight"), Some(&Value::Int(3)));

    assert_eq!(mapper.nodes_of_type("Parcel").unwrap(), vec![node]);

    let mut out = Payload::default();
    mapper.scan("env-1", &mut out).unwrap();
    assert_eq!(out.name, "box");
    assert_eq!(out.weight, 3);
}

#[test]
fn empty_type_tag_is_rejected() {
    let mapper = mapper();
    let record = Envelope::new("env-untyped", " ", Payload::default());
    let err = mapper.write(&record).unwrap_err();
    assert!(matches!(err, MapperError::EmptyTypeName));
}

#[test]
fn payload_without_fields_is_not_a_struct() {
    let mapper = mapper();
    let err = mapper.write(&Shaped::circle()).unwrap_err();
    assert!(matches!(err, MapperError::NotStruct));
}

#[test]
fn nodes_of_type_matches_lowercased_tag() {
    let mapper = mapper();
    let a = mapper.write(&Tnode::new("t-a", "a")).unwrap();
    let b = mapper.write(&Tnode::new("t-b", "b")).unwrap();
    let other = Payload {
        name: "c".to_string(),
        weight: 1,
    };
    mapper.write(&Envelope::new("e-c", "Other", other)).unwrap();

    let mut nodes = mapper.nodes_of_type("TNODE").unwrap();
    nodes.sort_by_key(|n| n.uid());
    assert_eq!(nodes, vec![a, b]);
    assert!(mapper.nodes_of_type("missing").unwrap().is_empty());
}

#[test]
fn scan_of_unknown_identity_is_empty() {
    let mapper = mapper();
    let mut out = Tnode::default();
    let err = mapper.scan("nobody", &mut out).unwrap_err();
    assert!(matches!(err, MapperError::Empty));
}
