use edgewise::store::Selection;
use edgewise::{Identity, MapperError, Value};

use crate::integration::support::{mapper, Tnode};

#[test]
fn connected_records_are_traversable() {
    let mapper = mapper();
    let node1 = Tnode::new("conn-1", "node1");
    let node2 = Tnode::new("conn-2", "node2");
    mapper.write(&node1).unwrap();
    let target = mapper.write(&node2).unwrap();

    mapper.connect(&node1, "next-to", &node2).unwrap();

    let found = mapper
        .fetch_values("conn-1", &[Selection::relation("next-to", ["f1"])])
        .unwrap()
        .unwrap();
    let children: Vec<_> = found.children_of("next-to").collect();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].uid, target.uid());
    assert_eq!(
        children[0].property("f1"),
        Some(&Value::Str("node2".to_string()))
    );
}

#[test]
fn connecting_twice_keeps_one_relation() {
    let mapper = mapper();
    let a = Tnode::new("twice-a", "a");
    let b = Tnode::new("twice-b", "b");
    mapper.write(&a).unwrap();
    mapper.write(&b).unwrap();

    mapper.connect(&a, "knows", &b).unwrap();
    mapper.connect(&a, "knows", &b).unwrap();

    let found = mapper
        .fetch_values("twice-a", &["knows".into()])
        .unwrap()
        .unwrap();
    assert_eq!(found.children_of("knows").count(), 1);
}

#[test]
fn connect_requires_both_records() {
    let mapper = mapper();
    let a = Tnode::new("lonely", "a");
    mapper.write(&a).unwrap();

    let err = mapper
        .connect(&a, "next-to", &Identity::from("ghost"))
        .unwrap_err();
    assert!(matches!(err, MapperError::Unresolved(ref id) if id == "ghost"));

    let err = mapper
        .connect(&Identity::from("ghost"), "next-to", &a)
        .unwrap_err();
    assert!(matches!(err, MapperError::Unresolved(_)));
}
