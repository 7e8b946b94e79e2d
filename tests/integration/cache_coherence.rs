use edgewise::{Identity, Node};
use std::sync::Arc;
use std::thread;

use crate::integration::support::{counting_mapper, Tnode};

#[test]
fn fetch_after_write_is_served_from_cache() {
    let (store, mapper) = counting_mapper();
    let record = Tnode::new("cached", "c");
    let written = mapper.write(&record).unwrap();
    assert_eq!(store.executions(), 1);

    let queries = store.queries();
    assert_eq!(mapper.fetch("cached").unwrap(), written);
    assert_eq!(mapper.node(&record).unwrap(), written);
    assert_eq!(store.queries(), queries);
}

#[test]
fn purge_forces_one_store_lookup() {
    let (store, mapper) = counting_mapper();
    let written = mapper.write(&Tnode::new("purged", "p")).unwrap();

    mapper.purge_cache();
    let before = store.queries();
    assert_eq!(mapper.fetch("purged").unwrap(), written);
    assert_eq!(store.queries(), before + 1);

    // repopulated by the miss
    assert_eq!(mapper.fetch("purged").unwrap(), written);
    assert_eq!(store.queries(), before + 1);
}

#[test]
fn unknown_identity_returns_empty_node_without_caching() {
    let (store, mapper) = counting_mapper();

    let node = mapper.fetch("missing").unwrap();
    assert!(node.is_empty());
    assert_eq!(node, Node::empty());
    assert_eq!(node.to_string(), "");
    assert!(!mapper.cache().contains("missing"));

    let before = store.queries();
    assert!(mapper.node(&Identity::from("missing")).unwrap().is_empty());
    assert_eq!(store.queries(), before + 1);
}

#[test]
fn concurrent_fetches_agree() {
    let (_store, mapper) = counting_mapper();
    let mapper = Arc::new(mapper);
    let mut expected = Vec::new();
    for i in 0..8 {
        let identity = format!("shared-{}", i);
        expected.push(mapper.write(&Tnode::new(&identity, "s")).unwrap());
    }
    mapper.purge_cache();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let mapper = Arc::clone(&mapper);
            thread::spawn(move || {
                (0..8)
                    .map(|i| mapper.fetch(&format!("shared-{}", i)).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn small_cache_still_resolves_evicted_identities() {
    let (store, mapper) = counting_mapper();
    let mapper = edgewise::Mapper::with_capacity(mapper.store().clone(), 2);

    let a = mapper.write(&Tnode::new("a", "a")).unwrap();
    mapper.write(&Tnode::new("b", "b")).unwrap();
    mapper.write(&Tnode::new("c", "c")).unwrap();
    assert_eq!(mapper.cache().len(), 2);
    assert!(!mapper.cache().contains("a"));

    let before = store.queries();
    assert_eq!(mapper.fetch("a").unwrap(), a);
    assert_eq!(store.queries(), before + 1);
}
