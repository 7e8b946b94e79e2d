use edgewise::store::SledGraphStore;
use edgewise::Mapper;
use std::sync::Arc;
use tempfile::TempDir;

use crate::integration::support::Tnode;

#[test]
fn records_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let record = Tnode::new("durable", "kept");

    let written = {
        let store = Arc::new(SledGraphStore::open(temp_dir.path()).unwrap());
        let mapper = Mapper::new(store.clone());
        mapper.bootstrap_schema().unwrap();
        let node = mapper.write(&record).unwrap();
        store.flush().unwrap();
        node
    };

    let store = SledGraphStore::open(temp_dir.path()).unwrap();
    let mapper = Mapper::new(Arc::new(store));
    // idempotent on an initialized store
    mapper.bootstrap_schema().unwrap();

    assert!(mapper.cache().is_empty());
    assert_eq!(mapper.fetch("durable").unwrap(), written);

    let mut out = Tnode::default();
    mapper.scan("durable", &mut out).unwrap();
    assert_eq!(out.field1, "kept");
}
