use edgewise::tooling::cli::{CliContext, Commands};
use edgewise::{Fields, Identifiable};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[derive(Debug, Default, Fields)]
pub struct Person {
    pub name: String,
    pub age: i64,
}

impl Identifiable for Person {
    fn identity(&self) -> String {
        format!("person/{}", self.name.to_lowercase())
    }
}

/// Context over a store under `temp_dir`, with indexes declared
pub fn init_context(temp_dir: &TempDir) -> CliContext {
    write_config(temp_dir.path());
    let cli = CliContext::new(temp_dir.path().to_path_buf(), None).unwrap();
    cli.execute(&Commands::Init).unwrap();
    cli
}

pub fn write_config(root: &Path) {
    fs::write(
        root.join("edgewise.toml"),
        "[storage]\npath = \"graph\"\n\n[cache]\ncapacity = 8\n",
    )
    .unwrap();
}

pub fn person(name: &str, age: i64) -> Person {
    Person {
        name: name.to_string(),
        age,
    }
}
