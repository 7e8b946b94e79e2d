//! CLI Tooling
//!
//! Command-line interface over a sled-backed graph. Every command runs
//! through the record mapper, so identity lookups share its cache and index
//! conventions.

use crate::codec::unescape_quotes;
use crate::config::{ConfigLoader, EdgewiseConfig};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::mapper::Mapper;
use crate::record::Identity;
use crate::store::{Node, QueryNode, Selection, SledGraphStore, Value};
use crate::types::IDENTITY_PREDICATE;
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value as Json};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Edgewise CLI - inspect and connect records stored as graph nodes
#[derive(Parser)]
#[command(name = "edgewise")]
#[command(about = "Inspect records mapped onto an embedded graph store")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Root directory for edgewise.toml and relative store paths
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply the logging flags on top of the configured settings
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if self.verbose {
            config.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Declare the identity and type indexes
    Init,
    /// Resolve an identity to its node
    Fetch {
        identity: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the requested edges of a node as JSON
    Show {
        identity: String,
        /// Edge names to read
        #[arg(required = true)]
        edges: Vec<String>,
        /// Relations to follow one hop, reading the target identities
        #[arg(long = "expand")]
        expand: Vec<String>,
    },
    /// List the nodes written with a type tag
    Types {
        type_tag: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Add a relation edge between two written records
    Connect {
        from: String,
        relation: String,
        to: String,
    },
}

/// CLI context for executing commands
pub struct CliContext {
    store: Arc<SledGraphStore>,
    mapper: Mapper,
    config: EdgewiseConfig,
    store_path: PathBuf,
}

impl CliContext {
    /// Load configuration and open the store it points at
    pub fn new(root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&root)?,
        };

        let store_path = config.storage.resolve_path(&root)?;
        std::fs::create_dir_all(&store_path).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to create store directory {}: {}",
                store_path.display(),
                e
            ))
        })?;

        let store = Arc::new(SledGraphStore::open(&store_path)?);
        let mapper = Mapper::from_config(store.clone(), &config.cache);

        Ok(Self {
            store,
            mapper,
            config,
            store_path,
        })
    }

    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    pub fn config(&self) -> &EdgewiseConfig {
        &self.config
    }

    pub fn store_path(&self) -> &PathBuf {
        &self.store_path
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let result = match command {
            Commands::Init => self.handle_init(),
            Commands::Fetch { identity, format } => self.handle_fetch(identity, format),
            Commands::Show {
                identity,
                edges,
                expand,
            } => self.handle_show(identity, edges, expand),
            Commands::Types { type_tag, format } => self.handle_types(type_tag, format),
            Commands::Connect { from, relation, to } => self.handle_connect(from, relation, to),
        };
        info!(command = command_name(command), ok = result.is_ok(), "command finished");
        result
    }

    fn handle_init(&self) -> Result<String, ApiError> {
        self.mapper.bootstrap_schema()?;
        Ok(format!(
            "Initialized graph store at {}",
            self.store_path.display()
        ))
    }

    fn handle_fetch(&self, identity: &str, format: &str) -> Result<String, ApiError> {
        let node = self.mapper.fetch(identity)?;
        match format {
            "json" => Ok(format_fetch_json(identity, node)),
            _ => Ok(if node.is_empty() {
                format!("No node for identity {}", identity)
            } else {
                node.to_string()
            }),
        }
    }

    fn handle_show(
        &self,
        identity: &str,
        edges: &[String],
        expand: &[String],
    ) -> Result<String, ApiError> {
        let mut selections: Vec<Selection> = vec![Selection::uid()];
        selections.extend(edges.iter().map(|e| Selection::predicate(e.as_str())));
        selections.extend(
            expand
                .iter()
                .map(|relation| Selection::relation(relation.as_str(), [IDENTITY_PREDICATE])),
        );

        let found = self.mapper.fetch_values(identity, &selections)?;
        let Some(found) = found else {
            return Err(ApiError::Mapper(crate::error::MapperError::Unresolved(
                identity.to_string(),
            )));
        };
        Ok(format_show_json(identity, &found))
    }

    fn handle_types(&self, type_tag: &str, format: &str) -> Result<String, ApiError> {
        let nodes = self.mapper.nodes_of_type(type_tag)?;
        match format {
            "json" => {
                let uids: Vec<String> = nodes.iter().map(Node::to_string).collect();
                let out = json!({
                    "type": type_tag.to_lowercase(),
                    "nodes": uids,
                    "total": nodes.len(),
                });
                Ok(serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string()))
            }
            _ => {
                if nodes.is_empty() {
                    return Ok(format!("No nodes of type {}", type_tag));
                }
                Ok(nodes
                    .iter()
                    .map(Node::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
    }

    fn handle_connect(&self, from: &str, relation: &str, to: &str) -> Result<String, ApiError> {
        self.mapper
            .connect(&Identity::from(from), relation, &Identity::from(to))?;
        Ok(format!("Connected {} -[{}]-> {}", from, relation, to))
    }
}

impl Drop for CliContext {
    fn drop(&mut self) {
        if let Err(e) = self.store.flush() {
            warn!(error = %e, "failed to flush graph store");
        }
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Init => "init",
        Commands::Fetch { .. } => "fetch",
        Commands::Show { .. } => "show",
        Commands::Types { .. } => "types",
        Commands::Connect { .. } => "connect",
    }
}

fn format_fetch_json(identity: &str, node: Node) -> String {
    let uid = if node.is_empty() {
        Json::Null
    } else {
        Json::String(node.to_string())
    };
    let out = json!({
        "identity": identity,
        "found": !node.is_empty(),
        "uid": uid,
    });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

fn format_show_json(identity: &str, found: &QueryNode) -> String {
    let mut properties = Map::new();
    for property in &found.properties {
        properties.insert(property.name.clone(), value_to_json(&property.value));
    }

    let mut relations: Map<String, Json> = Map::new();
    for child in &found.children {
        let mut target = Map::new();
        target.insert(
            "uid".to_string(),
            Json::String(Node::from_uid(child.uid).to_string()),
        );
        if let Some(value) = child.property(IDENTITY_PREDICATE) {
            target.insert("identity".to_string(), value_to_json(value));
        }
        let entry = relations
            .entry(child.attribute.clone())
            .or_insert_with(|| Json::Array(Vec::new()));
        if let Json::Array(targets) = entry {
            targets.push(Json::Object(target));
        }
    }

    let out = json!({
        "identity": identity,
        "uid": Node::from_uid(found.uid).to_string(),
        "properties": properties,
        "relations": relations,
    });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

/// Render a stored scalar; JSON payloads are inlined, other bytes shown lossily
fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Str(s) => Json::String(unescape_quotes(s)),
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Bytes(raw) => serde_json::from_slice(raw)
            .unwrap_or_else(|_| Json::String(String::from_utf8_lossy(raw).into_owned())),
        Value::Uid(uid) => Json::String(Node::from_uid(*uid).to_string()),
    }
}
