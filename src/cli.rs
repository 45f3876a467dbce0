//! CLI: GraphQL schema → CloudFormation resource schemas (list | translate)
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::TranslateConfig;
use crate::document::Document;
use crate::schema::{FieldDefinition, Operation, SchemaDocument};
use crate::service::{self, ServiceGrouper};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// translate GraphQL mutations and queries into CloudFormation resource schemas
#[derive(Parser, Debug)]
#[command(version)]
pub struct CommandLineInterface {
    /// log verbosity (RUST_LOG takes precedence when set)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the query and mutation fields of the schema
    List(ListCmd),
    /// emit one resource schema per grouped mutation set and per selected query
    Translate(TranslateCmd),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Args, Debug, Clone)]
struct SchemaSettings {
    /// One or more schema files. May be literal paths or quoted glob patterns;
    /// all files are concatenated before parsing
    #[arg(long, short, num_args = 1.., required = true)]
    schema: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct ListCmd {
    #[command(flatten)]
    schema_settings: SchemaSettings,
}

#[derive(clap::Parser, Debug)]
struct TranslateCmd {
    #[command(flatten)]
    schema_settings: SchemaSettings,

    /// comma-separated mutation name prefixes (every mutation if neither filter is given)
    #[arg(long, value_delimiter = ',')]
    mutations: Vec<String>,

    /// comma-separated query name prefixes
    #[arg(long, value_delimiter = ',')]
    queries: Vec<String>,

    /// resource configuration .json file
    #[arg(long)]
    config: Option<PathBuf>,

    /// type-name namespace, overrides the config file
    #[arg(long)]
    namespace: Option<String>,

    /// directory receiving one .json file per resource
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// print documents to stdout instead of writing files
    #[arg(long)]
    stdout: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl LogLevel {
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "gql2cfn=error",
            LogLevel::Warn => "gql2cfn=warn",
            LogLevel::Info => "gql2cfn=info",
            LogLevel::Debug => "gql2cfn=debug",
            LogLevel::Trace => "gql2cfn=trace",
        }
    }
}

impl SchemaSettings {
    fn load(&self) -> Result<SchemaDocument> {
        let source_paths = resolve_file_path_patterns(&self.schema)?;
        let mut source = String::new();
        for source_path in &source_paths {
            let text = std::fs::read_to_string(source_path)
                .with_context(|| format!("failed to read schema file {}", source_path.display()))?;
            source.push_str(&text);
            source.push('\n');
        }
        info!(files = source_paths.len(), bytes = source.len(), "schema.loaded");
        SchemaDocument::parse(&source).context("failed to parse schema")
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// Install the stderr log subscriber so stdout stays clean for documents.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level.directive()));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::List(target) => {
                let schema = target.schema_settings.load()?;
                let mut stdout = std::io::stdout().lock();
                for op in [Operation::Query, Operation::Mutation] {
                    writeln!(stdout, "{}", format!("{op} fields").bold().underline())?;
                    for field in schema.root_fields(op) {
                        writeln!(stdout, "  {}: {}", field.name.green(), field.ty)?;
                    }
                }
                Ok(())
            }
            Command::Translate(target) => {
                let schema = target.schema_settings.load()?;
                let mut config = match target.config.as_ref() {
                    Some(path) => TranslateConfig::load(path)?,
                    None => TranslateConfig::default(),
                };
                if let Some(namespace) = target.namespace.as_ref() {
                    config.namespace = namespace.clone();
                }

                let mut documents = Vec::new();
                let mutations = if target.mutations.is_empty() && target.queries.is_empty() {
                    schema.root_fields(Operation::Mutation).collect()
                } else {
                    select(&schema, Operation::Mutation, &target.mutations)?
                };
                let mut grouper = ServiceGrouper::new();
                for field in mutations {
                    grouper.add(&schema, field);
                }
                documents.extend(grouper.services().map(|s| s.emit(&config)));
                for field in select(&schema, Operation::Query, &target.queries)? {
                    documents.push(service::translate(&schema, &config, field));
                }

                let out_dir = (!target.stdout).then_some(target.out_dir.as_path());
                for doc in &documents {
                    write_document(doc, out_dir)?;
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Root fields of `op` matching any prefix. A prefix matching nothing is fatal.
fn select<'a>(schema: &'a SchemaDocument, op: Operation, prefixes: &[String]) -> Result<Vec<&'a FieldDefinition>> {
    let mut out: Vec<&FieldDefinition> = Vec::new();
    for prefix in prefixes.iter().filter(|p| !p.is_empty()) {
        let matched: Vec<_> = schema.matching_fields(op, prefix).collect();
        if matched.is_empty() {
            bail!("no {op} field matches `{prefix}`");
        }
        for field in matched {
            if !out.iter().any(|f| f.name == field.name) {
                out.push(field);
            }
        }
    }
    Ok(out)
}

fn write_document(doc: &Document, out_dir: Option<&Path>) -> Result<()> {
    let src = serde_json::to_string_pretty(doc)?;
    let Some(out_dir) = out_dir else {
        println!("{src}");
        return Ok(());
    };
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let out = out_dir.join(doc.file_name());
    std::fs::write(&out, &src).with_context(|| format!("failed to write {}", out.display()))?;
    info!(path = %out.display(), "document.written");
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern: {pattern}"))? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

// ------------------------------- Tests ------------------------------------ //
