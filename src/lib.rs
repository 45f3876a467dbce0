//! Translate a GraphQL schema into CloudFormation-style resource schemas.
//!
//! Mutations named `<resource>Create`, `<resource>Update` and
//! `<resource>Delete` are grouped into one resource each; every type they
//! reach is flattened into shared `definitions` referenced by `$ref`.
pub mod cli;
pub mod config;
pub mod document;
pub mod ir;
pub mod lower;
pub mod path_de;
pub mod schema;
pub mod service;
pub mod walk;

pub use config::{ResourceConfig, TranslateConfig};
pub use document::{Document, MergeConflict, MergeOutcome};
pub use schema::{Kind, Operation, SchemaDocument};
pub use service::{Lifecycle, Service, ServiceGrouper};
