//! Configuration for the outreach pipeline.
//!
//! Provides:
//! - The declarative workflow document model (`WorkflowDocument`, `StepDeclaration`)
//! - Secret lookup from the environment / `.env` and placeholder substitution
//! - Workflow loading (JSON or TOML) with `ConfigNotFound` / `ConfigParse` failures
//! - Layered engine settings (XDG user config + project-local `outreach.toml`)

pub mod discovery;
pub mod document;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options,
    xdg_config_dir, xdg_config_path,
};
pub use document::{
    DocumentFormat, LoadedWorkflow, StepDeclaration, WorkflowDocument, load_workflow,
    resolve_document,
};
pub use error::{ConfigError, Result};
pub use secrets::{
    DEFAULT_SECRET_NAMES, ResolvedSecret, SecretMap, SecretSource, placeholder_token,
    unresolved_placeholders,
};
pub use types::*;
