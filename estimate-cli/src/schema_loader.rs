//! Loading the form layout from TOML.
//!
//! A schema file is a list of `[[steps]]`, each with a `title` and a list of
//! `[[steps.fields]]`:
//!
//! ```toml
//! [[steps]]
//! title = "Contact"
//!
//! [[steps.fields]]
//! id = "email"
//! label = "Email Address"
//! type = "email"
//! required = true
//! ```

use std::path::{Path, PathBuf};

use estimate_core::models::FormSchema;
use thiserror::Error;
use tracing::debug;

/// The auto-body estimate layout shipped with the binary.
pub const DEFAULT_SCHEMA: &str = include_str!("../schema/auto_body.toml");

#[derive(Debug, Error)]
pub enum SchemaLoadError {
    #[error("cannot read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bad TOML, an unknown field type, or a layout the schema rejects
    /// (duplicate ids, empty steps, ...).
    #[error("invalid schema: {0}")]
    Invalid(#[from] toml::de::Error),
}

pub fn load_from_str(input: &str) -> Result<FormSchema, SchemaLoadError> {
    let schema: FormSchema = toml::from_str(input)?;
    debug!(
        steps = schema.total_steps(),
        fields = schema.fields().count(),
        "schema loaded"
    );
    Ok(schema)
}

pub fn load_from_file(path: &Path) -> Result<FormSchema, SchemaLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SchemaLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}

/// The schema at `path`, or the built-in one when no path is given.
pub fn load(path: Option<&Path>) -> Result<FormSchema, SchemaLoadError> {
    match path {
        Some(path) => load_from_file(path),
        None => load_from_str(DEFAULT_SCHEMA),
    }
}
