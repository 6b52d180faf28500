//! Typed failure kinds raised by the accessors.
//!
//! Public functions return `anyhow::Result`; the concrete kind can be recovered with
//! `err.downcast_ref::<AccessError>()`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccessError {
    /// `obs` has more than one column with the same name
    #[error("adata.obs contains duplicated columns {0:?}. Please rename or remove these columns first")]
    DuplicateObsColumns(Vec<String>),

    /// `var` has more than one column with the same name
    #[error("adata.var contains duplicated columns {0:?}. Please rename or remove these columns first")]
    DuplicateVarColumns(Vec<String>),

    /// The feature axis that would be searched is not unique
    #[error(
        "{source_name} contains duplicated var names {names:?}. Please rename these var names first, for example with `var_names_make_unique`"
    )]
    DuplicateVarNames {
        source_name: &'static str,
        names: Vec<String>,
    },

    /// The observation axis is not unique
    #[error("adata.obs_names contains duplicated entries {0:?}. Please make them unique first")]
    DuplicateObsNames(Vec<String>),

    /// Keys that name both an obs column and a feature
    #[error("the keys {keys:?} are found in both adata.obs and {searched}")]
    AmbiguousKeys { keys: Vec<String>, searched: String },

    /// Keys that map to more than one feature through the symbol column
    #[error("found duplicate entries for {keys:?} in {column}")]
    DuplicateSymbols { keys: Vec<String>, column: String },

    #[error("could not find keys {keys:?} in {searched}")]
    KeysNotFound { keys: Vec<String>, searched: String },

    /// More than one representation was requested at once
    #[error("conflicting representations requested: {0}")]
    ConflictingRepresentation(String),

    #[error("{kind} `{key}` not found")]
    MissingElement { kind: &'static str, key: String },

    #[error("index {index} out of bounds for {axis} of length {len}")]
    IndexOutOfBounds {
        axis: &'static str,
        index: usize,
        len: usize,
    },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl AccessError {
    pub(crate) fn missing(kind: &'static str, key: impl Into<String>) -> Self {
        AccessError::MissingElement {
            kind,
            key: key.into(),
        }
    }
}
