//! # single-accessors
//!
//! Tabular accessors for annotated single-cell matrices, part of the single-rust ecosystem.
//!
//! This crate turns an [`AnnData`](data::AnnData) into the table shapes that plotting,
//! summary and export code expects. Keys are resolved against observation or feature
//! annotations and against the matrix axes, values are pulled from the selected
//! representation (`X`, a layer, `raw`, auxiliary blocks) and densified on the way out.
//!
//! ## Core Features
//!
//! - **Observation tables** ([`get::obs_df`]): obs columns and feature values per cell,
//!   optionally through a gene symbol column or the raw matrix
//! - **Feature tables** ([`get::var_df`]): var columns and per-cell values per gene
//! - **Marker gene tables** ([`rank::rank_genes_groups_df`]): ranked differential
//!   expression results in long format with filtering and pct statistics
//! - **Representation selection** ([`get::get_obs_rep`], [`get::set_obs_rep`])
//! - **Sparse Matrix Support**: `CsrMatrix` / `CscMatrix` from nalgebra-sparse next to
//!   dense `ndarray` blocks
//!
//! ## Module Organization
//!
//! - **[`data`]**: the annotated matrix container and its column tables
//! - **[`get`]**: key resolution and table assembly
//! - **[`rank`]**: ranked marker gene results
//! - **[`error`]**: failure kinds, recoverable from `anyhow::Error` by downcasting

pub mod data;
pub mod error;
pub mod get;
pub mod rank;

pub use error::AccessError;
