//! Observation- and feature-indexed tables assembled from an [`AnnData`].

use anyhow::{Context, Result};
use log::debug;
use single_utilities::traits::FloatOps;

use crate::data::{AnnData, ArrayElem, Column, DataFrame};
use crate::error::AccessError;
use crate::get::rep::{ObsRep, RepSelector, get_obs_rep};
use crate::get::resolve::{resolve_obs_keys, resolve_var_keys};
use crate::get::utils::{take_columns, take_rows};

/// Options for [`obs_df`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObsDfOptions {
    /// Layer to read feature values from instead of `X`
    pub layer: Option<String>,
    /// Column of `var` whose values are matched against keys instead of the var names
    pub gene_symbols: Option<String>,
    /// Read feature values (and feature names) from `raw`
    pub use_raw: bool,
}

impl ObsDfOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_gene_symbols(mut self, column: impl Into<String>) -> Self {
        self.gene_symbols = Some(column.into());
        self
    }

    pub fn with_use_raw(mut self, use_raw: bool) -> Self {
        self.use_raw = use_raw;
        self
    }

    fn selector(&self) -> RepSelector {
        RepSelector {
            use_raw: self.use_raw,
            layer: self.layer.clone(),
            ..RepSelector::default()
        }
    }
}

/// Options for [`var_df`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarDfOptions {
    pub layer: Option<String>,
}

impl VarDfOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }
}

/// Table indexed by observation names with one column per requested key.
///
/// Keys may name `obs` columns or features (var names, or values of the
/// `gene_symbols` column). Output columns follow `keys` exactly, repeats included,
/// followed by one `"{key}-{index}"` column per entry of `obsm_keys`.
///
/// # Errors
///
/// Duplicate `obs` columns or feature names, keys that are ambiguous or unknown, a
/// missing layer/raw/obsm entry, or `use_raw` combined with `layer`.
pub fn obs_df<T>(
    adata: &AnnData<T>,
    keys: &[&str],
    obsm_keys: &[(&str, usize)],
    options: &ObsDfOptions,
) -> Result<DataFrame>
where
    T: FloatOps,
{
    let selector = options.selector();
    let rep = selector.resolve()?;

    let var = if options.use_raw {
        adata
            .raw()
            .ok_or_else(|| AccessError::missing("raw", "adata.raw"))?
            .var()
    } else {
        adata.var()
    };
    let resolved = resolve_obs_keys(
        keys,
        adata.obs(),
        var,
        options.gene_symbols.as_deref(),
        options.use_raw,
    )?;
    debug!(
        "obs_df: {} keys resolved to {} obs columns and {} features ({})",
        keys.len(),
        resolved.obs_columns.len(),
        resolved.features.len(),
        rep
    );

    let mut df = DataFrame::new(adata.obs_names().iter().cloned());

    if !resolved.features.is_empty() {
        let matrix = get_obs_rep(adata, rep)?;
        let positions: Vec<usize> = resolved.features.iter().map(|&(_, pos)| pos).collect();
        let values = take_columns(matrix, &positions, adata.is_backed())?.densify()?;
        for (j, (key, _)) in resolved.features.iter().enumerate() {
            df.push_column(key.as_str(), Column::Float(values.column(j).to_vec()))?;
        }
    }

    for name in &resolved.obs_columns {
        let column = adata
            .obs()
            .column(name)
            .ok_or_else(|| AccessError::missing("obs column", name.as_str()))?;
        df.push_column(name.as_str(), column.clone())?;
    }

    let mut df = df.select(keys)?;
    append_axis_columns(&mut df, obsm_keys, |key| adata.obsm(key))?;
    Ok(df)
}

/// Table indexed by var names with one column per requested key.
///
/// Keys may name observations or `var` columns; an observation name shadows a `var`
/// column of the same name. Output columns follow `keys` exactly, followed by one
/// `"{key}-{index}"` column per entry of `varm_keys`.
pub fn var_df<T>(
    adata: &AnnData<T>,
    keys: &[&str],
    varm_keys: &[(&str, usize)],
    options: &VarDfOptions,
) -> Result<DataFrame>
where
    T: FloatOps,
{
    let resolved = resolve_var_keys(keys, adata.obs(), adata.var())?;
    debug!(
        "var_df: {} keys resolved to {} observations and {} var columns",
        keys.len(),
        resolved.observations.len(),
        resolved.var_columns.len()
    );

    let mut df = DataFrame::new(adata.var_names().iter().cloned());

    if !resolved.observations.is_empty() {
        let rep = match options.layer.as_deref() {
            Some(layer) => ObsRep::Layer(layer),
            None => ObsRep::X,
        };
        let matrix = get_obs_rep(adata, rep)?;
        let positions: Vec<usize> = resolved.observations.iter().map(|&(_, pos)| pos).collect();
        let values = take_rows(matrix, &positions, adata.is_backed())?.densify()?;
        for (i, (key, _)) in resolved.observations.iter().enumerate() {
            df.push_column(key.as_str(), Column::Float(values.row(i).to_vec()))?;
        }
    }

    for name in &resolved.var_columns {
        let column = adata
            .var()
            .column(name)
            .ok_or_else(|| AccessError::missing("var column", name.as_str()))?;
        df.push_column(name.as_str(), column.clone())?;
    }

    let mut df = df.select(keys)?;
    append_axis_columns(&mut df, varm_keys, |key| adata.varm(key))?;
    Ok(df)
}

fn append_axis_columns<'a, T, F>(df: &mut DataFrame, keys: &[(&str, usize)], lookup: F) -> Result<()>
where
    T: FloatOps + 'a,
    F: Fn(&str) -> Result<&'a ArrayElem<T>>,
{
    for &(key, idx) in keys {
        let block = lookup(key)?;
        let values = block
            .column_values(idx)
            .with_context(|| format!("while reading column {idx} of `{key}`"))?;
        df.set_column(format!("{key}-{idx}"), values)?;
    }
    Ok(())
}
