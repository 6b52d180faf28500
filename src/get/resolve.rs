//! Splitting requested keys into annotation columns and matrix axis entries.

use std::collections::{BTreeSet, HashMap};

use anyhow::Result;

use crate::data::DataFrame;
use crate::data::frame::duplicated_labels;
use crate::error::AccessError;

/// Keys of an `obs_df` request, each listed once.
#[derive(Debug, Default)]
pub(crate) struct ObsKeys {
    pub obs_columns: Vec<String>,
    /// (requested key, position on the feature axis)
    pub features: Vec<(String, usize)>,
}

/// Keys of a `var_df` request, each listed once.
#[derive(Debug, Default)]
pub(crate) struct VarKeys {
    /// (requested key, position on the observation axis)
    pub observations: Vec<(String, usize)>,
    pub var_columns: Vec<String>,
}

/// Resolve keys against `obs` columns and the feature axis described by `var`
/// (either `adata.var` or `adata.raw.var`), optionally through a symbol column.
pub(crate) fn resolve_obs_keys(
    keys: &[&str],
    obs: &DataFrame,
    var: &DataFrame,
    gene_symbols: Option<&str>,
    use_raw: bool,
) -> Result<ObsKeys> {
    let dup_obs = obs.duplicated_columns();
    if !dup_obs.is_empty() {
        return Err(AccessError::DuplicateObsColumns(dup_obs).into());
    }
    let dup_vars = duplicated_labels(var.index());
    if !dup_vars.is_empty() {
        return Err(AccessError::DuplicateVarNames {
            source_name: if use_raw { "adata.raw.var" } else { "adata.var" },
            names: dup_vars,
        }
        .into());
    }

    let prefix = if use_raw { "adata.raw" } else { "adata" };
    let (searched, lookup) = match gene_symbols {
        Some(column) => {
            let symbols = var
                .column(column)
                .ok_or_else(|| AccessError::missing("var column", format!("{prefix}.var['{column}']")))?
                .labels()?;
            let mut lookup: HashMap<String, Vec<usize>> = HashMap::new();
            for (pos, symbol) in symbols.into_iter().enumerate() {
                if let Some(symbol) = symbol {
                    lookup.entry(symbol).or_default().push(pos);
                }
            }
            (format!("gene_symbols column `{prefix}.var['{column}']`"), lookup)
        }
        None => {
            let lookup: HashMap<String, Vec<usize>> = var
                .index()
                .iter()
                .enumerate()
                .map(|(pos, name)| (name.clone(), vec![pos]))
                .collect();
            (format!("`{prefix}.var_names`"), lookup)
        }
    };

    let mut resolved = ObsKeys::default();
    let mut ambiguous = Vec::new();
    let mut duplicate_symbols = Vec::new();
    let mut not_found = Vec::new();

    // unique keys only; repeats are restored when the columns are reordered
    for key in keys.iter().copied().collect::<BTreeSet<&str>>() {
        if obs.contains_column(key) {
            if lookup.contains_key(key) {
                ambiguous.push(key.to_string());
            }
            resolved.obs_columns.push(key.to_string());
        } else if let Some(positions) = lookup.get(key) {
            match positions.as_slice() {
                [pos] => resolved.features.push((key.to_string(), *pos)),
                _ => duplicate_symbols.push(key.to_string()),
            }
        } else {
            not_found.push(key.to_string());
        }
    }

    if !ambiguous.is_empty() {
        return Err(AccessError::AmbiguousKeys {
            keys: ambiguous,
            searched,
        }
        .into());
    }
    if !duplicate_symbols.is_empty() {
        return Err(AccessError::DuplicateSymbols {
            keys: duplicate_symbols,
            column: format!("{prefix}.var['{}']", gene_symbols.unwrap_or_default()),
        }
        .into());
    }
    if !not_found.is_empty() {
        return Err(AccessError::KeysNotFound {
            keys: not_found,
            searched: format!("columns of `adata.obs` or in {searched}"),
        }
        .into());
    }
    Ok(resolved)
}

/// Resolve keys against observation names and `var` columns. Observation names win
/// when a key is both.
pub(crate) fn resolve_var_keys(keys: &[&str], obs: &DataFrame, var: &DataFrame) -> Result<VarKeys> {
    let dup_var = var.duplicated_columns();
    if !dup_var.is_empty() {
        return Err(AccessError::DuplicateVarColumns(dup_var).into());
    }
    let dup_obs = duplicated_labels(obs.index());
    if !dup_obs.is_empty() {
        return Err(AccessError::DuplicateObsNames(dup_obs).into());
    }

    let obs_positions: HashMap<&str, usize> = obs
        .index()
        .iter()
        .enumerate()
        .map(|(pos, name)| (name.as_str(), pos))
        .collect();

    let mut resolved = VarKeys::default();
    let mut not_found = Vec::new();
    for key in keys.iter().copied().collect::<BTreeSet<&str>>() {
        if let Some(&pos) = obs_positions.get(key) {
            resolved.observations.push((key.to_string(), pos));
        } else if var.contains_column(key) {
            resolved.var_columns.push(key.to_string());
        } else {
            not_found.push(key.to_string());
        }
    }

    if !not_found.is_empty() {
        return Err(AccessError::KeysNotFound {
            keys: not_found,
            searched: "columns of `adata.var` or in `adata.obs_names`".to_string(),
        }
        .into());
    }
    Ok(resolved)
}
