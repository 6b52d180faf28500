use std::collections::{HashMap, HashSet};

use anyhow::Result;
use log::{debug, warn};
use single_utilities::traits::FloatOps;

use crate::data::{AnnData, Categorical, Column, DataFrame, UnsElem};
use crate::error::AccessError;
use crate::rank::RankGenesGroups;

/// `uns` key ranked marker genes are stored under by default.
pub const DEFAULT_KEY: &str = "rank_genes_groups";

/// Which groups to report.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GroupSelection {
    /// Every group, in stored order
    #[default]
    All,
    One(String),
    Many(Vec<String>),
}

impl GroupSelection {
    fn into_list(self, store: &RankGenesGroups) -> Vec<String> {
        match self {
            GroupSelection::All => store.group_names().into_iter().map(str::to_string).collect(),
            GroupSelection::One(group) => vec![group],
            GroupSelection::Many(groups) => groups,
        }
    }
}

impl From<&str> for GroupSelection {
    fn from(value: &str) -> Self {
        GroupSelection::One(value.to_string())
    }
}

impl From<String> for GroupSelection {
    fn from(value: String) -> Self {
        GroupSelection::One(value)
    }
}

impl From<Vec<String>> for GroupSelection {
    fn from(value: Vec<String>) -> Self {
        GroupSelection::Many(value)
    }
}

impl From<Vec<&str>> for GroupSelection {
    fn from(value: Vec<&str>) -> Self {
        GroupSelection::Many(value.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for GroupSelection {
    fn from(value: &[&str]) -> Self {
        GroupSelection::Many(value.iter().map(|s| s.to_string()).collect())
    }
}

/// Options for [`rank_genes_groups_df`].
#[derive(Debug, Clone, PartialEq)]
pub struct RankGenesGroupsDfOptions {
    /// `uns` key the results are stored under
    pub key: String,
    /// Keep rows with adjusted p-value strictly below this
    pub pval_cutoff: Option<f64>,
    /// Keep rows with log2 fold change strictly above this
    pub log2fc_min: Option<f64>,
    /// Keep rows with log2 fold change strictly below this
    pub log2fc_max: Option<f64>,
    /// `var` column joined onto the output by feature name
    pub gene_symbols: Option<String>,
}

impl Default for RankGenesGroupsDfOptions {
    fn default() -> Self {
        RankGenesGroupsDfOptions {
            key: DEFAULT_KEY.to_string(),
            pval_cutoff: None,
            log2fc_min: None,
            log2fc_max: None,
            gene_symbols: None,
        }
    }
}

impl RankGenesGroupsDfOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_pval_cutoff(mut self, cutoff: f64) -> Self {
        self.pval_cutoff = Some(cutoff);
        self
    }

    pub fn with_log2fc_min(mut self, min: f64) -> Self {
        self.log2fc_min = Some(min);
        self
    }

    pub fn with_log2fc_max(mut self, max: f64) -> Self {
        self.log2fc_max = Some(max);
        self
    }

    pub fn with_gene_symbols(mut self, column: impl Into<String>) -> Self {
        self.gene_symbols = Some(column.into());
        self
    }
}

/// Ranked marker genes as a long table.
///
/// Columns are `group` (categorical, in request order), `names`, `scores`,
/// `logfoldchanges`, `pvals`, `pvals_adj`, the `gene_symbols` column if requested, and
/// `pct_nz_group` / `pct_nz_reference` if the store carries them. Rows are grouped by
/// group in request order and keep rank order within a group. With a single group the
/// `group` column is left out.
///
/// The pct tables are inner-joined on (name, group): rows without a pct entry are
/// dropped.
pub fn rank_genes_groups_df<T>(
    adata: &AnnData<T>,
    group: impl Into<GroupSelection>,
    options: &RankGenesGroupsDfOptions,
) -> Result<DataFrame>
where
    T: FloatOps,
{
    let store = match adata.uns(&options.key) {
        Some(UnsElem::RankGenesGroups(store)) => store,
        Some(_) => {
            return Err(AccessError::InvalidData(format!(
                "adata.uns['{}'] does not hold rank_genes_groups results",
                options.key
            ))
            .into());
        }
        None => return Err(AccessError::missing("uns key", options.key.as_str()).into()),
    };

    let groups = group.into().into_list(store);
    let mut seen = HashSet::new();
    if let Some(dup) = groups.iter().find(|g| !seen.insert(g.as_str())) {
        return Err(AccessError::InvalidData(format!("group `{dup}` is requested twice")).into());
    }

    let capacity = groups.len() * store.n_ranked();
    let mut names = Vec::with_capacity(capacity);
    let mut scores = Vec::with_capacity(capacity);
    let mut logfoldchanges = Vec::with_capacity(capacity);
    let mut pvals = Vec::with_capacity(capacity);
    let mut pvals_adj = Vec::with_capacity(capacity);
    let mut group_codes = Vec::with_capacity(capacity);
    for (code, label) in groups.iter().enumerate() {
        let ranked = store
            .group(label)
            .ok_or_else(|| AccessError::missing("group", label.as_str()))?;
        names.extend(ranked.names.iter().map(|n| Some(n.clone())));
        scores.extend_from_slice(&ranked.scores);
        logfoldchanges.extend_from_slice(&ranked.logfoldchanges);
        pvals.extend_from_slice(&ranked.pvals);
        pvals_adj.extend_from_slice(&ranked.pvals_adj);
        group_codes.extend(std::iter::repeat_n(Some(code as u32), ranked.len()));
    }

    let mut keep = vec![true; names.len()];
    if let Some(cutoff) = options.pval_cutoff {
        keep.iter_mut()
            .zip(&pvals_adj)
            .for_each(|(k, &p)| *k &= p < cutoff);
    }
    if let Some(min) = options.log2fc_min {
        keep.iter_mut()
            .zip(&logfoldchanges)
            .for_each(|(k, &lfc)| *k &= lfc > min);
    }
    if let Some(max) = options.log2fc_max {
        keep.iter_mut()
            .zip(&logfoldchanges)
            .for_each(|(k, &lfc)| *k &= lfc < max);
    }

    let n_rows = names.len();
    let mut df = DataFrame::new((0..n_rows).map(|i| i.to_string()))
        .with_column(
            "group",
            Column::Categorical(Categorical::new(groups.clone(), group_codes)?),
        )?
        .with_column("names", Column::Str(names))?
        .with_column("scores", Column::Float(scores))?
        .with_column("logfoldchanges", Column::Float(logfoldchanges))?
        .with_column("pvals", Column::Float(pvals))?
        .with_column("pvals_adj", Column::Float(pvals_adj))?
        .filter_rows(&keep)?;
    debug!(
        "rank_genes_groups_df: {} of {} rows kept for {} groups",
        df.n_rows(),
        n_rows,
        groups.len()
    );

    if let Some(column) = options.gene_symbols.as_deref() {
        df = join_var_column(df, adata.var(), column)?;
    }

    for (block, value_name) in [
        (store.pts(), "pct_nz_group"),
        (store.pts_rest(), "pct_nz_reference"),
    ] {
        if let Some(block) = block {
            df = merge_pct(df, block, &groups, value_name)?;
        }
    }

    if groups.len() == 1 {
        df.drop_column("group");
    }
    df.reset_index();
    Ok(df)
}

/// Left join of `var[column]` keyed by the var names.
fn join_var_column(df: DataFrame, var: &DataFrame, column: &str) -> Result<DataFrame> {
    let values = var
        .column(column)
        .ok_or_else(|| AccessError::missing("var column", format!("adata.var['{column}']")))?;

    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (pos, name) in var.index().iter().enumerate() {
        by_name.entry(name.as_str()).or_default().push(pos);
    }

    let names = feature_names(&df)?;
    let mut left = Vec::with_capacity(names.len());
    let mut right = Vec::with_capacity(names.len());
    for (row, name) in names.iter().enumerate() {
        match name.as_deref().and_then(|n| by_name.get(n)) {
            Some(positions) => {
                for &pos in positions {
                    left.push(row);
                    right.push(Some(pos));
                }
            }
            None => {
                left.push(row);
                right.push(None);
            }
        }
    }
    if left.len() > names.len() {
        warn!(
            "adata.var index is not unique; joining `{}` repeated {} rows",
            column,
            left.len() - names.len()
        );
    }

    let mut out = df.take_rows(&left)?;
    out.push_column(column, values.take_optional(&right))?;
    Ok(out)
}

/// Inner join of a (feature × group) pct table on (name, group).
fn merge_pct(df: DataFrame, pts: &DataFrame, groups: &[String], value_name: &str) -> Result<DataFrame> {
    let mut lookup: HashMap<(&str, &str), Vec<f64>> = HashMap::new();
    for group in groups {
        let values = pts
            .column(group)
            .ok_or_else(|| AccessError::missing("pts column", group.as_str()))?
            .to_f64_vec()?;
        for (name, value) in pts.index().iter().zip(values) {
            lookup
                .entry((name.as_str(), group.as_str()))
                .or_default()
                .push(value);
        }
    }

    let names = feature_names(&df)?;
    let row_groups = match df.column("group") {
        Some(Column::Categorical(c)) => c,
        _ => return Err(AccessError::missing("column", "group").into()),
    };

    let mut rows = Vec::new();
    let mut values = Vec::new();
    for (row, name) in names.iter().enumerate() {
        let (Some(name), Some(group)) = (name.as_deref(), row_groups.get(row)) else {
            continue;
        };
        if let Some(matches) = lookup.get(&(name, group)) {
            for &value in matches {
                rows.push(row);
                values.push(value);
            }
        }
    }
    if rows.len() < df.n_rows() {
        debug!(
            "{}: {} rows without a matching entry dropped",
            value_name,
            df.n_rows() - rows.len()
        );
    }

    let mut out = df.take_rows(&rows)?;
    out.push_column(value_name, Column::Float(values))?;
    Ok(out)
}

fn feature_names(df: &DataFrame) -> Result<Vec<Option<String>>> {
    df.column("names")
        .ok_or_else(|| AccessError::missing("column", "names"))?
        .labels()
}
