//! Ranked marker gene results and their long-format view.
//!
//! A [`RankGenesGroups`] holds, for every group of a grouping, the features ranked by a
//! differential expression test together with their scores, log2 fold changes and raw
//! and adjusted p-values. All groups rank the same number of features (the results come
//! from one structured array). Optional `pts` / `pts_rest` tables carry the fraction of
//! cells expressing each feature inside the group and in the reference.
//!
//! [`rank_genes_groups_df`] turns such a store into one row per (group, feature).

use std::collections::HashSet;

use anyhow::Result;

use crate::data::DataFrame;
use crate::error::AccessError;

mod reshape;

pub use reshape::{DEFAULT_KEY, GroupSelection, RankGenesGroupsDfOptions, rank_genes_groups_df};

/// Per-group result columns, parallel and ordered by rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedGroup {
    pub names: Vec<String>,
    pub scores: Vec<f64>,
    pub logfoldchanges: Vec<f64>,
    pub pvals: Vec<f64>,
    pub pvals_adj: Vec<f64>,
}

impl RankedGroup {
    pub fn new(
        names: Vec<String>,
        scores: Vec<f64>,
        logfoldchanges: Vec<f64>,
        pvals: Vec<f64>,
        pvals_adj: Vec<f64>,
    ) -> Result<Self> {
        let n = names.len();
        let lengths = [scores.len(), logfoldchanges.len(), pvals.len(), pvals_adj.len()];
        if lengths.iter().any(|&l| l != n) {
            return Err(AccessError::ShapeMismatch(format!(
                "ranked columns differ in length: names={}, scores={}, logfoldchanges={}, pvals={}, pvals_adj={}",
                n, lengths[0], lengths[1], lengths[2], lengths[3]
            ))
            .into());
        }
        Ok(RankedGroup {
            names,
            scores,
            logfoldchanges,
            pvals,
            pvals_adj,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankGenesGroups {
    groups: Vec<(String, RankedGroup)>,
    pts: Option<DataFrame>,
    pts_rest: Option<DataFrame>,
}

impl RankGenesGroups {
    /// Groups keep the order given here.
    pub fn new(groups: Vec<(String, RankedGroup)>) -> Result<Self> {
        let mut seen = HashSet::new();
        for (name, _) in &groups {
            if !seen.insert(name.as_str()) {
                return Err(AccessError::InvalidData(format!("group `{name}` is given twice")).into());
            }
        }
        if let Some((_, first)) = groups.first() {
            if let Some((name, group)) = groups.iter().find(|(_, g)| g.len() != first.len()) {
                return Err(AccessError::ShapeMismatch(format!(
                    "group `{}` ranks {} features, expected {}",
                    name,
                    group.len(),
                    first.len()
                ))
                .into());
            }
        }
        Ok(RankGenesGroups {
            groups,
            pts: None,
            pts_rest: None,
        })
    }

    /// Fraction of cells expressing each feature within each group
    /// (rows: features, columns: group labels).
    pub fn with_pts(mut self, pts: DataFrame) -> Self {
        self.pts = Some(pts);
        self
    }

    /// Fraction of cells expressing each feature outside each group.
    pub fn with_pts_rest(mut self, pts_rest: DataFrame) -> Self {
        self.pts_rest = Some(pts_rest);
        self
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn group(&self, name: &str) -> Option<&RankedGroup> {
        self.groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, ranked)| ranked)
    }

    /// Number of ranked features per group.
    pub fn n_ranked(&self) -> usize {
        self.groups.first().map_or(0, |(_, g)| g.len())
    }

    pub fn pts(&self) -> Option<&DataFrame> {
        self.pts.as_ref()
    }

    pub fn pts_rest(&self) -> Option<&DataFrame> {
        self.pts_rest.as_ref()
    }
}
