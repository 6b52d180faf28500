//! Tabular views of an [`AnnData`] for plotting, summaries and export.
//!
//! - [`obs_df`]: one row per observation, columns drawn from `obs` and from feature values
//! - [`var_df`]: one row per feature, columns drawn from `var` and from observation values
//! - [`rank_genes_groups_df`](crate::rank::rank_genes_groups_df): ranked marker genes in
//!   long format
//! - [`get_obs_rep`] / [`set_obs_rep`]: read or replace the array selected by an [`ObsRep`]
//!
//! ```
//! use ndarray::array;
//! use single_accessors::data::{AnnData, ArrayElem, Column, DataFrame};
//! use single_accessors::get::{AnnDataGet, ObsDfOptions};
//!
//! let obs = DataFrame::new(["c1", "c2"])
//!     .with_column("cluster", Column::from_strs(&["x", "y"]))
//!     .unwrap();
//! let var = DataFrame::new(["G1", "G2", "G3"]);
//! let x = ArrayElem::Dense(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
//! let adata = AnnData::new(x, obs, var).unwrap();
//!
//! let df = adata
//!     .obs_df(&["cluster", "G2", "G1"], &[], &ObsDfOptions::default())
//!     .unwrap();
//! assert_eq!(df.column_names(), ["cluster", "G2", "G1"]);
//! assert_eq!(df.column("G2"), Some(&Column::Float(vec![2.0, 5.0])));
//! ```

use anyhow::Result;
use single_utilities::traits::FloatOps;

use crate::data::{AnnData, DataFrame};
use crate::rank::{GroupSelection, RankGenesGroupsDfOptions, rank_genes_groups_df};

pub mod rep;
mod resolve;
mod table;
pub mod utils;

pub use rep::{ObsRep, RepSelector, get_obs_rep, set_obs_rep};
pub use table::{ObsDfOptions, VarDfOptions, obs_df, var_df};

/// Accessor methods on [`AnnData`], delegating to the free functions of this module.
pub trait AnnDataGet<T>
where
    T: FloatOps,
{
    fn obs_df(&self, keys: &[&str], obsm_keys: &[(&str, usize)], options: &ObsDfOptions) -> Result<DataFrame>;

    fn var_df(&self, keys: &[&str], varm_keys: &[(&str, usize)], options: &VarDfOptions) -> Result<DataFrame>;

    fn rank_genes_groups_df(
        &self,
        group: impl Into<GroupSelection>,
        options: &RankGenesGroupsDfOptions,
    ) -> Result<DataFrame>;
}

impl<T> AnnDataGet<T> for AnnData<T>
where
    T: FloatOps,
{
    fn obs_df(&self, keys: &[&str], obsm_keys: &[(&str, usize)], options: &ObsDfOptions) -> Result<DataFrame> {
        obs_df(self, keys, obsm_keys, options)
    }

    fn var_df(&self, keys: &[&str], varm_keys: &[(&str, usize)], options: &VarDfOptions) -> Result<DataFrame> {
        var_df(self, keys, varm_keys, options)
    }

    fn rank_genes_groups_df(
        &self,
        group: impl Into<GroupSelection>,
        options: &RankGenesGroupsDfOptions,
    ) -> Result<DataFrame> {
        rank_genes_groups_df(self, group, options)
    }
}
