//! In-memory annotated data matrix.
//!
//! [`AnnData`] pairs a primary `obs × var` matrix with observation and feature
//! annotation tables, alternate same-shape layers, per-axis auxiliary blocks
//! (`obsm`, `varm`, `obsp`), an optional raw matrix with its own feature set, and an
//! unstructured `uns` map holding analysis results.
//!
//! The container only enforces shapes. Duplicate observation or feature names are
//! accepted here and rejected by the accessors that need them unique.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use single_utilities::traits::FloatOps;

use crate::error::AccessError;
use crate::rank::RankGenesGroups;

pub mod elem;
pub mod frame;

pub use elem::{ArrayElem, SparseArray};
pub use frame::{Categorical, Column, DataFrame};

/// Values stored in `uns`.
#[derive(Debug, Clone, PartialEq)]
pub enum UnsElem {
    RankGenesGroups(RankGenesGroups),
    Text(String),
}

impl From<RankGenesGroups> for UnsElem {
    fn from(value: RankGenesGroups) -> Self {
        UnsElem::RankGenesGroups(value)
    }
}

/// Secondary matrix kept alongside the primary one, with its own features.
#[derive(Debug, Clone)]
pub struct Raw<T> {
    x: ArrayElem<T>,
    var: DataFrame,
}

impl<T> Raw<T>
where
    T: FloatOps,
{
    pub fn new(x: ArrayElem<T>, var: DataFrame) -> Result<Self> {
        if x.shape().1 != var.n_rows() {
            return Err(AccessError::ShapeMismatch(format!(
                "raw matrix has {} columns but raw var has {} rows",
                x.shape().1,
                var.n_rows()
            ))
            .into());
        }
        Ok(Raw { x, var })
    }

    pub fn x(&self) -> &ArrayElem<T> {
        &self.x
    }

    pub fn var(&self) -> &DataFrame {
        &self.var
    }

    pub fn var_names(&self) -> &[String] {
        self.var.index()
    }

    pub fn n_vars(&self) -> usize {
        self.var.n_rows()
    }
}

#[derive(Debug, Clone)]
pub struct AnnData<T> {
    x: ArrayElem<T>,
    obs: DataFrame,
    var: DataFrame,
    layers: HashMap<String, ArrayElem<T>>,
    obsm: HashMap<String, ArrayElem<T>>,
    varm: HashMap<String, ArrayElem<T>>,
    obsp: HashMap<String, ArrayElem<T>>,
    uns: HashMap<String, UnsElem>,
    raw: Option<Raw<T>>,
    filename: Option<PathBuf>,
}

impl<T> AnnData<T>
where
    T: FloatOps,
{
    /// Build from the primary matrix and its annotations; `obs`/`var` row labels are
    /// the observation and feature names.
    pub fn new(x: ArrayElem<T>, obs: DataFrame, var: DataFrame) -> Result<Self> {
        let (n_obs, n_vars) = x.shape();
        if n_obs != obs.n_rows() || n_vars != var.n_rows() {
            return Err(AccessError::ShapeMismatch(format!(
                "X has shape ({}, {}) but obs has {} rows and var has {} rows",
                n_obs,
                n_vars,
                obs.n_rows(),
                var.n_rows()
            ))
            .into());
        }
        Ok(AnnData {
            x,
            obs,
            var,
            layers: HashMap::new(),
            obsm: HashMap::new(),
            varm: HashMap::new(),
            obsp: HashMap::new(),
            uns: HashMap::new(),
            raw: None,
            filename: None,
        })
    }

    pub fn with_layer(mut self, name: impl Into<String>, layer: impl Into<ArrayElem<T>>) -> Result<Self> {
        self.set_layer(name, layer.into())?;
        Ok(self)
    }

    pub fn with_obsm(mut self, name: impl Into<String>, block: impl Into<ArrayElem<T>>) -> Result<Self> {
        self.set_obsm(name, block.into())?;
        Ok(self)
    }

    pub fn with_varm(mut self, name: impl Into<String>, block: impl Into<ArrayElem<T>>) -> Result<Self> {
        self.set_varm(name, block.into())?;
        Ok(self)
    }

    pub fn with_obsp(mut self, name: impl Into<String>, block: impl Into<ArrayElem<T>>) -> Result<Self> {
        self.set_obsp(name, block.into())?;
        Ok(self)
    }

    pub fn with_raw(mut self, raw: Raw<T>) -> Result<Self> {
        if raw.x.shape().0 != self.n_obs() {
            return Err(AccessError::ShapeMismatch(format!(
                "raw matrix has {} rows, expected {}",
                raw.x.shape().0,
                self.n_obs()
            ))
            .into());
        }
        self.raw = Some(raw);
        Ok(self)
    }

    pub fn with_uns(mut self, key: impl Into<String>, value: impl Into<UnsElem>) -> Self {
        self.uns.insert(key.into(), value.into());
        self
    }

    /// Mark the matrix as backed by an on-disk file.
    pub fn backed_by(mut self, path: impl AsRef<Path>) -> Self {
        self.filename = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn n_obs(&self) -> usize {
        self.obs.n_rows()
    }

    pub fn n_vars(&self) -> usize {
        self.var.n_rows()
    }

    pub fn obs_names(&self) -> &[String] {
        self.obs.index()
    }

    pub fn var_names(&self) -> &[String] {
        self.var.index()
    }

    pub fn x(&self) -> &ArrayElem<T> {
        &self.x
    }

    pub fn obs(&self) -> &DataFrame {
        &self.obs
    }

    pub fn var(&self) -> &DataFrame {
        &self.var
    }

    pub fn layer(&self, name: &str) -> Result<&ArrayElem<T>> {
        self.layers
            .get(name)
            .ok_or_else(|| AccessError::missing("layer", name).into())
    }

    pub fn obsm(&self, name: &str) -> Result<&ArrayElem<T>> {
        self.obsm
            .get(name)
            .ok_or_else(|| AccessError::missing("obsm", name).into())
    }

    pub fn varm(&self, name: &str) -> Result<&ArrayElem<T>> {
        self.varm
            .get(name)
            .ok_or_else(|| AccessError::missing("varm", name).into())
    }

    pub fn obsp(&self, name: &str) -> Result<&ArrayElem<T>> {
        self.obsp
            .get(name)
            .ok_or_else(|| AccessError::missing("obsp", name).into())
    }

    pub fn raw(&self) -> Option<&Raw<T>> {
        self.raw.as_ref()
    }

    pub fn uns(&self, key: &str) -> Option<&UnsElem> {
        self.uns.get(key)
    }

    pub fn is_backed(&self) -> bool {
        self.filename.is_some()
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_x(&mut self, x: ArrayElem<T>) -> Result<()> {
        self.expect_shape("X", &x, (self.n_obs(), self.n_vars()))?;
        self.x = x;
        Ok(())
    }

    pub fn set_layer(&mut self, name: impl Into<String>, layer: ArrayElem<T>) -> Result<()> {
        let name = name.into();
        self.expect_shape(&format!("layer `{name}`"), &layer, (self.n_obs(), self.n_vars()))?;
        self.layers.insert(name, layer);
        Ok(())
    }

    pub fn set_obsm(&mut self, name: impl Into<String>, block: ArrayElem<T>) -> Result<()> {
        let name = name.into();
        self.expect_rows(&format!("obsm `{name}`"), &block, self.n_obs())?;
        self.obsm.insert(name, block);
        Ok(())
    }

    pub fn set_varm(&mut self, name: impl Into<String>, block: ArrayElem<T>) -> Result<()> {
        let name = name.into();
        self.expect_rows(&format!("varm `{name}`"), &block, self.n_vars())?;
        self.varm.insert(name, block);
        Ok(())
    }

    pub fn set_obsp(&mut self, name: impl Into<String>, block: ArrayElem<T>) -> Result<()> {
        let name = name.into();
        self.expect_shape(&format!("obsp `{name}`"), &block, (self.n_obs(), self.n_obs()))?;
        self.obsp.insert(name, block);
        Ok(())
    }

    /// Replace the raw matrix, keeping its feature annotation.
    pub fn set_raw_x(&mut self, x: ArrayElem<T>) -> Result<()> {
        let n_obs = self.n_obs();
        let raw = self
            .raw
            .as_mut()
            .ok_or_else(|| AccessError::missing("raw", "adata.raw"))?;
        let expected = (n_obs, raw.n_vars());
        if x.shape() != expected {
            return Err(AccessError::ShapeMismatch(format!(
                "raw X has shape {:?}, expected {:?}",
                x.shape(),
                expected
            ))
            .into());
        }
        raw.x = x;
        Ok(())
    }

    fn expect_shape(&self, what: &str, elem: &ArrayElem<T>, expected: (usize, usize)) -> Result<()> {
        if elem.shape() != expected {
            return Err(AccessError::ShapeMismatch(format!(
                "{} has shape {:?}, expected {:?}",
                what,
                elem.shape(),
                expected
            ))
            .into());
        }
        Ok(())
    }

    fn expect_rows(&self, what: &str, elem: &ArrayElem<T>, expected: usize) -> Result<()> {
        if elem.shape().0 != expected {
            return Err(AccessError::ShapeMismatch(format!(
                "{} has {} rows, expected {}",
                what,
                elem.shape().0,
                expected
            ))
            .into());
        }
        Ok(())
    }
}
