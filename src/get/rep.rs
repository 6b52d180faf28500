//! Selection of the observation-aligned array an operation should read or write.

use std::fmt;

use anyhow::Result;
use single_utilities::traits::FloatOps;

use crate::data::{AnnData, ArrayElem};
use crate::error::AccessError;

/// One observation-aligned representation of an [`AnnData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObsRep<'a> {
    /// The primary matrix `X`
    X,
    Layer(&'a str),
    /// `raw.X`
    Raw,
    Obsm(&'a str),
    Obsp(&'a str),
}

impl fmt::Display for ObsRep<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObsRep::X => write!(f, "X"),
            ObsRep::Layer(name) => write!(f, "layer={name}"),
            ObsRep::Raw => write!(f, "use_raw=true"),
            ObsRep::Obsm(name) => write!(f, "obsm={name}"),
            ObsRep::Obsp(name) => write!(f, "obsp={name}"),
        }
    }
}

/// Keyword-style representation choice where at most one field may be set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepSelector {
    pub use_raw: bool,
    pub layer: Option<String>,
    pub obsm: Option<String>,
    pub obsp: Option<String>,
}

impl RepSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_use_raw(mut self, use_raw: bool) -> Self {
        self.use_raw = use_raw;
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    pub fn with_obsm(mut self, key: impl Into<String>) -> Self {
        self.obsm = Some(key.into());
        self
    }

    pub fn with_obsp(mut self, key: impl Into<String>) -> Self {
        self.obsp = Some(key.into());
        self
    }

    /// The single representation this selector names; `X` if none is set.
    pub fn resolve(&self) -> Result<ObsRep<'_>> {
        let mut chosen = Vec::with_capacity(1);
        if self.use_raw {
            chosen.push(ObsRep::Raw);
        }
        if let Some(layer) = &self.layer {
            chosen.push(ObsRep::Layer(layer));
        }
        if let Some(key) = &self.obsm {
            chosen.push(ObsRep::Obsm(key));
        }
        if let Some(key) = &self.obsp {
            chosen.push(ObsRep::Obsp(key));
        }

        match chosen.as_slice() {
            [] => Ok(ObsRep::X),
            [one] => Ok(*one),
            many => {
                let names: Vec<String> = many.iter().map(ToString::to_string).collect();
                Err(AccessError::ConflictingRepresentation(format!(
                    "only one of use_raw, layer, obsm, obsp may be given, got {}",
                    names.join(", ")
                ))
                .into())
            }
        }
    }
}

/// Borrow the array selected by `rep`.
pub fn get_obs_rep<'a, T>(adata: &'a AnnData<T>, rep: ObsRep<'_>) -> Result<&'a ArrayElem<T>>
where
    T: FloatOps,
{
    match rep {
        ObsRep::X => Ok(adata.x()),
        ObsRep::Layer(name) => adata.layer(name),
        ObsRep::Raw => adata
            .raw()
            .map(|raw| raw.x())
            .ok_or_else(|| AccessError::missing("raw", "adata.raw").into()),
        ObsRep::Obsm(key) => adata.obsm(key),
        ObsRep::Obsp(key) => adata.obsp(key),
    }
}

/// Replace the array selected by `rep`. Shape checks are left to the container.
pub fn set_obs_rep<T>(adata: &mut AnnData<T>, value: ArrayElem<T>, rep: ObsRep<'_>) -> Result<()>
where
    T: FloatOps,
{
    match rep {
        ObsRep::X => adata.set_x(value),
        ObsRep::Layer(name) => adata.set_layer(name, value),
        ObsRep::Raw => adata.set_raw_x(value),
        ObsRep::Obsm(key) => adata.set_obsm(key, value),
        ObsRep::Obsp(key) => adata.set_obsp(key, value),
    }
}
