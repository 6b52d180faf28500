//! Array-like elements stored in an [`AnnData`](crate::data::AnnData).
//!
//! Every representation (the primary matrix, layers, the raw matrix, obsm/varm/obsp
//! blocks) is one of three shapes: a dense `ndarray` block, a compressed sparse
//! block from `nalgebra-sparse`, or a labeled [`DataFrame`]. All of them can be
//! subset along either axis and densified into `Array2<f64>`.

use anyhow::{Result, anyhow};
use nalgebra_sparse::{CscMatrix, CsrMatrix};
use ndarray::{Array2, Axis};
use single_utilities::traits::FloatOps;

use crate::data::frame::{Column, DataFrame};
use crate::error::AccessError;

#[derive(Debug, Clone)]
pub enum SparseArray<T> {
    Csr(CsrMatrix<T>),
    Csc(CscMatrix<T>),
}

#[derive(Debug, Clone)]
pub enum ArrayElem<T> {
    Dense(Array2<T>),
    Sparse(SparseArray<T>),
    Frame(DataFrame),
}

impl<T> From<Array2<T>> for ArrayElem<T> {
    fn from(value: Array2<T>) -> Self {
        ArrayElem::Dense(value)
    }
}

impl<T> From<CsrMatrix<T>> for ArrayElem<T> {
    fn from(value: CsrMatrix<T>) -> Self {
        ArrayElem::Sparse(SparseArray::Csr(value))
    }
}

impl<T> From<CscMatrix<T>> for ArrayElem<T> {
    fn from(value: CscMatrix<T>) -> Self {
        ArrayElem::Sparse(SparseArray::Csc(value))
    }
}

impl<T> From<DataFrame> for ArrayElem<T> {
    fn from(value: DataFrame) -> Self {
        ArrayElem::Frame(value)
    }
}

#[inline]
fn as_f64<T: FloatOps>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

fn check_bounds(idx: &[usize], len: usize, axis: &'static str) -> Result<()> {
    match idx.iter().find(|&&i| i >= len) {
        Some(&index) => Err(AccessError::IndexOutOfBounds { axis, index, len }.into()),
        None => Ok(()),
    }
}

impl<T> ArrayElem<T>
where
    T: FloatOps,
{
    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        match self {
            ArrayElem::Dense(a) => a.dim(),
            ArrayElem::Sparse(SparseArray::Csr(m)) => (m.nrows(), m.ncols()),
            ArrayElem::Sparse(SparseArray::Csc(m)) => (m.nrows(), m.ncols()),
            ArrayElem::Frame(df) => (df.n_rows(), df.n_cols()),
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, ArrayElem::Sparse(_))
    }

    /// Subset of columns in the given order. Sparse input stays sparse.
    pub fn select_columns(&self, idx: &[usize]) -> Result<ArrayElem<T>> {
        check_bounds(idx, self.shape().1, "columns")?;
        Ok(match self {
            ArrayElem::Dense(a) => ArrayElem::Dense(a.select(Axis(1), idx)),
            ArrayElem::Sparse(SparseArray::Csr(m)) => csr_select_columns(m, idx)?.into(),
            ArrayElem::Sparse(SparseArray::Csc(m)) => csc_select_columns(m, idx)?.into(),
            ArrayElem::Frame(df) => ArrayElem::Frame(df.select_positions(idx)?),
        })
    }

    /// Subset of rows in the given order. Sparse input stays sparse.
    pub fn select_rows(&self, idx: &[usize]) -> Result<ArrayElem<T>> {
        check_bounds(idx, self.shape().0, "rows")?;
        Ok(match self {
            ArrayElem::Dense(a) => ArrayElem::Dense(a.select(Axis(0), idx)),
            ArrayElem::Sparse(SparseArray::Csr(m)) => csr_select_rows(m, idx)?.into(),
            ArrayElem::Sparse(SparseArray::Csc(m)) => csc_select_rows(m, idx)?.into(),
            ArrayElem::Frame(df) => ArrayElem::Frame(df.take_rows(idx)?),
        })
    }

    /// Dense `f64` copy of the element. Tables must be all numeric.
    pub fn densify(&self) -> Result<Array2<f64>> {
        match self {
            ArrayElem::Dense(a) => Ok(a.mapv(as_f64)),
            ArrayElem::Sparse(SparseArray::Csr(m)) => {
                let mut out = Array2::zeros((m.nrows(), m.ncols()));
                for (i, j, v) in m.triplet_iter() {
                    out[[i, j]] = as_f64(*v);
                }
                Ok(out)
            }
            ArrayElem::Sparse(SparseArray::Csc(m)) => {
                let mut out = Array2::zeros((m.nrows(), m.ncols()));
                for (i, j, v) in m.triplet_iter() {
                    out[[i, j]] = as_f64(*v);
                }
                Ok(out)
            }
            ArrayElem::Frame(df) => {
                let mut out = Array2::zeros((df.n_rows(), df.n_cols()));
                for (j, (name, column)) in df.columns().enumerate() {
                    let values = column
                        .to_f64_vec()
                        .map_err(|e| anyhow!("column `{}`: {}", name, e))?;
                    for (i, v) in values.into_iter().enumerate() {
                        out[[i, j]] = v;
                    }
                }
                Ok(out)
            }
        }
    }

    /// One column as output values.
    ///
    /// Matrix blocks are addressed by position. Tables are addressed by column label, so
    /// index `3` selects the column named `"3"`.
    pub fn column_values(&self, idx: usize) -> Result<Column> {
        match self {
            ArrayElem::Frame(df) => df
                .column(&idx.to_string())
                .cloned()
                .ok_or_else(|| AccessError::missing("column label", idx.to_string()).into()),
            ArrayElem::Dense(a) => {
                check_bounds(&[idx], a.ncols(), "columns")?;
                Ok(Column::Float(a.column(idx).iter().map(|&v| as_f64(v)).collect()))
            }
            ArrayElem::Sparse(_) => {
                let dense = self.select_columns(&[idx])?.densify()?;
                Ok(Column::Float(dense.column(0).to_vec()))
            }
        }
    }
}

fn csr_select_columns<T: FloatOps>(m: &CsrMatrix<T>, idx: &[usize]) -> Result<CsrMatrix<T>> {
    let mut targets: Vec<Vec<usize>> = vec![Vec::new(); m.ncols()];
    for (new, &old) in idx.iter().enumerate() {
        targets[old].push(new);
    }

    let mut offsets = Vec::with_capacity(m.nrows() + 1);
    let mut indices = Vec::new();
    let mut values = Vec::new();
    let mut entries: Vec<(usize, T)> = Vec::new();
    offsets.push(0);
    for row in m.row_iter() {
        entries.clear();
        for (&col, &v) in row.col_indices().iter().zip(row.values()) {
            entries.extend(targets[col].iter().map(|&new| (new, v)));
        }
        entries.sort_unstable_by_key(|&(col, _)| col);
        for &(col, v) in &entries {
            indices.push(col);
            values.push(v);
        }
        offsets.push(indices.len());
    }

    CsrMatrix::try_from_csr_data(m.nrows(), idx.len(), offsets, indices, values)
        .map_err(|e| anyhow!("failed to subset CSR columns: {}", e))
}

fn csr_select_rows<T: FloatOps>(m: &CsrMatrix<T>, idx: &[usize]) -> Result<CsrMatrix<T>> {
    let mut offsets = Vec::with_capacity(idx.len() + 1);
    let mut indices = Vec::new();
    let mut values = Vec::new();
    offsets.push(0);
    for &i in idx {
        let row = m.row(i);
        indices.extend_from_slice(row.col_indices());
        values.extend_from_slice(row.values());
        offsets.push(indices.len());
    }

    CsrMatrix::try_from_csr_data(idx.len(), m.ncols(), offsets, indices, values)
        .map_err(|e| anyhow!("failed to subset CSR rows: {}", e))
}

fn csc_select_columns<T: FloatOps>(m: &CscMatrix<T>, idx: &[usize]) -> Result<CscMatrix<T>> {
    let mut offsets = Vec::with_capacity(idx.len() + 1);
    let mut indices = Vec::new();
    let mut values = Vec::new();
    offsets.push(0);
    for &j in idx {
        let col = m.col(j);
        indices.extend_from_slice(col.row_indices());
        values.extend_from_slice(col.values());
        offsets.push(indices.len());
    }

    CscMatrix::try_from_csc_data(m.nrows(), idx.len(), offsets, indices, values)
        .map_err(|e| anyhow!("failed to subset CSC columns: {}", e))
}

fn csc_select_rows<T: FloatOps>(m: &CscMatrix<T>, idx: &[usize]) -> Result<CscMatrix<T>> {
    let mut targets: Vec<Vec<usize>> = vec![Vec::new(); m.nrows()];
    for (new, &old) in idx.iter().enumerate() {
        targets[old].push(new);
    }

    let mut offsets = Vec::with_capacity(m.ncols() + 1);
    let mut indices = Vec::new();
    let mut values = Vec::new();
    let mut entries: Vec<(usize, T)> = Vec::new();
    offsets.push(0);
    for col in m.col_iter() {
        entries.clear();
        for (&row, &v) in col.row_indices().iter().zip(col.values()) {
            entries.extend(targets[row].iter().map(|&new| (new, v)));
        }
        entries.sort_unstable_by_key(|&(row, _)| row);
        for &(row, v) in &entries {
            indices.push(row);
            values.push(v);
        }
        offsets.push(indices.len());
    }

    CscMatrix::try_from_csc_data(idx.len(), m.ncols(), offsets, indices, values)
        .map_err(|e| anyhow!("failed to subset CSC rows: {}", e))
}
