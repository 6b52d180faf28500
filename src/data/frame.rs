//! Labeled column tables for annotations and accessor output.
//!
//! A [`DataFrame`] is a list of named [`Column`]s sharing one string row index. Column
//! names are allowed to repeat, which is what lets accessor output mirror a request
//! that names the same key twice.

use std::collections::HashSet;

use anyhow::Result;
use num_traits::ToPrimitive;

use crate::error::AccessError;

/// Categorical column: codes into an ordered list of categories, `None` marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorical {
    categories: Vec<String>,
    codes: Vec<Option<u32>>,
}

impl Categorical {
    pub fn new(categories: Vec<String>, codes: Vec<Option<u32>>) -> Result<Self> {
        if let Some(bad) = codes
            .iter()
            .flatten()
            .find(|&&c| c as usize >= categories.len())
        {
            return Err(AccessError::InvalidData(format!(
                "category code {} out of range for {} categories",
                bad,
                categories.len()
            ))
            .into());
        }
        Ok(Categorical { categories, codes })
    }

    /// Build from raw values with sorted unique categories.
    pub fn from_values<S: AsRef<str>>(values: &[S]) -> Self {
        let mut categories: Vec<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
        categories.sort();
        categories.dedup();
        let codes = values
            .iter()
            .map(|v| {
                categories
                    .binary_search_by(|c| c.as_str().cmp(v.as_ref()))
                    .ok()
                    .map(|i| i as u32)
            })
            .collect();
        Categorical { categories, codes }
    }

    /// Build with a fixed category order. Values outside the categories become missing.
    pub fn with_categories<S: AsRef<str>>(values: &[S], categories: Vec<String>) -> Self {
        let codes = values
            .iter()
            .map(|v| {
                categories
                    .iter()
                    .position(|c| c == v.as_ref())
                    .map(|i| i as u32)
            })
            .collect();
        Categorical { categories, codes }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn codes(&self) -> &[Option<u32>] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&str> {
        self.codes
            .get(i)
            .copied()
            .flatten()
            .map(|c| self.categories[c as usize].as_str())
    }

    fn with_codes(&self, codes: Vec<Option<u32>>) -> Self {
        Categorical {
            categories: self.categories.clone(),
            codes,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Floating point values, NaN marks a missing value
    Float(Vec<f64>),
    Int(Vec<i64>),
    Bool(Vec<bool>),
    Str(Vec<Option<String>>),
    Categorical(Categorical),
}

impl Column {
    pub fn from_strs<S: AsRef<str>>(values: &[S]) -> Self {
        Column::Str(values.iter().map(|v| Some(v.as_ref().to_string())).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Str(v) => v.len(),
            Column::Categorical(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> &'static str {
        match self {
            Column::Float(_) => "float",
            Column::Int(_) => "int",
            Column::Bool(_) => "bool",
            Column::Str(_) => "str",
            Column::Categorical(_) => "category",
        }
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            Column::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric view of the column; string-like columns are rejected.
    pub fn to_f64_vec(&self) -> Result<Vec<f64>> {
        match self {
            Column::Float(v) => Ok(v.clone()),
            Column::Int(v) => Ok(v.iter().map(|x| x.to_f64().unwrap_or(f64::NAN)).collect()),
            Column::Bool(v) => Ok(v.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect()),
            other => Err(AccessError::InvalidData(format!(
                "cannot read a {} column as numeric values",
                other.dtype()
            ))
            .into()),
        }
    }

    /// Per-row labels for string-like columns (strings, categories, integers).
    pub fn labels(&self) -> Result<Vec<Option<String>>> {
        match self {
            Column::Str(v) => Ok(v.clone()),
            Column::Categorical(c) => Ok((0..c.len()).map(|i| c.get(i).map(str::to_string)).collect()),
            Column::Int(v) => Ok(v.iter().map(|x| Some(x.to_string())).collect()),
            other => Err(AccessError::InvalidData(format!(
                "a {} column cannot be used as labels",
                other.dtype()
            ))
            .into()),
        }
    }

    pub fn take(&self, idx: &[usize]) -> Column {
        match self {
            Column::Float(v) => Column::Float(idx.iter().map(|&i| v[i]).collect()),
            Column::Int(v) => Column::Int(idx.iter().map(|&i| v[i]).collect()),
            Column::Bool(v) => Column::Bool(idx.iter().map(|&i| v[i]).collect()),
            Column::Str(v) => Column::Str(idx.iter().map(|&i| v[i].clone()).collect()),
            Column::Categorical(c) => {
                Column::Categorical(c.with_codes(idx.iter().map(|&i| c.codes[i]).collect()))
            }
        }
    }

    /// Like [`Column::take`], but `None` positions produce missing values.
    ///
    /// Integer columns become floats and bool columns become strings so that a
    /// missing value can be represented.
    pub fn take_optional(&self, idx: &[Option<usize>]) -> Column {
        match self {
            Column::Float(v) => Column::Float(idx.iter().map(|i| i.map_or(f64::NAN, |i| v[i])).collect()),
            Column::Int(v) => Column::Float(
                idx.iter()
                    .map(|i| i.and_then(|i| v[i].to_f64()).unwrap_or(f64::NAN))
                    .collect(),
            ),
            Column::Bool(v) => Column::Str(idx.iter().map(|i| i.map(|i| v[i].to_string())).collect()),
            Column::Str(v) => Column::Str(idx.iter().map(|i| i.and_then(|i| v[i].clone())).collect()),
            Column::Categorical(c) => Column::Categorical(
                c.with_codes(idx.iter().map(|i| i.and_then(|i| c.codes[i])).collect()),
            ),
        }
    }

    pub fn filter(&self, mask: &[bool]) -> Column {
        let idx: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        self.take(&idx)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    index: Vec<String>,
    names: Vec<String>,
    columns: Vec<Column>,
}

impl DataFrame {
    /// Empty table (no columns) over the given row labels.
    pub fn new<S: Into<String>>(index: impl IntoIterator<Item = S>) -> Self {
        DataFrame {
            index: index.into_iter().map(Into::into).collect(),
            names: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        self.push_column(name, column)?;
        Ok(self)
    }

    /// Append a column, even if a column of that name already exists.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if column.len() != self.n_rows() {
            return Err(AccessError::ShapeMismatch(format!(
                "column `{}` has {} values, table has {} rows",
                name,
                column.len(),
                self.n_rows()
            ))
            .into());
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Replace the first column called `name`, or append it.
    pub fn set_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        match self.position(&name) {
            Some(pos) => {
                if column.len() != self.n_rows() {
                    return Err(AccessError::ShapeMismatch(format!(
                        "column `{}` has {} values, table has {} rows",
                        name,
                        column.len(),
                        self.n_rows()
                    ))
                    .into());
                }
                self.columns[pos] = column;
                Ok(())
            }
            None => self.push_column(name, column),
        }
    }

    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let pos = self.position(name)?;
        self.names.remove(pos);
        Some(self.columns.remove(pos))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).map(|pos| &self.columns[pos])
    }

    pub fn column_at(&self, pos: usize) -> Option<(&str, &Column)> {
        self.columns
            .get(pos)
            .map(|c| (self.names[pos].as_str(), c))
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    /// Column names that occur more than once, each reported once.
    pub fn duplicated_columns(&self) -> Vec<String> {
        duplicated_labels(&self.names)
    }

    /// Columns in the order given by `keys`; repeated keys repeat the column.
    pub fn select<S: AsRef<str>>(&self, keys: &[S]) -> Result<DataFrame> {
        let mut out = DataFrame::new(self.index.iter().cloned());
        for key in keys {
            let key = key.as_ref();
            let column = self
                .column(key)
                .ok_or_else(|| AccessError::missing("column", key))?;
            out.names.push(key.to_string());
            out.columns.push(column.clone());
        }
        Ok(out)
    }

    /// Columns by position, in the given order.
    pub fn select_positions(&self, positions: &[usize]) -> Result<DataFrame> {
        let mut out = DataFrame::new(self.index.iter().cloned());
        for &pos in positions {
            let (name, column) = self.column_at(pos).ok_or(AccessError::IndexOutOfBounds {
                axis: "columns",
                index: pos,
                len: self.n_cols(),
            })?;
            out.names.push(name.to_string());
            out.columns.push(column.clone());
        }
        Ok(out)
    }

    pub fn take_rows(&self, idx: &[usize]) -> Result<DataFrame> {
        if let Some(&bad) = idx.iter().find(|&&i| i >= self.n_rows()) {
            return Err(AccessError::IndexOutOfBounds {
                axis: "rows",
                index: bad,
                len: self.n_rows(),
            }
            .into());
        }
        Ok(DataFrame {
            index: idx.iter().map(|&i| self.index[i].clone()).collect(),
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(idx)).collect(),
        })
    }

    pub fn filter_rows(&self, mask: &[bool]) -> Result<DataFrame> {
        if mask.len() != self.n_rows() {
            return Err(AccessError::ShapeMismatch(format!(
                "row mask has {} entries, table has {} rows",
                mask.len(),
                self.n_rows()
            ))
            .into());
        }
        let idx: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        self.take_rows(&idx)
    }

    /// Replace the row labels with `"0"..n`.
    pub fn reset_index(&mut self) {
        self.index = (0..self.n_rows()).map(|i| i.to_string()).collect();
    }
}

/// Labels occurring more than once, in order of their first repetition.
pub(crate) fn duplicated_labels(labels: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut dups = Vec::new();
    for label in labels {
        if !seen.insert(label.as_str()) && reported.insert(label.as_str()) {
            dups.push(label.clone());
        }
    }
    dups
}
