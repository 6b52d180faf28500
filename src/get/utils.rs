use anyhow::Result;
use log::trace;
use single_utilities::traits::FloatOps;

use crate::data::ArrayElem;

/// Positions that sort `values` ascending (stable).
pub fn argsort(values: &[usize]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by_key(|&i| values[i]);
    order
}

/// Gather columns `positions` (in that order) from `elem`.
///
/// Backed stores are read in ascending position order and the result is permuted back
/// afterwards.
pub(crate) fn take_columns<T: FloatOps>(
    elem: &ArrayElem<T>,
    positions: &[usize],
    backed: bool,
) -> Result<ArrayElem<T>> {
    if !backed {
        return elem.select_columns(positions);
    }
    let order = argsort(positions);
    let sorted: Vec<usize> = order.iter().map(|&o| positions[o]).collect();
    trace!("reading {} backed columns in sorted order", sorted.len());
    elem.select_columns(&sorted)?
        .select_columns(&argsort(&order))
}

/// Row counterpart of [`take_columns`].
pub(crate) fn take_rows<T: FloatOps>(
    elem: &ArrayElem<T>,
    positions: &[usize],
    backed: bool,
) -> Result<ArrayElem<T>> {
    if !backed {
        return elem.select_rows(positions);
    }
    let order = argsort(positions);
    let sorted: Vec<usize> = order.iter().map(|&o| positions[o]).collect();
    trace!("reading {} backed rows in sorted order", sorted.len());
    elem.select_rows(&sorted)?.select_rows(&argsort(&order))
}
