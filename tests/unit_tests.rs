use approx::assert_abs_diff_eq;
use nalgebra_sparse::{CscMatrix, CsrMatrix};
use ndarray::array;
use single_accessors::AccessError;
use single_accessors::data::{AnnData, ArrayElem, Categorical, Column, DataFrame};
use single_accessors::get::utils::argsort;
use single_accessors::get::{ObsRep, RepSelector, get_obs_rep, set_obs_rep};

fn access_error(err: &anyhow::Error) -> &AccessError {
    err.downcast_ref::<AccessError>()
        .expect("error should carry an AccessError")
}

// rows: [1 0 3 0], [0 5 0 7], [8 0 0 9]
fn csr() -> CsrMatrix<f64> {
    CsrMatrix::try_from_csr_data(
        3,
        4,
        vec![0, 2, 4, 6],
        vec![0, 2, 1, 3, 0, 3],
        vec![1.0, 3.0, 5.0, 7.0, 8.0, 9.0],
    )
    .unwrap()
}

fn csc() -> CscMatrix<f64> {
    CscMatrix::try_from_csc_data(
        3,
        4,
        vec![0, 2, 3, 4, 6],
        vec![0, 2, 1, 0, 1, 2],
        vec![1.0, 8.0, 5.0, 3.0, 7.0, 9.0],
    )
    .unwrap()
}

fn dense() -> ndarray::Array2<f64> {
    array![[1.0, 0.0, 3.0, 0.0], [0.0, 5.0, 0.0, 7.0], [8.0, 0.0, 0.0, 9.0]]
}

#[cfg(test)]
mod frame_tests {
    use super::*;

    #[test]
    fn select_repeats_columns_in_key_order() {
        let df = DataFrame::new(["a", "b"])
            .with_column("x", Column::Float(vec![1.0, 2.0]))
            .unwrap()
            .with_column("y", Column::from_strs(&["u", "v"]))
            .unwrap();

        let out = df.select(&["y", "x", "y"]).unwrap();
        assert_eq!(out.column_names(), ["y", "x", "y"]);
        assert_eq!(out.index(), ["a", "b"]);
        assert_eq!(out.column_at(2).unwrap().1, &Column::from_strs(&["u", "v"]));
    }

    #[test]
    fn select_unknown_column_fails() {
        let df = DataFrame::new(["a"]);
        let err = df.select(&["missing"]).unwrap_err();
        assert!(matches!(access_error(&err), AccessError::MissingElement { .. }));
    }

    #[test]
    fn push_column_checks_length() {
        let mut df = DataFrame::new(["a", "b"]);
        let err = df.push_column("x", Column::Int(vec![1])).unwrap_err();
        assert!(matches!(access_error(&err), AccessError::ShapeMismatch(_)));
    }

    #[test]
    fn set_column_replaces_existing() {
        let mut df = DataFrame::new(["a"])
            .with_column("x", Column::Int(vec![1]))
            .unwrap();
        df.set_column("x", Column::Int(vec![2])).unwrap();
        df.set_column("z", Column::Int(vec![3])).unwrap();
        assert_eq!(df.column_names(), ["x", "z"]);
        assert_eq!(df.column("x"), Some(&Column::Int(vec![2])));
    }

    #[test]
    fn duplicated_columns_reported_once() {
        let df = DataFrame::new(["a"])
            .with_column("x", Column::Int(vec![1]))
            .unwrap()
            .with_column("x", Column::Int(vec![2]))
            .unwrap()
            .with_column("x", Column::Int(vec![3]))
            .unwrap()
            .with_column("y", Column::Int(vec![4]))
            .unwrap();
        assert_eq!(df.duplicated_columns(), vec!["x".to_string()]);
    }

    #[test]
    fn filter_and_reset_index() {
        let mut df = DataFrame::new(["a", "b", "c"])
            .with_column("x", Column::Float(vec![1.0, 2.0, 3.0]))
            .unwrap()
            .filter_rows(&[true, false, true])
            .unwrap();
        assert_eq!(df.index(), ["a", "c"]);
        df.reset_index();
        assert_eq!(df.index(), ["0", "1"]);
        assert_eq!(df.column("x"), Some(&Column::Float(vec![1.0, 3.0])));
    }

    #[test]
    fn take_optional_produces_missing_values() {
        let ints = Column::Int(vec![4, 5]);
        let taken = ints.take_optional(&[Some(1), None]);
        let values = taken.as_f64().unwrap();
        assert_abs_diff_eq!(values[0], 5.0);
        assert!(values[1].is_nan());

        let strs = Column::from_strs(&["p", "q"]);
        assert_eq!(
            strs.take_optional(&[None, Some(0)]),
            Column::Str(vec![None, Some("p".to_string())])
        );
    }

    #[test]
    fn categorical_codes_follow_categories() {
        let cat = Categorical::from_values(&["y", "x", "y"]);
        assert_eq!(cat.categories(), ["x", "y"]);
        assert_eq!(cat.codes(), [Some(1), Some(0), Some(1)]);
        assert_eq!(cat.get(1), Some("x"));

        let fixed = Categorical::with_categories(&["b", "a", "c"], vec!["b".into(), "a".into()]);
        assert_eq!(fixed.codes(), [Some(0), Some(1), None]);
        assert!(Categorical::new(vec!["a".into()], vec![Some(1)]).is_err());
    }

    #[test]
    fn labels_reject_numeric_columns() {
        assert!(Column::Float(vec![1.0]).labels().is_err());
        assert_eq!(
            Column::Int(vec![7]).labels().unwrap(),
            vec![Some("7".to_string())]
        );
    }
}

#[cfg(test)]
mod elem_tests {
    use super::*;

    #[test]
    fn sparse_densify_matches_dense() {
        let expected = dense();
        for elem in [ArrayElem::from(csr()), ArrayElem::from(csc())] {
            assert!(elem.is_sparse());
            assert_eq!(elem.shape(), (3, 4));
            assert_eq!(elem.densify().unwrap(), expected);
        }
    }

    #[test]
    fn select_columns_keeps_requested_order() {
        let idx = [3, 0, 2];
        let expected = ArrayElem::Dense(dense()).select_columns(&idx).unwrap().densify().unwrap();
        assert_eq!(expected, array![[0.0, 1.0, 3.0], [7.0, 0.0, 0.0], [9.0, 8.0, 0.0]]);

        for elem in [ArrayElem::from(csr()), ArrayElem::from(csc())] {
            let subset = elem.select_columns(&idx).unwrap();
            assert!(subset.is_sparse());
            assert_eq!(subset.densify().unwrap(), expected);
        }
    }

    #[test]
    fn select_rows_keeps_requested_order() {
        let idx = [2, 0];
        let expected = array![[8.0, 0.0, 0.0, 9.0], [1.0, 0.0, 3.0, 0.0]];
        for elem in [ArrayElem::Dense(dense()), ArrayElem::from(csr()), ArrayElem::from(csc())] {
            assert_eq!(elem.select_rows(&idx).unwrap().densify().unwrap(), expected);
        }
    }

    #[test]
    fn out_of_bounds_selection_fails() {
        let err = ArrayElem::from(csr()).select_columns(&[4]).unwrap_err();
        assert_eq!(
            access_error(&err),
            &AccessError::IndexOutOfBounds {
                axis: "columns",
                index: 4,
                len: 4
            }
        );
    }

    #[test]
    fn column_values_by_position_and_label() {
        let sparse = ArrayElem::from(csc());
        assert_eq!(sparse.column_values(3).unwrap(), Column::Float(vec![0.0, 7.0, 9.0]));

        let frame: ArrayElem<f64> = DataFrame::new(["a", "b"])
            .with_column("1", Column::Int(vec![3, 4]))
            .unwrap()
            .into();
        assert_eq!(frame.column_values(1).unwrap(), Column::Int(vec![3, 4]));
        assert!(frame.column_values(0).is_err());
    }

    #[test]
    fn frame_densify_requires_numbers() {
        let numeric: ArrayElem<f64> = DataFrame::new(["a", "b"])
            .with_column("0", Column::Int(vec![1, 2]))
            .unwrap()
            .with_column("1", Column::Bool(vec![true, false]))
            .unwrap()
            .into();
        assert_eq!(numeric.densify().unwrap(), array![[1.0, 1.0], [2.0, 0.0]]);

        let text: ArrayElem<f64> = DataFrame::new(["a"])
            .with_column("0", Column::from_strs(&["s"]))
            .unwrap()
            .into();
        assert!(text.densify().is_err());
    }

    #[test]
    fn argsort_is_stable() {
        assert_eq!(argsort(&[3, 1, 2, 1]), vec![1, 3, 2, 0]);
        assert!(argsort(&[]).is_empty());
    }
}

#[cfg(test)]
mod rep_tests {
    use super::*;
    use single_accessors::data::Raw;

    fn adata() -> AnnData<f64> {
        let obs = DataFrame::new(["c1", "c2", "c3"]);
        let var = DataFrame::new(["G1", "G2", "G3", "G4"]);
        let raw_var = DataFrame::new(["G1", "G2"]);
        let raw = Raw::new(ArrayElem::Dense(array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]), raw_var).unwrap();
        AnnData::new(ArrayElem::Dense(dense()), obs, var)
            .unwrap()
            .with_layer("counts", csr())
            .unwrap()
            .with_obsm("X_pca", array![[0.1, 0.2], [0.3, 0.4], [0.5, 0.6]])
            .unwrap()
            .with_obsp("connectivities", ndarray::Array2::<f64>::eye(3))
            .unwrap()
            .with_raw(raw)
            .unwrap()
    }

    #[test]
    fn selector_without_choice_is_x() {
        assert_eq!(RepSelector::new().resolve().unwrap(), ObsRep::X);
        assert_eq!(
            RepSelector::new().with_layer("counts").resolve().unwrap(),
            ObsRep::Layer("counts")
        );
        assert_eq!(
            RepSelector::new().with_use_raw(true).resolve().unwrap(),
            ObsRep::Raw
        );
    }

    #[test]
    fn selector_rejects_multiple_choices() {
        let selector = RepSelector::new().with_use_raw(true).with_obsm("X_pca");
        let err = selector.resolve().unwrap_err();
        assert!(matches!(
            access_error(&err),
            AccessError::ConflictingRepresentation(_)
        ));
    }

    #[test]
    fn get_each_representation() {
        let adata = adata();
        assert_eq!(get_obs_rep(&adata, ObsRep::X).unwrap().shape(), (3, 4));
        assert!(get_obs_rep(&adata, ObsRep::Layer("counts")).unwrap().is_sparse());
        assert_eq!(get_obs_rep(&adata, ObsRep::Raw).unwrap().shape(), (3, 2));
        assert_eq!(get_obs_rep(&adata, ObsRep::Obsm("X_pca")).unwrap().shape(), (3, 2));
        assert_eq!(
            get_obs_rep(&adata, ObsRep::Obsp("connectivities")).unwrap().shape(),
            (3, 3)
        );

        let err = get_obs_rep(&adata, ObsRep::Layer("spliced")).unwrap_err();
        assert_eq!(
            access_error(&err),
            &AccessError::MissingElement {
                kind: "layer",
                key: "spliced".to_string()
            }
        );
    }

    #[test]
    fn set_then_get_returns_new_value() {
        let mut adata = adata();
        let replacement = ndarray::Array2::<f64>::from_elem((3, 4), 2.0);
        set_obs_rep(&mut adata, ArrayElem::Dense(replacement.clone()), ObsRep::Layer("counts")).unwrap();
        assert_eq!(
            get_obs_rep(&adata, ObsRep::Layer("counts")).unwrap().densify().unwrap(),
            replacement
        );

        let raw_x = ndarray::Array2::<f64>::zeros((3, 2));
        set_obs_rep(&mut adata, ArrayElem::Dense(raw_x.clone()), ObsRep::Raw).unwrap();
        assert_eq!(get_obs_rep(&adata, ObsRep::Raw).unwrap().densify().unwrap(), raw_x);

        set_obs_rep(&mut adata, ArrayElem::from(csr()), ObsRep::X).unwrap();
        assert!(adata.x().is_sparse());
    }

    #[test]
    fn set_with_wrong_shape_is_rejected_by_container() {
        let mut adata = adata();
        let err = set_obs_rep(
            &mut adata,
            ArrayElem::Dense(ndarray::Array2::<f64>::zeros((2, 4))),
            ObsRep::X,
        )
        .unwrap_err();
        assert!(matches!(access_error(&err), AccessError::ShapeMismatch(_)));

        let err = set_obs_rep(
            &mut adata,
            ArrayElem::Dense(ndarray::Array2::<f64>::zeros((3, 2))),
            ObsRep::Obsp("distances"),
        )
        .unwrap_err();
        assert!(matches!(access_error(&err), AccessError::ShapeMismatch(_)));
    }
}
