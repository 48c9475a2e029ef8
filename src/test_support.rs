//! Shared helpers for the unit tests: reference fixtures and small models.

use nalgebra::{DMatrix, DVector};
use serde_json::Value;

use crate::state_space::StateSpaceModel;

pub(crate) fn load_fixtures() -> Value {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/reference.json");
    let data = std::fs::read_to_string(path).expect("fixtures file not found");
    serde_json::from_str(&data).expect("invalid JSON")
}

pub(crate) fn vec_of(v: &Value) -> Vec<f64> {
    v.as_array()
        .unwrap()
        .iter()
        .map(|x| x.as_f64().unwrap())
        .collect()
}

/// Row-major list of rows; `null` entries become NaN.
pub(crate) fn matrix_of(v: &Value) -> DMatrix<f64> {
    let rows = v.as_array().unwrap();
    let ncols = rows[0].as_array().unwrap().len();
    let flat: Vec<f64> = rows
        .iter()
        .flat_map(|r| {
            r.as_array()
                .unwrap()
                .iter()
                .map(|x| x.as_f64().unwrap_or(f64::NAN))
                .collect::<Vec<_>>()
        })
        .collect();
    DMatrix::from_row_slice(rows.len(), ncols, &flat)
}

pub(crate) fn case_model(case: &Value) -> StateSpaceModel {
    let lags: Vec<usize> = case["lags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l.as_u64().unwrap() as usize)
        .collect();
    let ss = StateSpaceModel::new(
        matrix_of(&case["transition"]),
        matrix_of(&case["measurement"]),
        DVector::from_vec(vec_of(&case["persistence"])),
        matrix_of(&case["scale"]),
        &lags,
    )
    .unwrap();

    match case.get("exog") {
        Some(x) => {
            let x = vec_of(x);
            let coef = case["exog_coef"].as_f64().unwrap();
            ss.with_exog(
                DMatrix::from_column_slice(x.len(), 1, &x),
                DMatrix::from_element(1, 1, coef),
            )
            .unwrap()
        }
        None => ss,
    }
}

/// Seed rows from the fixture padded to a full history.
pub(crate) fn case_history(case: &Value, ss: &StateSpaceModel) -> DMatrix<f64> {
    let n = case["data"].as_array().unwrap().len();
    ss.initial_history(&matrix_of(&case["seed"]), n).unwrap()
}

/// One-component model x_t = x_{t-1} + alpha e_t.
pub(crate) fn local_level(alpha: f64) -> StateSpaceModel {
    StateSpaceModel::new(
        DMatrix::from_element(1, 1, 1.0),
        DMatrix::from_element(1, 1, 1.0),
        DVector::from_element(1, alpha),
        DMatrix::from_element(1, 1, 1.0),
        &[1],
    )
    .unwrap()
}

/// One-component model x_t = phi x_{t-1} + g e_t.
pub(crate) fn ar1(phi: f64, g: f64) -> StateSpaceModel {
    StateSpaceModel::new(
        DMatrix::from_element(1, 1, phi),
        DMatrix::from_element(1, 1, 1.0),
        DVector::from_element(1, g),
        DMatrix::from_element(1, 1, 1.0),
        &[1],
    )
    .unwrap()
}

pub(crate) fn assert_close(got: &[f64], expected: &[f64], tol: f64, what: &str) {
    assert_eq!(got.len(), expected.len(), "{}: length mismatch", what);
    for (i, (g, e)) in got.iter().zip(expected.iter()).enumerate() {
        assert!(
            (g - e).abs() < tol,
            "{}[{}]: got {}, expected {}, err={}",
            what,
            i,
            g,
            e,
            (g - e).abs()
        );
    }
}
