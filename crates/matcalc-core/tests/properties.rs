use matcalc_core::gauss::{canonical, invert};
use matcalc_core::{CoreError, Matrix, Value};

fn samples() -> Vec<Matrix> {
    vec![
        Matrix::from_rows(vec![vec![4.0, 7.0], vec![2.0, 6.0]]).unwrap(),
        Matrix::from_rows(vec![
            vec![0.0, 2.0, 1.0],
            vec![1.0, -1.0, 3.0],
            vec![2.0, 0.5, -4.0],
        ])
        .unwrap(),
        Matrix::from_rows(vec![
            vec![3.0, 0.0, 0.0, 1.0],
            vec![0.0, 0.0, 2.0, 0.0],
            vec![1.0, 5.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 7.0],
        ])
        .unwrap(),
    ]
}

fn assert_close(a: &Matrix, b: &Matrix, tolerance: f64) {
    assert_eq!(a.size(), b.size());
    for (x, y) in a.data().iter().zip(b.data()) {
        assert!((x - y).abs() < tolerance, "{:?}\n!=\n{:?}", a, b);
    }
}

#[test]
fn test_inverse_times_matrix_is_identity() {
    for m in samples() {
        let inv = invert(&m).unwrap();
        let product = m.multiply(&inv).unwrap();
        assert_close(&product, &Matrix::identity(m.rows(), m.cols(), 1.0), 1e-10);
    }
}

#[test]
fn test_double_transpose_is_exact() {
    let wide = Matrix::from_rows(vec![vec![1.5, -2.0, 3.25]]).unwrap();
    for m in samples().into_iter().chain(std::iter::once(wide)) {
        assert_eq!(m.transpose().transpose(), m);
    }
}

#[test]
fn test_zeroth_power_is_identity_of_same_shape() {
    for (rows, cols) in [(2, 2), (2, 3), (4, 1)] {
        let m = Value::Matrix(Matrix::from_vec(rows, cols, vec![7.0; rows * cols]).unwrap());
        let expected = Matrix::identity(rows, cols, 1.0);
        assert_eq!(m.power(0.0).unwrap(), Value::Matrix(expected));
    }
}

#[test]
fn test_elimination_is_idempotent() {
    let mut inputs = samples();
    inputs.push(Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 6.0]]).unwrap());
    inputs.push(Matrix::zeros(3, 2));
    for m in inputs {
        let once = canonical(&m);
        let twice = canonical(&once);
        assert_close(&once, &twice, 1e-10);
    }
}

#[test]
fn test_matrix_division_by_matrix_fails() {
    for m in samples() {
        let v = Value::Matrix(m);
        match v.divide(&v) {
            Err(CoreError::Computation(e)) => {
                assert!(e.left.is_some() && e.right.is_some());
            }
            other => panic!("expected a computation error, got {:?}", other),
        }
    }
}
