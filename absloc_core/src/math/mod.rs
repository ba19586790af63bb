// absloc_core/src/math/mod.rs

pub mod rotation;

use nalgebra::DMatrix;

/// Covariance propagation through a linear map: `J * P * J^T`.
pub fn prod_jpjt(j: &DMatrix<f64>, p: &DMatrix<f64>) -> DMatrix<f64> {
    j * p * j.transpose()
}

/// Gathers the sub-block `P[rows, cols]` of a matrix.
pub fn project(p: &DMatrix<f64>, rows: &[usize], cols: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), cols.len(), |r, c| p[(rows[r], cols[c])])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_gathers_in_index_order() {
        let p = DMatrix::from_fn(4, 4, |r, c| (10 * r + c) as f64);
        let block = project(&p, &[3, 1], &[0, 2]);
        assert_eq!(block, DMatrix::from_row_slice(2, 2, &[30.0, 32.0, 10.0, 12.0]));
    }

    #[test]
    fn jpjt_of_selector_is_sub_block() {
        let p = DMatrix::from_fn(3, 3, |r, c| (1 + r + c) as f64);
        let j = DMatrix::from_row_slice(1, 3, &[0.0, 1.0, 0.0]);
        assert_eq!(prod_jpjt(&j, &p)[(0, 0)], p[(1, 1)]);
    }
}
