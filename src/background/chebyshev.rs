//! # Chebyshev 多项式最小二乘拟合
//!
//! 在 [-1, 1] 区间上用 Chebyshev 基做多项式回归，高阶时比单项式基条件数好得多。
//!
//! ## 实现说明
//! - 数据按 [`ROW_BLOCK`] 行分块吸收进增广矩阵 `[A | y]` 的 QR 上三角因子，
//!   内存只与阶数有关，和点数无关
//! - 上三角因子 R 与设计矩阵 A 奇异值相同；按列归一化后做 SVD 求解
//!   （与 numpy `chebfit` 一致的列缩放）
//! - 奇异值截断阈值 `len(x) * eps * σ_max`
//! - 求值使用 Clenshaw 递推
//!
//! ## 依赖关系
//! - 被 `background/mod.rs` 调用
//! - 使用 `nalgebra` 做 SVD

use crate::error::{Result, XrdBkgError};

use nalgebra::{DMatrix, DVector};

/// 每次吸收进 QR 因子的数据行数
pub const ROW_BLOCK: usize = 4096;

/// 把 x 仿射映射到 [-1, 1]：`2 (x - x[0]) / (x[-1] - x[0]) - 1`
pub fn rescale_to_unit(x: &[f64]) -> Result<Vec<f64>> {
    let (first, last) = match (x.first(), x.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => {
            return Err(XrdBkgError::TooFewPoints { min: 2, got: 0 });
        }
    };

    let span = last - first;
    if !(span.is_finite() && span > 0.0) {
        return Err(XrdBkgError::DegenerateSpacing(format!(
            "x range [{}, {}] has no positive span",
            first, last
        )));
    }

    Ok(x.iter().map(|&v| 2.0 * (v - first) / span - 1.0).collect())
}

/// 构造 Chebyshev Vandermonde 矩阵，第 k 列为 T_k(x)
pub fn chebyshev_vander(x: &[f64], order: usize) -> DMatrix<f64> {
    let cols = order + 1;
    let mut v = DMatrix::<f64>::zeros(x.len(), cols);

    for (i, &t) in x.iter().enumerate() {
        v[(i, 0)] = 1.0;
        if cols > 1 {
            v[(i, 1)] = t;
        }
        for k in 2..cols {
            v[(i, k)] = 2.0 * t * v[(i, k - 1)] - v[(i, k - 2)];
        }
    }

    v
}

/// 最小二乘拟合 `order` 阶 Chebyshev 多项式，返回系数 c_0..c_order
pub fn chebyshev_fit(x: &[f64], y: &[f64], order: usize) -> Result<Vec<f64>> {
    fit_in_blocks(x, y, order, ROW_BLOCK)
}

fn fit_in_blocks(x: &[f64], y: &[f64], order: usize, block_rows: usize) -> Result<Vec<f64>> {
    if x.len() != y.len() {
        return Err(XrdBkgError::ShapeMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    if order >= x.len() {
        return Err(XrdBkgError::RankDeficient {
            order,
            len: x.len(),
        });
    }

    let ncols = order + 1;
    let factor = absorb_rows(x, y, order, block_rows.max(ncols));

    // factor 至少有 ncols 行：前 ncols 行是 [R | Qᵀy]
    let mut r = factor.view((0, 0), (ncols, ncols)).clone_owned();
    let rhs = DVector::from_iterator(ncols, factor.view((0, ncols), (ncols, 1)).iter().copied());

    // 列归一化；‖A_j‖ = ‖R_j‖
    let mut norms = Vec::with_capacity(ncols);
    for j in 0..ncols {
        let norm = r.column(j).norm();
        let norm = if norm > 0.0 { norm } else { 1.0 };
        r.column_mut(j).unscale_mut(norm);
        norms.push(norm);
    }

    let svd = r.svd(true, true);

    let sigma_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let tol = x.len() as f64 * f64::EPSILON * sigma_max;

    let scaled = svd
        .solve(&rhs, tol)
        .map_err(|e| XrdBkgError::SingularFit(e.to_string()))?;

    Ok(scaled
        .iter()
        .zip(norms.iter())
        .map(|(c, n)| c / n)
        .collect())
}

/// 逐块更新增广矩阵 `[A | y]` 的 QR 上三角因子
fn absorb_rows(x: &[f64], y: &[f64], order: usize, block_rows: usize) -> DMatrix<f64> {
    let ncols = order + 1;
    let mut factor = DMatrix::<f64>::zeros(0, ncols + 1);

    for (xs, ys) in x.chunks(block_rows).zip(y.chunks(block_rows)) {
        let head = factor.nrows();
        let mut stacked = DMatrix::<f64>::zeros(head + xs.len(), ncols + 1);
        stacked.view_mut((0, 0), (head, ncols + 1)).copy_from(&factor);
        stacked
            .view_mut((head, 0), (xs.len(), ncols))
            .copy_from(&chebyshev_vander(xs, order));
        for (i, &v) in ys.iter().enumerate() {
            stacked[(head + i, ncols)] = v;
        }
        factor = stacked.qr().r();
    }

    factor
}

/// Clenshaw 递推求 Σ c_k T_k(x)
pub fn chebyshev_eval(x: f64, coeffs: &[f64]) -> f64 {
    match coeffs.len() {
        0 => 0.0,
        1 => coeffs[0],
        _ => {
            let mut b1 = 0.0;
            let mut b2 = 0.0;
            for &c in coeffs[1..].iter().rev() {
                let b0 = 2.0 * x * b1 - b2 + c;
                b2 = b1;
                b1 = b0;
            }
            coeffs[0] + x * b1 - b2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| a + (b - a) * i as f64 / (n - 1) as f64)
            .collect()
    }

    #[test]
    fn test_rescale_endpoints() {
        let t = rescale_to_unit(&[2.0, 3.0, 4.0, 6.0]).unwrap();
        assert!((t[0] + 1.0).abs() < 1e-15);
        assert!((t[1] + 0.5).abs() < 1e-15);
        assert!((t[3] - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_rescale_rejects_zero_span() {
        let err = rescale_to_unit(&[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, XrdBkgError::DegenerateSpacing(_)));
    }

    #[test]
    fn test_eval_matches_definition() {
        // T_3(x) = 4x^3 - 3x
        let coeffs = [0.0, 0.0, 0.0, 1.0];
        for &x in &[-1.0, -0.3, 0.0, 0.5, 1.0] {
            let expected = 4.0 * x * x * x - 3.0 * x;
            assert!((chebyshev_eval(x, &coeffs) - expected).abs() < 1e-12);
        }
        assert_eq!(chebyshev_eval(0.7, &[]), 0.0);
        assert_eq!(chebyshev_eval(0.7, &[2.5]), 2.5);
    }

    #[test]
    fn test_fit_recovers_exact_polynomial() {
        let x = linspace(-1.0, 1.0, 25);
        let truth = [1.5, -0.75, 0.25, 2.0];
        let y: Vec<f64> = x.iter().map(|&t| chebyshev_eval(t, &truth)).collect();

        let coeffs = chebyshev_fit(&x, &y, 3).unwrap();
        for (c, t) in coeffs.iter().zip(truth.iter()) {
            assert!((c - t).abs() < 1e-10, "{} vs {}", c, t);
        }
    }

    #[test]
    fn test_degree_zero_is_mean() {
        let x = linspace(-1.0, 1.0, 10);
        let y: Vec<f64> = (0..10).map(|i| (i * i) as f64).collect();
        let mean = y.iter().sum::<f64>() / y.len() as f64;

        let coeffs = chebyshev_fit(&x, &y, 0).unwrap();
        assert_eq!(coeffs.len(), 1);
        assert!((coeffs[0] - mean).abs() < 1e-10);
    }

    #[test]
    fn test_blocked_fit_matches_single_block() {
        let x = linspace(-1.0, 1.0, 101);
        let y: Vec<f64> = x
            .iter()
            .map(|&t| 3.0 + t + 0.5 * (5.0 * t).sin() + 0.1 * (17.0 * t).cos())
            .collect();

        let whole = fit_in_blocks(&x, &y, 8, x.len()).unwrap();
        for block in [9, 10, 33] {
            let blocked = fit_in_blocks(&x, &y, 8, block).unwrap();
            for (a, b) in whole.iter().zip(blocked.iter()) {
                assert!((a - b).abs() < 1e-9, "block {}: {} vs {}", block, a, b);
            }
        }
    }

    #[test]
    fn test_factor_size_depends_on_order_only() {
        let x = linspace(-1.0, 1.0, 1000);
        let y = vec![1.0; 1000];
        let factor = absorb_rows(&x, &y, 5, 64);
        assert_eq!(factor.nrows(), 7);
        assert_eq!(factor.ncols(), 7);
    }

    #[test]
    fn test_fit_propagates_nan() {
        let x = linspace(-1.0, 1.0, 20);
        let mut y = vec![2.0; 20];
        y[4] = f64::NAN;
        let coeffs = chebyshev_fit(&x, &y, 3).unwrap();
        assert!(coeffs.iter().any(|c| c.is_nan()));
    }

    #[test]
    fn test_order_must_be_below_len() {
        let x = linspace(-1.0, 1.0, 4);
        let y = vec![1.0; 4];
        let err = chebyshev_fit(&x, &y, 4).unwrap_err();
        assert!(matches!(err, XrdBkgError::RankDeficient { order: 4, len: 4 }));

        // order = len - 1 是插值，仍然允许
        assert!(chebyshev_fit(&x, &y, 3).is_ok());
    }
}
