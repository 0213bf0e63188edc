//! # 背景提取模块
//!
//! 对一维 XRD 图样做背景提取：先 Bruckner 迭代平滑压掉衍射峰，
//! 再用 Chebyshev 多项式拟合平滑结果，得到连续的解析背景。
//!
//! 该模块是纯函数：无状态、无 I/O，可在多个线程中对不同数据并发调用。
//!
//! ## 子模块
//! - `bruckner`: 带填充的迭代平滑
//! - `chebyshev`: Chebyshev 最小二乘拟合与求值
//!
//! ## 依赖关系
//! - 被 `models/pattern.rs` 和 `commands/subtract.rs` 使用
//! - 使用 `error.rs`

pub mod bruckner;
pub mod chebyshev;

pub use bruckner::smooth_bruckner;
pub use chebyshev::{chebyshev_eval, chebyshev_fit, rescale_to_unit};

use crate::error::{Result, XrdBkgError};

use serde::Serialize;

/// 最少数据点数
pub const MIN_POINTS: usize = 3;

/// 窗口半宽上限（点数）
pub const MAX_WINDOW: usize = 10_000_000;

/// 背景提取参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackgroundParams {
    /// 平滑窗口宽度（x 单位）
    pub smooth_width: f64,
    /// Bruckner 平滑轮数
    pub iterations: usize,
    /// Chebyshev 多项式阶数
    pub cheb_order: usize,
}

impl Default for BackgroundParams {
    fn default() -> Self {
        Self {
            smooth_width: 0.1,
            iterations: 40,
            cheb_order: 40,
        }
    }
}

impl BackgroundParams {
    /// 创建参数
    pub fn new(smooth_width: f64, iterations: usize, cheb_order: usize) -> Self {
        Self {
            smooth_width,
            iterations,
            cheb_order,
        }
    }

    /// 检查与数据长度无关的参数
    pub fn validate(&self) -> Result<()> {
        if !(self.smooth_width.is_finite() && self.smooth_width > 0.0) {
            return Err(XrdBkgError::InvalidParameter(format!(
                "smooth_width must be positive and finite, got {}",
                self.smooth_width
            )));
        }
        if self.iterations == 0 {
            return Err(XrdBkgError::InvalidParameter(
                "iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// 由平滑宽度和首个采样间距计算窗口半宽（点数，向零截断）
pub fn window_from_width(x: &[f64], smooth_width: f64) -> Result<usize> {
    if x.len() < 2 {
        return Err(XrdBkgError::TooFewPoints {
            min: 2,
            got: x.len(),
        });
    }

    let step = x[1] - x[0];
    if !(step.is_finite() && step > 0.0) {
        return Err(XrdBkgError::DegenerateSpacing(format!(
            "first step x[1] - x[0] = {} must be positive",
            step
        )));
    }

    let points = (smooth_width / step).trunc().abs();
    if !points.is_finite() || points > MAX_WINDOW as f64 {
        return Err(XrdBkgError::InvalidParameter(format!(
            "smooth_width {} is too large for step {}",
            smooth_width, step
        )));
    }

    Ok(points as usize)
}

/// 检查输入数组和参数
fn validate_input(x: &[f64], y: &[f64], params: &BackgroundParams) -> Result<()> {
    if x.len() != y.len() {
        return Err(XrdBkgError::ShapeMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    if x.len() < MIN_POINTS {
        return Err(XrdBkgError::TooFewPoints {
            min: MIN_POINTS,
            got: x.len(),
        });
    }
    params.validate()?;

    if params.cheb_order >= x.len() {
        return Err(XrdBkgError::RankDeficient {
            order: params.cheb_order,
            len: x.len(),
        });
    }

    let last = x[x.len() - 1];
    if !(last - x[0] > 0.0) {
        return Err(XrdBkgError::DegenerateSpacing(format!(
            "x[-1] = {} must be greater than x[0] = {}",
            last, x[0]
        )));
    }

    Ok(())
}

/// 提取背景
///
/// 窗口半宽由 `smooth_width / (x[1] - x[0])` 得到，依次执行 Bruckner 平滑和
/// Chebyshev 拟合，返回与 `x` 等长的背景。`y` 中的 NaN/Inf 会传播到结果中。
pub fn extract_background(x: &[f64], y: &[f64], params: &BackgroundParams) -> Result<Vec<f64>> {
    validate_input(x, y, params)?;

    let window = window_from_width(x, params.smooth_width)?;
    let smoothed = smooth_bruckner(y, window, params.iterations);

    let x_cheb = rescale_to_unit(x)?;
    let coeffs = chebyshev_fit(&x_cheb, &smoothed, params.cheb_order)?;

    Ok(x_cheb.iter().map(|&t| chebyshev_eval(t, &coeffs)).collect())
}

/// 逐点相减 `y - background`
pub fn subtract(y: &[f64], background: &[f64]) -> Result<Vec<f64>> {
    if y.len() != background.len() {
        return Err(XrdBkgError::ShapeMismatch {
            x_len: y.len(),
            y_len: background.len(),
        });
    }
    Ok(y.iter().zip(background).map(|(a, b)| a - b).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn grid(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    fn spike_pattern() -> (Vec<f64>, Vec<f64>) {
        let x = grid(100);
        let mut y = vec![10.0; 100];
        y[50] = 1000.0;
        (x, y)
    }

    #[test]
    fn test_default_params() {
        let p = BackgroundParams::default();
        assert_eq!(p.smooth_width, 0.1);
        assert_eq!(p.iterations, 40);
        assert_eq!(p.cheb_order, 40);
    }

    #[test]
    fn test_window_from_width() {
        let x = grid(10);
        assert_eq!(window_from_width(&x, 5.0).unwrap(), 5);
        assert_eq!(window_from_width(&x, 2.9).unwrap(), 2);
        assert_eq!(window_from_width(&x, 0.4).unwrap(), 0);

        let q: Vec<f64> = (0..10).map(|i| 1.0 + 0.25 * i as f64).collect();
        assert_eq!(window_from_width(&q, 1.0).unwrap(), 4);
    }

    #[test]
    fn test_window_rejects_flat_step() {
        let err = window_from_width(&[1.0, 1.0, 2.0], 0.1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_spike_is_excluded() {
        let (x, y) = spike_pattern();
        let params = BackgroundParams::new(5.0, 40, 2);
        let bkg = extract_background(&x, &y, &params).unwrap();

        assert_eq!(bkg.len(), 100);
        for (i, b) in bkg.iter().enumerate() {
            assert!((b - 10.0).abs() < 1.0, "bkg[{}] = {}", i, b);
        }
    }

    #[test]
    fn test_length_invariance() {
        for &n in &[3, 7, 50, 333] {
            let x = grid(n);
            let y: Vec<f64> = x.iter().map(|v| (v * 0.3).sin() + 2.0).collect();
            let order = (n - 1).min(6);
            let params = BackgroundParams::new(2.0, 3, order);
            let bkg = extract_background(&x, &y, &params).unwrap();
            assert_eq!(bkg.len(), n);
        }
    }

    #[test]
    fn test_flat_input_round_trip() {
        let x = grid(50);
        let y = vec![5.0; 50];
        for &width in &[0.5, 3.0, 12.0] {
            for &iterations in &[1, 10] {
                for &order in &[0, 3, 10] {
                    let params = BackgroundParams::new(width, iterations, order);
                    let bkg = extract_background(&x, &y, &params).unwrap();
                    for b in &bkg {
                        assert!((b - 5.0).abs() < 1e-6, "{:?}: {}", params, b);
                    }
                }
            }
        }
    }

    #[test]
    fn test_degree_zero_is_smoothed_mean() {
        let x = grid(60);
        let y: Vec<f64> = x
            .iter()
            .map(|v| 3.0 + 0.1 * v + 80.0 * (-(v - 25.0).powi(2) / 3.0).exp())
            .collect();
        let params = BackgroundParams::new(4.0, 20, 0);

        let smoothed = smooth_bruckner(&y, 4, 20);
        let mean = smoothed.iter().sum::<f64>() / smoothed.len() as f64;

        let bkg = extract_background(&x, &y, &params).unwrap();
        for b in &bkg {
            assert!((b - mean).abs() < 1e-9);
        }
    }

    #[test]
    fn test_more_iterations_approach_baseline() {
        let x = grid(120);
        let baseline = |v: f64| 50.0 - 0.1 * v;
        let y: Vec<f64> = x
            .iter()
            .map(|&v| baseline(v) + 400.0 * (-(v - 60.0).powi(2) / 8.0).exp())
            .collect();

        let mut previous_gap = f64::INFINITY;
        for iterations in [1, 2, 4, 8, 16, 32, 64] {
            let smoothed = smooth_bruckner(&y, 6, iterations);
            let gap = smoothed
                .iter()
                .zip(x.iter())
                .map(|(s, &v)| s - baseline(v))
                .fold(f64::NEG_INFINITY, f64::max);
            assert!(gap <= previous_gap + 1e-12, "iterations {}", iterations);
            previous_gap = gap;
        }
    }

    #[test]
    fn test_cheb_order_too_high_is_domain_error() {
        let x = grid(5);
        let y = vec![1.0; 5];
        let err = extract_background(&x, &y, &BackgroundParams::new(1.0, 1, 5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
        assert!(matches!(err, XrdBkgError::RankDeficient { .. }));
    }

    #[test]
    fn test_shape_mismatch_is_value_error() {
        let x = grid(5);
        let y = vec![1.0; 4];
        let err = extract_background(&x, &y, &BackgroundParams::new(1.0, 1, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn test_bad_params_are_value_errors() {
        let x = grid(10);
        let y = vec![1.0; 10];
        for params in [
            BackgroundParams::new(0.0, 1, 1),
            BackgroundParams::new(-1.0, 1, 1),
            BackgroundParams::new(f64::NAN, 1, 1),
            BackgroundParams::new(1.0, 0, 1),
        ] {
            let err = extract_background(&x, &y, &params).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Value, "{:?}", params);
        }

        let err = extract_background(&x[..2], &y[..2], &BackgroundParams::new(1.0, 1, 0))
            .unwrap_err();
        assert!(matches!(err, XrdBkgError::TooFewPoints { .. }));
    }

    #[test]
    fn test_degenerate_spacing() {
        let y = vec![1.0; 4];
        let err = extract_background(&[0.0, 0.0, 1.0, 2.0], &y, &BackgroundParams::new(1.0, 1, 1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);

        let err = extract_background(&[0.0, 1.0, 0.5, 0.0], &y, &BackgroundParams::new(1.0, 1, 1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_nan_in_y_propagates() {
        let x = grid(20);
        let mut y = vec![2.0; 20];
        y[7] = f64::NAN;
        let bkg = extract_background(&x, &y, &BackgroundParams::new(2.0, 5, 3)).unwrap();
        assert_eq!(bkg.len(), 20);
        assert!(bkg.iter().any(|b| !b.is_finite()));
    }

    #[test]
    fn test_subtract() {
        let out = subtract(&[3.0, 4.0], &[1.0, 1.5]).unwrap();
        assert_eq!(out, vec![2.0, 2.5]);
        assert!(subtract(&[1.0], &[1.0, 2.0]).is_err());
    }
}
