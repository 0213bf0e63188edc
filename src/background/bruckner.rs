//! # Bruckner 平滑
//!
//! 迭代地把高于局部滑动平均的点压到平均值，逐步削去衍射峰，
//! 留下缓变的背景分量。
//!
//! ## 算法概述
//! 1. 两端各用首/尾值填充 `window` 个点
//! 2. 计算上限 `y_c = avg + 2 (avg - min)`，截断高于上限的点
//! 3. 每轮从左到右扫描，维护长度 `2 window + 1` 的滑动窗口平均值：
//!    当前点高于平均值时替换为平均值，平均值按增量更新（O(N) 每轮）
//! 4. 去掉两端填充，返回中间 N 个点
//!
//! ## 参考
//! - S. Bruckner, J. Appl. Cryst. 33, 977-979 (2000)
//!
//! ## 依赖关系
//! - 被 `background/mod.rs` 调用
//! - 无外部模块依赖

/// 两端填充：前 `window` 个点取 `y[0]`，后 `window` 个点取 `y[N-1]`
fn pad_edges(y: &[f64], window: usize) -> Vec<f64> {
    let (first, last) = match (y.first(), y.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => return Vec::new(),
    };

    let mut padded = Vec::with_capacity(y.len() + 2 * window);
    padded.extend(std::iter::repeat(first).take(window));
    padded.extend_from_slice(y);
    padded.extend(std::iter::repeat(last).take(window));
    padded
}

/// 计算截断上限 `avg + 2 (avg - min)`
pub fn bruckner_ceiling(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);

    avg + 2.0 * (avg - min)
}

/// 把高于 `ceiling` 的点截断到 `ceiling`，返回被截断的点数
///
/// NaN 上限不截断任何点。
pub fn clip_above(values: &mut [f64], ceiling: f64) -> usize {
    let mut clipped = 0;
    for v in values.iter_mut() {
        if *v > ceiling {
            *v = ceiling;
            clipped += 1;
        }
    }
    clipped
}

/// Bruckner 迭代平滑
///
/// `window` 为窗口半宽（点数），`iterations` 为扫描轮数。
/// 返回与 `y` 等长的平滑曲线，不修改输入。
pub fn smooth_bruckner(y: &[f64], window: usize, iterations: usize) -> Vec<f64> {
    let n_data = y.len();
    if n_data == 0 {
        return Vec::new();
    }

    let w = window;
    let mut padded = pad_edges(y, w);

    let ceiling = bruckner_ceiling(&padded);
    clip_above(&mut padded, ceiling);

    let window_size = (2 * w + 1) as f64;

    // 扫描区间 [w, n_data - w - 2)，点数不足时为空
    let scan_end = n_data.saturating_sub(w + 2);

    for _ in 0..iterations {
        let mut window_avg = padded[..=2 * w].iter().sum::<f64>() / window_size;

        for i in w..scan_end {
            let entering = padded[i + w + 1];
            let leaving = padded[i - w];
            let current = padded[i];

            if current > window_avg {
                let replacement = window_avg;
                // 中心点由 current 变为 replacement，同时窗口右移一位
                window_avg += ((window_avg - current) + (entering - leaving)) / window_size;
                padded[i] = replacement;
            } else {
                window_avg += (entering - leaving) / window_size;
            }
        }
    }

    padded[w..w + n_data].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// O(N·window) 参考实现：每个位置直接对当前窗口求平均
    fn smooth_bruckner_reference(y: &[f64], window: usize, iterations: usize) -> Vec<f64> {
        let n_data = y.len();
        let w = window;
        let mut padded = pad_edges(y, w);
        let ceiling = bruckner_ceiling(&padded);
        clip_above(&mut padded, ceiling);

        let scan_end = n_data.saturating_sub(w + 2);
        for _ in 0..iterations {
            for i in w..scan_end {
                let avg = padded[i - w..=i + w].iter().sum::<f64>() / (2 * w + 1) as f64;
                if padded[i] > avg {
                    padded[i] = avg;
                }
            }
        }

        padded[w..w + n_data].to_vec()
    }

    fn peaky_curve(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                let base = 20.0 + 0.05 * x;
                let peak1 = 300.0 * (-(x - 17.0).powi(2) / 4.0).exp();
                let peak2 = 120.0 * (-(x - 41.0).powi(2) / 9.0).exp();
                let ripple = 1.5 * (x * 0.7).sin();
                base + peak1 + peak2 + ripple
            })
            .collect()
    }

    #[test]
    fn test_pad_edges() {
        let padded = pad_edges(&[1.0, 2.0, 3.0], 2);
        assert_eq!(padded, vec![1.0, 1.0, 1.0, 2.0, 3.0, 3.0, 3.0]);
        assert!(pad_edges(&[], 3).is_empty());
    }

    #[test]
    fn test_matches_reference() {
        let y = peaky_curve(60);
        for &window in &[0, 1, 3, 7] {
            for &iterations in &[1, 5, 30] {
                let fast = smooth_bruckner(&y, window, iterations);
                let slow = smooth_bruckner_reference(&y, window, iterations);
                assert_eq!(fast.len(), slow.len());
                for (a, b) in fast.iter().zip(slow.iter()) {
                    assert!(
                        (a - b).abs() < 1e-9,
                        "window={} iterations={}: {} vs {}",
                        window,
                        iterations,
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn test_clip_is_idempotent() {
        let mut values = vec![1.0, 2.0, 50.0, 3.0, 2.0, 1.0];
        let ceiling = bruckner_ceiling(&values);
        let first = clip_above(&mut values, ceiling);
        assert_eq!(first, 1);

        let snapshot = values.clone();
        let second = clip_above(&mut values, ceiling);
        assert_eq!(second, 0);
        assert_eq!(values, snapshot);
    }

    #[test]
    fn test_length_preserved_and_input_untouched() {
        let y = peaky_curve(40);
        let before = y.clone();
        let smoothed = smooth_bruckner(&y, 4, 10);
        assert_eq!(smoothed.len(), y.len());
        assert_eq!(y, before);
    }

    #[test]
    fn test_never_raises_values_above_clipped_input() {
        let y = peaky_curve(80);
        let mut clipped = pad_edges(&y, 5);
        let ceiling = bruckner_ceiling(&clipped);
        clip_above(&mut clipped, ceiling);

        let smoothed = smooth_bruckner(&y, 5, 20);
        for (s, c) in smoothed.iter().zip(clipped[5..5 + y.len()].iter()) {
            assert!(*s <= *c + 1e-12);
        }
    }

    #[test]
    fn test_window_too_large_does_not_panic() {
        let y = vec![1.0, 5.0, 2.0, 8.0, 3.0];
        let smoothed = smooth_bruckner(&y, 10, 3);
        assert_eq!(smoothed.len(), 5);

        // 扫描区间为空，只剩截断
        let mut expected = pad_edges(&y, 10);
        let ceiling = bruckner_ceiling(&expected);
        clip_above(&mut expected, ceiling);
        assert_eq!(smoothed, expected[10..15].to_vec());
    }

    #[test]
    fn test_window_zero_only_clips() {
        let y = vec![1.0, 2.0, 100.0, 2.0, 1.0, 2.0, 1.0];
        let smoothed = smooth_bruckner(&y, 0, 5);
        let mut expected = y.clone();
        let ceiling = bruckner_ceiling(&expected);
        clip_above(&mut expected, ceiling);
        for (s, e) in smoothed.iter().zip(expected.iter()) {
            assert!((s - e).abs() < 1e-9, "{} vs {}", s, e);
        }
    }

    #[test]
    fn test_nan_propagates_without_panic() {
        let mut y = peaky_curve(30);
        y[10] = f64::NAN;
        let smoothed = smooth_bruckner(&y, 2, 4);
        assert_eq!(smoothed.len(), 30);
        assert!(smoothed.iter().any(|v| v.is_nan()));
    }

    #[test]
    fn test_more_iterations_never_increase() {
        let y = peaky_curve(100);
        let mut previous = smooth_bruckner(&y, 4, 1);
        for iterations in [2, 5, 10, 20, 40] {
            let current = smooth_bruckner(&y, 4, iterations);
            for (c, p) in current.iter().zip(previous.iter()) {
                assert!(*c <= *p + 1e-12);
            }
            previous = current;
        }
    }
}
