//! # 强度归一化
//!
//! 计算图样的强度缩放因子，可基于原始强度、扣背景后强度或背景本身，
//! 取最大值或平均值。
//!
//! ## 依赖关系
//! - 被 `models/pattern.rs` 和 `cli/subtract.rs` 使用

use clap::ValueEnum;
use serde::Serialize;

/// 缩放因子计算方法
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default, Serialize)]
pub enum ScaleMethod {
    /// Max raw intensity
    #[default]
    RawMax,
    /// Mean raw intensity
    RawMean,
    /// Max background-subtracted intensity
    SubMax,
    /// Mean background-subtracted intensity
    SubMean,
    /// Max background intensity
    BkgMax,
    /// Mean background intensity
    BkgMean,
}

impl ScaleMethod {
    /// 是否需要背景
    pub fn needs_background(&self) -> bool {
        !matches!(self, ScaleMethod::RawMax | ScaleMethod::RawMean)
    }

    /// 计算缩放因子；缺少所需背景或数据为空时返回 `None`
    pub fn compute(&self, intensity: &[f64], background: Option<&[f64]>) -> Option<f64> {
        match self {
            ScaleMethod::RawMax => max(intensity),
            ScaleMethod::RawMean => mean(intensity),
            ScaleMethod::BkgMax => background.and_then(max),
            ScaleMethod::BkgMean => background.and_then(mean),
            ScaleMethod::SubMax | ScaleMethod::SubMean => {
                let bkg = background?;
                if bkg.len() != intensity.len() {
                    return None;
                }
                let sub: Vec<f64> = intensity.iter().zip(bkg).map(|(i, b)| i - b).collect();
                if *self == ScaleMethod::SubMax {
                    max(&sub)
                } else {
                    mean(&sub)
                }
            }
        }
    }
}

impl std::fmt::Display for ScaleMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ScaleMethod::RawMax => "raw-max",
            ScaleMethod::RawMean => "raw-mean",
            ScaleMethod::SubMax => "sub-max",
            ScaleMethod::SubMean => "sub-mean",
            ScaleMethod::BkgMax => "bkg-max",
            ScaleMethod::BkgMean => "bkg-mean",
        };
        write!(f, "{}", name)
    }
}

fn max(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_methods() {
        let i = [1.0, 4.0, 7.0];
        assert_eq!(ScaleMethod::RawMax.compute(&i, None), Some(7.0));
        assert_eq!(ScaleMethod::RawMean.compute(&i, None), Some(4.0));
        assert_eq!(ScaleMethod::RawMax.compute(&[], None), None);
    }

    #[test]
    fn test_background_methods() {
        let i = [3.0, 9.0, 4.0];
        let b = [1.0, 2.0, 3.0];
        assert_eq!(ScaleMethod::SubMax.compute(&i, Some(&b)), Some(7.0));
        assert_eq!(ScaleMethod::SubMean.compute(&i, Some(&b)), Some(10.0 / 3.0));
        assert_eq!(ScaleMethod::BkgMax.compute(&i, Some(&b)), Some(3.0));
        assert_eq!(ScaleMethod::BkgMean.compute(&i, Some(&b)), Some(2.0));
        assert_eq!(ScaleMethod::SubMax.compute(&i, None), None);
        assert!(ScaleMethod::BkgMean.needs_background());
        assert!(!ScaleMethod::RawMean.needs_background());
    }
}
