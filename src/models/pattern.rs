//! # 一维衍射图样
//!
//! 统一以 q (Å⁻¹, 严格递增) 存储图样，背景也在 q 坐标上计算，
//! 需要时再换算为 2θ 或 d 输出。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`xrd/` 和 `commands/` 使用
//! - 使用 `background/` 提取背景
//! - 使用 `models/axis.rs` 做坐标换算

use crate::background::{self, BackgroundParams, MIN_POINTS};
use crate::error::{Result, XrdBkgError};
use crate::models::axis::XAxis;
use crate::models::scale::ScaleMethod;

use serde::Serialize;

/// 一维 XRD 图样
#[derive(Debug, Clone, Serialize)]
pub struct Pattern1D {
    /// 图样名称
    pub label: String,
    /// 动量转移 q (Å⁻¹)，严格递增
    pub q: Vec<f64>,
    /// 强度
    pub intensity: Vec<f64>,
    /// X 射线波长 (Å)
    pub wavelength: Option<f64>,
    /// 强度缩放因子
    pub scale: f64,
    /// 背景（与 q 等长）
    background: Option<Vec<f64>>,
    /// 计算背景时使用的参数
    background_params: Option<BackgroundParams>,
}

impl Pattern1D {
    /// 由 q 坐标创建图样
    pub fn new(
        label: impl Into<String>,
        q: Vec<f64>,
        intensity: Vec<f64>,
        wavelength: Option<f64>,
    ) -> Result<Self> {
        if q.len() != intensity.len() {
            return Err(XrdBkgError::ShapeMismatch {
                x_len: q.len(),
                y_len: intensity.len(),
            });
        }
        if q.len() < MIN_POINTS {
            return Err(XrdBkgError::TooFewPoints {
                min: MIN_POINTS,
                got: q.len(),
            });
        }
        if let Some(i) = q.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(XrdBkgError::DegenerateSpacing(format!(
                "q must be strictly increasing (q[{}] = {}, q[{}] = {})",
                i,
                q[i],
                i + 1,
                q[i + 1]
            )));
        }

        let raw_max = ScaleMethod::RawMax.compute(&intensity, None).unwrap_or(1.0);
        let scale = if raw_max.is_finite() && raw_max > 0.0 {
            raw_max
        } else {
            1.0
        };

        Ok(Self {
            label: label.into(),
            q,
            intensity,
            wavelength,
            scale,
            background: None,
            background_params: None,
        })
    }

    /// 由任意坐标创建图样（d 坐标换算后顺序反转，自动重排为 q 递增）
    pub fn from_axis(
        label: impl Into<String>,
        axis: XAxis,
        x: &[f64],
        intensity: Vec<f64>,
        wavelength: Option<f64>,
    ) -> Result<Self> {
        if x.len() != intensity.len() {
            return Err(XrdBkgError::ShapeMismatch {
                x_len: x.len(),
                y_len: intensity.len(),
            });
        }

        let mut q = axis.to_q(x, wavelength)?;
        let mut intensity = intensity;
        if q.len() >= 2 && q[0] > q[q.len() - 1] {
            q.reverse();
            intensity.reverse();
        }

        Self::new(label, q, intensity, wavelength)
    }

    /// 数据点数
    pub fn len(&self) -> usize {
        self.q.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// 指定坐标下的横坐标
    pub fn axis_values(&self, axis: XAxis) -> Result<Vec<f64>> {
        axis.from_q(&self.q, self.wavelength)
    }

    /// 计算并缓存背景
    pub fn compute_background(&mut self, params: &BackgroundParams) -> Result<&[f64]> {
        let bkg = background::extract_background(&self.q, &self.intensity, params)?;
        self.background_params = Some(*params);
        let stored = self.background.insert(bkg);
        Ok(stored.as_slice())
    }

    /// 背景缺失或近似全零时重新计算，否则沿用缓存
    pub fn ensure_background(&mut self, params: &BackgroundParams) -> Result<&[f64]> {
        let stale = match (&self.background, &self.background_params) {
            (Some(bkg), Some(used)) => used != params || is_blank(bkg),
            _ => true,
        };
        if stale {
            return self.compute_background(params);
        }
        Ok(self.background.as_deref().unwrap_or(&[]))
    }

    /// 已缓存的背景
    pub fn background(&self) -> Option<&[f64]> {
        self.background.as_deref()
    }

    /// 计算背景时使用的参数
    pub fn background_params(&self) -> Option<&BackgroundParams> {
        self.background_params.as_ref()
    }

    /// 扣除背景后的强度
    pub fn subtracted(&self) -> Option<Vec<f64>> {
        let bkg = self.background.as_deref()?;
        background::subtract(&self.intensity, bkg).ok()
    }

    /// 手动设置缩放因子
    pub fn set_scale(&mut self, value: f64) -> Result<()> {
        if !(value.is_finite() && value > 0.0) {
            return Err(XrdBkgError::InvalidParameter(format!(
                "scale must be positive, got {}",
                value
            )));
        }
        self.scale = value;
        Ok(())
    }

    /// 按方法自动计算缩放因子；结果非正时保留原值并返回 `None`
    pub fn auto_scale(
        &mut self,
        method: ScaleMethod,
        params: &BackgroundParams,
    ) -> Result<Option<f64>> {
        if method.needs_background() {
            self.ensure_background(params)?;
        }

        match method.compute(&self.intensity, self.background.as_deref()) {
            Some(scale) if scale.is_finite() && scale > 0.0 => {
                self.scale = scale;
                Ok(Some(scale))
            }
            _ => Ok(None),
        }
    }
}

/// 背景总和小于 0.5/len 视为未计算
fn is_blank(background: &[f64]) -> bool {
    background.is_empty() || background.iter().sum::<f64>() < 0.5 / background.len() as f64
}
