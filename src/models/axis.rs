//! # 横坐标与单位换算
//!
//! q (Å⁻¹)、2θ (°)、d (Å) 之间的换算，以及 X 射线能量与波长的换算。
//!
//! - `q = 4π sin(θ) / λ`，其中 `θ = 2θ / 2`
//! - `d = 2π / q`
//! - `λ = hc / E`
//!
//! ## 依赖关系
//! - 被 `models/pattern.rs`、`cli/` 和 `commands/` 使用

use crate::error::{Result, XrdBkgError};

use clap::ValueEnum;
use serde::Serialize;
use std::f64::consts::PI;

/// hc (eV·Å)
pub const PLANCK_HC: f64 = 12398.419843320026;

/// 文件头波长的合理范围 (Å)
pub const MIN_HEADER_WAVELENGTH: f64 = 0.01;
pub const MAX_HEADER_WAVELENGTH: f64 = 100.0;

/// 横坐标类型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default, Serialize)]
pub enum XAxis {
    /// Momentum transfer q (1/Å)
    #[default]
    Q,
    /// Scattering angle 2θ (degrees)
    TwoTheta,
    /// Lattice spacing d (Å)
    D,
}

impl XAxis {
    /// 坐标轴说明（用于图表和文件头）
    pub fn label(&self) -> &'static str {
        match self {
            XAxis::Q => "q (Å⁻¹)",
            XAxis::TwoTheta => "2θ (°)",
            XAxis::D => "d (Å)",
        }
    }

    /// 列名（纯 ASCII，用于 CSV/XY）
    pub fn column_name(&self) -> &'static str {
        match self {
            XAxis::Q => "q",
            XAxis::TwoTheta => "2theta",
            XAxis::D => "d",
        }
    }

    /// 是否需要波长才能与 q 互换
    pub fn needs_wavelength(&self) -> bool {
        matches!(self, XAxis::TwoTheta)
    }

    /// 把本坐标下的数值换算为 q
    pub fn to_q(&self, values: &[f64], wavelength: Option<f64>) -> Result<Vec<f64>> {
        match self {
            XAxis::Q => Ok(values.to_vec()),
            XAxis::D => Ok(values.iter().map(|&d| q_from_d(d)).collect()),
            XAxis::TwoTheta => {
                let wl = require_wavelength(wavelength)?;
                Ok(values.iter().map(|&t| q_from_two_theta(t, wl)).collect())
            }
        }
    }

    /// 把 q 换算为本坐标下的数值
    pub fn from_q(&self, q: &[f64], wavelength: Option<f64>) -> Result<Vec<f64>> {
        match self {
            XAxis::Q => Ok(q.to_vec()),
            XAxis::D => Ok(q.iter().map(|&v| d_from_q(v)).collect()),
            XAxis::TwoTheta => {
                let wl = require_wavelength(wavelength)?;
                let q_limit = 4.0 * PI / wl;
                if let Some(&bad) = q.iter().find(|&&v| v.abs() > q_limit) {
                    return Err(XrdBkgError::InvalidWavelength(format!(
                        "q = {:.4} Å⁻¹ is beyond 4π/λ = {:.4} Å⁻¹ for λ = {:.5} Å",
                        bad, q_limit, wl
                    )));
                }
                Ok(q.iter().map(|&v| two_theta_from_q(v, wl)).collect())
            }
        }
    }
}

impl std::fmt::Display for XAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

/// 检查波长存在且为正
pub fn require_wavelength(wavelength: Option<f64>) -> Result<f64> {
    match wavelength {
        Some(wl) if wl.is_finite() && wl > 0.0 => Ok(wl),
        Some(wl) => Err(XrdBkgError::InvalidWavelength(format!(
            "{} (must be positive)",
            wl
        ))),
        None => Err(XrdBkgError::InvalidWavelength(
            "a wavelength or energy is required for 2θ conversion".to_string(),
        )),
    }
}

/// 把带单位的波长换算为 Å
///
/// 支持 `m`（pyFAI 积分结果的写法）、`nm`、`pm` 和 `Å` / `A` / `Angstrom`；
/// 无单位时按 Å 处理。换算结果不在
/// [`MIN_HEADER_WAVELENGTH`, `MAX_HEADER_WAVELENGTH`] 内时报错。
pub fn wavelength_to_angstrom(value: f64, unit: Option<&str>) -> Result<f64> {
    let factor = match unit.map(|u| u.to_lowercase()).as_deref() {
        None | Some("") | Some("a") | Some("å") | Some("ang") | Some("angstrom")
        | Some("angstroms") => 1.0,
        Some("nm") => 10.0,
        Some("pm") => 0.01,
        Some("m") => 1e10,
        Some(other) => {
            return Err(XrdBkgError::InvalidWavelength(format!(
                "unknown wavelength unit '{}'",
                other
            )))
        }
    };

    let wl = value * factor;
    if !(MIN_HEADER_WAVELENGTH..=MAX_HEADER_WAVELENGTH).contains(&wl) {
        return Err(XrdBkgError::InvalidWavelength(format!(
            "{} {} = {} Å is outside {}..{} Å",
            value,
            unit.unwrap_or("Å"),
            wl,
            MIN_HEADER_WAVELENGTH,
            MAX_HEADER_WAVELENGTH
        )));
    }
    Ok(wl)
}

/// 2θ (°) → q (Å⁻¹)
pub fn q_from_two_theta(two_theta: f64, wavelength: f64) -> f64 {
    4.0 * PI * (two_theta.to_radians() / 2.0).sin() / wavelength
}

/// q (Å⁻¹) → 2θ (°)
pub fn two_theta_from_q(q: f64, wavelength: f64) -> f64 {
    (2.0 * (q * wavelength / (4.0 * PI)).asin()).to_degrees()
}

/// q (Å⁻¹) → d (Å)
pub fn d_from_q(q: f64) -> f64 {
    2.0 * PI / q
}

/// d (Å) → q (Å⁻¹)
pub fn q_from_d(d: f64) -> f64 {
    2.0 * PI / d
}

/// 能量 (eV) → 波长 (Å)
pub fn lambda_from_energy(energy_ev: f64) -> Result<f64> {
    if !(energy_ev.is_finite() && energy_ev > 0.0) {
        return Err(XrdBkgError::InvalidWavelength(format!(
            "energy {} eV must be positive",
            energy_ev
        )));
    }
    Ok(PLANCK_HC / energy_ev)
}

/// 波长 (Å) → 能量 (eV)
pub fn energy_from_lambda(wavelength: f64) -> Result<f64> {
    let wl = require_wavelength(Some(wavelength))?;
    Ok(PLANCK_HC / wl)
}
