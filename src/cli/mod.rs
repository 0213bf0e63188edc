//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `subtract`: 背景提取与扣除（单文件或目录批量）
//! - `convert`: 横坐标换算 (q / 2θ / d)
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: subtract, convert

pub mod convert;
pub mod subtract;

use crate::error::{Result, XrdBkgError};
use crate::models::axis;

use clap::{Parser, Subcommand};

/// xrdbkg - 一维 XRD 图样背景提取工具
#[derive(Parser)]
#[command(name = "xrdbkg")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Bruckner + Chebyshev background extraction for 1D X-ray diffraction patterns",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Extract and subtract the background of 1D XRD patterns
    Subtract(subtract::SubtractArgs),

    /// Rewrite a 1D pattern on another abscissa (q, 2θ, d)
    Convert(convert::ConvertArgs),
}

/// 预定义辐射源波长 (Å)
pub fn get_predefined_wavelength(name: &str) -> Option<f64> {
    match name.to_lowercase().as_str() {
        "cu-ka" | "cuka" => Some(1.5418),
        "cu-ka1" | "cuka1" => Some(1.5406),
        "cu-ka2" | "cuka2" => Some(1.5444),
        "mo-ka" | "moka" => Some(0.7107),
        "mo-ka1" | "moka1" => Some(0.7093),
        "co-ka" | "coka" => Some(1.7903),
        "fe-ka" | "feka" => Some(1.9373),
        "cr-ka" | "crka" => Some(2.2910),
        "ag-ka" | "agka" => Some(0.5609),
        _ => None,
    }
}

/// 解析波长输入（辐射源名称或数值，单位 Å）
pub fn parse_wavelength(input: &str) -> Result<f64> {
    if let Some(wl) = get_predefined_wavelength(input) {
        return Ok(wl);
    }
    let wl: f64 = input.parse().map_err(|_| {
        XrdBkgError::InvalidWavelength(format!(
            "'{}'. Use a number (e.g., 0.424589) or a name: cu-ka, mo-ka, co-ka, fe-ka, cr-ka, ag-ka",
            input
        ))
    })?;
    axis::require_wavelength(Some(wl))
}

/// 由 `--wavelength` / `--energy` 得到波长；都未给出时返回 `None`
pub fn resolve_wavelength(wavelength: Option<&str>, energy_ev: Option<f64>) -> Result<Option<f64>> {
    match (wavelength, energy_ev) {
        (Some(w), _) => parse_wavelength(w).map(Some),
        (None, Some(e)) => axis::lambda_from_energy(e).map(Some),
        (None, None) => Ok(None),
    }
}
