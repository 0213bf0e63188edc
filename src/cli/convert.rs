//! # convert 子命令 CLI 定义
//!
//! 把图样换算到另一种横坐标并写出 XY 文件。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use crate::models::XAxis;

use clap::Args;
use std::path::PathBuf;

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input pattern file (.xy, .csv, .dat, .chi)
    pub input: PathBuf,

    /// Output XY file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Abscissa of the input file
    #[arg(long, value_enum, default_value = "two-theta")]
    pub from: XAxis,

    /// Abscissa of the output file
    #[arg(long, value_enum, default_value = "q")]
    pub to: XAxis,

    /// X-ray wavelength: source name (cu-ka, mo-ka, ...) or value in Å; overrides the file header
    #[arg(short, long)]
    pub wavelength: Option<String>,

    /// X-ray energy in eV (alternative to --wavelength)
    #[arg(short, long, conflicts_with = "wavelength")]
    pub energy: Option<f64>,

    /// Overwrite an existing output file
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
