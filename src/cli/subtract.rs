//! # subtract 子命令 CLI 定义
//!
//! 背景提取与扣除：单文件模式输出一个文件，目录模式并行批量处理。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/subtract.rs`

use crate::background::BackgroundParams;
use crate::batch::collector::DEFAULT_PATTERN;
use crate::models::{ScaleMethod, XAxis};
use crate::xrd::PlotMode;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// PNG image
    Png,
    /// SVG vector image
    Svg,
    /// CSV data file (x, intensity, background, subtracted)
    Csv,
    /// XY data file (x, intensity, background, subtracted)
    Xy,
}

impl OutputFormat {
    /// 文件扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::Csv => "csv",
            OutputFormat::Xy => "xy",
        }
    }
}

/// subtract 子命令参数
#[derive(Args, Debug)]
pub struct SubtractArgs {
    /// Input: pattern file (.xy, .csv, .dat, .chi) or directory of patterns
    pub input: PathBuf,

    /// Output: file path (single mode) or directory (batch mode)
    #[arg(short, long, default_value = "xrd_background.png")]
    pub output: PathBuf,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Abscissa of the input file
    #[arg(long, value_enum, default_value = "q")]
    pub axis: XAxis,

    /// Abscissa for plots and exported data (default: same as input)
    #[arg(long, value_enum)]
    pub x_axis: Option<XAxis>,

    /// X-ray wavelength: source name (cu-ka, mo-ka, ...) or value in Å; overrides the file header
    #[arg(short, long)]
    pub wavelength: Option<String>,

    /// X-ray energy in eV (alternative to --wavelength)
    #[arg(short, long, conflicts_with = "wavelength")]
    pub energy: Option<f64>,

    // ─────────────────────────────────────────────────────────────
    // 背景参数
    // ─────────────────────────────────────────────────────────────
    /// Bruckner smoothing window width, in q units (Å⁻¹)
    #[arg(long, default_value_t = 0.1, env = "XRDBKG_SMOOTH_WIDTH")]
    pub smooth_width: f64,

    /// Number of Bruckner smoothing iterations
    #[arg(long, default_value_t = 40, env = "XRDBKG_ITERATIONS")]
    pub iterations: usize,

    /// Order of the fitted Chebyshev polynomial
    #[arg(long, default_value_t = 40, env = "XRDBKG_CHEB_ORDER")]
    pub cheb_order: usize,

    // ─────────────────────────────────────────────────────────────
    // 显示参数
    // ─────────────────────────────────────────────────────────────
    /// What to plot
    #[arg(long, value_enum, default_value = "raw-bkg")]
    pub plot: PlotMode,

    /// How to compute the intensity scale factor
    #[arg(long, value_enum, default_value = "raw-max")]
    pub scale_method: ScaleMethod,

    /// Fixed intensity scale factor (disables --scale-method)
    #[arg(long)]
    pub scale: Option<f64>,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Title for the plot (default: pattern name)
    #[arg(long)]
    pub title: Option<String>,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob patterns for input files (batch mode, comma separated)
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

impl SubtractArgs {
    /// 背景参数
    pub fn background_params(&self) -> BackgroundParams {
        BackgroundParams::new(self.smooth_width, self.iterations, self.cheb_order)
    }
}
