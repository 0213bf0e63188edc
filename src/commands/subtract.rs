//! # subtract 子命令实现
//!
//! 读取一维衍射图样，提取并扣除背景，导出数据或绘图。
//!
//! ## 功能
//! - 支持单文件和批量目录处理
//! - 并行处理（rayon）
//! - 背景在 q 坐标上计算，输出可换算到 2θ 或 d
//! - 输出图像 (PNG/SVG) 或数据文件 (CSV/XY)
//!
//! ## 依赖关系
//! - 使用 `cli/subtract.rs` 定义的 SubtractArgs
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `parsers/` 读取图样
//! - 使用 `xrd/` 模块导出和绘图

use crate::background::{self, BackgroundParams};
use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::resolve_wavelength;
use crate::cli::subtract::{OutputFormat, SubtractArgs};
use crate::error::{Result, XrdBkgError};
use crate::models::{Pattern1D, ScaleMethod, XAxis};
use crate::parsers;
use crate::utils::output;
use crate::xrd::{self, PlotMode};

use std::fs;
use std::path::{Path, PathBuf};

/// 单次处理所需的全部配置
#[derive(Debug, Clone)]
struct SubtractConfig {
    params: BackgroundParams,
    wavelength: Option<f64>,
    axis: XAxis,
    x_axis: XAxis,
    format: OutputFormat,
    plot: PlotMode,
    scale_method: ScaleMethod,
    scale: Option<f64>,
    width: u32,
    height: u32,
    title: Option<String>,
}

/// 执行背景扣除
pub fn execute(args: SubtractArgs) -> Result<()> {
    output::print_header("XRD 1D Background Subtraction");

    let params = args.background_params();
    params.validate()?;

    if let Some(scale) = args.scale {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(XrdBkgError::InvalidArgument(format!(
                "--scale must be positive, got {}",
                scale
            )));
        }
    }

    let wavelength = resolve_wavelength(args.wavelength.as_deref(), args.energy)?;

    if args.input.is_file() {
        execute_single_file(&args, params, wavelength)
    } else if args.input.is_dir() {
        execute_batch(&args, params, wavelength)
    } else {
        Err(XrdBkgError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

fn build_config(
    args: &SubtractArgs,
    params: BackgroundParams,
    wavelength: Option<f64>,
    format: OutputFormat,
) -> SubtractConfig {
    SubtractConfig {
        params,
        wavelength,
        axis: args.axis,
        x_axis: args.x_axis.unwrap_or(args.axis),
        format,
        plot: args.plot,
        scale_method: args.scale_method,
        scale: args.scale,
        width: args.width,
        height: args.height,
        title: args.title.clone(),
    }
}

fn print_params(config: &SubtractConfig) {
    output::print_info("Background parameters:");
    output::print_param("smooth_width", config.params.smooth_width);
    output::print_param("iterations", config.params.iterations);
    output::print_param("cheb_order", config.params.cheb_order);
    if let Some(wl) = config.wavelength {
        output::print_param("wavelength (Å)", format!("{:.6}", wl));
    }
}

/// 单文件模式
fn execute_single_file(
    args: &SubtractArgs,
    params: BackgroundParams,
    wavelength: Option<f64>,
) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let format = args
        .format
        .unwrap_or_else(|| guess_format_from_extension(&args.output));
    let config = build_config(args, params, wavelength, format);
    print_params(&config);

    let pattern = process_pattern(&args.input, &args.output, &config)?;

    print_summary_table(&pattern, &config.params);
    output::print_success(&format!(
        "{} output saved to '{}'",
        format.extension().to_uppercase(),
        args.output.display()
    ));

    Ok(())
}

/// 批量处理模式
fn execute_batch(args: &SubtractArgs, params: BackgroundParams, wavelength: Option<f64>) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} pattern files", files.len()));

    fs::create_dir_all(&args.output).map_err(|e| XrdBkgError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    let format = args.format.unwrap_or(OutputFormat::Png);
    output::print_info(&format!("Output format: {:?}", format));

    let config = build_config(args, params, wavelength, format);
    print_params(&config);

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Running with {} parallel jobs", runner.jobs()));

    let result = runner.run(&files, |file| {
        process_batch_file(file, &args.output, &config, args.overwrite)
    })?;

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} success, {} skipped, {} failed",
        result.success, result.skipped, result.failed
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    Ok(())
}

/// 批量输出文件名：`<stem>_bkg.<ext>`
fn batch_output_path(input: &Path, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("pattern");
    output_dir.join(format!("{}_bkg.{}", stem, format.extension()))
}

/// 处理批量模式中的单个文件
fn process_batch_file(
    input: &PathBuf,
    output_dir: &Path,
    config: &SubtractConfig,
    overwrite: bool,
) -> ProcessResult {
    let output_file = batch_output_path(input, output_dir, config.format);

    if output_file.exists() && !overwrite {
        return ProcessResult::Skipped(format!(
            "Output exists, skipping: {}",
            output_file.display()
        ));
    }

    match process_pattern(input, &output_file, config) {
        Ok(_) => {
            ProcessResult::Success(format!("{} -> {}", input.display(), output_file.display()))
        }
        Err(e) => ProcessResult::Failed(input.display().to_string(), e.to_string()),
    }
}

/// 读取图样；命令行波长优先于文件头
fn load_pattern(input: &Path, axis: XAxis, wavelength: Option<f64>) -> Result<Pattern1D> {
    let raw = parsers::parse_pattern_file(input)?;
    let wavelength = wavelength.or(raw.wavelength);
    Pattern1D::from_axis(raw.name, axis, &raw.x, raw.y, wavelength)
}

/// 读取、扣背景、缩放并输出一个图样
fn process_pattern(input: &Path, output: &Path, config: &SubtractConfig) -> Result<Pattern1D> {
    let mut pattern = load_pattern(input, config.axis, config.wavelength)?;

    pattern.compute_background(&config.params)?;

    match config.scale {
        Some(scale) => pattern.set_scale(scale)?,
        None => {
            pattern.auto_scale(config.scale_method, &config.params)?;
        }
    }

    write_output(&pattern, output, config)?;
    Ok(pattern)
}

fn write_output(pattern: &Pattern1D, output: &Path, config: &SubtractConfig) -> Result<()> {
    match config.format {
        OutputFormat::Png | OutputFormat::Svg => {
            let title = config
                .title
                .clone()
                .unwrap_or_else(|| pattern.label.clone());
            xrd::plot::generate_pattern_plot(
                pattern,
                config.plot,
                config.x_axis,
                output,
                &title,
                config.width,
                config.height,
                config.format == OutputFormat::Svg,
            )
        }
        OutputFormat::Csv => xrd::export::pattern_to_csv(pattern, config.x_axis, output),
        OutputFormat::Xy => xrd::export::pattern_to_xy(pattern, config.x_axis, output),
    }
}

/// 从文件扩展名推断输出格式
fn guess_format_from_extension(path: &Path) -> OutputFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("svg") => OutputFormat::Svg,
        Some("csv") => OutputFormat::Csv,
        Some("xy") | Some("dat") | Some("txt") => OutputFormat::Xy,
        _ => OutputFormat::Png,
    }
}

/// 背景统计
#[derive(Debug, Clone, PartialEq)]
struct BackgroundStats {
    min: f64,
    max: f64,
    mean: f64,
}

fn background_stats(bkg: &[f64]) -> Option<BackgroundStats> {
    if bkg.is_empty() {
        return None;
    }
    Some(BackgroundStats {
        min: bkg.iter().copied().fold(f64::INFINITY, f64::min),
        max: bkg.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean: bkg.iter().sum::<f64>() / bkg.len() as f64,
    })
}

/// 打印图样摘要表格
fn print_summary_table(pattern: &Pattern1D, params: &BackgroundParams) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct SummaryRow {
        #[tabled(rename = "Quantity")]
        name: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let mut rows = vec![
        SummaryRow {
            name: "Pattern".to_string(),
            value: pattern.label.clone(),
        },
        SummaryRow {
            name: "Points".to_string(),
            value: pattern.len().to_string(),
        },
        SummaryRow {
            name: "q range (Å⁻¹)".to_string(),
            value: format!(
                "{:.4} - {:.4}",
                pattern.q.first().copied().unwrap_or(f64::NAN),
                pattern.q.last().copied().unwrap_or(f64::NAN)
            ),
        },
    ];

    if let Ok(window) = background::window_from_width(&pattern.q, params.smooth_width) {
        rows.push(SummaryRow {
            name: "Smoothing window (points)".to_string(),
            value: format!("±{}", window),
        });
    }

    if let Some(stats) = pattern.background().and_then(background_stats) {
        rows.push(SummaryRow {
            name: "Background min / mean / max".to_string(),
            value: format!("{:.3} / {:.3} / {:.3}", stats.min, stats.mean, stats.max),
        });
    }

    rows.push(SummaryRow {
        name: "Scale".to_string(),
        value: format!("{:.4}", pattern.scale),
    });

    output::print_header("Background Summary");
    println!("{}", Table::new(&rows));
}
