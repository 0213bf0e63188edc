//! # 图样图表生成
//!
//! 使用 `plotters` 库绘制一维衍射图样。
//!
//! ## 绘图模式
//! - `raw`: 原始强度
//! - `raw-bkg`: 原始强度 + 背景
//! - `sub`: 扣背景后的强度
//!
//! 所有曲线都除以图样的缩放因子；支持 PNG 和 SVG 输出。
//!
//! ## 依赖关系
//! - 被 `commands/subtract.rs` 调用
//! - 使用 `models/pattern.rs` 的 Pattern1D
//! - 使用 `plotters` 渲染图表

use crate::error::{Result, XrdBkgError};
use crate::models::{Pattern1D, XAxis};

use clap::ValueEnum;
use plotters::prelude::*;
use std::path::Path;

/// 绘图模式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum PlotMode {
    /// Raw data
    Raw,
    /// Raw data + background
    #[default]
    RawBkg,
    /// Background-subtracted data
    Sub,
}

impl PlotMode {
    /// 是否需要背景
    pub fn needs_background(&self) -> bool {
        !matches!(self, PlotMode::Raw)
    }

    /// 纵轴说明
    pub fn y_label(&self) -> &'static str {
        match self {
            PlotMode::Raw => "Scaled Intensity",
            PlotMode::RawBkg => "Scaled Intensity with Background",
            PlotMode::Sub => "Scaled (Intensity - Background)",
        }
    }
}

/// 一条待绘制的曲线
#[derive(Debug, Clone)]
pub struct Curve {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// 按绘图模式生成曲线（已除以缩放因子）
pub fn build_curves(pattern: &Pattern1D, mode: PlotMode, axis: XAxis) -> Result<Vec<Curve>> {
    let x = pattern.axis_values(axis)?;
    let scale = pattern.scale;

    let scaled = |values: &[f64]| -> Vec<(f64, f64)> {
        x.iter()
            .zip(values.iter())
            .map(|(&a, &b)| (a, b / scale))
            .collect()
    };

    let missing_background = || {
        XrdBkgError::Other(format!(
            "Plot mode {:?} needs a background for '{}'",
            mode, pattern.label
        ))
    };

    let curves = match mode {
        PlotMode::Raw => vec![Curve {
            label: pattern.label.clone(),
            points: scaled(&pattern.intensity),
        }],
        PlotMode::RawBkg => {
            let bkg = pattern.background().ok_or_else(missing_background)?;
            vec![
                Curve {
                    label: pattern.label.clone(),
                    points: scaled(&pattern.intensity),
                },
                Curve {
                    label: "background".to_string(),
                    points: scaled(bkg),
                },
            ]
        }
        PlotMode::Sub => {
            let sub = pattern.subtracted().ok_or_else(missing_background)?;
            vec![Curve {
                label: pattern.label.clone(),
                points: scaled(&sub),
            }]
        }
    };

    Ok(curves)
}

/// 生成图样图表
#[allow(clippy::too_many_arguments)]
pub fn generate_pattern_plot(
    pattern: &Pattern1D,
    mode: PlotMode,
    axis: XAxis,
    output_path: &Path,
    title: &str,
    width: u32,
    height: u32,
    use_svg: bool,
) -> Result<()> {
    let curves = build_curves(pattern, mode, axis)?;

    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_curves(&root, &curves, title, axis, mode, pattern.wavelength)?;
        root.present()
            .map_err(|e| XrdBkgError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_curves(&root, &curves, title, axis, mode, pattern.wavelength)?;
        root.present()
            .map_err(|e| XrdBkgError::Other(e.to_string()))?;
    }
    Ok(())
}

/// 所有曲线有限值的范围
fn data_bounds(curves: &[Curve]) -> ((f64, f64), (f64, f64)) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for (x, y) in curves.iter().flat_map(|c| c.points.iter()) {
        if x.is_finite() && y.is_finite() {
            x_min = x_min.min(*x);
            x_max = x_max.max(*x);
            y_min = y_min.min(*y);
            y_max = y_max.max(*y);
        }
    }

    if !(x_min < x_max) {
        x_min = 0.0;
        x_max = 1.0;
    }
    if !(y_min < y_max) {
        y_min = 0.0;
        y_max = 1.0;
    }

    let pad = (y_max - y_min) * 0.05;
    ((x_min, x_max), (y_min - pad, y_max + pad))
}

/// 绘制图表的核心逻辑
fn draw_curves<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    curves: &[Curve],
    title: &str,
    axis: XAxis,
    mode: PlotMode,
    wavelength: Option<f64>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| XrdBkgError::Other(format!("{:?}", e)))?;

    let ((x_min, x_max), (y_min, y_max)) = data_bounds(curves);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| XrdBkgError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc(axis.label())
        .y_desc(mode.y_label())
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| XrdBkgError::Other(format!("{:?}", e)))?;

    let palette = [RGBColor(0, 102, 204), RGBColor(214, 39, 40), RGBColor(44, 160, 44)];

    for (idx, curve) in curves.iter().enumerate() {
        let color = palette[idx % palette.len()];
        chart
            .draw_series(LineSeries::new(
                curve
                    .points
                    .iter()
                    .copied()
                    .filter(|(x, y)| x.is_finite() && y.is_finite()),
                color.stroke_width(2),
            ))
            .map_err(|e| XrdBkgError::Other(format!("{:?}", e)))?
            .label(curve.label.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()
        .map_err(|e| XrdBkgError::Other(format!("{:?}", e)))?;

    // 波长信息
    if let Some(wl) = wavelength {
        let wavelength_text = format!("λ = {:.4} Å", wl);
        let x_pos = x_min + (x_max - x_min) * 0.80;
        let y_pos = y_min + (y_max - y_min) * 0.95;
        chart
            .draw_series(std::iter::once(Text::new(
                wavelength_text,
                (x_pos, y_pos),
                ("sans-serif", 14).into_font().color(&BLACK),
            )))
            .map_err(|e| XrdBkgError::Other(format!("{:?}", e)))?;
    }

    Ok(())
}
