//! # 图样数据导出
//!
//! 导出图样、背景和扣背景结果到 CSV 和 XY 格式。
//!
//! ## 支持格式
//! - CSV: 表头 + `x, intensity, background, subtracted`，未计算背景时后两列留空
//! - XY: 注释头（名称、波长、列说明）+ 空白分隔的数据列
//!
//! ## 依赖关系
//! - 被 `commands/subtract.rs` 和 `commands/convert.rs` 调用
//! - 使用 `models/pattern.rs` 的 Pattern1D
//! - 使用 `csv` + `serde` 写入 CSV 文件

use crate::error::{Result, XrdBkgError};
use crate::models::{Pattern1D, XAxis};

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// CSV 数据行
#[derive(Debug, Serialize)]
struct ExportRow {
    x: f64,
    intensity: f64,
    background: Option<f64>,
    subtracted: Option<f64>,
}

/// 构造导出行（横坐标按 `axis` 换算）
fn build_rows(pattern: &Pattern1D, axis: XAxis) -> Result<Vec<ExportRow>> {
    let x = pattern.axis_values(axis)?;
    let bkg = pattern.background();

    Ok(x.iter()
        .zip(pattern.intensity.iter())
        .enumerate()
        .map(|(i, (&x, &intensity))| {
            let background = bkg.map(|b| b[i]);
            ExportRow {
                x,
                intensity,
                background,
                subtracted: background.map(|b| intensity - b),
            }
        })
        .collect())
}

/// 导出图样为 CSV 格式
pub fn pattern_to_csv(pattern: &Pattern1D, axis: XAxis, output_path: &Path) -> Result<()> {
    let rows = build_rows(pattern, axis)?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output_path)?;

    wtr.write_record([axis.column_name(), "intensity", "background", "subtracted"])?;
    for row in &rows {
        wtr.serialize(row)?;
    }

    wtr.flush().map_err(|e| XrdBkgError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出图样为 XY 格式
pub fn pattern_to_xy(pattern: &Pattern1D, axis: XAxis, output_path: &Path) -> Result<()> {
    let rows = build_rows(pattern, axis)?;
    let mut file = create_writer(output_path)?;
    write_pattern_xy(&mut file, pattern, axis, &rows).map_err(write_error(output_path))
}

/// 导出两列数据为 XY 格式
pub fn series_to_xy(
    x: &[f64],
    y: &[f64],
    axis: XAxis,
    name: &str,
    wavelength: Option<f64>,
    output_path: &Path,
) -> Result<()> {
    let mut file = create_writer(output_path)?;
    write_series_xy(&mut file, x, y, axis, name, wavelength).map_err(write_error(output_path))
}

fn write_pattern_xy<W: Write>(
    out: &mut W,
    pattern: &Pattern1D,
    axis: XAxis,
    rows: &[ExportRow],
) -> io::Result<()> {
    write_xy_header(out, &pattern.label, pattern.wavelength)?;
    if pattern.background().is_some() {
        writeln!(
            out,
            "# Columns: {}, intensity, background, intensity-background",
            axis.column_name()
        )?;
        if let Some(p) = pattern.background_params() {
            writeln!(
                out,
                "# Background: smooth_width={} iterations={} cheb_order={}",
                p.smooth_width, p.iterations, p.cheb_order
            )?;
        }
    } else {
        writeln!(out, "# Columns: {}, intensity", axis.column_name())?;
    }
    writeln!(out, "#")?;

    for row in rows {
        match (row.background, row.subtracted) {
            (Some(b), Some(s)) => {
                writeln!(out, "{:.6}\t{:.6}\t{:.6}\t{:.6}", row.x, row.intensity, b, s)?
            }
            _ => writeln!(out, "{:.6}\t{:.6}", row.x, row.intensity)?,
        }
    }
    out.flush()
}

fn write_series_xy<W: Write>(
    out: &mut W,
    x: &[f64],
    y: &[f64],
    axis: XAxis,
    name: &str,
    wavelength: Option<f64>,
) -> io::Result<()> {
    write_xy_header(out, name, wavelength)?;
    writeln!(out, "# Columns: {}, intensity", axis.column_name())?;
    writeln!(out, "#")?;

    for (a, b) in x.iter().zip(y.iter()) {
        writeln!(out, "{:.6}\t{:.6}", a, b)?;
    }
    out.flush()
}

fn write_xy_header<W: Write>(out: &mut W, name: &str, wavelength: Option<f64>) -> io::Result<()> {
    writeln!(out, "# XRD Pattern: {}", name)?;
    if let Some(wl) = wavelength {
        writeln!(out, "# Wavelength: {:.6} Angstrom", wl)?;
    }
    Ok(())
}

fn create_writer(output_path: &Path) -> Result<BufWriter<File>> {
    File::create(output_path)
        .map(BufWriter::new)
        .map_err(write_error(output_path))
}

fn write_error(output_path: &Path) -> impl Fn(io::Error) -> XrdBkgError + '_ {
    move |e| XrdBkgError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::BackgroundParams;
    use crate::parsers::xy::parse_xy_content;

    fn pattern_with_background() -> Pattern1D {
        let q: Vec<f64> = (0..40).map(|i| 1.0 + 0.05 * i as f64).collect();
        let intensity: Vec<f64> = q.iter().map(|&v| 10.0 + v).collect();
        let mut p = Pattern1D::new("exported", q, intensity, Some(0.7093)).unwrap();
        p.compute_background(&BackgroundParams::new(0.2, 5, 2)).unwrap();
        p
    }

    #[test]
    fn test_rows_carry_background() {
        let p = pattern_with_background();
        let rows = build_rows(&p, XAxis::Q).unwrap();
        assert_eq!(rows.len(), 40);
        let r = &rows[3];
        let b = r.background.unwrap();
        assert!((r.subtracted.unwrap() - (r.intensity - b)).abs() < 1e-12);
    }

    #[test]
    fn test_rows_without_background() {
        let p = Pattern1D::new("plain", vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], None).unwrap();
        let rows = build_rows(&p, XAxis::D).unwrap();
        assert!(rows.iter().all(|r| r.background.is_none()));
        assert!((rows[0].x - 2.0 * std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_series_xy_is_readable_back() {
        let mut buf = Vec::new();
        write_series_xy(&mut buf, &[1.0, 1.1], &[2.0, 2.1], XAxis::Q, "CeO2", Some(0.424589)).unwrap();
        let content = String::from_utf8(buf).unwrap();
        let raw = parse_xy_content(&content, "other").unwrap();
        assert_eq!(raw.name, "CeO2");
        assert_eq!(raw.wavelength, Some(0.424589));
        assert_eq!(raw.x, vec![1.0, 1.1]);
    }

    #[test]
    fn test_pattern_xy_has_four_columns() {
        let p = pattern_with_background();
        let rows = build_rows(&p, XAxis::Q).unwrap();
        let mut buf = Vec::new();
        write_pattern_xy(&mut buf, &p, XAxis::Q, &rows).unwrap();
        let content = String::from_utf8(buf).unwrap();
        assert!(content.contains("# Background: smooth_width=0.2 iterations=5 cheb_order=2"));
        let first = content.lines().find(|l| !l.starts_with('#')).unwrap();
        assert_eq!(first.split('\t').count(), 4);
        assert_eq!(parse_xy_content(&content, "x").unwrap().x.len(), 40);
    }

    #[test]
    fn test_write_to_missing_directory_fails() {
        let p = pattern_with_background();
        let err = pattern_to_xy(&p, XAxis::Q, Path::new("/nonexistent-dir/out.xy")).unwrap_err();
        assert!(matches!(err, XrdBkgError::FileWriteError { .. }));
    }
}
