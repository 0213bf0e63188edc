//! # convert 子命令实现
//!
//! 把图样从一种横坐标换算到另一种（q / 2θ / d），按新坐标递增写出 XY 文件。
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的 ConvertArgs
//! - 使用 `parsers/` 读取图样
//! - 使用 `xrd/export.rs` 写出

use crate::cli::convert::ConvertArgs;
use crate::cli::resolve_wavelength;
use crate::error::{Result, XrdBkgError};
use crate::models::Pattern1D;
use crate::parsers;
use crate::utils::output;
use crate::xrd;

/// 执行坐标换算
pub fn execute(args: ConvertArgs) -> Result<()> {
    output::print_header("XRD 1D Axis Conversion");

    if !args.input.is_file() {
        return Err(XrdBkgError::FileNotFound {
            path: args.input.display().to_string(),
        });
    }

    if args.output.exists() && !args.overwrite {
        output::print_warning(&format!(
            "Output exists, use --overwrite to replace: {}",
            args.output.display()
        ));
        return Ok(());
    }

    let raw = parsers::parse_pattern_file(&args.input)?;
    let wavelength = resolve_wavelength(args.wavelength.as_deref(), args.energy)?.or(raw.wavelength);

    if let Some(wl) = wavelength {
        output::print_info(&format!("Using wavelength: {:.6} Å", wl));
    }
    output::print_info(&format!("{} -> {}", args.from.label(), args.to.label()));

    let pattern = Pattern1D::from_axis(raw.name, args.from, &raw.x, raw.y, wavelength)?;
    let (x, y) = converted_series(&pattern, args.to)?;

    xrd::export::series_to_xy(&x, &y, args.to, &pattern.label, wavelength, &args.output)?;

    output::print_conversion(
        &args.input.display().to_string(),
        &args.output.display().to_string(),
    );
    Ok(())
}

/// 目标坐标下的 (x, 强度)，按 x 递增排列
fn converted_series(pattern: &Pattern1D, to: crate::models::XAxis) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut x = pattern.axis_values(to)?;
    let mut y = pattern.intensity.clone();
    if x.len() >= 2 && x[0] > x[x.len() - 1] {
        x.reverse();
        y.reverse();
    }
    Ok((x, y))
}
