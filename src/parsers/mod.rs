//! # 解析器模块
//!
//! 读取一维衍射数据文件。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 子模块: xy, csv_pattern

pub mod csv_pattern;
pub mod xy;

use crate::error::{Result, XrdBkgError};
use std::path::Path;

/// 原始两列数据（横坐标单位由调用方决定）
#[derive(Debug, Clone)]
pub struct RawPattern {
    /// 图样名称
    pub name: String,
    /// 横坐标
    pub x: Vec<f64>,
    /// 强度
    pub y: Vec<f64>,
    /// 文件头中的波长 (Å)
    pub wavelength: Option<f64>,
}

/// 从文件路径推断格式并解析
pub fn parse_pattern_file(path: &Path) -> Result<RawPattern> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => csv_pattern::parse_csv_file(path),
        "xy" | "xye" | "dat" | "txt" | "chi" => xy::parse_xy_file(path),
        _ => Err(XrdBkgError::UnsupportedFormat(format!(
            "Cannot determine pattern format for: {}",
            path.display()
        ))),
    }
}
