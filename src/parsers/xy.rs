//! # XY 格式解析器
//!
//! 解析常见的两列（或多列）文本衍射数据。
//!
//! ## XY 格式说明
//! ```text
//! # XRD Pattern: sample_001
//! # Wavelength: 0.424589 Angstrom
//! # Columns: q, intensity
//! 1.0000   120.5
//! 1.0050   121.0
//! ...
//! ```
//! - `#`、`!`、`;` 开头的行为注释
//! - 波长可带单位 (`m`、`nm`、`pm`、`Å`)，统一换算为 Å；pyFAI 写作 `# Wavelength: 7.293e-11 m`
//! - 数据开始前无法解析的行视为列名表头并跳过
//! - 列之间可用空白或逗号分隔，只读取前两列
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `regex` 解析注释中的元数据

use crate::error::{Result, XrdBkgError};
use crate::models::axis;
use crate::parsers::RawPattern;

use regex::Regex;
use std::fs;
use std::path::Path;

/// 解析 .xy 文件
pub fn parse_xy_file(path: &Path) -> Result<RawPattern> {
    let content = fs::read_to_string(path).map_err(|e| XrdBkgError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("pattern");

    parse_xy_content(&content, name).map_err(|e| match e {
        XrdBkgError::ParseError { reason, .. } => XrdBkgError::ParseError {
            format: "XY".to_string(),
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// 从字符串内容解析 XY 格式
pub fn parse_xy_content(content: &str, default_name: &str) -> Result<RawPattern> {
    let wavelength_re = Regex::new(r"(?i)wavelength\s*[:=]\s*([-+0-9.eE]+)\s*(\p{L}+)?")
        .map_err(|e| XrdBkgError::Other(e.to_string()))?;
    let label_re = Regex::new(r"(?i)(?:xrd pattern|label)\s*:\s*(\S.*?)\s*$")
        .map_err(|e| XrdBkgError::Other(e.to_string()))?;

    let mut name = default_name.to_string();
    let mut wavelength: Option<f64> = None;
    let mut x = Vec::new();
    let mut y = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') || line.starts_with('!') || line.starts_with(';') {
            if let Some(cap) = wavelength_re.captures(line) {
                if let Ok(value) = cap[1].parse::<f64>() {
                    let unit = cap.get(2).map(|m| m.as_str());
                    wavelength = Some(axis::wavelength_to_angstrom(value, unit)?);
                }
            } else if let Some(cap) = label_re.captures(line) {
                name = cap[1].to_string();
            }
            continue;
        }

        let mut fields = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty());

        let parsed = match (fields.next(), fields.next()) {
            (Some(a), Some(b)) => match (a.parse::<f64>(), b.parse::<f64>()) {
                (Ok(a), Ok(b)) => Some((a, b)),
                _ => None,
            },
            _ => None,
        };

        match parsed {
            Some((a, b)) => {
                x.push(a);
                y.push(b);
            }
            // 数据前的列名行
            None if x.is_empty() => continue,
            None => {
                return Err(XrdBkgError::ParseError {
                    format: "XY".to_string(),
                    path: default_name.to_string(),
                    reason: format!("line {}: cannot read two numbers from '{}'", lineno + 1, line),
                });
            }
        }
    }

    if x.is_empty() {
        return Err(XrdBkgError::ParseError {
            format: "XY".to_string(),
            path: default_name.to_string(),
            reason: "no data rows found".to_string(),
        });
    }

    Ok(RawPattern {
        name,
        x,
        y,
        wavelength,
    })
}
