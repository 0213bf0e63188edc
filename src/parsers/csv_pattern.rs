//! # CSV 格式解析器
//!
//! 读取带表头的 CSV 衍射数据：前两列为横坐标和强度，其余列忽略。
//! `#` 开头的行为注释。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `csv` 库读取

use crate::error::{Result, XrdBkgError};
use crate::parsers::RawPattern;

use std::io::Read;
use std::path::Path;

/// 解析 CSV 文件
pub fn parse_csv_file(path: &Path) -> Result<RawPattern> {
    let file = std::fs::File::open(path).map_err(|e| XrdBkgError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("pattern");

    parse_csv_reader(file, name).map_err(|e| match e {
        XrdBkgError::ParseError { reason, .. } => XrdBkgError::ParseError {
            format: "CSV".to_string(),
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// 从任意 reader 解析 CSV
pub fn parse_csv_reader<R: Read>(reader: R, name: &str) -> Result<RawPattern> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut x = Vec::new();
    let mut y = Vec::new();

    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        let (a, b) = match (record.get(0), record.get(1)) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(XrdBkgError::ParseError {
                    format: "CSV".to_string(),
                    path: name.to_string(),
                    reason: format!("record {} has fewer than two columns", idx + 1),
                });
            }
        };

        let parse = |s: &str| {
            s.parse::<f64>().map_err(|_| XrdBkgError::ParseError {
                format: "CSV".to_string(),
                path: name.to_string(),
                reason: format!("record {}: '{}' is not a number", idx + 1, s),
            })
        };

        x.push(parse(a)?);
        y.push(parse(b)?);
    }

    if x.is_empty() {
        return Err(XrdBkgError::ParseError {
            format: "CSV".to_string(),
            path: name.to_string(),
            reason: "no data rows found".to_string(),
        });
    }

    Ok(RawPattern {
        name: name.to_string(),
        x,
        y,
        wavelength: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_basic() {
        let data = "2theta,intensity,background\n10.0,5.5,1.0\n10.1,6.5,1.0\n10.2,7.5,1.0\n";
        let raw = parse_csv_reader(data.as_bytes(), "scan").unwrap();
        assert_eq!(raw.name, "scan");
        assert_eq!(raw.x, vec![10.0, 10.1, 10.2]);
        assert_eq!(raw.y, vec![5.5, 6.5, 7.5]);
    }

    #[test]
    fn test_parse_csv_rejects_text_value() {
        let data = "q,intensity\n1.0,abc\n";
        let err = parse_csv_reader(data.as_bytes(), "scan").unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_parse_csv_skips_comments() {
        let data = "q,I\n# instrument drift\n1.0,2.0\n1.1,2.5\n";
        let raw = parse_csv_reader(data.as_bytes(), "scan").unwrap();
        assert_eq!(raw.x.len(), 2);
    }
}
