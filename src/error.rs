//! # 统一错误处理模块
//!
//! 定义 xrdbkg 的所有错误类型，使用 `thiserror` 派生。
//!
//! 背景提取核心的错误分为两类：
//! - `ErrorKind::Value`: 调用方传入的数据形状或参数不合法
//! - `ErrorKind::Domain`: 数据合法但数学上无法处理（步长退化、拟合秩亏）
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 输入形状或参数错误
    Value,
    /// 数值定义域错误
    Domain,
    /// 文件读写错误
    Io,
    /// 文件内容解析错误
    Parse,
    /// 其他错误
    Other,
}

/// xrdbkg 统一错误类型
#[derive(Error, Debug)]
pub enum XrdBkgError {
    // ─────────────────────────────────────────────────────────────
    // 输入形状 / 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Shape mismatch: x has {x_len} points but y has {y_len}")]
    ShapeMismatch { x_len: usize, y_len: usize },

    #[error("Too few points: need at least {min}, got {got}")]
    TooFewPoints { min: usize, got: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // ─────────────────────────────────────────────────────────────
    // 数值定义域错误
    // ─────────────────────────────────────────────────────────────
    #[error("Degenerate x spacing: {0}")]
    DegenerateSpacing(String),

    #[error("Chebyshev order {order} is rank deficient for {len} points (order must be < {len})")]
    RankDeficient { order: usize, len: usize },

    #[error("Least squares fit failed: {0}")]
    SingularFit(String),

    #[error("Invalid wavelength: {0}")]
    InvalidWavelength(String),

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl XrdBkgError {
    /// 返回错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            XrdBkgError::ShapeMismatch { .. }
            | XrdBkgError::TooFewPoints { .. }
            | XrdBkgError::InvalidParameter(_)
            | XrdBkgError::InvalidArgument(_) => ErrorKind::Value,

            XrdBkgError::DegenerateSpacing(_)
            | XrdBkgError::RankDeficient { .. }
            | XrdBkgError::SingularFit(_)
            | XrdBkgError::InvalidWavelength(_) => ErrorKind::Domain,

            XrdBkgError::FileReadError { .. }
            | XrdBkgError::FileWriteError { .. }
            | XrdBkgError::FileNotFound { .. } => ErrorKind::Io,

            XrdBkgError::ParseError { .. }
            | XrdBkgError::UnsupportedFormat(_)
            | XrdBkgError::CsvError(_) => ErrorKind::Parse,

            XrdBkgError::Other(_) => ErrorKind::Other,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, XrdBkgError>;
