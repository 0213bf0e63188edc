//! # XRD 输出模块
//!
//! 一维衍射图样的导出与绘图。
//!
//! ## 子模块
//! - `export`: 数据导出 (CSV/XY)
//! - `plot`: 图表生成 (PNG/SVG)
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/pattern.rs`

pub mod export;
pub mod plot;

pub use plot::PlotMode;
