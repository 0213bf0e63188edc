//! # 数据模型模块
//!
//! 定义一维衍射图样、坐标换算和强度归一化。
//!
//! ## 依赖关系
//! - 被 `parsers/`、`xrd/` 和 `commands/` 使用
//! - 子模块: axis, pattern, scale

pub mod axis;
pub mod pattern;
pub mod scale;

pub use axis::XAxis;
pub use pattern::Pattern1D;
pub use scale::ScaleMethod;
