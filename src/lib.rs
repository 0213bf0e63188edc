//! # xrdbkg - 一维 XRD 图样背景提取
//!
//! 对粉末衍射的一维积分图样做背景估计：
//! 先用迭代 Bruckner 平滑压低峰，再用高阶 Chebyshev 多项式拟合平滑后的曲线。
//!
//! ## 模块
//! - `background` - 核心算法（Bruckner 平滑、Chebyshev 拟合、`extract_background`）
//! - `models`     - 图样、横坐标与缩放方式
//! - `parsers`    - XY / CSV 图样读取
//! - `xrd`        - 导出与绘图
//! - `batch`      - 批量并行处理
//! - `cli` / `commands` - 命令行定义与执行
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/    (图样读取)
//!   │     ├── models/     (数据模型)
//!   │     ├── background/ (背景算法)
//!   │     └── xrd/        (导出、绘图)
//!   ├── utils/      (输出、进度条)
//!   └── error.rs    (错误处理)
//! ```

pub mod background;
pub mod batch;
pub mod cli;
pub mod commands;
pub mod error;
pub mod models;
pub mod parsers;
pub mod utils;
pub mod xrd;

pub use background::{extract_background, BackgroundParams};
pub use error::{ErrorKind, Result, XrdBkgError};
