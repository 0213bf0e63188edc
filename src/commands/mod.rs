//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `xrd/`, `utils/`
//! - 子模块: subtract, convert

pub mod convert;
pub mod subtract;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Subtract(args) => subtract::execute(args),
        Commands::Convert(args) => convert::execute(args),
    }
}
