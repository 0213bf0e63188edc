//! # xrdbkg 命令行入口
//!
//! ## 子命令
//! - `subtract` - 提取并扣除背景，输出图像或数据
//! - `convert`  - 横坐标换算 (q / 2θ / d)

use clap::Parser;
use xrdbkg::cli::Cli;
use xrdbkg::{commands, utils};

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
