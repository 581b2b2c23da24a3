//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use tracing::info;

use crate::config::Config;

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 程序配置
/// - `mode`: 运行模式描述
pub fn log_startup(config: &Config, mode: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 自动发帖程序启动 - {}", mode);
    info!(
        "🌐 首页: {} | 无头模式: {}",
        config.home_url, config.headless
    );
    info!(
        "📚 内容目录: {} | 已发布记录: {}",
        config.catalog_file.display(),
        config.ledger_file.display()
    );
    if let Some(topic) = &config.topic {
        info!("🏷️ 指定话题: {}", topic);
    }
    info!(
        "🔁 最多尝试 {} 次，首次重试间隔 {}s，倍数 {}",
        config.retry.max_attempts,
        config.retry.base_delay.as_secs(),
        config.retry.multiplier
    );
    info!("{}", "=".repeat(60));
}

/// 记录单次尝试开始
///
/// # 参数
/// - `attempt`: 当前尝试序号（从 1 开始）
/// - `max_attempts`: 最大尝试次数
pub fn log_attempt_start(attempt: u32, max_attempts: u32) {
    info!("\n{}", "─".repeat(60));
    info!("🔄 第 {}/{} 次尝试", attempt, max_attempts);
    info!("{}", "─".repeat(60));
}

/// 打印本轮运行结果
pub fn print_run_summary(published: bool, attempts: u32) {
    info!("\n{}", "=".repeat(60));
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    if published {
        info!("✅ 发布成功 (第 {} 次尝试)", attempts);
    } else {
        info!("❌ 共尝试 {} 次，全部失败", attempts);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_by_characters_not_bytes() {
        assert_eq!(truncate_text("你好世界", 2), "你好...");
        assert_eq!(truncate_text("short", 10), "short");
    }
}
