use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use tracing::info;

/// 初始化 tracing 日志
///
/// 日志级别通过 RUST_LOG 环境变量控制；
/// 未设置时 verbose 模式默认 debug，否则 info。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n文档提取日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(model_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量文档字段提取模式");
    info!("🤖 提取模型: {}", model_name);
    info!("💡 文档逐个顺序处理，同一时刻只有一个在途请求");
    info!("{}", "=".repeat(60));
}

/// 记录本次运行的输入概况
///
/// # 参数
/// - `documents`: 文档数量
/// - `headers`: 表头列数
/// - `selected`: 选中列数
pub fn log_run_inputs(documents: usize, headers: usize, selected: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量提取");
    info!("📄 文档: {} 个", documents);
    info!("📋 表头: {} 列，其中选中 {} 列", headers, selected);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `rows`: 产出行数
/// - `total`: 文档总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(rows: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 批处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 成功: {}/{}", rows, total);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
