/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// - `LOG_LEVEL` 控制过滤规则，默认 `info`
/// - `LOG_FORMAT=json` 输出结构化日志
pub fn init() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let result = match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().try_init(),
        _ => builder.try_init(),
    };

    if let Err(e) = result {
        eprintln!("日志初始化失败: {}", e);
    }
}

/// 记录程序启动信息
pub fn log_startup(storage_dir: &str, debounce_ms: u64, interval_secs: u64) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 试卷编辑器启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("💾 草稿目录: {}", storage_dir);
    info!(
        "⏱️ 自动保存: 静默 {} 毫秒后保存, 每 {} 秒强制保存",
        debounce_ms, interval_secs
    );
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
