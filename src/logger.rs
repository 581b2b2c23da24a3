use tracing_subscriber::EnvFilter;

/// 初始化日志，`RUST_LOG` 优先，默认 info 级别
pub fn init() {
    init_with_verbosity(false);
}

/// 初始化日志，`verbose` 为真时默认 debug 级别
pub fn init_with_verbosity(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试中可能被多次调用，重复初始化直接忽略
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
