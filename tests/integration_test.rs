use auto_poster::browser::{BrowserLauncher, BrowserSession, ChromeLauncher, PageDriver};
use auto_poster::config::Config;
use auto_poster::logger;
use auto_poster::models::load_catalog;
use auto_poster::services::NoopNotifier;
use auto_poster::services::DiagnosticsWriter;
use auto_poster::workflow::SessionEstablisher;

#[tokio::test]
#[ignore] // 默认忽略，需要本机 Chrome：cargo test -- --ignored
async fn test_launch_and_close_browser() {
    logger::init();

    let config = Config::from_env();
    let launcher = ChromeLauncher::new(&config);

    let session = launcher.launch().await.expect("启动浏览器失败");
    session
        .page()
        .goto(&config.home_url)
        .await
        .expect("打开首页失败");

    let url = session.page().current_url().await.expect("读取地址失败");
    println!("当前地址: {:?}", url);

    session.close().await.expect("关闭浏览器失败");
}

#[tokio::test]
#[ignore]
async fn test_establish_session_with_saved_profile() {
    logger::init();

    // 需要 USER_DATA_DIR 指向已登录过的浏览器目录，或配置 LOGIN_USERNAME/LOGIN_PASSWORD
    let config = Config::from_env();
    let launcher = ChromeLauncher::new(&config);
    let diagnostics = DiagnosticsWriter::new(config.screenshot_dir.clone());

    let session = launcher.launch().await.expect("启动浏览器失败");
    let outcome = SessionEstablisher::new(&config, &NoopNotifier, &diagnostics)
        .establish(session.page())
        .await;
    session.close().await.ok();

    println!("会话结果: {}", outcome);
    assert!(outcome.is_authenticated(), "应该能够进入已登录状态");
}

#[tokio::test]
#[ignore]
async fn test_load_configured_catalog() {
    logger::init();

    let config = Config::from_env();
    let catalog = load_catalog(&config.catalog_file)
        .await
        .expect("加载内容目录失败");

    println!("共 {} 条帖子，话题: {:?}", catalog.len(), catalog.topic_names());
    assert!(!catalog.is_empty());
}
