use std::process::ExitCode;

use anyhow::Result;
use auto_poster::{logger, App, Config};
use chrono::NaiveTime;
use clap::Parser;

/// 通过浏览器自动发布预先写好的帖子
#[derive(Parser, Debug)]
#[command(name = "auto_poster", version, about)]
struct Cli {
    /// 立即运行一轮后退出（默认按每日定时运行）
    #[arg(long)]
    now: bool,

    /// 只从指定话题中选内容
    #[arg(long)]
    topic: Option<String>,

    /// 使用有界面的浏览器，便于人工处理安全验证
    #[arg(long)]
    headed: bool,

    /// 每日运行时间，格式 HH:MM
    #[arg(long, value_parser = parse_time)]
    at: Option<NaiveTime>,
}

impl Cli {
    /// 命令行参数覆盖环境变量配置
    fn apply(&self, config: &mut Config) {
        if let Some(topic) = &self.topic {
            config.topic = Some(topic.clone());
        }
        if self.headed {
            config.headless = false;
        }
        if let Some(at) = self.at {
            config.schedule_time = at;
        }
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| format!("时间格式应为 HH:MM: {}", e))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::from_env();
    cli.apply(&mut config);

    // 初始化日志
    logger::init_with_verbosity(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config).await?;

    if cli.now {
        let outcome = app.run_once().await;
        if !outcome.is_published() {
            return Ok(ExitCode::FAILURE);
        }
    } else {
        app.run_scheduled().await;
    }

    Ok(ExitCode::SUCCESS)
}
