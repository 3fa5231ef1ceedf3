//! # 示例应用程序
//!
//! 用 axum 承载注解声明的控制器：`cargo run -p example-app -- --once "/api/user?id=7"`

mod controllers;
mod services;
mod transport;

use app_composition::{ApplicationSettings, LoggingConfig, WebApplicationBuilder};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use web_mvc::{WebRequest, WebResponse};

/// 未配置扫描根时扫描本 crate
const DEFAULT_SCAN_PACKAGE: &str = "example_app";

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "MiniSpring RS 示例应用")]
struct Args {
    /// 配置文件路径，默认读取 config/app.*
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 扫描根，覆盖配置
    #[arg(long)]
    scan: Option<String>,

    /// 监听地址，覆盖配置
    #[arg(long)]
    bind: Option<String>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 只分发一个 GET 请求并打印结果，例如 "/api/user?id=7"
    #[arg(long)]
    once: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => ApplicationSettings::load_from(path)?,
        None => ApplicationSettings::load()?,
    };
    if let Some(scan) = args.scan {
        settings.scan.package = scan;
    }
    if settings.scan_packages().is_empty() {
        settings.scan.package = DEFAULT_SCAN_PACKAGE.to_string();
    }
    if let Some(bind) = args.bind {
        settings.server.bind = bind;
    }

    let app = WebApplicationBuilder::new(settings)
        .with_logging(LoggingConfig::default().with_level_name(&args.log_level))
        .build()?;

    if let Some(target) = &args.once {
        let mut response = WebResponse::new();
        app.service(&WebRequest::get(target), &mut response);
        match response.forwarded() {
            Some(forward) => println!("{} forward -> {}", response.status(), forward.target),
            None => println!("{} {}", response.status(), response.body()),
        }
        app.shutdown();
        return Ok(());
    }

    let bind = app.settings().server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("示例应用监听 http://{}", bind);

    axum::serve(listener, transport::router(app.dispatcher()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    app.shutdown();
    info!("应用已关闭");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("监听退出信号失败: {}", e);
    }
    info!("收到退出信号，正在关闭应用");
}
