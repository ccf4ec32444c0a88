//! Yahoo Finance 代理后端服务
//!
//! 提供股票详情、历史K线和日内洞察的 RESTful API
//! 上游不可用时自动降级为模拟行情，接口形状保持不变

mod config;     // 配置加载
mod handlers;   // HTTP 请求处理器
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::AppConfig;
use crate::services::yahoo_service::YahooService;

/// 应用程序入口
///
/// 加载配置并启动 HTTP 服务器，默认监听 0.0.0.0:5000
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load();

    // 初始化日志系统，级别来自配置，可被 RUST_LOG 覆盖
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    let bind_addr = config.bind_addr();
    log::info!("启动 Yahoo Finance 代理服务，监听 {}", bind_addr);

    // 全部请求共享同一个上游客户端
    let service = web::Data::new(YahooService::new(&config.api));

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())       // 请求日志中间件
            .app_data(service.clone())     // 行情网关
            .configure(handlers::config)   // 配置路由
    });

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(bind_addr)?.run().await
}
