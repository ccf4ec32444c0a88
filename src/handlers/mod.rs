pub mod health;
pub mod intraday;
pub mod stock;

use actix_web::web;

/// 路由全部挂在根路径下，与前端约定的接口路径一致
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::config)
        .configure(stock::config)
        .configure(intraday::config);
}
