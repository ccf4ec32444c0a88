use actix_web::{web, HttpResponse, Result};
use chrono::{NaiveDate, Utc};

use crate::models::{IntradayCandle, IntradayQuery, IntradayResponse};
use crate::services::indicators::round2;
use crate::services::insights::calculate_insights;
use crate::services::yahoo_service::{MarketDataError, YahooService};
use crate::services::{mock_service, MarketData};

/// 上游只保留最近几天的日内数据，更早的日期直接走模拟
const INTRADAY_WINDOW_DAYS: i64 = 7;

/// GET /chart-with-chat
///
/// 返回指定日期的日内K线和盘面洞察；
/// 日期超出上游窗口或上游失败时降级为带动量偏置的模拟行情
pub async fn get_chart_with_chat(
    service: web::Data<YahooService>,
    query: web::Query<IntradayQuery>,
) -> Result<HttpResponse> {
    let symbol = query.symbol.clone().unwrap_or_else(|| "AAPL".to_string());
    let interval = query.interval.clone().unwrap_or_else(|| "30m".to_string());

    // 日期非法或缺省时取当天
    let target_date = query
        .date
        .as_deref()
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Utc::now().date_naive());

    let response = fetch_intraday(&service, &symbol, target_date, &interval)
        .await
        .into_inner(&format!("/chart-with-chat {} {}", symbol, target_date));
    Ok(HttpResponse::Ok().json(response))
}

async fn fetch_intraday(
    service: &YahooService,
    symbol: &str,
    date: NaiveDate,
    interval: &str,
) -> MarketData<IntradayResponse> {
    let age_days = (Utc::now().date_naive() - date).num_days();
    if age_days > INTRADAY_WINDOW_DAYS {
        let e = MarketDataError::InvalidDateRange(format!(
            "{} 距今 {} 天，超出 {} 天的日内窗口",
            date, age_days, INTRADAY_WINDOW_DAYS
        ));
        log::warn!("获取 {} 日内数据跳过上游: {}", symbol, e);
        let mut rng = rand::thread_rng();
        let mock = mock_service::mock_intraday_data(&mut rng, symbol, date, interval);
        return MarketData::Mock(mock, e.to_string());
    }

    match try_fetch_intraday(service, symbol, date, interval).await {
        Ok(response) => MarketData::Live(response),
        Err(e) => {
            log::warn!("获取 {} 日内数据失败: {}", symbol, e);
            let mut rng = rand::thread_rng();
            let mock = mock_service::mock_intraday_data(&mut rng, symbol, date, interval);
            MarketData::Mock(mock, e.to_string())
        }
    }
}

async fn try_fetch_intraday(
    service: &YahooService,
    symbol: &str,
    date: NaiveDate,
    interval: &str,
) -> Result<IntradayResponse, MarketDataError> {
    // 上游日内数据只支持近期，固定拉取最近一个交易日
    let chart = service.get_chart(symbol, "1d", interval).await?;

    let data: Vec<IntradayCandle> = chart
        .candles
        .iter()
        .map(|c| {
            let local = chart.meta.to_exchange_time(c.timestamp);
            let gain = match (c.close, c.open) {
                (Some(close), Some(open)) => Some(close > open),
                _ => None,
            };
            IntradayCandle {
                time: local.format("%H:%M").to_string(),
                timestamp: c.timestamp * 1000,
                open: c.open.map(round2),
                high: c.high.map(round2),
                low: c.low.map(round2),
                close: c.close.map(round2),
                volume: c.volume,
                gain,
            }
        })
        .collect();

    let insights = calculate_insights(&data);

    Ok(IntradayResponse {
        symbol: symbol.to_string(),
        date: date.format("%Y-%m-%d").to_string(),
        interval: interval.to_string(),
        data,
        insights,
        is_mock_data: false,
    })
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/chart-with-chat", web::get().to(get_chart_with_chat));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use actix_web::{test, App};

    /// 过旧的日期不访问上游，直接返回13根模拟K线
    #[actix_web::test]
    async fn test_old_date_returns_mock_without_upstream() {
        let service = web::Data::new(YahooService::new(&ApiConfig::default()));
        let app = test::init_service(
            App::new().app_data(service).configure(config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/chart-with-chat?symbol=BANKNIFTY&date=2020-01-15&interval=30m")
            .to_request();
        let resp: IntradayResponse = test::call_and_read_body_json(&app, req).await;

        assert!(resp.is_mock_data);
        assert_eq!(resp.symbol, "BANKNIFTY");
        assert_eq!(resp.date, "2020-01-15");
        assert_eq!(resp.data.len(), 13);
        assert_eq!(resp.data[0].time, "09:15");
        // 洞察结构完整
        assert_eq!(
            resp.insights.bullish_candles.unwrap() + resp.insights.bearish_candles.unwrap(),
            13
        );
    }
}
