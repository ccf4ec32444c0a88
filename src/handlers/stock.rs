use actix_web::{web, HttpResponse, Result};

use crate::models::{CandleData, DetailsQuery, HistoricalResponse, HistoryQuery, StockDetails};
use crate::services::indicators::round2;
use crate::services::yahoo_service::{ChartData, MarketDataError, YahooService};
use crate::services::{mock_service, MarketData};
use crate::services::indicators;

/// GET /stock-details
///
/// 拉取实时报价和历史K线并计算技术指标；
/// 上游任何失败都降级为模拟详情，始终返回 200
pub async fn get_stock_details(
    service: web::Data<YahooService>,
    query: web::Query<DetailsQuery>,
) -> Result<HttpResponse> {
    let symbol = query.symbol.clone().unwrap_or_else(|| "AAPL".to_string());
    let period = query.period.clone().unwrap_or_else(|| "1y".to_string());

    let details = fetch_stock_details(&service, &symbol, &period)
        .await
        .into_inner(&format!("/stock-details {}", symbol));
    Ok(HttpResponse::Ok().json(details))
}

async fn fetch_stock_details(
    service: &YahooService,
    symbol: &str,
    period: &str,
) -> MarketData<StockDetails> {
    match try_fetch_details(service, symbol, period).await {
        Ok(details) => MarketData::Live(details),
        Err(e) => {
            log::warn!("获取 {} 详情失败: {}", symbol, e);
            let mut rng = rand::thread_rng();
            let mock = mock_service::mock_stock_details(&mut rng, symbol);
            MarketData::Mock(mock, e.to_string())
        }
    }
}

async fn try_fetch_details(
    service: &YahooService,
    symbol: &str,
    period: &str,
) -> Result<StockDetails, MarketDataError> {
    let meta = service.get_metadata(symbol).await?;
    let chart = service.get_chart(symbol, period, "1d").await?;
    Ok(indicators::build_stock_details(symbol, &meta, &chart.candles))
}

/// GET /historical-data
///
/// 返回指定区间和周期的K线序列；上游失败时降级为随机游走模拟序列
pub async fn get_historical_data(
    service: web::Data<YahooService>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse> {
    let symbol = query.symbol.clone().unwrap_or_else(|| "AAPL".to_string());
    let period = query.period.clone().unwrap_or_else(|| "1mo".to_string());
    let interval = query.interval.clone().unwrap_or_else(|| "1d".to_string());

    let response = fetch_historical_data(&service, &symbol, &period, &interval)
        .await
        .into_inner(&format!("/historical-data {}", symbol));
    Ok(HttpResponse::Ok().json(response))
}

async fn fetch_historical_data(
    service: &YahooService,
    symbol: &str,
    period: &str,
    interval: &str,
) -> MarketData<HistoricalResponse> {
    match service.get_chart(symbol, period, interval).await {
        Ok(chart) => MarketData::Live(to_historical_response(symbol, period, interval, &chart)),
        Err(e) => {
            log::warn!("获取 {} 历史数据失败: {}", symbol, e);
            let mut rng = rand::thread_rng();
            let mock = mock_service::mock_historical_data(&mut rng, symbol, period, interval);
            MarketData::Mock(mock, e.to_string())
        }
    }
}

/// 把原始K线转成图表用的响应，时间按交易所当地时区渲染
fn to_historical_response(
    symbol: &str,
    period: &str,
    interval: &str,
    chart: &ChartData,
) -> HistoricalResponse {
    let data = chart
        .candles
        .iter()
        .map(|c| CandleData {
            date: chart
                .meta
                .to_exchange_time(c.timestamp)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            open: c.open.map(round2),
            high: c.high.map(round2),
            low: c.low.map(round2),
            close: c.close.map(round2),
            volume: c.volume,
        })
        .collect();

    HistoricalResponse {
        symbol: symbol.to_string(),
        period: period.to_string(),
        interval: interval.to_string(),
        data,
        is_mock_data: None,
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/stock-details", web::get().to(get_stock_details))
        .route("/historical-data", web::get().to(get_historical_data));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::yahoo_service::{Candle, ChartMeta};

    #[test]
    fn test_to_historical_response_renders_exchange_time() {
        let chart = ChartData {
            meta: ChartMeta {
                // 印度市场 UTC+5:30
                gmt_offset: Some(19800),
                ..Default::default()
            },
            candles: vec![Candle {
                // 2025-03-14 03:45:00 UTC → 09:15 当地
                timestamp: 1741923900,
                open: Some(150.123),
                high: Some(151.0),
                low: Some(149.5),
                close: Some(150.789),
                volume: Some(1_000),
            }],
        };

        let resp = to_historical_response("NIFTY.NS", "1d", "30m", &chart);
        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.data[0].date, "2025-03-14 09:15:00");
        assert_eq!(resp.data[0].open, Some(150.12));
        assert_eq!(resp.data[0].close, Some(150.79));
        assert_eq!(resp.is_mock_data, None);
    }
}
