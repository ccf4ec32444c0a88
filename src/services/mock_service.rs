//! 模拟行情生成
//!
//! 上游不可用或请求超出其支持范围时，用带偏置的随机游走
//! 生成与真实数据同构的行情，仅靠 isMockData 标记区分。
//! 随机源由调用方注入，测试时可用固定种子复现

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Asia::Kolkata;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::models::{
    CandleData, HistoricalResponse, IntradayCandle, IntradayResponse, StockDetails,
};
use crate::services::indicators::round2;
use crate::services::insights::calculate_insights;

/// 日线随机游走的日收益分布：小幅正漂移
const DAILY_DRIFT: f64 = 0.0001;
const DAILY_SIGMA: f64 = 0.01;

/// 日内交易时段（约6.5小时）的30分钟K线数量
const INTRADAY_CANDLES: usize = 13;

/// 期间关键字映射为交易日数量，未知期间按 30 天处理
pub fn period_to_days(period: &str) -> usize {
    match period {
        "1d" => 1,
        "5d" => 5,
        "1mo" => 30,
        "3mo" => 90,
        "6mo" => 180,
        "1y" => 365,
        _ => 30,
    }
}

/// 按标的选择日内基准价和波动幅度
///
/// 指数类标的（BANKNIFTY / NIFTY.NS）点位远高于普通个股
fn intraday_base_price(symbol: &str) -> (f64, f64) {
    if matches!(symbol, "BANKNIFTY" | "NIFTY.NS" | "BANKNIFTY.NS") {
        if symbol.contains("BANK") {
            (52000.0, 150.0)
        } else {
            (25000.0, 70.0)
        }
    } else {
        (150.0, 2.0)
    }
}

/// 生成带全部字段的模拟股票详情
pub fn mock_stock_details<R: Rng + ?Sized>(rng: &mut R, symbol: &str) -> StockDetails {
    let sectors = ["Technology", "Healthcare", "Finance", "Consumer Cyclical"];
    let industries = ["Software", "Semiconductors", "Internet Services"];

    let base_price = round2(rng.gen_range(145.0..155.0));
    let previous_close = round2(rng.gen_range(base_price * 0.98..base_price * 1.02));
    let day_change = round2(base_price - previous_close);
    let day_change_percent = round2(day_change / previous_close * 100.0);

    let now = Utc::now();

    StockDetails {
        symbol: symbol.to_string(),
        short_name: Some(format!("{} Stock", symbol)),
        long_name: Some(format!("{} Inc.", symbol)),
        sector: sectors.choose(rng).map(|s| s.to_string()),
        industry: industries.choose(rng).map(|s| s.to_string()),

        regular_market_price: Some(base_price),
        regular_market_open: Some(round2(previous_close * rng.gen_range(0.99..1.01))),
        regular_market_previous_close: Some(previous_close),
        regular_market_day_high: Some(round2(base_price * rng.gen_range(1.00..1.02))),
        regular_market_day_low: Some(round2(base_price * rng.gen_range(0.98..1.00))),
        day_change: Some(day_change),
        day_change_percent: Some(day_change_percent),

        regular_market_volume: Some(rng.gen_range(5_000_000..=15_000_000)),
        average_daily_volume_10day: Some(rng.gen_range(5_000_000..=15_000_000_u64) as f64),
        average_daily_volume_3month: Some(rng.gen_range(5_000_000..=15_000_000_u64) as f64),

        fifty_day_average: Some(round2(base_price * rng.gen_range(0.95..1.05))),
        two_hundred_day_average: Some(round2(base_price * rng.gen_range(0.90..1.10))),
        fifty_two_week_high: Some(round2(base_price * rng.gen_range(1.10..1.30))),
        fifty_two_week_low: Some(round2(base_price * rng.gen_range(0.70..0.90))),
        support_level: Some(round2(base_price * rng.gen_range(0.90..0.95))),
        resistance_level: Some(round2(base_price * rng.gen_range(1.05..1.10))),
        rsi: Some(round2(rng.gen_range(30.0..70.0))),
        macd: Some(round2(rng.gen_range(-2.0..2.0))),
        macd_signal: Some(round2(rng.gen_range(-2.0..2.0))),

        week_change: Some(round2(rng.gen_range(-5.0..5.0))),
        month_change: Some(round2(rng.gen_range(-10.0..10.0))),

        market_cap: Some(rng.gen_range(900_000_000_000_i64..=1_100_000_000_000) as f64),
        trailing_pe: Some(round2(rng.gen_range(18.0..25.0))),
        forward_pe: Some(round2(rng.gen_range(16.0..22.0))),
        price_to_book: Some(round2(rng.gen_range(3.0..7.0))),
        enterprise_value: Some(rng.gen_range(900_000_000_000_i64..=1_100_000_000_000) as f64),
        dividend_rate: (rng.gen::<f64>() > 0.3).then(|| round2(rng.gen_range(0.5..2.0))),
        // 模拟数据直接给出合理区间内的百分比股息率
        dividend_yield: Some(round2(rng.gen_range(0.5..3.5))),
        payout_ratio: (rng.gen::<f64>() > 0.3).then(|| round2(rng.gen_range(0.1..0.5))),
        beta: Some(round2(rng.gen_range(0.8..1.5))),
        earnings_quarterly_growth: Some(round2(rng.gen_range(-0.1..0.3))),
        revenue_quarterly_growth: Some(round2(rng.gen_range(-0.05..0.2))),

        target_mean_price: Some(round2(base_price * rng.gen_range(0.9..1.2))),
        analyst_rating: Some((rng.gen_range(1.5_f64..3.5) * 10.0).round() / 10.0),
        timestamp: now.timestamp_millis() as f64 / 1000.0,
        data_date: now.format("%Y-%m-%d").to_string(),
        is_mock_data: Some(true),
    }
}

/// 按随机游走生成日线历史K线
///
/// 每日收益 ~ N(0.0001, 0.01) × 当前价，开盘价为前日收盘，
/// 最高/最低在开收区间外各加一个有界随机偏移
pub fn mock_historical_data<R: Rng + ?Sized>(
    rng: &mut R,
    symbol: &str,
    period: &str,
    interval: &str,
) -> HistoricalResponse {
    let base_price = 150.0;
    let volatility = 2.0;
    let days = period_to_days(period);

    // 常数参数下构造不会失败
    let walk = Normal::new(DAILY_DRIFT, DAILY_SIGMA).unwrap();

    let end_date = Utc::now();
    let mut data = Vec::with_capacity(days);
    let mut current_price = base_price;

    for i in 0..days {
        let date = end_date - Duration::days((days - i - 1) as i64);

        let price_change = walk.sample(rng) * current_price;
        let open = current_price;
        let close = open + price_change;
        let high = open.max(close) + rng.gen_range(0.0..volatility);
        let low = open.min(close) - rng.gen_range(0.0..volatility);
        let volume = rng.gen_range(5_000_000..=15_000_000);

        data.push(CandleData {
            date: date.format("%Y-%m-%d %H:%M:%S").to_string(),
            open: Some(round2(open)),
            high: Some(round2(high)),
            low: Some(round2(low)),
            close: Some(round2(close)),
            volume: Some(volume),
        });

        current_price = close;
    }

    HistoricalResponse {
        symbol: symbol.to_string(),
        period: period.to_string(),
        interval: interval.to_string(),
        data,
        is_mock_data: Some(true),
    }
}

/// 按动量偏置生成日内K线和洞察
///
/// 13根30分钟K线，09:15（印度时区）开盘；上一根收阳时本根
/// 有 60% 概率延续上行，否则 40%；成交量随单根涨跌幅放大
pub fn mock_intraday_data<R: Rng + ?Sized>(
    rng: &mut R,
    symbol: &str,
    date: NaiveDate,
    interval: &str,
) -> IntradayResponse {
    let (base_price, volatility) = intraday_base_price(symbol);

    let session_start = Kolkata
        .from_local_datetime(&date.and_hms_opt(9, 15, 0).unwrap_or_default())
        .single();

    let mut data: Vec<IntradayCandle> = Vec::with_capacity(INTRADAY_CANDLES);
    let mut current_price = base_price;

    for i in 0..INTRADAY_CANDLES {
        let candle_time = session_start.map(|s| s + Duration::minutes(30 * i as i64));

        let open = current_price;

        // 动量偏置：首根对半开，之后跟随上一根方向
        let trend_bias = match data.last() {
            Some(prev) if prev.gain == Some(true) => 0.6,
            Some(_) => 0.4,
            None => 0.5,
        };
        let movement_up = rng.gen::<f64>() < trend_bias;

        let high_delta = rng.gen::<f64>() * volatility * if movement_up { 1.2 } else { 0.8 };
        let low_delta = rng.gen::<f64>() * volatility * if movement_up { 0.8 } else { 1.2 };

        let high = open + high_delta;
        // 最低价不偏离开盘价超过 2%
        let low = (open - low_delta).max(open * 0.98);

        // 上行时收在区间上半部，下行时收在下半部
        let close_range = high - low;
        let close = if movement_up {
            low + close_range * (0.5 + rng.gen::<f64>() * 0.5)
        } else {
            low + close_range * rng.gen::<f64>() * 0.5
        };

        // 涨跌幅越大成交量越高
        let volume_base = rng.gen_range(5_000_000..=15_000_000_u64) as f64;
        let volume_factor = (close - open).abs() / open * 10.0;
        let volume = (volume_base * (1.0 + volume_factor)) as u64;

        data.push(IntradayCandle {
            time: candle_time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default(),
            timestamp: candle_time.map(|t| t.timestamp_millis()).unwrap_or_default(),
            open: Some(round2(open)),
            high: Some(round2(high)),
            low: Some(round2(low)),
            close: Some(round2(close)),
            volume: Some(volume),
            gain: Some(close > open),
        });

        current_price = close;
    }

    let insights = calculate_insights(&data);

    IntradayResponse {
        symbol: symbol.to_string(),
        date: date.format("%Y-%m-%d").to_string(),
        interval: interval.to_string(),
        data,
        insights,
        is_mock_data: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_period_mapping() {
        assert_eq!(period_to_days("1d"), 1);
        assert_eq!(period_to_days("5d"), 5);
        assert_eq!(period_to_days("1mo"), 30);
        assert_eq!(period_to_days("3mo"), 90);
        assert_eq!(period_to_days("6mo"), 180);
        assert_eq!(period_to_days("1y"), 365);
        // 未知期间取默认值
        assert_eq!(period_to_days("max"), 30);
        assert_eq!(period_to_days(""), 30);
    }

    #[test]
    fn test_historical_candle_counts() {
        let mut rng = rng();
        assert_eq!(mock_historical_data(&mut rng, "AAPL", "1d", "1d").data.len(), 1);
        assert_eq!(mock_historical_data(&mut rng, "AAPL", "1y", "1d").data.len(), 365);
        assert_eq!(mock_historical_data(&mut rng, "AAPL", "oops", "1d").data.len(), 30);
    }

    #[test]
    fn test_historical_data_shape() {
        let mut rng = rng();
        let resp = mock_historical_data(&mut rng, "TSLA", "1mo", "1d");

        assert_eq!(resp.symbol, "TSLA");
        assert_eq!(resp.period, "1mo");
        assert_eq!(resp.is_mock_data, Some(true));

        let mut prev_close: Option<f64> = None;
        for candle in &resp.data {
            let (open, high, low, close) = (
                candle.open.unwrap(),
                candle.high.unwrap(),
                candle.low.unwrap(),
                candle.close.unwrap(),
            );
            // 最高/最低必须包住开收区间
            assert!(high >= open.max(close) - 1e-9);
            assert!(low <= open.min(close) + 1e-9);
            let volume = candle.volume.unwrap();
            assert!((5_000_000..=15_000_000).contains(&volume));
            // 随机游走：开盘接上一日收盘（数值都经过2位舍入）
            if let Some(prev) = prev_close {
                assert!((open - prev).abs() < 0.011);
            }
            prev_close = Some(close);
        }
    }

    #[test]
    fn test_intraday_fixed_candle_count_and_session() {
        let mut rng = rng();
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let resp = mock_intraday_data(&mut rng, "BANKNIFTY", date, "30m");

        assert!(resp.is_mock_data);
        assert_eq!(resp.data.len(), 13);
        assert_eq!(resp.date, "2025-03-14");
        assert_eq!(resp.data[0].time, "09:15");
        assert_eq!(resp.data[1].time, "09:45");
        assert_eq!(resp.data[12].time, "15:15");
        // 相邻时间戳相差30分钟
        assert_eq!(resp.data[1].timestamp - resp.data[0].timestamp, 30 * 60 * 1000);
    }

    #[test]
    fn test_intraday_base_price_by_symbol() {
        assert_eq!(intraday_base_price("BANKNIFTY"), (52000.0, 150.0));
        assert_eq!(intraday_base_price("BANKNIFTY.NS"), (52000.0, 150.0));
        assert_eq!(intraday_base_price("NIFTY.NS"), (25000.0, 70.0));
        // 裸 NIFTY 不在指数名单内，按普通个股处理
        assert_eq!(intraday_base_price("NIFTY"), (150.0, 2.0));
        assert_eq!(intraday_base_price("AAPL"), (150.0, 2.0));
    }

    #[test]
    fn test_intraday_candle_invariants() {
        let mut rng = rng();
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let resp = mock_intraday_data(&mut rng, "NIFTY.NS", date, "30m");

        for candle in &resp.data {
            let (open, high, low, close) = (
                candle.open.unwrap(),
                candle.high.unwrap(),
                candle.low.unwrap(),
                candle.close.unwrap(),
            );
            assert!(high >= open - 0.01);
            assert!(low <= open + 0.01);
            assert!(close <= high + 0.01 && close >= low - 0.01);
            // 最低价不低于开盘价的 98%
            assert!(low >= open * 0.98 - 0.01);
            assert!(candle.volume.unwrap() >= 5_000_000);
            assert_eq!(candle.gain, Some(close > open));
        }
        // 洞察随行情一起返回
        assert_eq!(
            resp.insights.bullish_candles.unwrap() + resp.insights.bearish_candles.unwrap(),
            13
        );
    }

    /// 固定种子下输出可复现
    #[test]
    fn test_seeded_generation_is_reproducible() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

        let a = mock_intraday_data(&mut StdRng::seed_from_u64(7), "AAPL", date, "30m");
        let b = mock_intraday_data(&mut StdRng::seed_from_u64(7), "AAPL", date, "30m");
        for (x, y) in a.data.iter().zip(b.data.iter()) {
            assert_eq!(x.close, y.close);
            assert_eq!(x.volume, y.volume);
        }

        let c = mock_stock_details(&mut StdRng::seed_from_u64(7), "AAPL");
        let d = mock_stock_details(&mut StdRng::seed_from_u64(7), "AAPL");
        assert_eq!(c.regular_market_price, d.regular_market_price);
        assert_eq!(c.sector, d.sector);
    }

    #[test]
    fn test_mock_details_fields() {
        let mut rng = rng();
        let details = mock_stock_details(&mut rng, "GOOG");

        assert_eq!(details.symbol, "GOOG");
        assert_eq!(details.is_mock_data, Some(true));
        let price = details.regular_market_price.unwrap();
        assert!((145.0..155.0).contains(&price));
        let rsi = details.rsi.unwrap();
        assert!((30.0..70.0).contains(&rsi));
        let yield_pct = details.dividend_yield.unwrap();
        assert!((0.5..3.5).contains(&yield_pct));
        // 模拟详情不能有缺字段的当日涨跌
        assert!(details.day_change.is_some());
        assert!(details.day_change_percent.is_some());
        // 企业价值和增速字段随详情一起生成
        let ev = details.enterprise_value.unwrap();
        assert!((900_000_000_000.0..=1_100_000_000_000.0).contains(&ev));
        let earnings = details.earnings_quarterly_growth.unwrap();
        assert!((-0.1..0.3).contains(&earnings));
        let revenue = details.revenue_quarterly_growth.unwrap();
        assert!((-0.05..0.2).contains(&revenue));
    }
}
