//! 盘面洞察计算
//!
//! 对一段日内K线做聚合描述统计，供 /chart-with-chat 返回

use crate::models::{InsightSummary, IntradayCandle};
use crate::services::indicators::round2;

/// 参与统计的完整K线（OHLCV 均有值）
struct ValidCandle {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
    gain: bool,
}

/// 计算一段日内行情的聚合洞察
///
/// 先过滤掉任何字段缺失的K线；过滤后为空则返回空洞察（`{}`），不报错
pub fn calculate_insights(data: &[IntradayCandle]) -> InsightSummary {
    let candles: Vec<ValidCandle> = data
        .iter()
        .filter_map(|c| {
            let (open, high, low, close, volume) =
                (c.open?, c.high?, c.low?, c.close?, c.volume?);
            Some(ValidCandle {
                open,
                high,
                low,
                close,
                volume,
                gain: c.gain.unwrap_or(close > open),
            })
        })
        .collect();

    if candles.is_empty() {
        return InsightSummary::empty();
    }

    let n = candles.len();
    let open_price = candles[0].open;
    let close_price = candles[n - 1].close;
    let high_price = candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low_price = candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let price_change = close_price - open_price;

    // 趋势方向：收盘不低于开盘即视为看多
    let trend_direction = if price_change >= 0.0 { "bullish" } else { "bearish" };

    // 波动率：单根K线振幅的均值
    let volatility = candles.iter().map(|c| c.high - c.low).sum::<f64>() / n as f64;
    let volatility_percent = volatility / open_price * 100.0;

    // 成交量趋势：后半段总量对比前半段，持平算放量
    let half = n / 2;
    let first_half: u64 = candles[..half].iter().map(|c| c.volume).sum();
    let second_half: u64 = candles[half..].iter().map(|c| c.volume).sum();
    let volume_trend = if second_half >= first_half { "increasing" } else { "decreasing" };

    let bullish_candles = candles.iter().filter(|c| c.gain).count();
    let bearish_candles = n - bullish_candles;

    // 支撑阻力：全幅的上下 25% 分位
    let price_range = high_price - low_price;
    let resistance = high_price - price_range * 0.25;
    let support = low_price + price_range * 0.25;

    // 近期动量：与3根之前（不足则与首根）的收盘价比较
    let start_index = n.saturating_sub(4);
    let recent_trend = if close_price > candles[start_index].close { "positive" } else { "negative" };

    // 相对强度：平均阳线涨幅 / 平均阴线跌幅
    let gains: Vec<f64> = candles.iter().filter(|c| c.gain).map(|c| c.close - c.open).collect();
    let losses: Vec<f64> = candles.iter().filter(|c| !c.gain).map(|c| c.open - c.close).collect();
    let avg_gain = if gains.is_empty() { 0.0 } else { gains.iter().sum::<f64>() / gains.len() as f64 };
    let avg_loss = if losses.is_empty() { 0.0 } else { losses.iter().sum::<f64>() / losses.len() as f64 };
    let relative_strength = if avg_loss > 0.0 {
        avg_gain / avg_loss
    } else if avg_gain > 0.0 {
        10.0
    } else {
        0.0
    };

    let total_volume: u64 = candles.iter().map(|c| c.volume).sum();
    let average_volume = (total_volume as f64 / n as f64).round() as u64;

    InsightSummary {
        trend_direction: Some(trend_direction.to_string()),
        volatility: Some(round2(volatility)),
        volatility_percent: Some(round2(volatility_percent)),
        volume_trend: Some(volume_trend.to_string()),
        bullish_candles: Some(bullish_candles),
        bearish_candles: Some(bearish_candles),
        resistance_level: Some(round2(resistance)),
        support_level: Some(round2(support)),
        recent_trend: Some(recent_trend.to_string()),
        relative_strength: Some(round2(relative_strength)),
        total_volume: Some(total_volume),
        average_volume: Some(average_volume),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f64, high: f64, low: f64, close: f64, volume: u64) -> IntradayCandle {
        IntradayCandle {
            time: "09:15".to_string(),
            timestamp: 0,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
            gain: Some(close > open),
        }
    }

    /// 空序列返回空洞察，序列化为 {}
    #[test]
    fn test_empty_input_gives_empty_summary() {
        let insights = calculate_insights(&[]);
        assert_eq!(insights, InsightSummary::empty());
        let json = serde_json::to_string(&insights).unwrap();
        assert_eq!(json, "{}");
    }

    /// 字段不全的K线被剔除后为空也返回空洞察
    #[test]
    fn test_all_incomplete_candles_give_empty_summary() {
        let mut c = candle(100.0, 101.0, 99.0, 100.5, 1000);
        c.close = None;
        let insights = calculate_insights(&[c]);
        assert_eq!(insights, InsightSummary::empty());
    }

    #[test]
    fn test_bullish_plus_bearish_equals_total() {
        let data = vec![
            candle(100.0, 102.0, 99.0, 101.0, 1000), // 阳
            candle(101.0, 103.0, 100.0, 100.5, 2000), // 阴
            candle(100.5, 101.5, 99.5, 101.2, 1500), // 阳
            candle(101.2, 101.3, 100.0, 100.1, 800), // 阴
            candle(100.1, 100.2, 99.8, 100.0, 900),  // 阴
        ];
        let insights = calculate_insights(&data);
        assert_eq!(
            insights.bullish_candles.unwrap() + insights.bearish_candles.unwrap(),
            data.len()
        );
        assert_eq!(insights.bullish_candles, Some(2));
    }

    #[test]
    fn test_trend_and_levels() {
        let data = vec![
            candle(100.0, 110.0, 95.0, 104.0, 1000),
            candle(104.0, 108.0, 100.0, 106.0, 1000),
        ];
        let insights = calculate_insights(&data);
        // 106 >= 100 → bullish
        assert_eq!(insights.trend_direction.as_deref(), Some("bullish"));
        // 全幅 = 110 - 95 = 15
        assert_eq!(insights.resistance_level, Some(round2(110.0 - 3.75)));
        assert_eq!(insights.support_level, Some(round2(95.0 + 3.75)));
        // 振幅均值 = (15 + 8) / 2 = 11.5，相对开盘 11.5%
        assert_eq!(insights.volatility, Some(11.5));
        assert_eq!(insights.volatility_percent, Some(11.5));
    }

    /// 前后半成交量完全持平时判定为放量
    #[test]
    fn test_volume_trend_tie_is_increasing() {
        let data = vec![
            candle(100.0, 101.0, 99.0, 100.5, 5000),
            candle(100.5, 101.5, 99.5, 101.0, 5000),
        ];
        let insights = calculate_insights(&data);
        assert_eq!(insights.volume_trend.as_deref(), Some("increasing"));
    }

    #[test]
    fn test_volume_trend_decreasing() {
        let data = vec![
            candle(100.0, 101.0, 99.0, 100.5, 9000),
            candle(100.5, 101.5, 99.5, 101.0, 1000),
        ];
        let insights = calculate_insights(&data);
        assert_eq!(insights.volume_trend.as_deref(), Some("decreasing"));
    }

    /// 没有阴线时相对强度取约定值 10
    #[test]
    fn test_relative_strength_no_losses() {
        let data = vec![
            candle(100.0, 102.0, 99.5, 101.0, 1000),
            candle(101.0, 103.0, 100.5, 102.0, 1000),
        ];
        let insights = calculate_insights(&data);
        assert_eq!(insights.relative_strength, Some(10.0));
    }

    #[test]
    fn test_relative_strength_ratio() {
        let data = vec![
            candle(100.0, 103.0, 99.0, 102.0, 1000), // +2
            candle(102.0, 102.5, 100.5, 101.0, 1000), // -1
        ];
        let insights = calculate_insights(&data);
        assert_eq!(insights.relative_strength, Some(2.0));
    }

    #[test]
    fn test_recent_trend_clamps_to_first() {
        // 只有2根K线时与首根比较
        let up = vec![
            candle(100.0, 101.0, 99.0, 100.2, 1000),
            candle(100.2, 102.0, 100.0, 101.5, 1000),
        ];
        assert_eq!(calculate_insights(&up).recent_trend.as_deref(), Some("positive"));

        let down = vec![
            candle(100.0, 101.0, 99.0, 100.8, 1000),
            candle(100.8, 101.0, 99.0, 99.5, 1000),
        ];
        assert_eq!(calculate_insights(&down).recent_trend.as_deref(), Some("negative"));
    }

    #[test]
    fn test_volume_totals() {
        let data = vec![
            candle(100.0, 101.0, 99.0, 100.5, 1000),
            candle(100.5, 101.5, 99.5, 101.0, 2001),
        ];
        let insights = calculate_insights(&data);
        assert_eq!(insights.total_volume, Some(3001));
        // 1500.5 四舍五入
        assert_eq!(insights.average_volume, Some(1501));
    }
}
