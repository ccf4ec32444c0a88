//! 技术指标计算
//!
//! 对升序K线序列计算均线、RSI、MACD、支撑阻力等指标
//! 全部为纯函数：数据长度不足时返回 None，不报错

use chrono::Utc;

use crate::models::StockDetails;
use crate::services::yahoo_service::{Candle, QuoteMetadata};

/// 保留2位小数
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// 保留3位小数（MACD 用）
pub fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// 尾部 n 点简单均值，长度不足返回 None
pub fn sma_tail(values: &[f64], n: usize) -> Option<f64> {
    if n == 0 || values.len() < n {
        return None;
    }
    let tail = &values[values.len() - n..];
    Some(tail.iter().sum::<f64>() / n as f64)
}

/// 指数移动平均序列
///
/// 递推：ema[0] = v[0]，ema[t] = α·v[t] + (1-α)·ema[t-1]，α = 2/(span+1)
/// 与 pandas 的 ewm(span, adjust=False) 一致
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = values[0];
    out.push(prev);
    for &v in &values[1..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}

/// 14日 RSI（Wilder 简化版：尾部14个涨跌幅的算术平均）
///
/// 需要至少 period+1 个收盘价
/// 平均跌幅为 0 时返回 100（约定值，避免除零）
pub fn rsi_tail(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let diffs: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let tail = &diffs[diffs.len() - period..];

    let avg_gain = tail.iter().map(|d| d.max(0.0)).sum::<f64>() / period as f64;
    let avg_loss = tail.iter().map(|d| (-d).max(0.0)).sum::<f64>() / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// MACD 线和信号线的最新值
///
/// MACD = EMA(close,12) - EMA(close,26)，信号线 = EMA(MACD,9)
pub fn macd_tail(closes: &[f64]) -> Option<(f64, f64)> {
    if closes.is_empty() {
        return None;
    }
    let ema12 = ema(closes, 12);
    let ema26 = ema(closes, 26);
    let macd_line: Vec<f64> = ema12
        .iter()
        .zip(ema26.iter())
        .map(|(a, b)| a - b)
        .collect();
    let signal = ema(&macd_line, 9);
    Some((*macd_line.last()?, *signal.last()?))
}

/// 最新收盘价相对 n 个点之前（含端点，即倒数第 n 个）的百分比变化
///
/// 对齐 pandas 的 iloc[-n] 取法：周涨幅 n=5，月涨幅 n=22
pub fn change_rate(closes: &[f64], n: usize) -> Option<f64> {
    if n < 2 || closes.len() < n {
        return None;
    }
    let last = *closes.last()?;
    let base = closes[closes.len() - n];
    if base == 0.0 {
        return None;
    }
    Some((last / base - 1.0) * 100.0)
}

/// 支撑位：尾部 window 点中最低 k 个低点的均值
pub fn support_level(lows: &[f64], window: usize, k: usize) -> Option<f64> {
    if lows.len() < window {
        return None;
    }
    let mut tail: Vec<f64> = lows[lows.len() - window..].to_vec();
    tail.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let picked = &tail[..k.min(tail.len())];
    Some(picked.iter().sum::<f64>() / picked.len() as f64)
}

/// 阻力位：尾部 window 点中最高 k 个高点的均值
pub fn resistance_level(highs: &[f64], window: usize, k: usize) -> Option<f64> {
    if highs.len() < window {
        return None;
    }
    let mut tail: Vec<f64> = highs[highs.len() - window..].to_vec();
    tail.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let picked = &tail[..k.min(tail.len())];
    Some(picked.iter().sum::<f64>() / picked.len() as f64)
}

/// 股息率归一化为百分比
///
/// 上游有时给小数（0.0235 表示 2.35%）有时给百分数（2.35），
/// 这里按启发式处理：>= 1.0 视为百分数并封顶 10%，< 1.0 乘 100。
/// 只是防御性修正，不保证转换一定正确
pub fn normalize_dividend_yield(raw: f64) -> f64 {
    if raw >= 1.0 {
        raw.min(10.0)
    } else {
        raw * 100.0
    }
}

/// 把元数据和历史K线汇总成股票详情
///
/// 序列为空时所有序列指标为 None，元数据字段照常填充
pub fn build_stock_details(
    symbol: &str,
    meta: &QuoteMetadata,
    candles: &[Candle],
) -> StockDetails {
    // 各字段缺失的K线直接跳过，只用完整值参与计算
    let closes: Vec<f64> = candles.iter().filter_map(|c| c.close).collect();
    let highs: Vec<f64> = candles.iter().filter_map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().filter_map(|c| c.low).collect();
    let volumes: Vec<f64> = candles.iter().filter_map(|c| c.volume.map(|v| v as f64)).collect();

    // 当日涨跌用实时报价计算，不依赖K线序列
    let day_change = match (
        meta.regular_market_price,
        meta.regular_market_previous_close,
    ) {
        (Some(price), Some(prev)) => Some(price - prev),
        _ => None,
    };
    let day_change_percent = match (day_change, meta.regular_market_previous_close) {
        (Some(change), Some(prev)) if prev != 0.0 => Some(change / prev * 100.0),
        _ => None,
    };

    // 均线和均量优先用上游现成值，缺失时退回本地计算
    let avg_vol_10d = meta
        .average_daily_volume_10day
        .or_else(|| sma_tail(&volumes, 10));
    let avg_vol_3m = meta
        .average_daily_volume_3month
        .or_else(|| sma_tail(&volumes, 90));

    let macd_pair = macd_tail(&closes);

    let now = Utc::now();

    StockDetails {
        symbol: symbol.to_string(),
        short_name: Some(
            meta.short_name
                .clone()
                .unwrap_or_else(|| format!("{} Stock", symbol)),
        ),
        long_name: Some(
            meta.long_name
                .clone()
                .unwrap_or_else(|| format!("{} Stock", symbol)),
        ),
        sector: Some(meta.sector.clone().unwrap_or_else(|| "Unknown".to_string())),
        industry: Some(meta.industry.clone().unwrap_or_else(|| "Unknown".to_string())),

        regular_market_price: meta.regular_market_price,
        regular_market_open: meta.regular_market_open,
        regular_market_previous_close: meta.regular_market_previous_close,
        regular_market_day_high: meta.regular_market_day_high,
        regular_market_day_low: meta.regular_market_day_low,
        day_change: day_change.map(round2),
        day_change_percent: day_change_percent.map(round2),

        regular_market_volume: meta.regular_market_volume,
        average_daily_volume_10day: avg_vol_10d.map(round2),
        average_daily_volume_3month: avg_vol_3m.map(round2),

        fifty_day_average: sma_tail(&closes, 50).map(round2),
        two_hundred_day_average: sma_tail(&closes, 200).map(round2),
        fifty_two_week_high: meta.fifty_two_week_high,
        fifty_two_week_low: meta.fifty_two_week_low,
        support_level: support_level(&lows, 20, 3).map(round2),
        resistance_level: resistance_level(&highs, 20, 3).map(round2),
        rsi: rsi_tail(&closes, 14).map(round2),
        macd: macd_pair.map(|(m, _)| round3(m)),
        macd_signal: macd_pair.map(|(_, s)| round3(s)),

        week_change: change_rate(&closes, 5).map(round2),
        month_change: change_rate(&closes, 22).map(round2),

        market_cap: meta.market_cap,
        trailing_pe: meta.trailing_pe,
        forward_pe: meta.forward_pe,
        price_to_book: meta.price_to_book,
        enterprise_value: meta.enterprise_value,
        dividend_rate: meta.dividend_rate,
        dividend_yield: meta.dividend_yield.map(|y| round2(normalize_dividend_yield(y))),
        payout_ratio: meta.payout_ratio,
        beta: meta.beta,
        earnings_quarterly_growth: meta.earnings_quarterly_growth,
        revenue_quarterly_growth: meta.revenue_quarterly_growth,

        target_mean_price: meta.target_mean_price,
        analyst_rating: meta.recommendation_mean,
        timestamp: now.timestamp_millis() as f64 / 1000.0,
        data_date: now.format("%Y-%m-%d").to_string(),
        is_mock_data: None,
    }
}
