//! Yahoo Finance 行情网关
//!
//! 封装 Yahoo Finance v8 chart / v10 quoteSummary 接口
//! 对应 yfinance 的 Ticker.info 和 Ticker.history()

use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ApiConfig;

// Yahoo Finance API 常量
const YAHOO_CHART_API: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const YAHOO_QUOTE_SUMMARY_API: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const QUOTE_SUMMARY_MODULES: &str = "price,summaryDetail,assetProfile,defaultKeyStatistics,financialData";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/97.0.4692.71 Safari/537.36";

/// 行情获取错误分类
///
/// 任何一类错误都会触发上层回退到模拟数据
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// 网络不通或上游返回非 2xx
    #[error("上游服务不可用: {0}")]
    UpstreamUnavailable(String),
    /// 响应体无法解析
    #[error("上游响应解析失败: {0}")]
    UpstreamParse(String),
    /// 请求成功但没有任何数据行
    #[error("上游返回空数据: {0}")]
    UpstreamEmpty(String),
    /// 日内请求的日期超出上游支持窗口
    #[error("日期超出上游支持范围: {0}")]
    InvalidDateRange(String),
}

impl From<reqwest::Error> for MarketDataError {
    fn from(e: reqwest::Error) -> Self {
        MarketDataError::UpstreamUnavailable(e.to_string())
    }
}

/// 单根原始K线，时间戳为 Unix 秒，升序排列
#[derive(Debug, Clone)]
pub struct Candle {
    pub timestamp: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

/// chart 接口返回的元数据，只保留时间还原所需的字段
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChartMeta {
    /// 交易所相对 UTC 的秒偏移，用于还原当地盘面时间
    #[serde(rename = "gmtoffset")]
    pub gmt_offset: Option<i32>,
    pub timezone: Option<String>,
}

impl ChartMeta {
    /// 把K线时间戳（Unix 秒）转为交易所当地时间
    pub fn to_exchange_time(&self, ts: i64) -> DateTime<FixedOffset> {
        // east_opt 仅在偏移超过一天时失败，上游不会给出这种值
        let offset = FixedOffset::east_opt(self.gmt_offset.unwrap_or(0))
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
        DateTime::from_timestamp(ts, 0)
            .unwrap_or_default()
            .with_timezone(&offset)
    }
}

/// chart 接口解析结果
#[derive(Debug, Clone)]
pub struct ChartData {
    pub meta: ChartMeta,
    pub candles: Vec<Candle>,
}

/// quoteSummary 各模块汇总出的标的元数据
///
/// 上游字段时有时无，全部按 Option 处理
#[derive(Debug, Clone, Default)]
pub struct QuoteMetadata {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub regular_market_price: Option<f64>,
    pub regular_market_open: Option<f64>,
    pub regular_market_previous_close: Option<f64>,
    pub regular_market_day_high: Option<f64>,
    pub regular_market_day_low: Option<f64>,
    pub regular_market_volume: Option<u64>,
    pub average_daily_volume_10day: Option<f64>,
    pub average_daily_volume_3month: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub dividend_rate: Option<f64>,
    /// 原始股息率，可能是小数也可能是百分数，由指标层归一化
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,
    pub beta: Option<f64>,
    /// 季度盈利同比增速
    pub earnings_quarterly_growth: Option<f64>,
    /// 季度营收同比增速
    pub revenue_quarterly_growth: Option<f64>,
    pub target_mean_price: Option<f64>,
    pub recommendation_mean: Option<f64>,
}

// ==================== 上游响应反序列化结构 ====================

/// Yahoo 的数值字段统一包装为 {"raw": .., "fmt": ".."}
#[derive(Debug, Clone, Default, Deserialize)]
struct RawNum {
    raw: Option<f64>,
}

fn raw(v: &Option<RawNum>) -> Option<f64> {
    v.as_ref().and_then(|n| n.raw)
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartNode>>,
}

#[derive(Debug, Deserialize)]
struct ChartNode {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChartQuote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryBody,
}

#[derive(Debug, Deserialize)]
struct SummaryBody {
    result: Option<Vec<SummaryNode>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SummaryNode {
    price: PriceModule,
    #[serde(rename = "summaryDetail")]
    summary_detail: SummaryDetailModule,
    #[serde(rename = "assetProfile")]
    asset_profile: AssetProfileModule,
    #[serde(rename = "defaultKeyStatistics")]
    default_key_statistics: KeyStatisticsModule,
    #[serde(rename = "financialData")]
    financial_data: FinancialDataModule,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PriceModule {
    short_name: Option<String>,
    long_name: Option<String>,
    regular_market_price: Option<RawNum>,
    regular_market_open: Option<RawNum>,
    regular_market_previous_close: Option<RawNum>,
    regular_market_day_high: Option<RawNum>,
    regular_market_day_low: Option<RawNum>,
    regular_market_volume: Option<RawNum>,
    market_cap: Option<RawNum>,
    average_daily_volume10_day: Option<RawNum>,
    average_daily_volume3_month: Option<RawNum>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SummaryDetailModule {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawNum>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<RawNum>,
    dividend_rate: Option<RawNum>,
    dividend_yield: Option<RawNum>,
    payout_ratio: Option<RawNum>,
    beta: Option<RawNum>,
    fifty_two_week_high: Option<RawNum>,
    fifty_two_week_low: Option<RawNum>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AssetProfileModule {
    sector: Option<String>,
    industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct KeyStatisticsModule {
    price_to_book: Option<RawNum>,
    enterprise_value: Option<RawNum>,
    earnings_quarterly_growth: Option<RawNum>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FinancialDataModule {
    target_mean_price: Option<RawNum>,
    recommendation_mean: Option<RawNum>,
    /// quoteSummary 把季度营收增速叫 revenueGrowth
    revenue_growth: Option<RawNum>,
}

// ==================== 服务实现 ====================

/// Yahoo Finance 数据服务
pub struct YahooService {
    client: Client,
}

impl YahooService {
    /// 按配置的超时时间构建 HTTP 客户端
    pub fn new(config: &ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .gzip(true)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// 获取标的元数据（实时报价 + 基本面）
    /// 对应 yfinance 的 Ticker.info
    pub async fn get_metadata(&self, symbol: &str) -> Result<QuoteMetadata, MarketDataError> {
        let url = format!("{}/{}", YAHOO_QUOTE_SUMMARY_API, symbol);
        log::debug!("请求元数据 URL: {}?modules={}", url, QUOTE_SUMMARY_MODULES);

        let response = self
            .client
            .get(&url)
            .query(&[("modules", QUOTE_SUMMARY_MODULES)])
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketDataError::UpstreamUnavailable(format!(
                "quoteSummary {} 返回 {}",
                symbol,
                response.status()
            )));
        }

        let envelope: SummaryEnvelope = response
            .json()
            .await
            .map_err(|e| MarketDataError::UpstreamParse(e.to_string()))?;

        let node = envelope
            .quote_summary
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| {
                MarketDataError::UpstreamEmpty(format!("{} 无 quoteSummary 数据", symbol))
            })?;

        Ok(Self::flatten_summary(node))
    }

    /// 获取历史K线
    /// 对应 yfinance 的 Ticker.history(period, interval)
    pub async fn get_chart(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<ChartData, MarketDataError> {
        let url = format!("{}/{}", YAHOO_CHART_API, symbol);
        log::debug!("请求K线 URL: {}?range={}&interval={}", url, range, interval);

        let response = self
            .client
            .get(&url)
            .query(&[("range", range), ("interval", interval)])
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketDataError::UpstreamUnavailable(format!(
                "chart {} 返回 {}",
                symbol,
                response.status()
            )));
        }

        let envelope: ChartEnvelope = response
            .json()
            .await
            .map_err(|e| MarketDataError::UpstreamParse(e.to_string()))?;

        let node = envelope
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| MarketDataError::UpstreamEmpty(format!("{} 无K线数据", symbol)))?;

        let candles = Self::zip_candles(&node);
        if candles.is_empty() {
            return Err(MarketDataError::UpstreamEmpty(format!(
                "{} 的 {}/{} K线为空",
                symbol, range, interval
            )));
        }

        log::debug!("获取到 {} 根K线: {} {}/{}", candles.len(), symbol, range, interval);

        Ok(ChartData {
            meta: node.meta,
            candles,
        })
    }

    /// 把 chart 响应的列式数组拼成K线序列
    fn zip_candles(node: &ChartNode) -> Vec<Candle> {
        let quote = match node.indicators.quote.first() {
            Some(q) => q,
            None => return Vec::new(),
        };

        node.timestamp
            .iter()
            .enumerate()
            .map(|(i, &ts)| Candle {
                timestamp: ts,
                open: quote.open.get(i).copied().flatten(),
                high: quote.high.get(i).copied().flatten(),
                low: quote.low.get(i).copied().flatten(),
                close: quote.close.get(i).copied().flatten(),
                volume: quote.volume.get(i).copied().flatten(),
            })
            .collect()
    }

    /// 把 quoteSummary 各模块压平成单层元数据
    fn flatten_summary(node: SummaryNode) -> QuoteMetadata {
        QuoteMetadata {
            short_name: node.price.short_name,
            long_name: node.price.long_name,
            sector: node.asset_profile.sector,
            industry: node.asset_profile.industry,
            regular_market_price: raw(&node.price.regular_market_price),
            regular_market_open: raw(&node.price.regular_market_open),
            regular_market_previous_close: raw(&node.price.regular_market_previous_close),
            regular_market_day_high: raw(&node.price.regular_market_day_high),
            regular_market_day_low: raw(&node.price.regular_market_day_low),
            regular_market_volume: raw(&node.price.regular_market_volume).map(|v| v as u64),
            average_daily_volume_10day: raw(&node.price.average_daily_volume10_day),
            average_daily_volume_3month: raw(&node.price.average_daily_volume3_month),
            fifty_two_week_high: raw(&node.summary_detail.fifty_two_week_high),
            fifty_two_week_low: raw(&node.summary_detail.fifty_two_week_low),
            market_cap: raw(&node.price.market_cap),
            trailing_pe: raw(&node.summary_detail.trailing_pe),
            forward_pe: raw(&node.summary_detail.forward_pe),
            price_to_book: raw(&node.default_key_statistics.price_to_book),
            enterprise_value: raw(&node.default_key_statistics.enterprise_value),
            dividend_rate: raw(&node.summary_detail.dividend_rate),
            dividend_yield: raw(&node.summary_detail.dividend_yield),
            payout_ratio: raw(&node.summary_detail.payout_ratio),
            beta: raw(&node.summary_detail.beta),
            earnings_quarterly_growth: raw(&node.default_key_statistics.earnings_quarterly_growth),
            revenue_quarterly_growth: raw(&node.financial_data.revenue_growth),
            target_mean_price: raw(&node.financial_data.target_mean_price),
            recommendation_mean: raw(&node.financial_data.recommendation_mean),
        }
    }
}
