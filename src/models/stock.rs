//! 股票数据模型
//!
//! 定义股票详情和历史K线相关的数据结构
//! 所有可缺失字段统一用 Option 表示，序列化时跳过 None

use serde::{Deserialize, Serialize};

/// 股票综合详情
///
/// 对应 /stock-details 接口的扁平化响应
/// 字段来源：Yahoo Finance 元数据 + 本地计算的技术指标
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDetails {
    // ==================== 基本信息 ====================
    /// 股票代码
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_name: Option<String>,
    /// 所属行业板块
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    // ==================== 价格数据 ====================
    /// 最新成交价
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_market_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_market_open: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_market_previous_close: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_market_day_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_market_day_low: Option<f64>,
    /// 当日涨跌额（最新价 - 昨收）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_change: Option<f64>,
    /// 当日涨跌幅（百分比）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_change_percent: Option<f64>,

    // ==================== 成交量数据 ====================
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_market_volume: Option<u64>,
    /// 10日平均成交量
    #[serde(rename = "averageDailyVolume10Day", skip_serializing_if = "Option::is_none")]
    pub average_daily_volume_10day: Option<f64>,
    /// 3个月平均成交量
    #[serde(rename = "averageDailyVolume3Month", skip_serializing_if = "Option::is_none")]
    pub average_daily_volume_3month: Option<f64>,

    // ==================== 技术指标 ====================
    /// 50日均线
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fifty_day_average: Option<f64>,
    /// 200日均线
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_hundred_day_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fifty_two_week_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fifty_two_week_low: Option<f64>,
    /// 支撑位（近20日最低3个低点均值）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_level: Option<f64>,
    /// 阻力位（近20日最高3个高点均值）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistance_level: Option<f64>,
    /// 14日相对强弱指标
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd_signal: Option<f64>,

    // ==================== 区间表现 ====================
    /// 周涨跌幅（近5个交易日）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_change: Option<f64>,
    /// 月涨跌幅（近22个交易日）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_change: Option<f64>,

    // ==================== 基本面数据 ====================
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(rename = "trailingPE", skip_serializing_if = "Option::is_none")]
    pub trailing_pe: Option<f64>,
    #[serde(rename = "forwardPE", skip_serializing_if = "Option::is_none")]
    pub forward_pe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_to_book: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_rate: Option<f64>,
    /// 股息率（已归一化为百分比）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    /// 季度盈利同比增速
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earnings_quarterly_growth: Option<f64>,
    /// 季度营收同比增速
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_quarterly_growth: Option<f64>,

    // ==================== 附加数据 ====================
    /// 分析师目标均价
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_mean_price: Option<f64>,
    /// 分析师评级（1=强烈买入 ... 5=卖出）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyst_rating: Option<f64>,
    /// 响应时间戳（Unix 秒）
    pub timestamp: f64,
    /// 数据日期（YYYY-MM-DD）
    pub data_date: String,
    /// 模拟数据标记，真实数据时不输出
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_mock_data: Option<bool>,
}

/// 单根K线（/historical-data 响应中的一条）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandleData {
    /// 日期时间（YYYY-MM-DD HH:MM:SS）
    pub date: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

/// /historical-data 接口响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalResponse {
    pub symbol: String,
    pub period: String,
    pub interval: String,
    pub data: Vec<CandleData>,
    #[serde(rename = "isMockData", skip_serializing_if = "Option::is_none")]
    pub is_mock_data: Option<bool>,
}

/// /stock-details 查询参数
#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    /// 股票代码，缺省 AAPL
    pub symbol: Option<String>,
    /// 数据区间，缺省 1y
    pub period: Option<String>,
}

/// /historical-data 查询参数
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub symbol: Option<String>,
    /// 数据区间（1d, 5d, 1mo, 3mo, 6mo, 1y, ...），缺省 1mo
    pub period: Option<String>,
    /// K线周期（1m, 5m, 30m, 1d, ...），缺省 1d
    pub interval: Option<String>,
}
