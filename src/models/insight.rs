//! 盘面洞察数据模型

use serde::{Deserialize, Serialize};

/// 日内行情的聚合统计
///
/// 所有字段均为 Option：输入序列为空时返回全 None，
/// 序列化结果为 `{}`（空洞察），而不是报错
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSummary {
    /// 趋势方向：bullish / bearish
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_direction: Option<String>,
    /// 平均单根K线振幅（high - low）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
    /// 振幅相对开盘价的百分比
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility_percent: Option<f64>,
    /// 成交量趋势：increasing / decreasing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_trend: Option<String>,
    /// 阳线数量
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullish_candles: Option<usize>,
    /// 阴线数量
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearish_candles: Option<usize>,
    /// 阻力位（最高价 - 0.25 × 全幅）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resistance_level: Option<f64>,
    /// 支撑位（最低价 + 0.25 × 全幅）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_level: Option<f64>,
    /// 近期动量：positive / negative
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_trend: Option<String>,
    /// 相对强度（平均阳线涨幅 / 平均阴线跌幅）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_volume: Option<u64>,
    /// 平均成交量（四舍五入为整数）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_volume: Option<u64>,
}

impl InsightSummary {
    /// 空洞察，序列化为 `{}`
    pub fn empty() -> Self {
        Self::default()
    }
}
