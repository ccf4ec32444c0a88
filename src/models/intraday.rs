//! 日内行情数据模型
//!
//! /chart-with-chat 接口使用的K线和响应结构

use serde::{Deserialize, Serialize};

use super::InsightSummary;

/// 单根日内K线
///
/// 相比日线K线多了 time（盘中时刻）和 gain（是否收阳）字段
/// 模拟数据与真实数据共用此结构，下游仅能通过 isMockData 区分
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntradayCandle {
    /// 盘中时刻（HH:MM）
    pub time: String,
    /// Unix 毫秒时间戳
    pub timestamp: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
    /// 是否收阳（close > open），价格缺失时为 None
    pub gain: Option<bool>,
}

/// /chart-with-chat 接口响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntradayResponse {
    pub symbol: String,
    /// 数据日期（YYYY-MM-DD）
    pub date: String,
    pub interval: String,
    pub data: Vec<IntradayCandle>,
    pub insights: InsightSummary,
    #[serde(rename = "isMockData")]
    pub is_mock_data: bool,
}

/// /chart-with-chat 查询参数
#[derive(Debug, Deserialize)]
pub struct IntradayQuery {
    /// 股票代码，缺省 AAPL
    pub symbol: Option<String>,
    /// 日期（YYYY-MM-DD），缺省当天
    pub date: Option<String>,
    /// K线周期，缺省 30m
    pub interval: Option<String>,
}
