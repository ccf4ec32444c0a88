//! 业务逻辑服务模块
//!
//! 封装数据获取、指标计算和模拟数据生成

pub mod indicators;    // 技术指标计算
pub mod insights;      // 盘面洞察统计
pub mod mock_service;  // 模拟行情生成
pub mod yahoo_service; // Yahoo Finance 行情网关

/// 行情获取结果
///
/// 区分真实数据和降级后的模拟数据，由接口层决定如何向调用方标记。
/// 模拟数据附带降级原因，只用于日志
#[derive(Debug)]
pub enum MarketData<T> {
    /// 来自上游的真实数据
    Live(T),
    /// 上游失败后生成的模拟数据，附降级原因
    Mock(T, String),
}

impl<T> MarketData<T> {
    /// 取出数据；模拟数据把降级原因连同接口上下文记入日志
    pub fn into_inner(self, context: &str) -> T {
        match self {
            MarketData::Live(data) => data,
            MarketData::Mock(data, reason) => {
                log::info!("{} 返回模拟数据: {}", context, reason);
                data
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_inner_returns_payload_for_both_variants() {
        assert_eq!(MarketData::Live(41).into_inner("/x"), 41);
        let mock = MarketData::Mock(42, "上游服务不可用".to_string());
        assert_eq!(mock.into_inner("/x"), 42);
    }
}
