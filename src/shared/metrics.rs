//! Prometheus Metrics Module
//!
//! 订单簿的核心运行指标
//!
//! ## 指标类型
//! - **Counter**: 下单数、撮合数、撤单数、过期数、错误数
//! - **Histogram**: 下单处理耗时
//! - **Gauge**: 两侧队列长度
//!
//! ## 使用示例
//! ```rust,ignore
//! use order_book::shared::metrics::METRICS;
//!
//! METRICS.orders_total.with_label_values(&["buy"]).inc();
//!
//! let timer = METRICS.submit_duration.start_timer();
//! // ... 撮合 ...
//! timer.observe_duration();
//! ```

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge_vec, register_histogram, CounterVec, Encoder, GaugeVec,
    Histogram, TextEncoder,
};

lazy_static! {
    /// 全局Metrics实例
    pub static ref METRICS: Metrics = Metrics::new();
}

/// 订单簿核心指标
pub struct Metrics {
    /// 下单总数 (按方向: buy/sell)
    pub orders_total: CounterVec,

    /// 撮合成交总数 (按主动方方向)
    pub matches_total: CounterVec,

    /// 撤单总数 (按结果: ok/not_found)
    pub cancellations_total: CounterVec,

    /// 过期订单总数 (按方向和发现阶段: submit/match/sweep)
    pub expired_total: CounterVec,

    /// 错误总数 (按类型)
    pub errors_total: CounterVec,

    /// 队列长度 (含尚未清理的墓碑)
    pub depth: GaugeVec,

    /// 下单处理耗时分布 (微秒)
    pub submit_duration: Histogram,
}

impl Metrics {
    /// 创建新的Metrics实例
    pub fn new() -> Self {
        Self {
            orders_total: register_counter_vec!(
                "order_book_orders_total",
                "Total number of accepted order submissions",
                &["side"]
            )
            .unwrap(),

            matches_total: register_counter_vec!(
                "order_book_matches_total",
                "Total number of matches, labelled by aggressor side",
                &["side"]
            )
            .unwrap(),

            cancellations_total: register_counter_vec!(
                "order_book_cancellations_total",
                "Total number of cancel requests",
                &["status"]
            )
            .unwrap(),

            expired_total: register_counter_vec!(
                "order_book_expired_total",
                "Total number of orders destroyed because their good-til-time lapsed",
                &["side", "stage"]
            )
            .unwrap(),

            errors_total: register_counter_vec!(
                "order_book_errors_total",
                "Total number of rejected requests",
                &["error_type"]
            )
            .unwrap(),

            depth: register_gauge_vec!(
                "order_book_depth",
                "Current queue length per side, including pending tombstones",
                &["side"]
            )
            .unwrap(),

            submit_duration: register_histogram!(
                "order_book_submit_duration_microseconds",
                "Submit (validate + match + rest) duration in microseconds",
                vec![1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 5000.0]
            )
            .unwrap(),
        }
    }

    /// 导出Prometheus文本格式的指标
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = vec![];
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::warn!(error = %e, "failed to encode metrics");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
