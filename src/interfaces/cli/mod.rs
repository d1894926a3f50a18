/// CLI Interface Module
///
/// Command-line entry point of the `order-book` binary.
///
/// ## Responsibilities
/// - Parse command-line arguments
/// - Initialise logging
/// - Wire the matching service and the expiry sweeper
/// - Drive a demonstration workload against the book

use crate::application::services::{ExpirySweeper, MatchingService};
use crate::application::use_cases::OrderBookUseCase;
use crate::domain::{CustomerId, OrderBook, OrderId, OrderValidator, Side, ValidationConfig};
use crate::shared::metrics::METRICS;
use crate::shared::timestamp::{Clock, SystemClock};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

/// 订单簿命令行配置
#[derive(Parser, Debug, Clone)]
#[command(name = "order-book")]
#[command(version = "0.1.0")]
#[command(about = "价格-时间优先的内存撮合订单簿", long_about = None)]
pub struct CliConfig {
    /// 日志级别
    #[arg(short = 'l', long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,

    /// 过期订单清理周期（秒）
    #[arg(short = 's', long, default_value_t = 5)]
    pub sweep_interval_secs: u64,

    /// 最低价格（含）
    #[arg(long, default_value_t = 1)]
    pub min_price: u64,

    /// 最高价格（含）
    #[arg(long, default_value_t = u64::MAX)]
    pub max_price: u64,

    /// 演示订单的有效期（秒）
    #[arg(short = 'g', long, default_value_t = 3600)]
    pub gtt_secs: u64,

    /// 演示结束后保持清理任务运行的时间（秒）
    #[arg(long, default_value_t = 0)]
    pub hold_secs: u64,

    /// 退出前打印Prometheus指标
    #[arg(long, default_value_t = false)]
    pub print_metrics: bool,

    /// 仅显示配置不运行（用于调试）
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

impl CliConfig {
    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }
}

/// Outcome of the demonstration workload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoReport {
    pub submitted: usize,
    pub cancelled: usize,
    pub failed_cancels: Vec<OrderId>,
    pub remaining: usize,
}

/// Runs the CLI application
pub async fn run() {
    // 解析命令行参数
    let config = CliConfig::parse();

    // 初始化日志系统
    init_logging(&config.log_level);

    tracing::info!("订单簿启动");
    tracing::debug!("配置: {:?}", config);

    println!("========================================");
    println!("  价格-时间优先订单簿 v0.1.0");
    println!("========================================");
    println!("清理周期:     {}s", config.sweep_interval_secs);
    println!("价格区间:     [{}, {}]", config.min_price, config.max_price);
    println!("订单有效期:   {}s", config.gtt_secs);
    println!("日志级别:     {}", config.log_level);
    println!("========================================");

    if config.dry_run {
        println!("\nDry-run 模式 - 不运行演示");
        return;
    }

    let validator = OrderValidator::with_config(config.validation_config());
    let service = Arc::new(MatchingService::with_book(OrderBook::with_validator(
        validator,
        SystemClock,
    )));

    let sweeper = ExpirySweeper::new(
        service.clone(),
        Duration::from_secs(config.sweep_interval_secs),
    )
    .spawn();

    let report = run_demo(service.clone(), Duration::from_secs(config.gtt_secs)).await;
    tracing::info!(
        submitted = report.submitted,
        cancelled = report.cancelled,
        remaining = report.remaining,
        "演示完成"
    );

    if config.hold_secs > 0 {
        println!("\n保持运行 {}s，等待过期清理...", config.hold_secs);
        tokio::time::sleep(Duration::from_secs(config.hold_secs)).await;
        println!("当前订单簿: {:?}", service.snapshot());
    }

    sweeper.shutdown().await;

    if config.print_metrics {
        println!("\n{}", METRICS.export());
    }

    tracing::info!("订单簿关闭");
}

/// Demonstration workload: concurrent submitters, queries, a concurrent
/// cancel batch for ids 1..=6, then queries again.
pub async fn run_demo<S>(service: Arc<S>, gtt: Duration) -> DemoReport
where
    S: OrderBookUseCase + 'static,
{
    let batches: [(CustomerId, Side, [u64; 3]); 3] = [
        (1, Side::Buy, [100, 101, 102]),
        (2, Side::Buy, [99, 98, 97]),
        (3, Side::Sell, [110, 109, 108]),
    ];

    // 并发提交：每个客户一个阻塞任务
    let submitters: Vec<_> = batches
        .into_iter()
        .map(|(customer_id, side, prices)| {
            let service = service.clone();
            tokio::task::spawn_blocking(move || {
                let mut accepted: usize = 0;
                for price in prices {
                    let valid_until = Some(SystemClock.after(gtt));
                    match service.submit_order(customer_id, price, side, valid_until) {
                        Ok(_) => accepted += 1,
                        Err(e) => eprintln!("客户 {} 下单失败: {}", customer_id, e),
                    }
                }
                accepted
            })
        })
        .collect();

    let mut submitted: usize = 0;
    for submitter in submitters {
        match submitter.await {
            Ok(accepted) => submitted += accepted,
            Err(e) => tracing::warn!(error = %e, "submitter task failed"),
        }
    }

    let customers: Vec<CustomerId> = batches.iter().map(|(customer_id, _, _)| *customer_id).collect();
    print_orders(service.as_ref(), &customers);

    // 并发撤单
    let canceller = {
        let service = service.clone();
        tokio::task::spawn_blocking(move || {
            let mut failed = Vec::new();
            for order_id in 1..=6 {
                if let Err(e) = service.cancel_order(order_id) {
                    eprintln!("撤单 {} 失败: {}", order_id, e);
                    failed.push(order_id);
                }
            }
            failed
        })
    };

    let failed_cancels = match canceller.await {
        Ok(failed) => failed,
        Err(e) => {
            tracing::warn!(error = %e, "canceller task failed");
            (1..=6).collect()
        }
    };

    print_orders(service.as_ref(), &customers);

    let remaining = customers
        .iter()
        .map(|customer_id| service.query_orders(*customer_id).len())
        .sum();

    DemoReport {
        submitted,
        cancelled: 6 - failed_cancels.len(),
        failed_cancels,
        remaining,
    }
}

fn print_orders<S: OrderBookUseCase + ?Sized>(service: &S, customers: &[CustomerId]) {
    for customer_id in customers {
        let orders = service.query_orders(*customer_id);
        println!("客户 {} 的有效订单 ({}):", customer_id, orders.len());
        for order in orders {
            match serde_json::to_string(&order) {
                Ok(json) => println!("  {}", json),
                Err(e) => eprintln!("  无法序列化订单 {}: {}", order.id, e),
            }
        }
    }
}

/// 初始化日志系统
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
