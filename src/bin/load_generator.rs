use order_book::application::services::{ExpirySweeper, MatchingService};
use order_book::application::use_cases::OrderBookUseCase;
use order_book::domain::Side;
use order_book::shared::timestamp::{Clock, SystemClock};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// --- 配置 ---
const TEST_DURATION: Duration = Duration::from_secs(10); // 测试持续时间
const NUM_CUSTOMERS: u64 = 64; // 模拟的客户数量
const CANCEL_RATIO: f64 = 0.1; // 撤单占比
const QUERY_RATIO: f64 = 0.05; // 查询占比
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Default)]
struct Counters {
    submits: AtomicU64,
    matches: AtomicU64,
    cancels: AtomicU64,
    failed_cancels: AtomicU64,
    queries: AtomicU64,
}

#[tokio::main]
async fn main() {
    let workers = num_cpus::get();
    println!("启动吞吐量测试...");
    println!("工作线程数量: {}", workers);
    println!("测试持续时间: {:?}", TEST_DURATION);

    let service = Arc::new(MatchingService::new());
    let counters = Arc::new(Counters::default());
    let sweeper = ExpirySweeper::new(service.clone(), SWEEP_INTERVAL).spawn();

    let deadline = Instant::now() + TEST_DURATION;
    let handles: Vec<_> = (0..workers)
        .map(|worker| {
            let service = service.clone();
            let counters = counters.clone();
            thread::spawn(move || run_worker(worker, service, counters, deadline))
        })
        .collect();

    // 工作线程是阻塞的，交给阻塞线程池等待
    let joined = tokio::task::spawn_blocking(move || {
        for handle in handles {
            if handle.join().is_err() {
                eprintln!("工作线程异常退出");
            }
        }
    })
    .await;
    if let Err(e) = joined {
        eprintln!("等待工作线程失败: {}", e);
    }

    sweeper.shutdown().await;

    let submits = counters.submits.load(Ordering::Relaxed);
    let cancels = counters.cancels.load(Ordering::Relaxed);
    let queries = counters.queries.load(Ordering::Relaxed);
    let total_ops = submits + cancels + counters.failed_cancels.load(Ordering::Relaxed) + queries;

    println!("\n--- 测试结果 ---");
    println!("下单数: {}", submits);
    println!("撮合数: {}", counters.matches.load(Ordering::Relaxed));
    println!("撤单成功/失败: {}/{}", cancels, counters.failed_cancels.load(Ordering::Relaxed));
    println!("查询数: {}", queries);
    println!("吞吐量 (ops/s): {:.2}", total_ops as f64 / TEST_DURATION.as_secs_f64());
    println!("最终订单簿: {:?}", service.snapshot());
}

fn run_worker(
    worker: usize,
    service: Arc<MatchingService>,
    counters: Arc<Counters>,
    deadline: Instant,
) {
    let mut rng = rand::thread_rng();
    let mut my_orders = Vec::new();

    while Instant::now() < deadline {
        let roll: f64 = rng.gen();

        if roll < CANCEL_RATIO && !my_orders.is_empty() {
            let idx = rng.gen_range(0..my_orders.len());
            let order_id = my_orders.swap_remove(idx);
            match service.cancel_order(order_id) {
                Ok(_) => counters.cancels.fetch_add(1, Ordering::Relaxed),
                Err(_) => counters.failed_cancels.fetch_add(1, Ordering::Relaxed),
            };
            continue;
        }

        let customer_id = rng.gen_range(0..NUM_CUSTOMERS);

        if roll < CANCEL_RATIO + QUERY_RATIO {
            let _ = service.query_orders(customer_id);
            counters.queries.fetch_add(1, Ordering::Relaxed);
            continue;
        }

        let side = if rng.gen::<bool>() { Side::Buy } else { Side::Sell };
        let price = match side {
            Side::Buy => rng.gen_range(49_990..=50_000),
            Side::Sell => rng.gen_range(50_000..=50_010),
        };
        // 一部分订单带短有效期，让清理任务有活干
        let valid_until = if rng.gen_bool(0.3) {
            Some(SystemClock.after(Duration::from_millis(rng.gen_range(10..2_000))))
        } else {
            None
        };

        match service.submit_order(customer_id, price, side, valid_until) {
            Ok(submission) => {
                counters.submits.fetch_add(1, Ordering::Relaxed);
                if submission.is_matched() {
                    counters.matches.fetch_add(1, Ordering::Relaxed);
                } else {
                    my_orders.push(submission.order_id());
                }
            }
            Err(e) => eprintln!("[线程 {}] 下单失败: {}", worker, e),
        }
    }
}
