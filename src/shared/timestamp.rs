/// 时间戳与时钟抽象
///
/// 订单簿内部所有时间都是 Unix 纪元以来的纳秒数（`Timestamp`）。
/// 撮合核心通过 `Clock` trait 取当前时间，生产环境使用 `SystemClock`，
/// 测试使用可手动拨动的 `ManualClock`。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 纳秒级时间戳
pub type Timestamp = u64;

/// 获取精确时间戳（无缓存）
#[inline]
pub fn get_precise_timestamp() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as Timestamp
}

/// 把一段时长换算成纳秒，溢出时饱和
#[inline]
pub fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Source of "now" for the order book.
pub trait Clock {
    fn now(&self) -> Timestamp;

    /// Good-til-time that lapses `ttl` from now.
    fn after(&self, ttl: Duration) -> Timestamp {
        self.now().saturating_add(duration_to_nanos(ttl))
    }

    /// A timestamp `ago` in the past.
    fn before(&self, ago: Duration) -> Timestamp {
        self.now().saturating_sub(duration_to_nanos(ago))
    }
}

/// 系统墙钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Timestamp {
        get_precise_timestamp()
    }
}

/// 手动时钟，克隆体共享同一个时间值
///
/// 时间只会在调用 `advance` / `set` 时改变，用于确定性地测试过期逻辑。
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(duration_to_nanos(by), Ordering::SeqCst);
    }

    pub fn set(&self, to: Timestamp) {
        self.now.store(to, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
