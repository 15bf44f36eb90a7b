use once_cell::sync::Lazy;

// 默认挖矿难度，预期搜索约 2^10 次哈希
pub const DEFAULT_DIFFICULTY: u32 = 10;

pub const MIN_DIFFICULTY: u32 = 1;
pub const MAX_DIFFICULTY: u32 = 255;

// 进程级难度配置，挖矿和验证必须使用同一个值
static DIFFICULTY: Lazy<u32> = Lazy::new(|| {
    std::env::var("RUST_CHAIN_DIFFICULTY")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|d| (MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(d))
        .unwrap_or(DEFAULT_DIFFICULTY)
});

pub fn difficulty() -> u32 {
    *DIFFICULTY
}
