use tracing::info;

use rust_chain::{blockchain::Blockchain, error::Result};

fn main() -> Result<()> {
    // 初始化日志记录器
    tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::TRACE)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(false)
        .with_ansi(true)
        .pretty()
        .init();

    // 构建演示链
    let mut blockchain = Blockchain::new()?;
    blockchain.add_block(b"First Block".to_vec())?;
    blockchain.add_block(b"Second Block".to_vec())?;

    for (i, block) in blockchain.blocks().iter().enumerate() {
        info!(
            "区块 {}: 前置哈希: {}, 哈希: {}, nonce: {}",
            i,
            hex::encode(&block.prev_hash),
            hex::encode(&block.hash),
            block.nonce
        );
    }

    if blockchain.validate_chain() {
        info!("区块链验证通过");
    }

    Ok(())
}
