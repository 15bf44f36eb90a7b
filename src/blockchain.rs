use tracing::{debug, error, info, warn};

use crate::block::Block;
use crate::error::{Result, RustChainError};
use crate::pow::ProofOfWork;

pub const GENESIS_DATA: &[u8] = b"Genesis";

// 只支持单写者：add_block期间挖矿会阻塞调用方，调用方负责串行追加
#[derive(Debug)]
pub struct Blockchain {
    blocks: Vec<Block>,
}

impl Blockchain {
    pub fn new() -> Result<Self> {
        info!("创建新的区块链");
        let genesis = Block::new(GENESIS_DATA, Vec::new())?;
        info!("创世区块创建成功，哈希: {}", hex::encode(&genesis.hash));

        Ok(Blockchain {
            blocks: vec![genesis],
        })
    }

    pub fn add_block(&mut self, data: impl Into<Vec<u8>>) -> Result<&Block> {
        let prev_hash = self.last_block().hash.clone();
        debug!("开始添加新区块, 前置哈希: {}", hex::encode(&prev_hash));

        let block = Block::new(data, prev_hash)?;
        self.append_block(block)?;

        Ok(self.last_block())
    }

    pub fn append_block(&mut self, block: Block) -> Result<()> {
        if !block.is_sealed() {
            error!("拒绝追加未密封的区块");
            return Err(RustChainError::InvalidBlock("区块未密封".to_string()));
        }

        if !block.verify_hash() || !ProofOfWork::new(&block).validate() {
            error!("区块 {} 工作量证明验证失败", hex::encode(&block.hash));
            return Err(RustChainError::InvalidBlock(format!(
                "区块 {} 工作量证明无效",
                hex::encode(&block.hash)
            )));
        }

        let last_hash = &self.last_block().hash;
        if block.prev_hash != *last_hash {
            error!(
                "区块的前置哈希 {} 与链尾哈希 {} 不匹配",
                hex::encode(&block.prev_hash),
                hex::encode(last_hash)
            );
            return Err(RustChainError::InvalidBlock(format!(
                "前置哈希 {} 与链尾哈希 {} 不匹配",
                hex::encode(&block.prev_hash),
                hex::encode(last_hash)
            )));
        }

        self.blocks.push(block);
        info!("成功添加新区块，当前区块链长度: {}", self.blocks.len());

        Ok(())
    }

    pub fn validate_chain(&self) -> bool {
        info!("开始验证区块链");

        for (i, block) in self.blocks.iter().enumerate() {
            debug!("验证第 {} 个区块", i);

            if !block.is_sealed() {
                error!("区块 {} 未密封", i);
                return false;
            }

            if !block.verify_hash() {
                error!("区块 {} 哈希验证失败", i);
                return false;
            }

            if !ProofOfWork::new(block).validate() {
                error!("区块 {} 工作量证明验证失败", i);
                return false;
            }

            if i == 0 {
                if !block.prev_hash.is_empty() {
                    error!("创世区块的前置哈希应为空");
                    return false;
                }
            } else if block.prev_hash != self.blocks[i - 1].hash {
                error!("区块 {} 的前置哈希不匹配", i);
                return false;
            }
        }

        info!("区块链验证完成，验证通过");
        true
    }

    pub fn get_block(&self, hash: &[u8]) -> Result<&Block> {
        debug!("查找哈希为 {} 的区块", hex::encode(hash));
        self.blocks
            .iter()
            .find(|block| block.hash == hash)
            .ok_or_else(|| {
                warn!("未找到哈希为 {} 的区块", hex::encode(hash));
                RustChainError::BlockNotFound(hex::encode(hash))
            })
    }

    pub fn get_last_hash(&self) -> &[u8] {
        &self.last_block().hash
    }

    pub fn get_block_height(&self) -> usize {
        self.blocks.len()
    }

    pub fn last_block(&self) -> &Block {
        // new保证链上始终至少有创世区块
        self.blocks.last().expect("区块链不能为空")
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_chain_has_genesis() -> Result<()> {
        let blockchain = Blockchain::new()?;

        assert_eq!(blockchain.get_block_height(), 1, "New chain should hold one block");

        let genesis = &blockchain.blocks()[0];
        assert_eq!(genesis.data, GENESIS_DATA.to_vec(), "Genesis data should be 'Genesis'");
        assert!(genesis.prev_hash.is_empty(), "Genesis previous hash should be empty");
        assert!(genesis.is_sealed(), "Genesis block should be sealed");

        // 创世区块同样满足序列化往返律
        let bytes = genesis.serialize()?;
        assert_eq!(&Block::deserialize(&bytes)?, genesis);

        Ok(())
    }

    #[test]
    fn test_add_block_links_to_previous() -> Result<()> {
        let mut blockchain = Blockchain::new()?;

        blockchain.add_block(b"A".to_vec())?;
        blockchain.add_block(b"B".to_vec())?;

        assert_eq!(blockchain.get_block_height(), 3);

        let blocks = blockchain.blocks();
        assert_eq!(blocks[1].data, b"A".to_vec());
        assert_eq!(blocks[2].data, b"B".to_vec());
        assert_eq!(
            blocks[1].prev_hash, blocks[0].hash,
            "Second block should link to the genesis hash"
        );
        assert_eq!(
            blocks[2].prev_hash, blocks[1].hash,
            "Third block should link to the second block hash"
        );

        Ok(())
    }

    #[test]
    fn test_append_block_accepts_externally_mined() -> Result<()> {
        let mut blockchain = Blockchain::new()?;

        let block = Block::new(b"external".to_vec(), blockchain.get_last_hash().to_vec())?;
        blockchain.append_block(block)?;

        assert_eq!(blockchain.get_block_height(), 2);
        assert!(blockchain.validate_chain());

        Ok(())
    }

    #[test]
    fn test_append_block_rejects_unsealed() -> Result<()> {
        let mut blockchain = Blockchain::new()?;

        let unsealed = Block {
            hash: Vec::new(),
            data: b"unsealed".to_vec(),
            prev_hash: blockchain.get_last_hash().to_vec(),
            nonce: 0,
        };

        assert!(matches!(
            blockchain.append_block(unsealed),
            Err(RustChainError::InvalidBlock(_))
        ));
        assert_eq!(blockchain.get_block_height(), 1, "Chain should be unchanged");

        Ok(())
    }

    #[test]
    fn test_append_block_rejects_mismatched_prev_hash() -> Result<()> {
        let mut blockchain = Blockchain::new()?;

        // 合法挖出的区块，但链接到了错误的前置哈希
        let mislinked = Block::new(b"mislinked".to_vec(), b"bogus prev hash".to_vec())?;

        assert!(matches!(
            blockchain.append_block(mislinked),
            Err(RustChainError::InvalidBlock(_))
        ));
        assert_eq!(blockchain.get_block_height(), 1, "Chain should be unchanged");

        Ok(())
    }

    #[test]
    fn test_append_block_rejects_tampered_hash() -> Result<()> {
        let mut blockchain = Blockchain::new()?;

        let mut block = Block::new(b"tampered".to_vec(), blockchain.get_last_hash().to_vec())?;
        block.hash[0] ^= 0xFF;

        assert!(matches!(
            blockchain.append_block(block),
            Err(RustChainError::InvalidBlock(_))
        ));

        Ok(())
    }

    #[test]
    fn test_validate_chain_detects_tampering() -> Result<()> {
        let mut blockchain = Blockchain::new()?;
        blockchain.add_block(b"A".to_vec())?;
        blockchain.add_block(b"B".to_vec())?;

        assert!(blockchain.validate_chain());

        // 篡改链中间区块的数据
        blockchain.blocks[1].data = b"tampered".to_vec();
        assert!(
            !blockchain.validate_chain(),
            "A tampered interior block should fail chain validation"
        );

        Ok(())
    }

    #[test]
    fn test_get_block() -> Result<()> {
        let mut blockchain = Blockchain::new()?;
        blockchain.add_block(b"A".to_vec())?;

        let hash = blockchain.blocks()[1].hash.clone();
        let found = blockchain.get_block(&hash)?;
        assert_eq!(found.data, b"A".to_vec());

        assert!(matches!(
            blockchain.get_block(&[0u8; 32]),
            Err(RustChainError::BlockNotFound(_))
        ));

        Ok(())
    }

    #[test]
    fn test_get_last_hash() -> Result<()> {
        let mut blockchain = Blockchain::new()?;
        let added = blockchain.add_block(b"A".to_vec())?.hash.clone();

        assert_eq!(blockchain.get_last_hash(), added.as_slice());

        Ok(())
    }
}
