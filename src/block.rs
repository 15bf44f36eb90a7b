use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{Result, RustChainError};
use crate::pow::ProofOfWork;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Block {
    pub hash: Vec<u8>,
    pub data: Vec<u8>,
    pub prev_hash: Vec<u8>,
    pub nonce: i64,
}

impl Block {
    // 同步阻塞直到挖矿结束，返回的区块保证已密封且自洽
    pub fn new(data: impl Into<Vec<u8>>, prev_hash: Vec<u8>) -> Result<Block> {
        debug!("创建新区块，前置哈希: {}", hex::encode(&prev_hash));

        let mut block = Block {
            hash: Vec::new(),
            data: data.into(),
            prev_hash,
            nonce: 0,
        };

        let (nonce, hash) = ProofOfWork::new(&block).run()?;
        block.hash = hash;
        block.nonce = nonce;

        info!("新区块创建成功，哈希: {}", hex::encode(&block.hash));
        Ok(block)
    }

    pub fn is_sealed(&self) -> bool {
        !self.hash.is_empty()
    }

    pub fn verify_hash(&self) -> bool {
        let calculated = ProofOfWork::new(self).hash_for_nonce(self.nonce);
        if calculated != self.hash {
            error!(
                "区块哈希验证失败，存储的哈希: {}, 计算的哈希: {}",
                hex::encode(&self.hash),
                hex::encode(&calculated)
            );
            return false;
        }
        true
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn deserialize(data: &[u8]) -> Result<Block> {
        bincode::deserialize(data)
            .map_err(|e| RustChainError::DeserializationError(e.to_string()))
    }
}
