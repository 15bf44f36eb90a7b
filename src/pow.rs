use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info};

use crate::block::Block;
use crate::config;
use crate::error::{Result, RustChainError};

pub type Target = [u8; 32];

pub struct ProofOfWork<'a> {
    block: &'a Block,
    difficulty: u32,
    target: Target,
}

impl<'a> ProofOfWork<'a> {
    pub fn new(block: &'a Block) -> Self {
        Self::with_difficulty(block, config::difficulty())
    }

    pub fn with_difficulty(block: &'a Block, difficulty: u32) -> Self {
        let target = calculate_target(difficulty);
        ProofOfWork {
            block,
            difficulty,
            target,
        }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    // 拼接哈希输入: prev_hash || data || nonce大端8字节 || 难度大端8字节
    // 挖矿和验证必须使用完全相同的字节布局
    pub fn prepare_data(&self, nonce: i64) -> Vec<u8> {
        let mut data =
            Vec::with_capacity(self.block.prev_hash.len() + self.block.data.len() + 16);
        data.extend_from_slice(&self.block.prev_hash);
        data.extend_from_slice(&self.block.data);
        data.extend_from_slice(&int_to_bytes(nonce));
        data.extend_from_slice(&int_to_bytes(i64::from(self.difficulty)));
        data
    }

    pub fn run(&self) -> Result<(i64, Vec<u8>)> {
        info!("开始挖矿，难度: {}", self.difficulty);

        let mut nonce: i64 = 0;
        loop {
            let hash = Sha256::digest(self.prepare_data(nonce));

            if nonce > 0 && nonce % 100_000 == 0 {
                debug!("挖矿尝试次数: {}", nonce);
            }

            if meets_target(hash.as_slice(), &self.target) {
                info!("挖矿成功，nonce: {}, 哈希: {}", nonce, hex::encode(&hash));
                return Ok((nonce, hash.to_vec()));
            }

            if nonce == i64::MAX {
                error!("nonce搜索空间耗尽，难度: {}", self.difficulty);
                return Err(RustChainError::SearchExhausted(self.difficulty));
            }
            nonce += 1;
        }
    }

    // 并行搜索不相交的nonce区间，find_first保证取最小的命中nonce，
    // 因此结果与run完全一致
    pub fn run_parallel(&self) -> Result<(i64, Vec<u8>)> {
        info!("开始并行挖矿，难度: {}", self.difficulty);

        let found = (0..=i64::MAX).into_par_iter().find_first(|&nonce| {
            let hash = Sha256::digest(self.prepare_data(nonce));
            meets_target(hash.as_slice(), &self.target)
        });

        match found {
            Some(nonce) => {
                let hash = self.hash_for_nonce(nonce);
                info!("挖矿成功，nonce: {}, 哈希: {}", nonce, hex::encode(&hash));
                Ok((nonce, hash))
            }
            None => {
                error!("nonce搜索空间耗尽，难度: {}", self.difficulty);
                Err(RustChainError::SearchExhausted(self.difficulty))
            }
        }
    }

    pub fn hash_for_nonce(&self, nonce: i64) -> Vec<u8> {
        Sha256::digest(self.prepare_data(nonce)).to_vec()
    }

    // 只检查阈值条件，篡改检测还需比较重算哈希与block.hash，见Block::verify_hash
    pub fn validate(&self) -> bool {
        let hash = self.hash_for_nonce(self.block.nonce);
        meets_target(&hash, &self.target)
    }
}

// target = 2^(256 - difficulty)，大端字节序
pub fn calculate_target(difficulty: u32) -> Target {
    assert!(
        (config::MIN_DIFFICULTY..=config::MAX_DIFFICULTY).contains(&difficulty),
        "difficulty must be between {} and {}",
        config::MIN_DIFFICULTY,
        config::MAX_DIFFICULTY
    );

    let mut target = [0u8; 32];
    let bit = (256 - difficulty) as usize;
    target[31 - bit / 8] = 1 << (bit % 8);
    target
}

// 等长大端字节序的字典序比较即数值比较
fn meets_target(hash: &[u8], target: &Target) -> bool {
    hash < &target[..]
}

pub fn int_to_bytes(num: i64) -> [u8; 8] {
    num.to_be_bytes()
}
