use thiserror::Error;

#[derive(Error, Debug)]
pub enum RustChainError {
    #[error("序列化错误: {0}")]
    SerializationError(String),

    #[error("反序列化错误: {0}")]
    DeserializationError(String),

    #[error("无效区块: {0}")]
    InvalidBlock(String),

    #[error("区块未找到: {0}")]
    BlockNotFound(String),

    #[error("nonce搜索空间耗尽, 难度: {0}")]
    SearchExhausted(u32),
}

impl From<bincode::Error> for RustChainError {
    fn from(err: bincode::Error) -> Self {
        RustChainError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RustChainError>;
