//! Ingestion 错误类型

use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 无法连接数据源
    #[error("failed to connect to feed {addr}: {source}")]
    Connect {
        /// 目标地址
        addr: String,
        /// 底层 IO 错误
        #[source]
        source: std::io::Error,
    },

    /// 无法打开回放文件
    #[error("failed to open replay capture {path}: {source}")]
    OpenReplay {
        /// 文件路径
        path: String,
        /// 底层 IO 错误
        #[source]
        source: std::io::Error,
    },

    /// 读取数据源失败
    #[error("feed read failed: {0}")]
    Read(#[source] std::io::Error),
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
