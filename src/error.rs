use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 进程退出码，每类失败对应一个
pub mod exit {
    pub const SUCCESS: u8 = 0;
    pub const ARGUMENT: u8 = 1;
    pub const MODE: u8 = 2;
    pub const DIRECTORY: u8 = 3;
    pub const NO_IMAGES: u8 = 4;
    pub const DECODE: u8 = 5;
    pub const RESIZE: u8 = 6;
    pub const PERSISTENCE: u8 = 7;
    pub const ROUTING: u8 = 8;
    pub const MODEL: u8 = 9;
    pub const UNKNOWN: u8 = 10;
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// 无法打开输入目录，整个操作终止
    #[error("无法打开目录 {path}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 目录中没有任何可用的图片
    #[error("目录中没有找到图片: {path}")]
    NoImages { path: PathBuf },

    /// 图片损坏或格式不支持
    #[error("无法解码图片 {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("无法缩放图片 {path}: {reason}")]
    Resize { path: PathBuf, reason: String },

    /// 读写 CSV 文件失败
    #[error("无法读写文件 {path}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// CSV 行格式错误，行号从 1 开始
    #[error("{path} 第 {line} 行格式错误: {reason}")]
    Format { path: PathBuf, line: usize, reason: String },

    #[error("向量长度不一致: 期望 {expected}, 实际 {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("无效的聚类数量 K = {k}，样本数量为 {n}")]
    InvalidClusterCount { k: usize, n: usize },

    #[error("聚类失败: {0}")]
    Clustering(String),

    /// 无法创建聚类输出目录
    #[error("无法创建目录 {path}")]
    Routing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Directory { .. } => exit::DIRECTORY,
            Error::NoImages { .. } => exit::NO_IMAGES,
            Error::Decode { .. } => exit::DECODE,
            Error::Resize { .. } => exit::RESIZE,
            Error::Persistence { .. } => exit::PERSISTENCE,
            Error::Routing { .. } => exit::ROUTING,
            Error::InvalidClusterCount { .. } => exit::ARGUMENT,
            Error::Format { .. } | Error::DimensionMismatch { .. } | Error::Clustering(_) => {
                exit::MODEL
            }
        }
    }

    /// 单个文件的失败，调用方跳过该文件后继续
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Decode { .. } | Error::Resize { .. })
    }
}

/// 从 anyhow 错误链中找到退出码
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|e| e.downcast_ref::<Error>())
        .map(Error::exit_code)
        .unwrap_or(exit::UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_from_anyhow() {
        let err = anyhow::Error::new(Error::NoImages { path: "x".into() });
        assert_eq!(exit_code(&err), exit::NO_IMAGES);

        let err = anyhow::Error::new(Error::DimensionMismatch { expected: 1, actual: 2 })
            .context("读取模型失败");
        assert_eq!(exit_code(&err), exit::MODEL);

        let err = anyhow::anyhow!("其他错误");
        assert_eq!(exit_code(&err), exit::UNKNOWN);
    }

    #[test]
    fn test_recoverable() {
        let err = Error::Resize { path: "a.png".into(), reason: "zero".into() };
        assert!(err.is_recoverable());
        assert!(!Error::NoImages { path: "x".into() }.is_recoverable());
    }
}
