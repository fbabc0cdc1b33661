//! # Error 模块
//!
//! 定义 fx-host 中使用的错误类型。

use thiserror::Error;

use fx_runtime::FxError;

use crate::config::ConfigError;

/// 宿主层错误
#[derive(Error, Debug)]
pub enum HostError {
    /// 引擎错误（类型未注册等）
    #[error(transparent)]
    Runtime(#[from] FxError),

    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// 终端输出失败
    #[error("终端输出失败: {0}")]
    Io(#[from] std::io::Error),

    /// 命令行覆盖参数无效
    #[error("播放参数无效: {0}")]
    InvalidOverride(String),

    /// 序列没有任何步骤
    #[error("序列至少需要一个动画类型")]
    EmptySequence,
}

/// Result 类型别名
pub type HostResult<T> = Result<T, HostError>;
