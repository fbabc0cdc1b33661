//! # Error 模块
//!
//! 定义 fx-runtime 中使用的错误类型。
//!
//! 引擎层只有一类错误会传播给调用方：请求了未注册的动画类型。
//! 效果层的渲染问题（找不到目标表面等）在效果内部吸收，表现为动画立即完成。

use thiserror::Error;

use crate::kind::AnimationType;

/// fx-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FxError {
    /// 动画类型未注册
    #[error("动画类型 '{kind}' 未注册")]
    NotRegistered { kind: AnimationType },
}

/// Result 类型别名
pub type FxResult<T> = Result<T, FxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_registered_message() {
        let err = FxError::NotRegistered {
            kind: AnimationType::Glitch,
        };
        assert_eq!(err.to_string(), "动画类型 'glitch' 未注册");
    }
}
