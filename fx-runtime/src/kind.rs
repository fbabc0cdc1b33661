//! # Kind 模块
//!
//! 动画的符号类型。调用方只通过 [`AnimationType`] 请求动画，不接触具体实现。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 动画符号类型
///
/// 内置类型在编译期已知；新的效果通过 [`AnimationType::Custom`] 注册，
/// 不需要修改引擎。
///
/// ## 名称映射（大小写不敏感）
///
/// | 名称 | 变体 |
/// |------|------|
/// | `typing` | `Typing` |
/// | `glitch` | `Glitch` |
/// | `flicker` | `Flicker` |
/// | `pulse` | `Pulse` |
/// | `digital-rain` / `matrix` | `DigitalRain` |
/// | `fade-in` | `FadeIn` |
/// | `fade-out` | `FadeOut` |
/// | `scan-line` | `ScanLine` |
/// | 其他 | `Custom(name)` |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnimationType {
    /// 逐字打出
    Typing,
    /// 字符故障替换
    Glitch,
    /// 闪烁
    Flicker,
    /// 亮度脉冲
    Pulse,
    /// 数字雨
    DigitalRain,
    /// 淡入
    FadeIn,
    /// 淡出
    FadeOut,
    /// 扫描线
    ScanLine,
    /// 自定义类型
    Custom(String),
}

impl AnimationType {
    /// 所有内置类型
    pub const BUILTIN: [AnimationType; 8] = [
        AnimationType::Typing,
        AnimationType::Glitch,
        AnimationType::Flicker,
        AnimationType::Pulse,
        AnimationType::DigitalRain,
        AnimationType::FadeIn,
        AnimationType::FadeOut,
        AnimationType::ScanLine,
    ];

    /// 规范名称
    pub fn as_str(&self) -> &str {
        match self {
            AnimationType::Typing => "typing",
            AnimationType::Glitch => "glitch",
            AnimationType::Flicker => "flicker",
            AnimationType::Pulse => "pulse",
            AnimationType::DigitalRain => "digital-rain",
            AnimationType::FadeIn => "fade-in",
            AnimationType::FadeOut => "fade-out",
            AnimationType::ScanLine => "scan-line",
            AnimationType::Custom(name) => name,
        }
    }

    /// 是否为自定义类型
    pub fn is_custom(&self) -> bool {
        matches!(self, AnimationType::Custom(_))
    }
}

impl fmt::Display for AnimationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimationType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_lowercase().as_str() {
            "typing" => AnimationType::Typing,
            "glitch" => AnimationType::Glitch,
            "flicker" => AnimationType::Flicker,
            "pulse" => AnimationType::Pulse,
            "digital-rain" | "matrix" => AnimationType::DigitalRain,
            "fade-in" => AnimationType::FadeIn,
            "fade-out" => AnimationType::FadeOut,
            "scan-line" => AnimationType::ScanLine,
            _ => AnimationType::Custom(s.trim().to_string()),
        };
        Ok(kind)
    }
}

impl From<String> for AnimationType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for AnimationType {
    fn from(value: &str) -> Self {
        AnimationType::from(value.to_string())
    }
}

impl From<AnimationType> for String {
    fn from(value: AnimationType) -> Self {
        value.as_str().to_string()
    }
}
