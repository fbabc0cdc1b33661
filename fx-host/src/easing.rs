//! # Easing 模块
//!
//! 缓动函数库，用于淡入淡出和脉冲的亮度插值。

use std::f64::consts::PI;

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    /// 缓入（先慢后快）
    EaseIn,
    /// 缓出（先快后慢）
    EaseOut,
    /// 缓入缓出（两头慢中间快）
    #[default]
    EaseInOut,
    /// 正弦缓入缓出
    EaseInOutSine,
    /// 弹跳缓出
    EaseOutBounce,
}

impl EasingFunction {
    /// 按名称查找（大小写不敏感，`-` 与 `_` 等价）
    ///
    /// 用于读取 `extra.easing`。
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase().replace('_', "-");
        match name.as_str() {
            "linear" => Some(EasingFunction::Linear),
            "ease-in" => Some(EasingFunction::EaseIn),
            "ease-out" => Some(EasingFunction::EaseOut),
            "ease-in-out" => Some(EasingFunction::EaseInOut),
            "sine" | "ease-in-out-sine" => Some(EasingFunction::EaseInOutSine),
            "bounce" | "ease-out-bounce" => Some(EasingFunction::EaseOutBounce),
            _ => None,
        }
    }

    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    ///
    /// # 返回
    /// - 缓动后的进度值 (0.0 - 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseIn => t * t * t,
            EasingFunction::EaseOut => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            EasingFunction::EaseOutBounce => ease_out_bounce(t),
        }
    }
}

/// 弹跳缓出
fn ease_out_bounce(t: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_and_clamp() {
        let easing = EasingFunction::Linear;
        assert_eq!(easing.apply(0.5), 0.5);
        assert_eq!(easing.apply(-0.5), 0.0);
        assert_eq!(easing.apply(1.5), 1.0);
    }

    #[test]
    fn test_endpoints() {
        for easing in [
            EasingFunction::EaseIn,
            EasingFunction::EaseOut,
            EasingFunction::EaseInOut,
            EasingFunction::EaseInOutSine,
            EasingFunction::EaseOutBounce,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-9, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9, "{easing:?}");
        }
        // 中点应该是 0.5
        assert!((EasingFunction::EaseInOut.apply(0.5) - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            EasingFunction::from_name("Ease_In_Out"),
            Some(EasingFunction::EaseInOut)
        );
        assert_eq!(
            EasingFunction::from_name("sine"),
            Some(EasingFunction::EaseInOutSine)
        );
        assert_eq!(EasingFunction::from_name("wobble"), None);
    }
}
