//! # Effects 模块
//!
//! 内置终端效果。
//!
//! 所有效果遵循同一约定：
//! - 第一次 `update` 时从 `options.target` 解析表面；解析不到就记录警告并请求终止
//! - 效果自己的缓冲（原始文本、雨滴列、随机数发生器）在第一次 `update` 时分配
//! - `complete` 把表面恢复到稳定状态并释放缓冲
//!
//! 带随机性的效果读取 `extra.seed`，指定后输出可复现。

mod digital_rain;
mod fade;
mod flicker;
mod glitch;
mod pulse;
mod scan_line;
mod typing;

use std::any::Any;
use std::sync::Arc;

use fx_runtime::{AnimationOptions, AnimationType, FrameContext, Orchestrator};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::warn;

use crate::easing::EasingFunction;

pub use digital_rain::DigitalRainEffect;
pub use fade::{FadeDirection, FadeEffect};
pub use flicker::FlickerEffect;
pub use glitch::GlitchEffect;
pub use pulse::PulseEffect;
pub use scan_line::ScanLineEffect;
pub use typing::TypingEffect;

/// 各效果的默认参数
///
/// 这些常量是内置效果参数的**唯一来源**，默认预设与效果实现都从这里读取。
pub mod defaults {
    /// 打字默认时长（毫秒）
    pub const TYPING_DURATION_MS: f64 = 1500.0;
    /// 故障默认时长（毫秒）
    pub const GLITCH_DURATION_MS: f64 = 600.0;
    /// 故障默认强度
    pub const GLITCH_INTENSITY: f64 = 0.4;
    /// 闪烁默认时长（毫秒）
    pub const FLICKER_DURATION_MS: f64 = 800.0;
    /// 闪烁默认强度
    pub const FLICKER_INTENSITY: f64 = 0.5;
    /// 脉冲默认单次时长（毫秒）
    pub const PULSE_DURATION_MS: f64 = 1200.0;
    /// 脉冲默认强度
    pub const PULSE_INTENSITY: f64 = 0.5;
    /// 数字雨默认时长（毫秒）
    pub const DIGITAL_RAIN_DURATION_MS: f64 = 3000.0;
    /// 数字雨默认密度（活跃列占比）
    pub const DIGITAL_RAIN_DENSITY: f64 = 0.6;
    /// 淡入/淡出默认时长（毫秒）
    pub const FADE_DURATION_MS: f64 = 800.0;
    /// 扫描线默认时长（毫秒）
    pub const SCAN_LINE_DURATION_MS: f64 = 1000.0;
}

/// 注册所有内置效果
pub fn register_builtin_effects(orchestrator: &mut Orchestrator) {
    orchestrator.register_animation(AnimationType::Typing, TypingEffect::default);
    orchestrator.register_animation(AnimationType::Glitch, GlitchEffect::default);
    orchestrator.register_animation(AnimationType::Flicker, FlickerEffect::default);
    orchestrator.register_animation(AnimationType::Pulse, PulseEffect::default);
    orchestrator.register_animation(AnimationType::DigitalRain, DigitalRainEffect::default);
    orchestrator.register_animation(AnimationType::FadeIn, FadeEffect::fade_in);
    orchestrator.register_animation(AnimationType::FadeOut, FadeEffect::fade_out);
    orchestrator.register_animation(AnimationType::ScanLine, ScanLineEffect::default);
}

/// 从帧上下文解析表面
///
/// 目标缺失或类型不符时请求终止动画，调用方的等待正常返回。
fn resolve_surface<T: Any + Send + Sync>(ctx: &mut FrameContext<'_>) -> Option<Arc<T>> {
    let surface = ctx.target().and_then(|target| target.downcast::<T>());
    if surface.is_none() {
        warn!(
            animation = %ctx.animation_type(),
            expected = std::any::type_name::<T>(),
            "找不到可渲染的目标，动画终止"
        );
        ctx.stop();
    }
    surface
}

/// 按 `extra.seed` 创建随机数发生器
fn seeded_rng(options: &AnimationOptions) -> SmallRng {
    match options.extra_u64("seed") {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

/// 读取强度，限制在 0.0 - 1.0；NaN 和无穷使用默认值
fn intensity(options: &AnimationOptions, default: f64) -> f64 {
    options
        .intensity
        .filter(|value| value.is_finite())
        .unwrap_or(default)
        .clamp(0.0, 1.0)
}

/// 读取 `extra.easing`，无法识别时使用默认值
fn easing(options: &AnimationOptions) -> EasingFunction {
    options
        .extra
        .get("easing")
        .and_then(|value| value.as_str())
        .and_then(EasingFunction::from_name)
        .unwrap_or_default()
}
