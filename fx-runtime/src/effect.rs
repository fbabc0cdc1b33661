//! # Effect 模块
//!
//! 效果接口定义。引擎只依赖 [`Effect`] trait，不关心具体效果类型。
//!
//! ## 生命周期钩子
//!
//! - [`Effect::update`]：每帧调用一次，仅在 Playing 状态下
//! - [`Effect::complete`]：进入 Completed 时调用一次，用于释放效果自己分配的资源
//!
//! 效果需要的资源（字符缓冲、画布行等）应在第一次 `update` 时懒分配，
//! 在 `complete` 中释放。引擎本身从不分配这些资源。

use crate::kind::AnimationType;
use crate::options::{AnimationOptions, Target};

/// 单帧上下文
///
/// 提供当前配置的只读视图，以及在帧内请求终止的能力。
/// 效果不能在 `update` 中直接调用 [`Animation::stop`](crate::Animation::stop)，
/// 而是调用 [`FrameContext::stop`]，由引擎在本帧结束后执行终止。
#[derive(Debug)]
pub struct FrameContext<'a> {
    kind: &'a AnimationType,
    options: &'a AnimationOptions,
    stop_requested: bool,
}

impl<'a> FrameContext<'a> {
    /// 创建帧上下文
    ///
    /// 引擎每帧构造一次；也用于在引擎之外单独驱动效果。
    pub fn new(kind: &'a AnimationType, options: &'a AnimationOptions) -> Self {
        Self {
            kind,
            options,
            stop_requested: false,
        }
    }

    /// 当前动画的符号类型
    pub fn animation_type(&self) -> &AnimationType {
        self.kind
    }

    /// 当前生效的配置
    pub fn options(&self) -> &AnimationOptions {
        self.options
    }

    /// 渲染目标
    pub fn target(&self) -> Option<&Target> {
        self.options.target.as_ref()
    }

    /// 请求在本帧结束后终止动画
    ///
    /// 用于"找不到可渲染目标"之类的情况：动画直接完成，调用方的等待正常返回。
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    /// 是否已请求终止
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }
}

/// 效果接口
///
/// 每个具体效果实现 `update`；需要清理资源的效果覆盖 `complete`。
pub trait Effect: Send + 'static {
    /// 渲染一帧
    ///
    /// # 参数
    /// - `progress`: 当前迭代内的进度，范围 [0, 1)，最后一帧恰好为 1
    /// - `iteration`: 当前迭代序号（从 0 开始）
    fn update(&mut self, ctx: &mut FrameContext<'_>, progress: f64, iteration: u32);

    /// 动画进入 Completed 时调用一次
    ///
    /// 在从未播放过的实例上也可能被调用（`stop()` 先于 `play()`），
    /// 实现必须容忍没有分配过资源的情况。
    fn complete(&mut self, _options: &AnimationOptions) {}
}

/// 由闭包构成的效果
///
/// 用于不需要 `complete` 钩子的简单效果。
pub struct FnEffect<F>(F);

/// 用闭包创建效果
pub fn effect_fn<F>(f: F) -> FnEffect<F>
where
    F: FnMut(&mut FrameContext<'_>, f64, u32) + Send + 'static,
{
    FnEffect(f)
}

impl<F> Effect for FnEffect<F>
where
    F: FnMut(&mut FrameContext<'_>, f64, u32) + Send + 'static,
{
    fn update(&mut self, ctx: &mut FrameContext<'_>, progress: f64, iteration: u32) {
        (self.0)(ctx, progress, iteration)
    }
}
