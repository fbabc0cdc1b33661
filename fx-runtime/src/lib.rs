//! # FX Runtime
//!
//! 终端特效动画的生命周期引擎。
//!
//! ## 架构概述
//!
//! `fx-runtime` 只负责 **时间轴与生命周期**，不做任何终端 IO：
//! 把挂钟时间转换为每帧的 `(progress, iteration)`，交给效果自己去渲染。
//!
//! ```text
//! Consumer                    Orchestrator                  Animation (engine)
//!   │── play(type, opts) ──────►│                              │
//!   │                           │── factory() / set_options ──►│
//!   │                           │── play() ───────────────────►│ 帧任务
//!   │                           │                              │── Effect::update(p, i)
//!   │                           │                              │── ...
//!   │◄──────── Playback 就绪 ───│◄──────── Completion ─────────│── Effect::complete()
//! ```
//!
//! ## 核心类型
//!
//! - [`AnimationOptions`]：可合并的配置值
//! - [`Animation`]：单个动画实例（状态机）
//! - [`Effect`]：效果接口（`update` / `complete` 钩子）
//! - [`Orchestrator`]：类型注册表 + 活跃集合 + 顺序播放
//!
//! ## 使用示例
//!
//! ```ignore
//! use fx_runtime::{AnimationOptions, AnimationType, Orchestrator};
//!
//! let mut orchestrator = Orchestrator::new();
//! orchestrator.register_animation(AnimationType::Typing, TypingEffect::default);
//!
//! orchestrator
//!     .play(AnimationType::Typing, Some(AnimationOptions::new().with_text("HELLO")))?
//!     .await;
//! ```
//!
//! ## 模块结构
//!
//! - [`animation`]：状态机与帧调度
//! - [`effect`]：效果接口
//! - [`error`]：错误类型定义
//! - [`kind`]：符号类型
//! - [`options`]：配置值
//! - [`orchestrator`]：注册表与编排

pub mod animation;
pub mod effect;
pub mod error;
pub mod kind;
pub mod options;
pub mod orchestrator;

// 重导出核心类型
pub use animation::{Animation, AnimationId, AnimationState, Completion, DEFAULT_TICK};
pub use effect::{Effect, FnEffect, FrameContext, effect_fn};
pub use error::{FxError, FxResult};
pub use kind::AnimationType;
pub use options::{
    AnimationOptions, CompletionCallback, IterationCount, StyleFlags, Target,
};
pub use orchestrator::{
    AnimationFactory, Orchestrator, Playback, SequenceOutcome, SequenceStep,
};
