//! # Orchestrator 模块
//!
//! 动画注册表与编排器。
//!
//! 调用方只知道符号类型（[`AnimationType`]），编排器负责：
//! 1. 维护 类型 → 工厂 的映射（后注册覆盖先注册）
//! 2. 每次播放创建新实例（不做对象池）
//! 3. 维护活跃集合，供 [`stop_all`](Orchestrator::stop_all) 使用
//! 4. 顺序播放一组动画
//!
//! 编排器是显式构造的值：在应用启动时创建，退出时调用
//! [`shutdown`](Orchestrator::shutdown)（或直接丢弃）停止所有动画。

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use tracing::debug;

use crate::animation::{Animation, AnimationId, Completion, DEFAULT_TICK};
use crate::effect::Effect;
use crate::error::{FxError, FxResult};
use crate::kind::AnimationType;
use crate::options::AnimationOptions;

/// 效果工厂：每次调用产生一个全新的效果实例
pub type AnimationFactory = Arc<dyn Fn() -> Box<dyn Effect> + Send + Sync>;

/// 序列中的一步
#[derive(Debug, Clone)]
pub struct SequenceStep {
    /// 动画类型
    pub kind: AnimationType,
    /// 本步的配置
    pub options: Option<AnimationOptions>,
}

impl SequenceStep {
    pub fn new(kind: impl Into<AnimationType>) -> Self {
        Self {
            kind: kind.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: AnimationOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// 序列执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    /// 所有步骤依次完成
    Completed,
    /// 被 `stop_all()` 打断，剩余步骤未启动
    Interrupted {
        /// 被打断前已完成的步骤数
        completed: usize,
    },
}

/// 一次编排播放
///
/// 作为 future 等待时，在动画完成后就绪并把实例移出活跃集合。
/// 也可以通过 [`animation`](Playback::animation) 拿到实例句柄，单独暂停/恢复。
#[must_use = "Playback 在完成时才会把实例移出活跃集合"]
pub struct Playback {
    animation: Animation,
    completion: Completion,
    active: Arc<Mutex<ActiveSet>>,
}

impl Playback {
    /// 正在播放的实例
    pub fn animation(&self) -> &Animation {
        &self.animation
    }
}

impl Future for Playback {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match Pin::new(&mut self.completion).poll(cx) {
            Poll::Ready(()) => {
                let id = self.animation.id();
                lock_active(&self.active).animations.remove(&id);
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl fmt::Debug for Playback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playback")
            .field("animation", &self.animation)
            .finish()
    }
}

/// 活跃集合
///
/// 只由编排器自己的操作修改：播放开始时加入、完成或 `stop_all` 时移除。
#[derive(Default)]
struct ActiveSet {
    animations: HashMap<AnimationId, Animation>,
    /// 每次 `stop_all` 递增，序列据此判断是否被打断
    generation: u64,
}

impl ActiveSet {
    fn prune(&mut self) {
        self.animations.retain(|_, animation| !animation.is_completed());
    }
}

fn lock_active(active: &Mutex<ActiveSet>) -> MutexGuard<'_, ActiveSet> {
    active.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 动画编排器
pub struct Orchestrator {
    factories: HashMap<AnimationType, AnimationFactory>,
    active: Arc<Mutex<ActiveSet>>,
    tick: Duration,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registered", &self.factories.len())
            .field("active", &lock_active(&self.active).animations.len())
            .field("tick", &self.tick)
            .finish()
    }
}

impl Orchestrator {
    /// 创建编排器（默认帧间隔 16ms）
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            active: Arc::new(Mutex::new(ActiveSet::default())),
            tick: DEFAULT_TICK,
        }
    }

    /// 设置新实例使用的帧间隔
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// 新实例使用的帧间隔
    pub fn tick(&self) -> Duration {
        self.tick
    }

    fn active(&self) -> MutexGuard<'_, ActiveSet> {
        lock_active(&self.active)
    }

    // ========== 注册 ==========

    /// 注册动画类型
    ///
    /// 不校验重复注册：同一类型再次注册时覆盖之前的工厂。
    pub fn register_animation<F, E>(&mut self, kind: impl Into<AnimationType>, factory: F)
    where
        F: Fn() -> E + Send + Sync + 'static,
        E: Effect,
    {
        let kind = kind.into();
        let factory: AnimationFactory = Arc::new(move || Box::new(factory()) as Box<dyn Effect>);
        if self.factories.insert(kind.clone(), factory).is_some() {
            debug!(animation = %kind, "覆盖已注册的动画类型");
        } else {
            debug!(animation = %kind, "注册动画类型");
        }
    }

    /// 检查类型是否已注册
    pub fn is_registered(&self, kind: &AnimationType) -> bool {
        self.factories.contains_key(kind)
    }

    /// 已注册的类型（无序）
    pub fn get_available_animations(&self) -> Vec<AnimationType> {
        self.factories.keys().cloned().collect()
    }

    // ========== 播放 ==========

    /// 创建实例但不播放
    ///
    /// # 返回
    /// - `Ok(Animation)`: 新实例，已应用 `options`
    /// - `Err(FxError::NotRegistered)`: 类型未注册
    pub fn get_animation(
        &self,
        kind: impl Into<AnimationType>,
        options: Option<AnimationOptions>,
    ) -> FxResult<Animation> {
        let kind = kind.into();
        let factory = self
            .factories
            .get(&kind)
            .ok_or_else(|| FxError::NotRegistered { kind: kind.clone() })?;

        let animation = Animation::from_boxed(kind, factory()).with_tick(self.tick);
        if let Some(options) = options {
            animation.set_options(options);
        }
        Ok(animation)
    }

    /// 播放动画
    ///
    /// 类型未注册的错误同步返回。成功时实例已加入活跃集合并开始播放，
    /// 返回的 [`Playback`] 在动画完成时就绪，并把实例移出活跃集合。
    ///
    /// 丢弃 [`Playback`] 不会停止动画；实例会留在活跃集合中直到 `stop_all()`
    /// 或下一次 `play()` 清理已完成的实例。
    pub fn play(
        &self,
        kind: impl Into<AnimationType>,
        options: Option<AnimationOptions>,
    ) -> FxResult<Playback> {
        let animation = self.get_animation(kind, options)?;

        {
            let mut active = self.active();
            active.prune();
            active.animations.insert(animation.id(), animation.clone());
        }

        let completion = animation.play(None);
        Ok(Playback {
            animation,
            completion,
            active: Arc::clone(&self.active),
        })
    }

    /// 停止所有活跃动画并清空活跃集合
    ///
    /// 活跃集合为空时是 no-op。已注册的类型不受影响。
    pub fn stop_all(&self) {
        let stopped: Vec<Animation> = {
            let mut active = self.active();
            active.generation += 1;
            active.animations.drain().map(|(_, animation)| animation).collect()
        };

        if !stopped.is_empty() {
            debug!(count = stopped.len(), "停止所有动画");
        }
        for animation in stopped {
            animation.stop();
        }
    }

    /// 当前处于 Playing 或 Paused 的实例数
    pub fn active_count(&self) -> usize {
        let mut active = self.active();
        active.prune();
        active.animations.len()
    }

    /// 顺序播放
    ///
    /// 每一步完成后才启动下一步，不并行。
    /// 播放过程中若发生 `stop_all()`，当前步骤被终止，剩余步骤不再启动。
    ///
    /// # 返回
    /// - `Ok(SequenceOutcome)`: 全部完成或被打断
    /// - `Err(FxError::NotRegistered)`: 走到某一步时发现类型未注册（之前的步骤已播放）
    pub async fn create_sequence(
        &self,
        steps: impl IntoIterator<Item = SequenceStep>,
    ) -> FxResult<SequenceOutcome> {
        let generation = self.active().generation;

        for (index, step) in steps.into_iter().enumerate() {
            debug!(step = index, animation = %step.kind, "序列步骤开始");
            self.play(step.kind, step.options)?.await;

            if self.active().generation != generation {
                debug!(completed = index, "序列被中断");
                return Ok(SequenceOutcome::Interrupted { completed: index });
            }
        }

        Ok(SequenceOutcome::Completed)
    }

    /// 停止所有动画（应用退出时调用）
    pub fn shutdown(&self) {
        self.stop_all();
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.stop_all();
    }
}
