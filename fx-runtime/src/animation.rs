//! # Animation 模块
//!
//! 动画生命周期引擎：把挂钟时间转换成每帧的 `(progress, iteration)`。
//!
//! ## 状态机
//!
//! ```text
//! Idle ──play()──► Playing ◄──resume()── Paused
//!   │                 │  └────pause()────►  │
//!   │               stop() / 迭代耗尽        │
//!   └──stop()──►  Completed  ◄──stop()──────┘
//! ```
//!
//! Completed 是终态，没有任何转换能离开它。
//!
//! ## 时间计算
//!
//! ```text
//! elapsed         = now - start_time - accumulated_paused
//! iteration_float = elapsed / duration_ms
//! iteration       = floor(iteration_float)
//! progress        = iteration_float - iteration      // [0, 1)
//! ```
//!
//! 有限迭代在 `iteration >= iterations` 时补发一帧 `(1.0, iterations - 1)`，然后终止。
//!
//! ## 帧调度
//!
//! 每个 Playing 实例持有一个 Tokio 帧任务，按固定 tick 触发（第一帧在启动后一个 tick）。
//! 暂停和终止都会取消帧任务；同一实例任何时刻最多只有一个帧任务。
//! 帧任务每次拿到锁都先确认自己仍是登记的任务，被替换的旧任务直接退出。
//!
//! 效果的 `update` / `complete` 发生 panic 时，实例记录警告并进入 Completed，
//! 等待方照常被释放。时长为 NaN 或无穷时按零时长处理。

use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::effect::{Effect, FrameContext};
use crate::kind::AnimationType;
use crate::options::{AnimationOptions, CompletionCallback, IterationCount};

/// 默认帧间隔（约 60 FPS）
pub const DEFAULT_TICK: Duration = Duration::from_millis(16);

/// 动画实例 ID
///
/// 进程内唯一，由 [`Animation`] 创建时分配。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(u64);

impl AnimationId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnimationId({})", self.0)
    }
}

/// 动画状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    /// 尚未播放
    #[default]
    Idle,
    /// 正在播放
    Playing,
    /// 已暂停
    Paused,
    /// 已完成（终态）
    Completed,
}

impl AnimationState {
    /// 是否为活跃状态（Playing 或 Paused）
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// 完成信号
///
/// 由 `play()` / `resume()` 返回，在本次运行进入 Completed 时就绪。
/// 永远不会以错误结束：即使实例被丢弃，等待方也只会看到"已完成"。
#[must_use = "Completion 不会推动动画，但丢弃它就无法得知动画何时结束"]
pub struct Completion {
    rx: Option<oneshot::Receiver<()>>,
}

impl Completion {
    fn pending(rx: oneshot::Receiver<()>) -> Self {
        Self { rx: Some(rx) }
    }

    /// 已经就绪的完成信号
    pub fn ready() -> Self {
        Self { rx: None }
    }
}

impl Future for Completion {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let Some(rx) = self.rx.as_mut() else {
            return Poll::Ready(());
        };
        match Pin::new(rx).poll(cx) {
            Poll::Ready(_) => {
                self.rx = None;
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("pending", &self.rx.is_some())
            .finish()
    }
}

/// 引擎持有的计时字段
#[derive(Debug, Default)]
struct Timing {
    start: Option<Instant>,
    pause_start: Option<Instant>,
    paused_total: Duration,
}

impl Timing {
    fn started(now: Instant) -> Self {
        Self {
            start: Some(now),
            pause_start: None,
            paused_total: Duration::ZERO,
        }
    }

    /// 扣除暂停时间后的已播放时长
    fn active_elapsed(&self, now: Instant) -> Duration {
        let Some(start) = self.start else {
            return Duration::ZERO;
        };
        let until = self.pause_start.unwrap_or(now);
        until
            .saturating_duration_since(start)
            .saturating_sub(self.paused_total)
    }
}

/// 单帧计算结果
enum FrameOutcome {
    Continue,
    Finish,
}

/// 进入 Completed 后需要在锁外处理的收尾工作
struct Finished {
    waiters: Vec<oneshot::Sender<()>>,
    callback: Option<CompletionCallback>,
}

impl Finished {
    fn release(self) {
        if let Some(callback) = self.callback {
            callback();
        }
        // 按调用顺序释放所有等待方
        for waiter in self.waiters {
            let _ = waiter.send(());
        }
    }
}

struct Inner {
    kind: AnimationType,
    id: AnimationId,
    state: AnimationState,
    options: AnimationOptions,
    timing: Timing,
    effect: Box<dyn Effect>,
    waiters: Vec<oneshot::Sender<()>>,
    frame_task: Option<JoinHandle<()>>,
    tick: Duration,
}

impl Inner {
    fn push_waiter(&mut self) -> Completion {
        let (tx, rx) = oneshot::channel();
        self.waiters.push(tx);
        Completion::pending(rx)
    }

    /// 当前任务是否就是登记的帧任务
    ///
    /// 多线程运行时下，已 abort 的旧任务可能在 `resume()` 启动新任务之后才拿到锁。
    fn owns_frames(&self) -> bool {
        match (&self.frame_task, task::try_id()) {
            (Some(handle), Some(current)) => handle.id() == current,
            _ => false,
        }
    }

    fn cancel_frames(&mut self) {
        if let Some(task) = self.frame_task.take() {
            task.abort();
        }
    }

    /// 计算并投递一帧
    fn frame(&mut self, now: Instant) -> FrameOutcome {
        let elapsed_ms =
            self.timing.active_elapsed(now).as_secs_f64() * 1000.0 - self.options.delay_ms();
        if elapsed_ms < 0.0 {
            // 仍在延迟期内
            return FrameOutcome::Continue;
        }

        let duration_ms = self.options.duration_ms();
        // NaN / 无穷时长按零时长处理，保证有限迭代一定结束
        let instant = !duration_ms.is_finite() || duration_ms <= 0.0;
        let (progress, iteration, last) = match self.options.iterations() {
            IterationCount::Finite(0) => return FrameOutcome::Finish,
            IterationCount::Finite(total) => {
                if instant {
                    (1.0, total - 1, true)
                } else {
                    let iteration_float = elapsed_ms / duration_ms;
                    let current = iteration_float.floor();
                    if current >= f64::from(total) {
                        (1.0, total - 1, true)
                    } else {
                        (iteration_float - current, current as u32, false)
                    }
                }
            }
            IterationCount::Infinite => {
                if instant {
                    (1.0, 0, false)
                } else {
                    let iteration_float = elapsed_ms / duration_ms;
                    let current = iteration_float.floor();
                    (iteration_float - current, current as u32, false)
                }
            }
        };

        let mut ctx = FrameContext::new(&self.kind, &self.options);
        let delivered = panic::catch_unwind(AssertUnwindSafe(|| {
            self.effect.update(&mut ctx, progress, iteration);
        }));
        if delivered.is_err() {
            warn!(animation = %self.kind, id = %self.id, progress, iteration, "效果更新时 panic，动画终止");
            return FrameOutcome::Finish;
        }

        if last || ctx.stop_requested() {
            FrameOutcome::Finish
        } else {
            FrameOutcome::Continue
        }
    }

    /// 进入 Completed；已完成时返回 `None`
    fn finish(&mut self) -> Option<Finished> {
        if self.state == AnimationState::Completed {
            return None;
        }

        self.cancel_frames();
        let from = self.state;
        self.state = AnimationState::Completed;
        self.timing = Timing::default();
        let options = &self.options;
        let effect = &mut self.effect;
        if panic::catch_unwind(AssertUnwindSafe(|| effect.complete(options))).is_err() {
            warn!(animation = %self.kind, id = %self.id, "效果收尾时 panic");
        }

        debug!(animation = %self.kind, id = %self.id, from = ?from, "动画完成");

        Some(Finished {
            waiters: std::mem::take(&mut self.waiters),
            callback: self.options.on_complete.clone(),
        })
    }
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 帧任务：每个 tick 投递一帧，直到实例离开 Playing
async fn run_frames(inner: Arc<Mutex<Inner>>, tick: Duration) {
    let mut ticker = time::interval_at(Instant::now() + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let finished = {
            let mut guard = lock_inner(&inner);
            if guard.state != AnimationState::Playing || !guard.owns_frames() {
                break;
            }
            match guard.frame(Instant::now()) {
                FrameOutcome::Continue => continue,
                FrameOutcome::Finish => {
                    // 当前任务即将自然退出，不需要 abort 自己
                    guard.frame_task.take();
                    guard.finish()
                }
            }
        };

        if let Some(finished) = finished {
            finished.release();
        }
        break;
    }
}

/// 动画实例句柄
///
/// 克隆得到的句柄共享同一个实例。所有方法都不阻塞。
///
/// `play()` / `resume()` 需要在 Tokio 运行时内调用（帧任务通过 `tokio::spawn` 启动）。
#[derive(Clone)]
pub struct Animation {
    id: AnimationId,
    kind: AnimationType,
    inner: Arc<Mutex<Inner>>,
}

impl Animation {
    /// 用具体效果创建实例
    pub fn new(kind: AnimationType, effect: impl Effect) -> Self {
        Self::from_boxed(kind, Box::new(effect))
    }

    /// 用已装箱的效果创建实例
    pub fn from_boxed(kind: AnimationType, effect: Box<dyn Effect>) -> Self {
        let id = AnimationId::next();
        let inner = Inner {
            kind: kind.clone(),
            id,
            state: AnimationState::Idle,
            options: AnimationOptions::default(),
            timing: Timing::default(),
            effect,
            waiters: Vec::new(),
            frame_task: None,
            tick: DEFAULT_TICK,
        };
        Self {
            id,
            kind,
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// 设置帧间隔（对下一次启动的帧任务生效）
    pub fn with_tick(self, tick: Duration) -> Self {
        self.lock().tick = tick.max(Duration::from_millis(1));
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }

    fn spawn_frames(&self, inner: &mut Inner) {
        inner.cancel_frames();
        let task = tokio::spawn(run_frames(Arc::clone(&self.inner), inner.tick));
        inner.frame_task = Some(task);
    }

    // ========== 查询方法 ==========

    /// 实例 ID
    pub fn id(&self) -> AnimationId {
        self.id
    }

    /// 创建时的符号类型
    pub fn animation_type(&self) -> &AnimationType {
        &self.kind
    }

    /// 当前状态
    pub fn state(&self) -> AnimationState {
        self.lock().state
    }

    pub fn is_playing(&self) -> bool {
        self.state() == AnimationState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state() == AnimationState::Paused
    }

    pub fn is_completed(&self) -> bool {
        self.state() == AnimationState::Completed
    }

    /// 当前生效配置的快照
    pub fn options(&self) -> AnimationOptions {
        self.lock().options.clone()
    }

    /// 帧间隔
    pub fn tick(&self) -> Duration {
        self.lock().tick
    }

    /// 扣除暂停时间后的已播放时长
    ///
    /// Idle 与 Completed 状态下返回 `None`。
    pub fn elapsed(&self) -> Option<Duration> {
        let inner = self.lock();
        if inner.state.is_active() {
            Some(inner.timing.active_elapsed(Instant::now()))
        } else {
            None
        }
    }

    // ========== 控制方法 ==========

    /// 浅合并配置
    ///
    /// 不改变状态。播放中修改 `duration_ms` 不会重置起始时间，
    /// 进度会按新时长立即重新计算（可能出现跳变）。
    pub fn set_options(&self, options: AnimationOptions) {
        self.lock().options.merge(options);
    }

    /// 播放
    ///
    /// - Idle：合并配置，记录起始时间，启动帧任务
    /// - Playing：不启动第二个帧任务，返回与当前运行同时完成的信号
    /// - Paused：等同于 [`resume`](Self::resume)
    /// - Completed：终态，直接返回已就绪的信号
    pub fn play(&self, options: Option<AnimationOptions>) -> Completion {
        let mut inner = self.lock();
        if let Some(options) = options {
            if inner.state != AnimationState::Completed {
                inner.options.merge(options);
            }
        }

        let state = inner.state;
        match state {
            AnimationState::Idle => {
                inner.timing = Timing::started(Instant::now());
                inner.state = AnimationState::Playing;
                debug!(
                    animation = %self.kind,
                    id = %self.id,
                    duration_ms = inner.options.duration_ms(),
                    iterations = ?inner.options.iterations(),
                    "开始播放"
                );
                let completion = inner.push_waiter();
                self.spawn_frames(&mut inner);
                completion
            }
            AnimationState::Playing => inner.push_waiter(),
            AnimationState::Paused => {
                drop(inner);
                self.resume()
            }
            AnimationState::Completed => {
                debug!(animation = %self.kind, id = %self.id, "实例已完成，忽略 play()");
                Completion::ready()
            }
        }
    }

    /// 暂停
    ///
    /// 仅在 Playing 状态下有效，其他状态为 no-op。
    pub fn pause(&self) {
        let mut inner = self.lock();
        if inner.state != AnimationState::Playing {
            return;
        }
        inner.timing.pause_start = Some(Instant::now());
        inner.cancel_frames();
        inner.state = AnimationState::Paused;
        debug!(animation = %self.kind, id = %self.id, "暂停");
    }

    /// 恢复
    ///
    /// 从 Paused 恢复时把暂停时长计入 `accumulated_paused`；
    /// 不在 Paused 状态时等同于 `play(None)`。
    pub fn resume(&self) -> Completion {
        let mut inner = self.lock();
        if inner.state != AnimationState::Paused {
            drop(inner);
            return self.play(None);
        }

        let now = Instant::now();
        if let Some(pause_start) = inner.timing.pause_start.take() {
            inner.timing.paused_total += now.saturating_duration_since(pause_start);
        }
        inner.state = AnimationState::Playing;
        debug!(
            animation = %self.kind,
            id = %self.id,
            paused_total_ms = inner.timing.paused_total.as_millis() as u64,
            "恢复"
        );

        let completion = inner.push_waiter();
        self.spawn_frames(&mut inner);
        completion
    }

    /// 终止
    ///
    /// 取消帧任务，进入 Completed，释放所有等待方，调用一次 `complete` 钩子。
    /// 幂等：对已完成的实例调用是 no-op。
    pub fn stop(&self) {
        let finished = self.lock().finish();
        if let Some(finished) = finished {
            finished.release();
        }
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("state", &self.state())
            .finish()
    }
}
