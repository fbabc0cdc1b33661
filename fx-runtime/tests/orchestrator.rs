//! # 编排器集成测试
//!
//! 测试 Orchestrator → Animation → Effect 的完整链路。
//! 时间由 Tokio 的暂停时钟驱动，不依赖真实等待。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fx_runtime::{
    AnimationOptions, AnimationType, Effect, FrameContext, FxError, IterationCount, Orchestrator,
    SequenceOutcome, SequenceStep,
};
use tokio::time::{self, Instant};

/// 共享日志
#[derive(Clone, Default)]
struct Log {
    renders: Arc<Mutex<Vec<String>>>,
    updates: Arc<Mutex<Vec<Instant>>>,
    completes: Arc<Mutex<Vec<Instant>>>,
}

impl Log {
    fn renders(&self) -> Vec<String> {
        self.renders.lock().unwrap().clone()
    }

    fn updates(&self) -> Vec<Instant> {
        self.updates.lock().unwrap().clone()
    }

    fn completes(&self) -> Vec<Instant> {
        self.completes.lock().unwrap().clone()
    }
}

/// 按进度显示字符数的确定性打字效果
struct CharCount {
    log: Log,
}

impl Effect for CharCount {
    fn update(&mut self, ctx: &mut FrameContext<'_>, progress: f64, _iteration: u32) {
        let text = ctx.options().text.clone().unwrap_or_default();
        let total = text.chars().count();
        let visible = ((progress * total as f64).floor() as usize).min(total);
        let rendered: String = text.chars().take(visible).collect();

        self.log.renders.lock().unwrap().push(rendered);
        self.log.updates.lock().unwrap().push(Instant::now());
    }

    fn complete(&mut self, _options: &fx_runtime::AnimationOptions) {
        self.log.completes.lock().unwrap().push(Instant::now());
    }
}

/// 只记录调用的效果
struct Probe {
    label: &'static str,
    seen: Arc<Mutex<Vec<&'static str>>>,
    log: Log,
}

impl Effect for Probe {
    fn update(&mut self, _ctx: &mut FrameContext<'_>, _progress: f64, _iteration: u32) {
        self.seen.lock().unwrap().push(self.label);
        self.log.updates.lock().unwrap().push(Instant::now());
    }

    fn complete(&mut self, _options: &fx_runtime::AnimationOptions) {
        self.log.completes.lock().unwrap().push(Instant::now());
    }
}

fn typing_orchestrator(log: &Log) -> Orchestrator {
    let mut orchestrator = Orchestrator::new().with_tick(Duration::from_millis(10));
    let log = log.clone();
    orchestrator.register_animation(AnimationType::Typing, move || CharCount { log: log.clone() });
    orchestrator
}

/// 场景 A：打字效果在 1000ms 后恰好渲染一次完整文本
#[tokio::test(start_paused = true)]
async fn test_typing_renders_full_text_once() {
    let log = Log::default();
    let orchestrator = typing_orchestrator(&log);

    let playback = orchestrator
        .play(
            AnimationType::Typing,
            Some(AnimationOptions::new().with_duration_ms(1000.0).with_text("HELLO")),
        )
        .unwrap();
    let handle = tokio::spawn(playback);

    time::sleep(Duration::from_millis(1001)).await;
    handle.await.unwrap();

    let renders = log.renders();
    assert_eq!(renders.iter().filter(|r| r.as_str() == "HELLO").count(), 1);
    assert_eq!(renders.last().map(String::as_str), Some("HELLO"));

    // 完成后不再更新
    time::sleep(Duration::from_millis(500)).await;
    assert_eq!(log.renders().len(), renders.len());
    assert_eq!(log.completes().len(), 1);
    assert_eq!(orchestrator.active_count(), 0);
}

/// 场景 B：首帧之前 stop_all，等待正常返回，类型仍然注册
#[tokio::test(start_paused = true)]
async fn test_stop_all_before_first_frame() {
    let log = Log::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut orchestrator = Orchestrator::new();
    {
        let log = log.clone();
        let seen = seen.clone();
        orchestrator.register_animation(AnimationType::Glitch, move || Probe {
            label: "glitch",
            seen: seen.clone(),
            log: log.clone(),
        });
    }

    let playback = orchestrator.play(AnimationType::Glitch, None).unwrap();
    assert_eq!(orchestrator.active_count(), 1);

    orchestrator.stop_all();
    playback.await;

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(log.completes().len(), 1);
    assert_eq!(orchestrator.active_count(), 0);
    assert!(
        orchestrator
            .get_available_animations()
            .contains(&AnimationType::Glitch)
    );
}

/// 场景 C：序列中后一步的第一帧严格晚于前一步完成
#[tokio::test(start_paused = true)]
async fn test_sequence_runs_strictly_in_order() {
    let typing_log = Log::default();
    let pulse_log = Log::default();
    let mut orchestrator = typing_orchestrator(&typing_log);
    {
        let log = pulse_log.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        orchestrator.register_animation(AnimationType::Pulse, move || Probe {
            label: "pulse",
            seen: seen.clone(),
            log: log.clone(),
        });
    }

    let outcome = orchestrator
        .create_sequence([
            SequenceStep::new(AnimationType::Typing).with_options(
                AnimationOptions::new()
                    .with_duration_ms(300.0)
                    .with_text("WAKE UP"),
            ),
            SequenceStep::new(AnimationType::Pulse)
                .with_options(AnimationOptions::new().with_duration_ms(200.0)),
        ])
        .await
        .unwrap();
    assert_eq!(outcome, SequenceOutcome::Completed);

    let typing_done = typing_log.completes()[0];
    let pulse_first = pulse_log.updates()[0];
    assert!(pulse_first > typing_done);
    assert!(typing_log.updates().iter().all(|t| *t <= typing_done));
    assert_eq!(pulse_log.completes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_last_registration_wins() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Log::default();
    let mut orchestrator = Orchestrator::new();

    for label in ["first", "second"] {
        let seen = seen.clone();
        let log = log.clone();
        orchestrator.register_animation(AnimationType::Flicker, move || Probe {
            label,
            seen: seen.clone(),
            log: log.clone(),
        });
    }

    orchestrator
        .play(
            AnimationType::Flicker,
            Some(AnimationOptions::new().with_duration_ms(50.0)),
        )
        .unwrap()
        .await;

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|label| *label == "second"));
    assert_eq!(orchestrator.get_available_animations().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unregistered_type_is_reported_synchronously() {
    let orchestrator = Orchestrator::new();
    let err = orchestrator.play("scan-line", None).unwrap_err();
    assert_eq!(
        err,
        FxError::NotRegistered {
            kind: AnimationType::ScanLine
        }
    );
    assert_eq!(orchestrator.active_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_active_set_tracks_playing_and_paused() {
    let log = Log::default();
    let orchestrator = typing_orchestrator(&log);

    let playback = orchestrator
        .play(
            AnimationType::Typing,
            Some(AnimationOptions::new().with_text("abc").with_iterations(-1)),
        )
        .unwrap();
    let animation = playback.animation().clone();
    assert_eq!(orchestrator.active_count(), 1);

    time::sleep(Duration::from_millis(100)).await;
    animation.pause();
    assert!(animation.is_paused());
    assert_eq!(orchestrator.active_count(), 1);

    // 暂停中的实例也会被 stop_all 停止
    orchestrator.stop_all();
    assert!(animation.is_completed());
    playback.await;
    assert_eq!(orchestrator.active_count(), 0);
    assert_eq!(log.completes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_replaying_returned_handle_does_not_touch_active_set() {
    let log = Log::default();
    let orchestrator = typing_orchestrator(&log);

    let playback = orchestrator
        .play(
            AnimationType::Typing,
            Some(AnimationOptions::new().with_duration_ms(50.0).with_text("x")),
        )
        .unwrap();
    let animation = playback.animation().clone();
    playback.await;

    // 已完成的实例不会被复用
    animation.play(None).await;
    assert!(animation.is_completed());
    assert_eq!(orchestrator.active_count(), 0);
    assert_eq!(log.completes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_all_interrupts_sequence() {
    let typing_log = Log::default();
    let pulse_seen = Arc::new(Mutex::new(Vec::new()));
    let mut orchestrator = typing_orchestrator(&typing_log);
    {
        let seen = pulse_seen.clone();
        let log = Log::default();
        orchestrator.register_animation(AnimationType::Pulse, move || Probe {
            label: "pulse",
            seen: seen.clone(),
            log: log.clone(),
        });
    }

    let (outcome, ()) = tokio::join!(
        orchestrator.create_sequence(vec![
            SequenceStep::new(AnimationType::Typing)
                .with_options(AnimationOptions::new().with_text("LONG LINE")),
            SequenceStep::new(AnimationType::Pulse),
        ]),
        async {
            time::sleep(Duration::from_millis(200)).await;
            orchestrator.stop_all();
        }
    );

    assert_eq!(
        outcome.unwrap(),
        SequenceOutcome::Interrupted { completed: 0 }
    );
    time::sleep(Duration::from_millis(2000)).await;
    assert!(pulse_seen.lock().unwrap().is_empty());
    assert_eq!(typing_log.completes().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_sequence_fails_on_unregistered_step() {
    let log = Log::default();
    let orchestrator = typing_orchestrator(&log);

    let result = orchestrator
        .create_sequence([
            SequenceStep::new(AnimationType::Typing).with_options(
                AnimationOptions::new()
                    .with_duration_ms(100.0)
                    .with_text("ok"),
            ),
            SequenceStep::new("sparkle"),
        ])
        .await;

    assert_eq!(
        result,
        Err(FxError::NotRegistered {
            kind: AnimationType::Custom("sparkle".into())
        })
    );
    // 第一步已经完整播放
    assert_eq!(log.renders().last().map(String::as_str), Some("ok"));
}

#[tokio::test(start_paused = true)]
async fn test_independent_instances_run_concurrently() {
    let log = Log::default();
    let orchestrator = typing_orchestrator(&log);
    let started = Instant::now();

    let short = orchestrator
        .play(
            AnimationType::Typing,
            Some(AnimationOptions::new().with_duration_ms(100.0).with_text("a")),
        )
        .unwrap();
    let long = orchestrator
        .play(
            AnimationType::Typing,
            Some(
                AnimationOptions::new()
                    .with_duration_ms(100.0)
                    .with_iterations(IterationCount::Finite(3))
                    .with_text("b"),
            ),
        )
        .unwrap();
    assert_eq!(orchestrator.active_count(), 2);

    short.await;
    assert!(started.elapsed() < Duration::from_millis(150));
    assert_eq!(orchestrator.active_count(), 1);

    long.await;
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(orchestrator.active_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_everything() {
    let completes = Arc::new(AtomicUsize::new(0));
    let log = Log::default();
    let orchestrator = typing_orchestrator(&log);

    let mut playbacks = Vec::new();
    for _ in 0..3 {
        let counter = completes.clone();
        playbacks.push(
            orchestrator
                .play(
                    AnimationType::Typing,
                    Some(
                        AnimationOptions::new()
                            .with_iterations(-1)
                            .with_on_complete(move || {
                                counter.fetch_add(1, Ordering::SeqCst);
                            }),
                    ),
                )
                .unwrap(),
        );
    }

    time::sleep(Duration::from_millis(50)).await;
    drop(orchestrator);

    for playback in playbacks {
        playback.await;
    }
    assert_eq!(completes.load(Ordering::SeqCst), 3);
}

/// 更新时 panic 的效果
struct Faulty {
    log: Log,
}

impl Effect for Faulty {
    fn update(&mut self, _ctx: &mut FrameContext<'_>, _progress: f64, _iteration: u32) {
        self.log.updates.lock().unwrap().push(Instant::now());
        panic!("faulty effect");
    }

    fn complete(&mut self, _options: &fx_runtime::AnimationOptions) {
        self.log.completes.lock().unwrap().push(Instant::now());
    }
}

/// 效果 panic 时该步骤照常完成，序列继续
#[tokio::test(start_paused = true)]
async fn test_sequence_continues_after_effect_panic() {
    let typing_log = Log::default();
    let faulty_log = Log::default();
    let mut orchestrator = typing_orchestrator(&typing_log);
    {
        let log = faulty_log.clone();
        orchestrator.register_animation(AnimationType::Glitch, move || Faulty { log: log.clone() });
    }

    let outcome = time::timeout(
        Duration::from_secs(60),
        orchestrator.create_sequence([
            SequenceStep::new(AnimationType::Glitch)
                .with_options(AnimationOptions::new().with_duration_ms(500.0)),
            SequenceStep::new(AnimationType::Typing).with_options(
                AnimationOptions::new()
                    .with_duration_ms(100.0)
                    .with_text("OK"),
            ),
        ]),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(outcome, SequenceOutcome::Completed);

    assert_eq!(faulty_log.updates().len(), 1);
    assert_eq!(faulty_log.completes().len(), 1);
    assert_eq!(typing_log.renders().last().map(String::as_str), Some("OK"));
    assert_eq!(orchestrator.active_count(), 0);
}
