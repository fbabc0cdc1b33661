//! # App 模块
//!
//! 宿主的播放流程：场景表面、配置合成、驱动循环。
//!
//! ## 配置合成
//!
//! 每次播放的配置 = 预设（配置文件）← 命令行覆盖 ← 场景目标。
//! 后者浅覆盖前者。
//!
//! ## 驱动循环
//!
//! [`App::play`] / [`App::sequence`] 在等待动画完成的同时按帧间隔刷新呈现器，
//! 收到 Ctrl-C 时调用 `stop_all()`，等待随之正常返回。

use std::future::Future;
use std::io::{Stdout, Write};
use std::sync::Arc;

use fx_runtime::{
    AnimationOptions, AnimationType, Orchestrator, SequenceOutcome, SequenceStep, Target,
};
use tokio::signal;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{HostConfig, SurfaceConfig};
use crate::effects::register_builtin_effects;
use crate::error::{HostError, HostResult};
use crate::presenter::{Presenter, parse_color};
use crate::surface::{CanvasSurface, TextSurface};

/// 未指定文本时显示的内容
pub const DEFAULT_TEXT: &str = "SYSTEM ONLINE";

/// 场景：宿主拥有的渲染表面
#[derive(Debug, Clone)]
pub struct Scene {
    /// 文本行
    pub text: Arc<TextSurface>,
    /// 字符画布
    pub canvas: Arc<CanvasSurface>,
}

impl Scene {
    pub fn new(width: usize, height: usize, text: impl Into<String>) -> Self {
        Self {
            text: Arc::new(TextSurface::new(text)),
            canvas: Arc::new(CanvasSurface::new(width, height)),
        }
    }

    pub fn from_config(config: &SurfaceConfig, text: impl Into<String>) -> Self {
        Self::new(config.width, config.height, text)
    }

    /// 动画类型对应的渲染目标
    ///
    /// 数字雨画在画布上，其余效果作用于文本行。
    pub fn target_for(&self, kind: &AnimationType) -> Target {
        match kind {
            AnimationType::DigitalRain => Target::new(Arc::clone(&self.canvas)),
            _ => Target::new(Arc::clone(&self.text)),
        }
    }

    /// (文本修订号, 画布修订号)
    pub fn revision(&self) -> (u64, u64) {
        (self.text.revision(), self.canvas.revision())
    }
}

/// 命令行对单次播放的覆盖参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayOverrides {
    pub text: Option<String>,
    pub duration_ms: Option<f64>,
    pub iterations: Option<i64>,
    pub intensity: Option<f64>,
    pub seed: Option<u64>,
}

impl PlayOverrides {
    /// 转换为只包含已指定字段的配置
    pub fn to_options(&self) -> AnimationOptions {
        let mut options = AnimationOptions::new();
        options.text = self.text.clone();
        options.duration_ms = self.duration_ms;
        options.iterations = self.iterations.map(Into::into);
        options.intensity = self.intensity;
        if let Some(seed) = self.seed {
            options = options.with_extra("seed", seed);
        }
        options
    }

    /// 检查覆盖参数
    ///
    /// 时长必须是非负有限数，强度必须在 0.0 - 1.0 之间（NaN 不通过）。
    pub fn validate(&self) -> HostResult<()> {
        if let Some(duration) = self.duration_ms
            && !(duration.is_finite() && duration >= 0.0)
        {
            return Err(HostError::InvalidOverride(format!(
                "时长必须是非负有限数: {duration}"
            )));
        }

        if let Some(intensity) = self.intensity
            && !(0.0..=1.0).contains(&intensity)
        {
            return Err(HostError::InvalidOverride(format!(
                "强度必须在 0.0 - 1.0 之间: {intensity}"
            )));
        }

        Ok(())
    }
}

/// 合成一次播放的配置
pub fn compose_options(
    config: &HostConfig,
    kind: &AnimationType,
    overrides: &PlayOverrides,
    scene: &Scene,
) -> AnimationOptions {
    config
        .preset(kind)
        .cloned()
        .unwrap_or_default()
        .merged(overrides.to_options())
        .with_target(scene.target_for(kind))
}

/// 宿主应用
#[derive(Debug)]
pub struct App {
    config: HostConfig,
    orchestrator: Orchestrator,
    scene: Scene,
}

impl App {
    /// 创建应用并注册所有内置效果
    pub fn new(config: HostConfig, text: impl Into<String>) -> Self {
        let mut orchestrator = Orchestrator::new().with_tick(config.tick());
        register_builtin_effects(&mut orchestrator);
        let scene = Scene::from_config(&config.surface, text);

        Self {
            config,
            orchestrator,
            scene,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut Orchestrator {
        &mut self.orchestrator
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// 标准输出呈现器，颜色取自配置
    pub fn presenter(&self) -> Presenter<Stdout> {
        let colour = self.config.surface.color.as_deref().and_then(parse_color);
        Presenter::stdout(colour)
    }

    /// 已注册的类型，按名称排序
    pub fn available(&self) -> Vec<AnimationType> {
        let mut kinds = self.orchestrator.get_available_animations();
        kinds.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        kinds
    }

    /// 播放单个动画直到完成
    pub async fn play<W: Write>(
        &self,
        kind: AnimationType,
        overrides: &PlayOverrides,
        presenter: &mut Presenter<W>,
    ) -> HostResult<()> {
        overrides.validate()?;
        let options = compose_options(&self.config, &kind, overrides, &self.scene);
        debug!(animation = %kind, options = ?options, "播放动画");

        let playback = self.orchestrator.play(kind, Some(options))?;
        self.drive(playback, presenter).await
    }

    /// 依次播放多个动画
    pub async fn sequence<W: Write>(
        &self,
        kinds: &[AnimationType],
        overrides: &PlayOverrides,
        presenter: &mut Presenter<W>,
    ) -> HostResult<SequenceOutcome> {
        if kinds.is_empty() {
            return Err(HostError::EmptySequence);
        }
        overrides.validate()?;

        let steps: Vec<SequenceStep> = kinds
            .iter()
            .map(|kind| {
                SequenceStep::new(kind.clone()).with_options(compose_options(
                    &self.config,
                    kind,
                    overrides,
                    &self.scene,
                ))
            })
            .collect();

        let outcome = self
            .drive(self.orchestrator.create_sequence(steps), presenter)
            .await??;
        if let SequenceOutcome::Interrupted { completed } = outcome {
            info!(completed, total = kinds.len(), "序列被中断");
        }
        Ok(outcome)
    }

    /// 等待 `future` 完成，期间按帧刷新呈现器并监听 Ctrl-C
    async fn drive<F, W>(&self, future: F, presenter: &mut Presenter<W>) -> HostResult<F::Output>
    where
        F: Future,
        W: Write,
    {
        tokio::pin!(future);
        // 与引擎的帧错开半个节拍
        let tick = self.config.tick();
        let mut frames = time::interval_at(Instant::now() + tick / 2, tick);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut interrupted = false;

        loop {
            tokio::select! {
                output = &mut future => {
                    presenter.draw(&self.scene)?;
                    return Ok(output);
                }
                _ = frames.tick() => presenter.draw(&self.scene)?,
                result = signal::ctrl_c(), if !interrupted => {
                    interrupted = true;
                    match result {
                        Ok(()) => {
                            info!("收到 Ctrl-C，停止所有动画");
                            self.orchestrator.stop_all();
                        }
                        Err(e) => warn!(error = %e, "无法监听 Ctrl-C"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_runtime::IterationCount;

    #[test]
    fn test_target_for_kind() {
        let scene = Scene::new(8, 2, "x");
        assert!(scene.target_for(&AnimationType::DigitalRain).is::<CanvasSurface>());
        assert!(scene.target_for(&AnimationType::Typing).is::<TextSurface>());
        assert!(
            scene
                .target_for(&AnimationType::Custom("sparkle".into()))
                .is::<TextSurface>()
        );
    }

    #[test]
    fn test_overrides_to_options() {
        let overrides = PlayOverrides {
            iterations: Some(-1),
            seed: Some(9),
            ..PlayOverrides::default()
        };
        let options = overrides.to_options();

        assert_eq!(options.iterations, Some(IterationCount::Infinite));
        assert_eq!(options.extra_u64("seed"), Some(9));
        assert!(options.duration_ms.is_none());
        assert!(options.text.is_none());
    }

    #[test]
    fn test_compose_options_cli_overrides_preset() {
        let config = HostConfig::default();
        let scene = Scene::new(8, 2, "x");
        let overrides = PlayOverrides {
            duration_ms: Some(250.0),
            ..PlayOverrides::default()
        };

        let options = compose_options(&config, &AnimationType::Glitch, &overrides, &scene);
        assert_eq!(options.duration_ms(), 250.0);
        // 未覆盖的字段来自预设
        assert_eq!(options.intensity, Some(crate::effects::defaults::GLITCH_INTENSITY));
        let expected = scene.target_for(&AnimationType::Glitch);
        assert!(options.target.is_some_and(|target| target.ptr_eq(&expected)));
    }

    #[test]
    fn test_available_is_sorted() {
        let app = App::new(HostConfig::default(), "");
        let kinds = app.available();
        let names: Vec<&str> = kinds.iter().map(AnimationType::as_str).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), AnimationType::BUILTIN.len());
    }

    #[test]
    fn test_overrides_validate() {
        assert!(PlayOverrides::default().validate().is_ok());

        for intensity in [f64::NAN, -0.1, 1.5] {
            let overrides = PlayOverrides {
                intensity: Some(intensity),
                ..PlayOverrides::default()
            };
            assert!(
                matches!(overrides.validate(), Err(HostError::InvalidOverride(_))),
                "{intensity}"
            );
        }

        for duration in [f64::NAN, f64::INFINITY, -1.0] {
            let overrides = PlayOverrides {
                duration_ms: Some(duration),
                ..PlayOverrides::default()
            };
            assert!(
                matches!(overrides.validate(), Err(HostError::InvalidOverride(_))),
                "{duration}"
            );
        }

        let overrides = PlayOverrides {
            duration_ms: Some(0.0),
            intensity: Some(1.0),
            ..PlayOverrides::default()
        };
        assert!(overrides.validate().is_ok());
    }
}
