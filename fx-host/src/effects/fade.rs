//! 淡入 / 淡出效果。

use std::sync::Arc;

use fx_runtime::{AnimationOptions, Effect, FrameContext};

use super::{easing, resolve_surface};
use crate::surface::TextSurface;

/// 淡变方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    /// 0 → 1
    In,
    /// 1 → 0
    Out,
}

impl FadeDirection {
    /// 终点亮度
    fn target(&self) -> f64 {
        match self {
            FadeDirection::In => 1.0,
            FadeDirection::Out => 0.0,
        }
    }
}

/// 淡入 / 淡出效果
///
/// 亮度按 `extra.easing`（默认 ease-in-out）插值；
/// 淡出结束后文本行不可见。
#[derive(Debug)]
pub struct FadeEffect {
    direction: FadeDirection,
    surface: Option<Arc<TextSurface>>,
}

impl FadeEffect {
    pub fn new(direction: FadeDirection) -> Self {
        Self {
            direction,
            surface: None,
        }
    }

    pub fn fade_in() -> Self {
        Self::new(FadeDirection::In)
    }

    pub fn fade_out() -> Self {
        Self::new(FadeDirection::Out)
    }

    pub fn direction(&self) -> FadeDirection {
        self.direction
    }
}

impl Effect for FadeEffect {
    fn update(&mut self, ctx: &mut FrameContext<'_>, progress: f64, _iteration: u32) {
        if self.surface.is_none() {
            self.surface = resolve_surface::<TextSurface>(ctx);
        }
        let Some(surface) = &self.surface else {
            return;
        };

        let eased = easing(ctx.options()).apply(progress);
        let brightness = match self.direction {
            FadeDirection::In => eased,
            FadeDirection::Out => 1.0 - eased,
        };

        surface.edit(|line| {
            line.brightness = brightness;
            line.visible = brightness > 0.0;
        });
    }

    fn complete(&mut self, _options: &AnimationOptions) {
        // 提前终止时直接跳到终点
        if let Some(surface) = self.surface.take() {
            let brightness = self.direction.target();
            surface.edit(|line| {
                line.brightness = brightness;
                line.visible = brightness > 0.0;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_runtime::{AnimationType, Target};

    #[test]
    fn test_fade_in_and_out_endpoints() {
        let surface = Arc::new(TextSurface::new("CONNECTED"));
        let options = AnimationOptions::new()
            .with_extra("easing", "linear")
            .with_target(Target::new(surface.clone()));

        let kind = AnimationType::FadeOut;
        let mut fade_out = FadeEffect::fade_out();
        let mut ctx = FrameContext::new(&kind, &options);
        fade_out.update(&mut ctx, 0.25, 0);
        assert_eq!(surface.snapshot().brightness, 0.75);
        fade_out.update(&mut ctx, 1.0, 0);
        let line = surface.snapshot();
        assert_eq!(line.brightness, 0.0);
        assert!(!line.visible);

        let kind = AnimationType::FadeIn;
        let mut fade_in = FadeEffect::fade_in();
        let mut ctx = FrameContext::new(&kind, &options);
        fade_in.update(&mut ctx, 0.5, 0);
        assert_eq!(surface.snapshot().brightness, 0.5);
        assert!(surface.snapshot().visible);

        // 提前终止跳到终点
        fade_in.complete(&options);
        assert_eq!(surface.snapshot().brightness, 1.0);
        assert_eq!(fade_in.direction(), FadeDirection::In);
    }
}
