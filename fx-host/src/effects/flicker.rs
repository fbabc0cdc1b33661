//! 闪烁效果：随机熄灭和调暗文本行。

use std::sync::Arc;

use fx_runtime::{AnimationOptions, Effect, FrameContext};
use rand::Rng;
use rand::rngs::SmallRng;

use super::{defaults, intensity, resolve_surface, seeded_rng};
use crate::surface::TextSurface;

/// 闪烁效果
///
/// 每帧以 `intensity * 0.5` 的概率熄灭，亮着时亮度在 `[1 - intensity, 1]` 之间随机。
#[derive(Debug, Default)]
pub struct FlickerEffect {
    surface: Option<Arc<TextSurface>>,
    rng: Option<SmallRng>,
}

impl Effect for FlickerEffect {
    fn update(&mut self, ctx: &mut FrameContext<'_>, progress: f64, _iteration: u32) {
        if self.surface.is_none() {
            let Some(surface) = resolve_surface::<TextSurface>(ctx) else {
                return;
            };
            self.rng = Some(seeded_rng(ctx.options()));
            self.surface = Some(surface);
        }
        let (Some(surface), Some(rng)) = (&self.surface, &mut self.rng) else {
            return;
        };

        if progress >= 1.0 {
            surface.edit(|line| {
                line.visible = true;
                line.brightness = 1.0;
            });
            return;
        }

        let strength = intensity(ctx.options(), defaults::FLICKER_INTENSITY);
        let visible = !rng.gen_bool(strength * 0.5);
        let brightness = if strength > 0.0 {
            rng.gen_range((1.0 - strength)..=1.0)
        } else {
            1.0
        };

        surface.edit(|line| {
            line.visible = visible;
            line.brightness = brightness;
        });
    }

    fn complete(&mut self, _options: &AnimationOptions) {
        if let Some(surface) = self.surface.take() {
            surface.edit(|line| {
                line.visible = true;
                line.brightness = 1.0;
            });
        }
        self.rng = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_runtime::{AnimationType, Target};

    #[test]
    fn test_flicker_stays_in_range_and_recovers() {
        let surface = Arc::new(TextSurface::new("LOW POWER"));
        let options = AnimationOptions::new()
            .with_intensity(0.8)
            .with_extra("seed", 3)
            .with_target(Target::new(surface.clone()));
        let kind = AnimationType::Flicker;
        let mut effect = FlickerEffect::default();

        for step in 0..50 {
            let mut ctx = FrameContext::new(&kind, &options);
            effect.update(&mut ctx, step as f64 / 50.0, 0);
            let line = surface.snapshot();
            assert!((0.19..=1.0).contains(&line.brightness));
        }

        effect.complete(&options);
        let line = surface.snapshot();
        assert!(line.visible);
        assert_eq!(line.brightness, 1.0);
        assert_eq!(line.text, "LOW POWER");
    }
}
