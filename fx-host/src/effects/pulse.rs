//! 脉冲效果：亮度在每次迭代内呼吸一次。

use std::f64::consts::PI;
use std::sync::Arc;

use fx_runtime::{AnimationOptions, Effect, FrameContext};

use super::{defaults, easing, intensity, resolve_surface};
use crate::surface::TextSurface;

/// 脉冲效果
///
/// 亮度 = `1 - intensity + intensity * ease(sin(π * progress))`，
/// 迭代起止最暗，中点最亮。
#[derive(Debug, Default)]
pub struct PulseEffect {
    surface: Option<Arc<TextSurface>>,
}

/// 计算脉冲亮度
fn pulse_brightness(options: &AnimationOptions, progress: f64) -> f64 {
    let strength = intensity(options, defaults::PULSE_INTENSITY);
    let wave = (PI * progress).sin();
    1.0 - strength + strength * easing(options).apply(wave)
}

impl Effect for PulseEffect {
    fn update(&mut self, ctx: &mut FrameContext<'_>, progress: f64, _iteration: u32) {
        if self.surface.is_none() {
            self.surface = resolve_surface::<TextSurface>(ctx);
        }
        let Some(surface) = &self.surface else {
            return;
        };

        let brightness = pulse_brightness(ctx.options(), progress);
        surface.edit(|line| {
            line.visible = true;
            line.brightness = brightness;
        });
    }

    fn complete(&mut self, _options: &AnimationOptions) {
        if let Some(surface) = self.surface.take() {
            surface.edit(|line| line.brightness = 1.0);
        }
    }
}
