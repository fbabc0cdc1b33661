//! 数字雨效果：字符列从画布顶端落下，留下渐暗的尾迹。

use std::sync::Arc;

use fx_runtime::{AnimationOptions, Effect, FrameContext};
use rand::Rng;
use rand::rngs::SmallRng;

use super::{defaults, intensity, resolve_surface, seeded_rng};
use crate::surface::{CanvasSurface, Cell};

const RAIN_CHARS: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'ｱ', 'ｲ', 'ｳ', 'ｴ', 'ｵ', 'ｶ', 'ｷ', 'ｸ',
    'ｹ', 'ｺ', 'ｻ', 'ｼ', 'ｽ', 'ｾ', 'ｿ', ':', '.', '=', '*', '+', '<', '>',
];

/// 尾迹每帧的衰减系数
const TRAIL_FADE: f64 = 0.82;
/// 亮度低于此值的单元格被清空
const TRAIL_FLOOR: f64 = 0.08;

/// 一列雨滴
#[derive(Debug, Clone)]
struct RainDrop {
    /// 头部所在行（可为负，表示尚未进入画布）
    head: f64,
    /// 每帧下落的行数
    speed: f64,
}

/// 数字雨效果
///
/// `intensity` 为活跃列占比。雨滴列在第一帧按画布宽度分配，`complete` 时清空画布。
#[derive(Debug, Default)]
pub struct DigitalRainEffect {
    surface: Option<Arc<CanvasSurface>>,
    drops: Vec<Option<RainDrop>>,
    rng: Option<SmallRng>,
}

fn spawn_drop(rng: &mut SmallRng, height: usize) -> RainDrop {
    RainDrop {
        head: -(rng.gen_range(0..=height) as f64),
        speed: rng.gen_range(0.3..1.0),
    }
}

impl Effect for DigitalRainEffect {
    fn update(&mut self, ctx: &mut FrameContext<'_>, _progress: f64, _iteration: u32) {
        if self.surface.is_none() {
            let Some(surface) = resolve_surface::<CanvasSurface>(ctx) else {
                return;
            };
            let density = intensity(ctx.options(), defaults::DIGITAL_RAIN_DENSITY);
            let mut rng = seeded_rng(ctx.options());
            self.drops = (0..surface.width())
                .map(|_| {
                    rng.gen_bool(density)
                        .then(|| spawn_drop(&mut rng, surface.height()))
                })
                .collect();
            self.rng = Some(rng);
            self.surface = Some(surface);
        }
        let (Some(surface), Some(rng)) = (&self.surface, &mut self.rng) else {
            return;
        };
        let drops = &mut self.drops;

        surface.edit(|cells| {
            cells.fade(TRAIL_FADE, TRAIL_FLOOR);
            let height = cells.height();

            for (x, slot) in drops.iter_mut().enumerate() {
                let Some(rain) = slot else {
                    continue;
                };
                rain.head += rain.speed;

                if rain.head >= 0.0 {
                    let ch = RAIN_CHARS[rng.gen_range(0..RAIN_CHARS.len())];
                    cells.set(x, rain.head as usize, Cell::new(ch, 1.0));
                }
                if rain.head >= height as f64 {
                    *rain = spawn_drop(rng, height);
                }
            }
        });
    }

    fn complete(&mut self, _options: &AnimationOptions) {
        if let Some(surface) = self.surface.take() {
            surface.edit(|cells| cells.clear());
        }
        self.drops = Vec::new();
        self.rng = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_runtime::{AnimationType, Target};

    fn run_frames(effect: &mut DigitalRainEffect, options: &AnimationOptions, frames: usize) {
        let kind = AnimationType::DigitalRain;
        for frame in 0..frames {
            let mut ctx = FrameContext::new(&kind, options);
            effect.update(&mut ctx, frame as f64 / frames as f64, 0);
        }
    }

    #[test]
    fn test_rain_fills_canvas_and_complete_clears() {
        let canvas = Arc::new(CanvasSurface::new(16, 6));
        let options = AnimationOptions::new()
            .with_intensity(1.0)
            .with_extra("seed", 11)
            .with_target(Target::new(canvas.clone()));
        let mut effect = DigitalRainEffect::default();

        run_frames(&mut effect, &options, 40);
        assert!(!canvas.is_blank());
        assert!(canvas.revision() > 0);

        effect.complete(&options);
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_same_seed_same_rain() {
        let options_for = |canvas: &Arc<CanvasSurface>| {
            AnimationOptions::new()
                .with_extra("seed", 5)
                .with_target(Target::new(canvas.clone()))
        };

        let a = Arc::new(CanvasSurface::new(10, 4));
        let b = Arc::new(CanvasSurface::new(10, 4));
        run_frames(&mut DigitalRainEffect::default(), &options_for(&a), 20);
        run_frames(&mut DigitalRainEffect::default(), &options_for(&b), 20);

        assert_eq!(a.rows(), b.rows());
    }

    #[test]
    fn test_zero_density_stays_blank() {
        let canvas = Arc::new(CanvasSurface::new(8, 3));
        let options = AnimationOptions::new()
            .with_intensity(0.0)
            .with_target(Target::new(canvas.clone()));
        let mut effect = DigitalRainEffect::default();

        run_frames(&mut effect, &options, 10);
        assert!(canvas.is_blank());
        assert_eq!(canvas.revision(), 0);
    }
}
