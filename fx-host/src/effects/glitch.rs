//! 故障效果：随机替换字符，随进度逐渐恢复。

use std::sync::Arc;

use fx_runtime::{AnimationOptions, Effect, FrameContext};
use rand::Rng;
use rand::rngs::SmallRng;

use super::{defaults, intensity, resolve_surface, seeded_rng};
use crate::surface::TextSurface;

const GLITCH_CHARS: &[char] = &[
    '#', '%', '&', '@', '$', '!', '?', '/', '\\', '|', '_', '~', '*', '+', '=', '<', '>',
];

/// 故障效果
///
/// 每帧以 `intensity * (1 - progress)` 的概率替换每个非空白字符，
/// 最后一帧和 `complete` 都恢复原文。
#[derive(Debug, Default)]
pub struct GlitchEffect {
    surface: Option<Arc<TextSurface>>,
    original: String,
    rng: Option<SmallRng>,
}

impl Effect for GlitchEffect {
    fn update(&mut self, ctx: &mut FrameContext<'_>, progress: f64, _iteration: u32) {
        if self.surface.is_none() {
            let Some(surface) = resolve_surface::<TextSurface>(ctx) else {
                return;
            };
            self.original = ctx.options().text.clone().unwrap_or_else(|| surface.text());
            self.rng = Some(seeded_rng(ctx.options()));
            self.surface = Some(surface);
        }
        let (Some(surface), Some(rng)) = (&self.surface, &mut self.rng) else {
            return;
        };

        if progress >= 1.0 {
            let original = self.original.clone();
            surface.edit(|line| line.text = original);
            return;
        }

        let rate = intensity(ctx.options(), defaults::GLITCH_INTENSITY) * (1.0 - progress);
        let glitched: String = self
            .original
            .chars()
            .map(|ch| {
                if !ch.is_whitespace() && rng.gen_bool(rate) {
                    GLITCH_CHARS[rng.gen_range(0..GLITCH_CHARS.len())]
                } else {
                    ch
                }
            })
            .collect();

        surface.edit(|line| {
            line.text = glitched;
            line.visible = true;
        });
    }

    fn complete(&mut self, _options: &AnimationOptions) {
        if let Some(surface) = self.surface.take() {
            let original = std::mem::take(&mut self.original);
            surface.edit(|line| line.text = original);
        }
        self.rng = None;
    }
}
