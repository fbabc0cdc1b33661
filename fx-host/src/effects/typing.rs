//! 打字效果：按进度逐字显示文本。

use std::sync::Arc;

use fx_runtime::{AnimationOptions, Effect, FrameContext};

use super::resolve_surface;
use crate::surface::TextSurface;

/// 光标字符
const CURSOR: char = '█';

/// 打字效果
///
/// 可见字符数为 `floor(progress * len)`，因此完整文本只在最后一帧出现。
/// 文本取自 `options.text`，未指定时使用表面上的现有文本。
#[derive(Debug, Default)]
pub struct TypingEffect {
    surface: Option<Arc<TextSurface>>,
    full: Vec<char>,
}

impl Effect for TypingEffect {
    fn update(&mut self, ctx: &mut FrameContext<'_>, progress: f64, _iteration: u32) {
        if self.surface.is_none() {
            let Some(surface) = resolve_surface::<TextSurface>(ctx) else {
                return;
            };
            self.full = match &ctx.options().text {
                Some(text) => text.chars().collect(),
                None => surface.text().chars().collect(),
            };
            self.surface = Some(surface);
        }
        let Some(surface) = &self.surface else {
            return;
        };

        let total = self.full.len();
        let visible = ((progress * total as f64).floor() as usize).min(total);
        let cursor = ctx.options().style.is_some_and(|style| style.cursor);

        let mut rendered: String = self.full[..visible].iter().collect();
        if cursor && visible < total {
            rendered.push(CURSOR);
        }

        surface.edit(|line| {
            line.text = rendered;
            line.visible = true;
        });
    }

    fn complete(&mut self, _options: &AnimationOptions) {
        // 提前终止时补全文本
        if let Some(surface) = self.surface.take() {
            let full: String = self.full.iter().collect();
            surface.edit(|line| line.text = full);
        }
        self.full = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_runtime::{AnimationType, StyleFlags, Target};

    fn drive(effect: &mut TypingEffect, options: &AnimationOptions, progress: f64) {
        let kind = AnimationType::Typing;
        let mut ctx = FrameContext::new(&kind, options);
        effect.update(&mut ctx, progress, 0);
    }

    #[test]
    fn test_reveals_by_floor_of_progress() {
        let surface = Arc::new(TextSurface::new(""));
        let options = AnimationOptions::new()
            .with_text("HELLO")
            .with_target(Target::new(surface.clone()));
        let mut effect = TypingEffect::default();

        drive(&mut effect, &options, 0.0);
        assert_eq!(surface.text(), "");
        drive(&mut effect, &options, 0.5);
        assert_eq!(surface.text(), "HE");
        drive(&mut effect, &options, 0.99);
        assert_eq!(surface.text(), "HELL");
        drive(&mut effect, &options, 1.0);
        assert_eq!(surface.text(), "HELLO");
    }

    #[test]
    fn test_cursor_and_complete_restores_text() {
        let surface = Arc::new(TextSurface::new("WAKE UP"));
        let options = AnimationOptions::new()
            .with_style(StyleFlags {
                cursor: true,
                ..StyleFlags::default()
            })
            .with_target(Target::new(surface.clone()));
        let mut effect = TypingEffect::default();

        drive(&mut effect, &options, 0.3);
        assert_eq!(surface.text(), "WA█");

        effect.complete(&options);
        assert_eq!(surface.text(), "WAKE UP");
    }
}
