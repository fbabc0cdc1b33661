//! 扫描线效果：高亮列从左到右扫过文本。

use std::sync::Arc;

use fx_runtime::{AnimationOptions, Effect, FrameContext};

use super::resolve_surface;
use crate::surface::TextSurface;

/// 扫描线效果
#[derive(Debug, Default)]
pub struct ScanLineEffect {
    surface: Option<Arc<TextSurface>>,
}

/// 进度对应的高亮列；空文本没有高亮
fn scan_column(progress: f64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(((progress * len as f64).floor() as usize).min(len - 1))
}

impl Effect for ScanLineEffect {
    fn update(&mut self, ctx: &mut FrameContext<'_>, progress: f64, _iteration: u32) {
        if self.surface.is_none() {
            self.surface = resolve_surface::<TextSurface>(ctx);
        }
        let Some(surface) = &self.surface else {
            return;
        };

        surface.edit(|line| {
            line.highlight = scan_column(progress, line.text.chars().count());
        });
    }

    fn complete(&mut self, _options: &AnimationOptions) {
        if let Some(surface) = self.surface.take() {
            surface.edit(|line| line.highlight = None);
        }
    }
}
