//! # Options 模块
//!
//! 动画配置值。
//!
//! 所有字段都是可选的：未指定的字段在读取时回落到默认值，
//! 合并时保持原值（浅覆盖）。效果专属字段对引擎不透明，原样转交给效果。

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 默认单次迭代时长（毫秒）
pub const DEFAULT_DURATION_MS: f64 = 1000.0;
/// 默认启动延迟（毫秒）
pub const DEFAULT_DELAY_MS: f64 = 0.0;

/// 迭代次数
///
/// 序列化为整数，任何负数都表示无限循环。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum IterationCount {
    /// 有限次
    Finite(u32),
    /// 无限循环，只能通过 `stop()` 结束
    Infinite,
}

impl IterationCount {
    /// 是否无限循环
    pub fn is_infinite(&self) -> bool {
        matches!(self, IterationCount::Infinite)
    }
}

impl Default for IterationCount {
    fn default() -> Self {
        IterationCount::Finite(1)
    }
}

impl From<i64> for IterationCount {
    fn from(value: i64) -> Self {
        if value < 0 {
            IterationCount::Infinite
        } else {
            IterationCount::Finite(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }
}

impl From<i32> for IterationCount {
    fn from(value: i32) -> Self {
        IterationCount::from(i64::from(value))
    }
}

impl From<u32> for IterationCount {
    fn from(value: u32) -> Self {
        IterationCount::Finite(value)
    }
}

impl From<IterationCount> for i64 {
    fn from(value: IterationCount) -> Self {
        match value {
            IterationCount::Finite(n) => i64::from(n),
            IterationCount::Infinite => -1,
        }
    }
}

/// 渲染目标表面的句柄
///
/// 表面由调用方拥有，引擎只转交引用。效果通过 [`Target::downcast`]
/// 取回自己能识别的表面类型；识别不了就视为"没有可渲染的目标"。
#[derive(Clone)]
pub struct Target(Arc<dyn Any + Send + Sync>);

impl Target {
    /// 包装一个共享表面
    pub fn new<T: Any + Send + Sync>(surface: Arc<T>) -> Self {
        Self(surface)
    }

    /// 取回具体表面类型
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.0).downcast::<T>().ok()
    }

    /// 是否为指定表面类型
    pub fn is<T: Any + Send + Sync>(&self) -> bool {
        self.0.is::<T>()
    }

    /// 两个句柄是否指向同一个表面
    pub fn ptr_eq(&self, other: &Target) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Target(..)")
    }
}

/// 完成回调
pub type CompletionCallback = Arc<dyn Fn() + Send + Sync>;

/// 文本样式标记
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleFlags {
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    /// 打字效果是否显示光标
    pub cursor: bool,
}

/// 动画配置
///
/// ## 合并语义
///
/// [`merge`](AnimationOptions::merge) 是浅覆盖：`other` 中为 `Some` 的字段覆盖当前值，
/// 为 `None` 的字段保留当前值。`extra` 按键逐个覆盖。
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationOptions {
    /// 单次迭代时长（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    /// 启动延迟（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<f64>,
    /// 迭代次数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<IterationCount>,
    /// 渲染目标
    #[serde(skip)]
    pub target: Option<Target>,
    /// 文本内容
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// 强度（0.0 - 1.0）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    /// 缩放
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// 颜色（`#rrggbb` 或颜色名）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// 样式标记
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleFlags>,
    /// 其他效果专属参数
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
    /// 完成回调，在终止时调用一次
    #[serde(skip)]
    pub on_complete: Option<CompletionCallback>,
}

impl AnimationOptions {
    /// 创建空配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 浅合并 `other` 到当前配置
    pub fn merge(&mut self, other: AnimationOptions) {
        let AnimationOptions {
            duration_ms,
            delay_ms,
            iterations,
            target,
            text,
            intensity,
            scale,
            color,
            style,
            extra,
            on_complete,
        } = other;

        if duration_ms.is_some() {
            self.duration_ms = duration_ms;
        }
        if delay_ms.is_some() {
            self.delay_ms = delay_ms;
        }
        if iterations.is_some() {
            self.iterations = iterations;
        }
        if target.is_some() {
            self.target = target;
        }
        if text.is_some() {
            self.text = text;
        }
        if intensity.is_some() {
            self.intensity = intensity;
        }
        if scale.is_some() {
            self.scale = scale;
        }
        if color.is_some() {
            self.color = color;
        }
        if style.is_some() {
            self.style = style;
        }
        if on_complete.is_some() {
            self.on_complete = on_complete;
        }
        self.extra.extend(extra);
    }

    /// 合并后返回新配置
    pub fn merged(mut self, other: AnimationOptions) -> Self {
        self.merge(other);
        self
    }

    // ========== 构建方法 ==========

    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: f64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    pub fn with_iterations(mut self, iterations: impl Into<IterationCount>) -> Self {
        self.iterations = Some(iterations.into());
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_style(mut self, style: StyleFlags) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn with_on_complete(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    // ========== 读取（带默认值） ==========

    /// 单次迭代时长，未指定时为 1000ms
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms.unwrap_or(DEFAULT_DURATION_MS)
    }

    /// 启动延迟，未指定时为 0
    pub fn delay_ms(&self) -> f64 {
        self.delay_ms.unwrap_or(DEFAULT_DELAY_MS)
    }

    /// 迭代次数，未指定时为 1
    pub fn iterations(&self) -> IterationCount {
        self.iterations.unwrap_or_default()
    }

    /// 读取 `extra` 中的浮点参数
    pub fn extra_f64(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(Value::as_f64)
    }

    /// 读取 `extra` 中的整数参数
    pub fn extra_u64(&self, key: &str) -> Option<u64> {
        self.extra.get(key).and_then(Value::as_u64)
    }

    /// 读取 `extra` 中的布尔参数
    pub fn extra_bool(&self, key: &str) -> Option<bool> {
        self.extra.get(key).and_then(Value::as_bool)
    }
}

impl fmt::Debug for AnimationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationOptions")
            .field("duration_ms", &self.duration_ms)
            .field("delay_ms", &self.delay_ms)
            .field("iterations", &self.iterations)
            .field("target", &self.target)
            .field("text", &self.text)
            .field("intensity", &self.intensity)
            .field("scale", &self.scale)
            .field("color", &self.color)
            .field("style", &self.style)
            .field("extra", &self.extra)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}
