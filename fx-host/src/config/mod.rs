//! # Config 模块
//!
//! 宿主配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (fx.json)
//! 3. 默认值（最低）

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use fx_runtime::{AnimationOptions, AnimationType, IterationCount};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, info, warn};

use crate::effects::defaults;
use crate::presenter::parse_color;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "fx.json";

/// 宿主配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// 帧间隔（毫秒）
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 渲染表面配置
    #[serde(default)]
    pub surface: SurfaceConfig,

    /// 各动画类型的预设配置
    ///
    /// 键为类型名（大小写不敏感），值在播放时被命令行参数浅覆盖。
    #[serde(default = "default_presets")]
    pub presets: BTreeMap<String, AnimationOptions>,
}

/// 渲染表面配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// 画布宽度（字符）
    #[serde(default = "default_surface_width")]
    pub width: usize,

    /// 画布高度（行）
    #[serde(default = "default_surface_height")]
    pub height: usize,

    /// 前景色（颜色名或 `#rrggbb`），为空时不着色
    #[serde(default = "default_surface_color")]
    pub color: Option<String>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: default_surface_width(),
            height: default_surface_height(),
            color: default_surface_color(),
        }
    }
}

// 默认值函数
fn default_tick_ms() -> u64 {
    16
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_surface_width() -> usize {
    48
}

fn default_surface_height() -> usize {
    12
}

fn default_surface_color() -> Option<String> {
    Some("green".to_string())
}

fn default_presets() -> BTreeMap<String, AnimationOptions> {
    let presets = [
        (
            AnimationType::Typing,
            AnimationOptions::new().with_duration_ms(defaults::TYPING_DURATION_MS),
        ),
        (
            AnimationType::Glitch,
            AnimationOptions::new()
                .with_duration_ms(defaults::GLITCH_DURATION_MS)
                .with_intensity(defaults::GLITCH_INTENSITY),
        ),
        (
            AnimationType::Flicker,
            AnimationOptions::new()
                .with_duration_ms(defaults::FLICKER_DURATION_MS)
                .with_intensity(defaults::FLICKER_INTENSITY),
        ),
        (
            AnimationType::Pulse,
            AnimationOptions::new()
                .with_duration_ms(defaults::PULSE_DURATION_MS)
                .with_iterations(2)
                .with_intensity(defaults::PULSE_INTENSITY),
        ),
        (
            AnimationType::DigitalRain,
            AnimationOptions::new()
                .with_duration_ms(defaults::DIGITAL_RAIN_DURATION_MS)
                .with_intensity(defaults::DIGITAL_RAIN_DENSITY),
        ),
        (
            AnimationType::FadeIn,
            AnimationOptions::new().with_duration_ms(defaults::FADE_DURATION_MS),
        ),
        (
            AnimationType::FadeOut,
            AnimationOptions::new().with_duration_ms(defaults::FADE_DURATION_MS),
        ),
        (
            AnimationType::ScanLine,
            AnimationOptions::new().with_duration_ms(defaults::SCAN_LINE_DURATION_MS),
        ),
    ];

    presets
        .into_iter()
        .map(|(kind, options)| (String::from(kind), options))
        .collect()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            log_level: default_log_level(),
            surface: SurfaceConfig::default(),
            presets: default_presets(),
        }
    }
}

impl HostConfig {
    /// 严格读取配置文件
    ///
    /// 文件不存在、读取失败或解析失败都返回错误。
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                info!(path = %path.display(), "配置文件加载成功");
                config
            }
            Err(e) => {
                warn!(error = %e, "配置文件加载失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 帧间隔
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// 解析后的日志级别
    pub fn level(&self) -> Result<Level, ConfigError> {
        Level::from_str(self.log_level.trim()).map_err(|_| {
            ConfigError::ValidationFailed(format!("无效的日志级别: {}", self.log_level))
        })
    }

    /// 指定类型的预设配置
    ///
    /// 预设键按类型名匹配，因此 `"matrix"` 与 `"digital-rain"` 指向同一类型。
    pub fn preset(&self, kind: &AnimationType) -> Option<&AnimationOptions> {
        self.presets
            .iter()
            .find(|(key, _)| AnimationType::from(key.as_str()) == *kind)
            .map(|(_, options)| options)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 || self.tick_ms > 1000 {
            return Err(ConfigError::ValidationFailed(
                "tick_ms 必须在 1 - 1000 之间".to_string(),
            ));
        }

        self.level()?;

        if self.surface.width == 0 || self.surface.height == 0 {
            return Err(ConfigError::ValidationFailed(
                "画布尺寸必须大于 0".to_string(),
            ));
        }

        if let Some(color) = &self.surface.color
            && parse_color(color).is_none()
        {
            return Err(ConfigError::ValidationFailed(format!(
                "无法识别的颜色: {}",
                color
            )));
        }

        for (name, options) in &self.presets {
            if let Some(intensity) = options.intensity
                && !(0.0..=1.0).contains(&intensity)
            {
                return Err(ConfigError::ValidationFailed(format!(
                    "预设 '{}' 的强度必须在 0.0 - 1.0 之间",
                    name
                )));
            }

            if let Some(duration) = options.duration_ms
                && !(duration.is_finite() && duration >= 0.0)
            {
                return Err(ConfigError::ValidationFailed(format!(
                    "预设 '{}' 的时长必须是非负有限数",
                    name
                )));
            }

            if let Some(IterationCount::Finite(0)) = options.iterations {
                warn!(preset = %name, "预设迭代次数为 0，动画会立即完成");
            }
        }

        Ok(())
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// 解析失败
    #[error("配置解析失败: {0}")]
    ParseFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
