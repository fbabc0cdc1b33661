//! # FX Host
//!
//! 终端特效的宿主层：内置效果、渲染表面、配置、终端呈现。
//!
//! ## 架构概述
//!
//! ```text
//! CLI ──► App ──► Orchestrator (fx-runtime) ──► Effect::update ──► Surface
//!          │                                                          │
//!          └──────────── Presenter（按帧读取修订号，输出 ANSI）◄───────┘
//! ```
//!
//! 引擎只推进时间轴；效果把 `(progress, iteration)` 写进表面；
//! 呈现器按帧把表面画到终端。三者之间没有直接调用。
//!
//! ## 模块结构
//!
//! - [`app`]：场景、配置合成、驱动循环
//! - [`config`]：JSON 配置
//! - [`easing`]：缓动函数
//! - [`effects`]：内置效果
//! - [`error`]：错误类型定义
//! - [`presenter`]：终端输出
//! - [`surface`]：渲染表面

pub mod app;
pub mod config;
pub mod easing;
pub mod effects;
pub mod error;
pub mod presenter;
pub mod surface;

pub use app::{App, DEFAULT_TEXT, PlayOverrides, Scene, compose_options};
pub use config::{ConfigError, DEFAULT_CONFIG_FILE, HostConfig, SurfaceConfig};
pub use easing::EasingFunction;
pub use effects::register_builtin_effects;
pub use error::{HostError, HostResult};
pub use presenter::{Presenter, parse_color};
pub use surface::{CanvasSurface, Cell, TextLine, TextSurface};
