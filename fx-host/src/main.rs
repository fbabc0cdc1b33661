//! # FX Host
//!
//! 终端特效播放器。
//!
//! ## 用法
//!
//! ```bash
//! fx-host list
//! fx-host play typing --text "WAKE UP" --duration-ms 1200
//! fx-host play glitch --intensity 0.8 --seed 7
//! fx-host play pulse --iterations -1          # 无限循环，Ctrl-C 结束
//! fx-host sequence typing pulse fade-out --text "HELLO"
//! fx-host --config fx.json --tick-ms 33 --log-level debug play matrix
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use fx_host::{App, DEFAULT_CONFIG_FILE, DEFAULT_TEXT, HostConfig, HostResult, PlayOverrides};
use fx_runtime::{AnimationType, SequenceOutcome};
use tracing::{Level, error, info, warn};

#[derive(Parser)]
#[command(name = "fx-host")]
#[command(about = "终端特效动画播放器")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件路径（默认：fx.json）
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// 帧间隔（毫秒），覆盖配置文件
    #[arg(long, global = true)]
    tick_ms: Option<u64>,

    /// 日志级别，覆盖配置文件
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出可用的动画类型
    List,

    /// 播放单个动画
    Play {
        /// 动画类型（如 typing、glitch、matrix）
        kind: String,

        #[command(flatten)]
        args: PlayArgs,
    },

    /// 依次播放多个动画
    Sequence {
        /// 动画类型列表
        #[arg(required = true)]
        kinds: Vec<String>,

        #[command(flatten)]
        args: PlayArgs,
    },
}

#[derive(Args)]
struct PlayArgs {
    /// 显示的文本
    #[arg(short, long)]
    text: Option<String>,

    /// 单次迭代时长（毫秒）
    #[arg(short, long)]
    duration_ms: Option<f64>,

    /// 迭代次数，负数表示无限循环
    #[arg(short, long, allow_negative_numbers = true)]
    iterations: Option<i64>,

    /// 强度（0.0 - 1.0）
    #[arg(long)]
    intensity: Option<f64>,

    /// 随机种子
    #[arg(long)]
    seed: Option<u64>,
}

impl From<PlayArgs> for PlayOverrides {
    fn from(args: PlayArgs) -> Self {
        PlayOverrides {
            text: args.text,
            duration_ms: args.duration_ms,
            iterations: args.iterations,
            intensity: args.intensity,
            seed: args.seed,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // 先读配置再初始化日志：日志级别可能来自配置文件
    let loaded = HostConfig::read(&cli.config);
    let mut config = loaded.clone().unwrap_or_default();
    if let Some(tick_ms) = cli.tick_ms {
        config.tick_ms = tick_ms;
    }
    if let Some(log_level) = cli.log_level.clone() {
        config.log_level = log_level;
    }

    tracing_subscriber::fmt()
        .with_max_level(config.level().unwrap_or(Level::INFO))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match &loaded {
        Ok(_) => info!(path = %cli.config.display(), "配置文件加载成功"),
        Err(e) => warn!(path = %cli.config.display(), error = %e, "配置文件加载失败，使用默认配置"),
    }

    if let Err(e) = config.validate() {
        error!(error = %e, "配置无效");
        return ExitCode::FAILURE;
    }

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "运行失败");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: HostConfig) -> HostResult<()> {
    match command {
        Commands::List => {
            let app = App::new(config, "");
            for kind in app.available() {
                let duration = app
                    .config()
                    .preset(&kind)
                    .map(|preset| preset.duration_ms())
                    .unwrap_or_default();
                println!("{:<14} {:>6}ms", kind.as_str(), duration);
            }
            Ok(())
        }
        Commands::Play { kind, args } => {
            let overrides = PlayOverrides::from(args);
            let text = overrides.text.clone().unwrap_or_else(|| DEFAULT_TEXT.to_string());
            let app = App::new(config, text);
            let mut presenter = app.presenter();

            app.play(AnimationType::from(kind), &overrides, &mut presenter)
                .await
        }
        Commands::Sequence { kinds, args } => {
            let overrides = PlayOverrides::from(args);
            let text = overrides.text.clone().unwrap_or_else(|| DEFAULT_TEXT.to_string());
            let app = App::new(config, text);
            let mut presenter = app.presenter();

            let kinds: Vec<AnimationType> = kinds.into_iter().map(AnimationType::from).collect();
            match app.sequence(&kinds, &overrides, &mut presenter).await? {
                SequenceOutcome::Completed => info!(steps = kinds.len(), "序列播放完成"),
                SequenceOutcome::Interrupted { completed } => {
                    info!(completed, steps = kinds.len(), "序列已停止")
                }
            }
            Ok(())
        }
    }
}
