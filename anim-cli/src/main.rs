//! # Anim CLI
//!
//! 动画时间线命令行驱动 - 无窗口播放时间线，演示取消策略与快照恢复。
//!
//! ## 用法
//!
//! ```bash
//! # 在项目根目录使用 cargo 运行
//! cargo run -p anim-cli -- run intro.json
//! cargo run -p anim-cli -- run intro.json --fps 30 --until 2.5 --speed 0.5
//! cargo run -p anim-cli -- resume intro.json --at 1.2 --snapshot saved.json
//! cargo run -p anim-cli -- cancel intro.json --at 1.0 --policy animate-to-complete
//!
//! # 或安装后直接使用
//! cargo install --path anim-cli
//! anim run intro.json --config config.json --log-level debug
//! ```

mod config;
mod runner;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anim_runtime::CancelPolicy;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use config::{AppConfig, Overrides};
use runner::{format_event, format_frame, format_value, format_values};

#[derive(Parser)]
#[command(name = "anim")]
#[command(about = "动画时间线命令行驱动 - 播放、取消与快照恢复")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct CommonArgs {
    /// 配置文件（默认：config.json，不存在时使用默认配置）
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// 采样帧率（覆盖配置文件）
    #[arg(long, global = true)]
    fps: Option<u32>,

    /// 倍速（覆盖配置文件）
    #[arg(long, global = true)]
    speed: Option<f32>,

    /// 日志级别（覆盖配置文件）
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 播放全部时间线并逐帧输出属性
    Run {
        /// 时间线文件
        timeline: PathBuf,

        /// 在该时间（秒）停止
        #[arg(long)]
        until: Option<f32>,
    },

    /// 中途拍快照，恢复到新的管理器后与原运行逐帧比较
    Resume {
        /// 时间线文件
        timeline: PathBuf,

        /// 拍快照的时间（秒）
        #[arg(long)]
        at: f32,

        /// 快照输出文件
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// 中途对全部动画应用取消策略
    Cancel {
        /// 时间线文件
        timeline: PathBuf,

        /// 取消的时间（秒）
        #[arg(long)]
        at: f32,

        /// 取消策略
        #[arg(long, value_enum, default_value = "cancel")]
        policy: PolicyArg,
    },
}

/// 命令行中的取消策略
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Cancel,
    Complete,
    Freeze,
    AnimateToComplete,
}

impl From<PolicyArg> for CancelPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Cancel => CancelPolicy::Cancel,
            PolicyArg::Complete => CancelPolicy::Complete,
            PolicyArg::Freeze => CancelPolicy::Freeze,
            PolicyArg::AnimateToComplete => CancelPolicy::AnimateToComplete,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // 日志级别可能来自配置文件，所以先读配置再初始化日志
    let loaded = AppConfig::read(&cli.common.config);
    let overrides = Overrides {
        fps: cli.common.fps,
        speed: cli.common.speed,
        log_level: cli.common.log_level.clone(),
    };
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => AppConfig::default(),
    }
    .with_overrides(&overrides);

    tracing_subscriber::fmt()
        .with_max_level(config.level())
        .with_writer(std::io::stderr)
        .init();

    match &loaded {
        Ok(_) => info!(path = %cli.common.config.display(), "已加载配置文件"),
        Err(e) => {
            let reason = format!("{e:#}");
            warn!(error = %reason, "使用默认配置");
        }
    }

    match execute(cli.command, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// 执行子命令，返回结果是否符合预期
fn execute(command: Commands, config: &AppConfig) -> Result<bool> {
    config.validate()?;

    match command {
        Commands::Run { timeline, until } => {
            let file = runner::load_timelines(&timeline)?;
            let report = runner::run(&file, config, until)?;
            for frame in &report.frames {
                println!("{}", format_frame(frame, &report.animated));
            }
            if report.finished {
                println!("✅ 全部动画结束");
            } else {
                println!("⏹ 到达停止时间，仍有动画在播放");
            }
            Ok(true)
        }
        Commands::Resume {
            timeline,
            at,
            snapshot,
        } => {
            let file = runner::load_timelines(&timeline)?;
            let report = runner::resume(&file, config, at)?;
            println!(
                "📸 t={:.3} 拍摄快照，{} 个动画",
                report.at,
                report.saved.manager.animations.len()
            );
            if let Some(path) = snapshot {
                fs::write(&path, report.saved.to_json()?)
                    .with_context(|| format!("写入快照失败: {}", path.display()))?;
                println!("   快照已写入: {}", path.display());
            }

            match report.divergence {
                None => {
                    println!("✅ 恢复后 {} 帧与原运行一致", report.compared);
                    Ok(true)
                }
                Some(d) => {
                    println!(
                        "❌ t={:.3} {} 不一致: 期望 {}，实际 {}",
                        d.time,
                        d.property,
                        format_value(&d.expected),
                        format_value(&d.actual)
                    );
                    Ok(false)
                }
            }
        }
        Commands::Cancel {
            timeline,
            at,
            policy,
        } => {
            let file = runner::load_timelines(&timeline)?;
            let report = runner::cancel(&file, config, at, policy.into())?;

            println!("⏹ t={:.3} 应用取消策略 {}", report.at, report.policy);
            println!("   取消前: {}", format_values(&report.before, &report.animated));
            println!("   取消后: {}", format_values(&report.after, &report.animated));
            for event in &report.events {
                println!("   事件: {}", format_event(event));
            }
            for frame in &report.frames {
                println!("{}", format_frame(frame, &report.animated));
            }
            match report.settled_at {
                Some(time) => println!("✅ t={time:.3} 全部动画结束"),
                None => println!("⏹ 到达最长运行时间，仍有动画在播放"),
            }
            Ok(true)
        }
    }
}
