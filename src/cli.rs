use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "lantern")]
#[command(about = "Progressive CPU path tracer for sphere scenes")]
pub struct Args {
    /// Viewport width in pixels
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 360)]
    pub height: u32,

    /// Number of frames to render (and accumulate)
    #[arg(short, long, default_value_t = 32)]
    pub frames: u32,

    /// Scene description in JSON; the built-in sample scene is used when omitted
    #[arg(short, long)]
    pub scene: Option<PathBuf>,

    /// Render every frame independently instead of accumulating
    #[arg(long)]
    pub no_accumulate: bool,

    /// PNG file the last frame is written to
    #[arg(short, long, default_value = "lantern.png")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}
