use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use std::fs;

use tickpath::{
    build_svg_path, choose_time_format, compress_svg, float_to_string_with_spec,
    path::points_from_json, produce_ticks, AxisLabels, LabelRole, LinearScale, LogScale,
    TickMode, TickScale,
};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// 日志级别
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// 按格式串输出数值，如 6.4g
    Format {
        #[arg(allow_negative_numbers = true)]
        value: f64,

        #[arg(long, default_value = tickpath::format::DEFAULT_FORMAT)]
        spec: String,

        /// 同时输出实际使用的格式
        #[arg(long)]
        show_spec: bool,
    },

    /// 计算坐标轴刻度及标签
    Ticks {
        #[arg(long, allow_negative_numbers = true)]
        min: f64,

        #[arg(long, allow_negative_numbers = true)]
        max: f64,

        #[arg(long, default_value = "10")]
        ndiv: usize,

        /// 次级分度数
        #[arg(long)]
        ndiv2: Option<usize>,

        /// 对数坐标的底数
        #[arg(long)]
        log: Option<f64>,

        /// 等分整个区间
        #[arg(long)]
        exact: bool,

        /// 标签配置 JSON 文件
        #[arg(long)]
        labels: Option<String>,
    },

    /// 由点集 JSON 生成 SVG path
    Path {
        /// 输入点集 JSON 文件
        #[arg(short, long)]
        input: String,

        /// 曲线类型，如 bezier、calc、Lbezier
        #[arg(long, default_value = "")]
        kind: String,

        /// 填充基线高度
        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        ndig: Option<usize>,
    },

    /// 压缩 SVG
    Compress {
        /// 输入 SVG 文件
        #[arg(short, long)]
        input: String,

        /// 输出文件
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 按时间跨度（秒）选择时间格式
    TimeFormat {
        width: f64,

        #[arg(long)]
        ticks: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(cli.log_level.into())
        .format_module_path(false)
        .init();

    match cli.command {
        Cmd::Format {
            value,
            spec,
            show_spec,
        } => {
            let res = float_to_string_with_spec(value, &spec);
            if show_spec {
                println!("{}\t{}", res.text, res.spec);
            } else {
                println!("{}", res.text);
            }
        }
        Cmd::Ticks {
            min,
            max,
            ndiv,
            ndiv2,
            log,
            exact,
            labels,
        } => ticks_pipeline(min, max, ndiv, ndiv2, log, exact, labels.as_deref())?,
        Cmd::Path {
            input,
            kind,
            height,
            ndig,
        } => {
            let text = fs::read_to_string(&input).with_context(|| format!("read {}", input))?;
            let points = points_from_json(&text).with_context(|| format!("parse points in {}", input))?;
            info!("{} points from {}", points.len(), input);
            let res = build_svg_path(&kind, &points, height, ndig)?;
            println!("{}", res.path);
            if !res.close.is_empty() {
                println!("{}", res.close);
            }
        }
        Cmd::Compress { input, output } => {
            let svg = fs::read_to_string(&input).with_context(|| format!("read {}", input))?;
            let compressed = compress_svg(&svg)?;
            if let Some(output) = &output {
                fs::write(output, &compressed)?;
                println!("输出: {}", output);
            } else {
                println!("{}", compressed);
            }
        }
        Cmd::TimeFormat { width, ticks } => {
            if !width.is_finite() || width < 0.0 {
                bail!("时间跨度必须为非负数: {}", width);
            }
            println!("{}", choose_time_format(width, ticks));
        }
    }

    Ok(())
}

fn ticks_pipeline(
    min: f64,
    max: f64,
    ndiv: usize,
    ndiv2: Option<usize>,
    log_base: Option<f64>,
    exact: bool,
    labels_file: Option<&str>,
) -> Result<()> {
    if !(min.is_finite() && max.is_finite()) {
        bail!("坐标范围无效: {} .. {}", min, max);
    }

    let mut labels: AxisLabels = match labels_file {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("read {}", path))?;
            serde_json::from_str(&text).with_context(|| format!("parse labels in {}", path))?
        }
        None => AxisLabels::default(),
    };

    let scale: Box<dyn TickScale> = match log_base {
        Some(base) => {
            if min * max <= 0.0 {
                bail!("对数坐标范围不能跨越 0: {} .. {}", min, max);
            }
            if !(base > 0.0 && base != 1.0) {
                bail!("对数底数无效: {}", base);
            }
            labels.log_base = base;
            Box::new(LogScale::new((min, max), (0.0, 1.0), base))
        }
        None => Box::new(LinearScale::new((min, max), (0.0, 1.0))),
    };
    let mode = if exact { TickMode::Exact } else { TickMode::Nice };

    let ticks = produce_ticks(scale.as_ref(), ndiv, ndiv2, mode);
    debug!("{} ticks for {} .. {}", ticks.len(), min, max);

    for tick in ticks {
        let label = if log_base.is_some() {
            labels.format_log(tick, LabelRole::Tick, None).unwrap_or_default()
        } else {
            labels.format_normal(tick, LabelRole::Tick, None)
        };
        println!("{}\t{}", tickpath::number::to_js_string(tick), label);
    }
    Ok(())
}
