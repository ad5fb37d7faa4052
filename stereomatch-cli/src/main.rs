use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use stereomatch::io::{load_gray_image, save_disparity_image_with_bound};
use stereomatch::{
    left_right_check, BlockMatchConfig, BlockMatcher, DisparityMap, DisparityMapBuilder,
    DisparityStats, Metric, ScanlineConfig,
};
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Stereo disparity CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
enum MethodConfig {
    Block,
    #[default]
    Scanline,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MetricConfig {
    Sad,
    Ssd,
}

impl From<MetricConfig> for Metric {
    fn from(value: MetricConfig) -> Self {
        match value {
            MetricConfig::Sad => Metric::Sad,
            MetricConfig::Ssd => Metric::Ssd,
        }
    }
}

/// Block-matching section. The metric has no default and must be given.
#[derive(Debug, Deserialize)]
struct BlockConfigJson {
    metric: MetricConfig,
    #[serde(default = "default_max_disparity")]
    max_disparity: usize,
    #[serde(default = "default_window_size")]
    window_size: usize,
    #[serde(default = "default_parallel")]
    parallel: bool,
}

fn default_max_disparity() -> usize {
    BlockMatchConfig::new(Metric::Sad).max_disparity
}

fn default_window_size() -> usize {
    BlockMatchConfig::new(Metric::Sad).window_size
}

fn default_parallel() -> bool {
    true
}

impl From<&BlockConfigJson> for BlockMatchConfig {
    fn from(value: &BlockConfigJson) -> Self {
        Self {
            max_disparity: value.max_disparity,
            window_size: value.window_size,
            metric: value.metric.into(),
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ScanlineConfigJson {
    sigma: f64,
    occlusion_cost: f64,
    parallel: bool,
}

impl Default for ScanlineConfigJson {
    fn default() -> Self {
        let cfg = ScanlineConfig::default();
        Self {
            sigma: cfg.sigma,
            occlusion_cost: cfg.occlusion_cost,
            parallel: true,
        }
    }
}

impl From<&ScanlineConfigJson> for ScanlineConfig {
    fn from(value: &ScanlineConfigJson) -> Self {
        Self {
            sigma: value.sigma,
            occlusion_cost: value.occlusion_cost,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    left_path: String,
    right_path: String,
    method: MethodConfig,
    block: Option<BlockConfigJson>,
    scanline: ScanlineConfigJson,
    /// Left/right consistency tolerance; scanline method only.
    cross_check_tolerance: Option<u32>,
    disparity_path: Option<String>,
    right_disparity_path: Option<String>,
    /// Disparity drawn as white in saved images. Defaults to the configured
    /// search range for block matching and the observed maximum for scanline.
    display_max_disparity: Option<u32>,
    summary_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatsRecord {
    width: usize,
    height: usize,
    max_disparity: u32,
    valid: usize,
    min: Option<u32>,
    max: Option<u32>,
    mean: Option<f64>,
}

impl From<&DisparityMap> for StatsRecord {
    fn from(map: &DisparityMap) -> Self {
        let stats: Option<DisparityStats> = map.stats();
        Self {
            width: map.width(),
            height: map.height(),
            max_disparity: map.max_disparity(),
            valid: stats.map_or(0, |s| s.valid),
            min: stats.map(|s| s.min),
            max: stats.map(|s| s.max),
            mean: stats.map(|s| s.mean),
        }
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    method: MethodConfig,
    left: StatsRecord,
    right: Option<StatsRecord>,
    checked: Option<StatsRecord>,
}

/// Scanline maps are bounded by the image width, far above typical
/// disparities, so images are stretched to the largest value present.
fn display_bound(map: &DisparityMap, configured: Option<u32>) -> u32 {
    configured.unwrap_or_else(|| map.stats().map_or(0, |s| s.max))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("stereomatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.left_path.is_empty() || config.right_path.is_empty() {
        return Err("left_path and right_path must be set in the config".into());
    }

    let left = load_gray_image(&config.left_path)?;
    let right = load_gray_image(&config.right_path)?;

    tracing::info!(
        width = left.width(),
        height = left.height(),
        method = ?config.method,
        "loaded image pair"
    );

    let summary = match config.method {
        MethodConfig::Block => {
            let Some(block) = config.block.as_ref() else {
                return Err("method \"block\" requires a block section with a metric".into());
            };
            if config.cross_check_tolerance.is_some() {
                return Err("cross_check_tolerance is only supported by the scanline method".into());
            }
            let map = BlockMatcher::new(block.into()).compute(left.view(), right.view())?;
            if let Some(path) = &config.disparity_path {
                let bound = config
                    .display_max_disparity
                    .unwrap_or(map.max_disparity());
                save_disparity_image_with_bound(&map, bound, path)?;
            }
            Summary {
                method: config.method,
                left: StatsRecord::from(&map),
                right: None,
                checked: None,
            }
        }
        MethodConfig::Scanline => {
            let maps = DisparityMapBuilder::new((&config.scanline).into())
                .build(left.view(), right.view())?;
            let checked = config
                .cross_check_tolerance
                .map(|tolerance| left_right_check(&maps.left, &maps.right, tolerance))
                .transpose()?;

            if let Some(path) = &config.disparity_path {
                let map = checked.as_ref().unwrap_or(&maps.left);
                let bound = display_bound(map, config.display_max_disparity);
                save_disparity_image_with_bound(map, bound, path)?;
            }
            if let Some(path) = &config.right_disparity_path {
                let bound = display_bound(&maps.right, config.display_max_disparity);
                save_disparity_image_with_bound(&maps.right, bound, path)?;
            }
            Summary {
                method: config.method,
                left: StatsRecord::from(&maps.left),
                right: Some(StatsRecord::from(&maps.right)),
                checked: checked.as_ref().map(StatsRecord::from),
            }
        }
    };

    let json = serde_json::to_string_pretty(&summary)?;
    match config.summary_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
