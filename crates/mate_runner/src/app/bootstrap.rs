use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use mate_engine::{
    load_catalog, Catalog, CatalogError, SystemHost, Universe, UniverseConfig, Viewport,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub(crate) const CATALOG_ENV_VAR: &str = "MATE_CATALOG";
pub(crate) const SEED_ENV_VAR: &str = "MATE_SEED";
pub(crate) const VIEWPORT_ENV_VAR: &str = "MATE_VIEWPORT";
pub(crate) const TICKS_ENV_VAR: &str = "MATE_TICKS";
pub(crate) const TICK_MS_ENV_VAR: &str = "MATE_TICK_MS";
pub(crate) const SPEED_ENV_VAR: &str = "MATE_SPEED";

#[derive(Debug, Error)]
pub(crate) enum RunnerError {
    #[error("invalid {origin} value '{value}' (expected {expected})")]
    InvalidValue {
        origin: String,
        value: String,
        expected: &'static str,
    },
    #[error("missing value for {flag}")]
    MissingValue { flag: String },
    #[error("unknown argument '{arg}'")]
    UnknownArgument { arg: String },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("failed to write snapshot output: {0}")]
    Output(#[source] std::io::Error),
    #[error("failed to encode snapshot line: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunnerConfig {
    pub(crate) catalog_path: Option<PathBuf>,
    pub(crate) seed: Option<u64>,
    pub(crate) viewport_width: f64,
    pub(crate) viewport_height: f64,
    pub(crate) ticks: u64,
    pub(crate) tick_ms: u64,
    pub(crate) universe: UniverseConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        let viewport = Viewport::default();
        Self {
            catalog_path: None,
            seed: None,
            viewport_width: viewport.width,
            viewport_height: viewport.height,
            ticks: 250,
            tick_ms: 40,
            universe: UniverseConfig::default(),
        }
    }
}

pub(crate) enum Invocation {
    Run(RunnerConfig),
    Help,
}

impl RunnerConfig {
    /// Defaults, then `MATE_*` environment variables, then `--flag value`
    /// arguments, each layer overriding the last.
    pub(crate) fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        args: &[String],
    ) -> Result<Invocation, RunnerError> {
        let mut config = Self::default();
        for key in [
            CATALOG_ENV_VAR,
            SEED_ENV_VAR,
            VIEWPORT_ENV_VAR,
            TICKS_ENV_VAR,
            TICK_MS_ENV_VAR,
            SPEED_ENV_VAR,
        ] {
            if let Some(value) = lookup(key) {
                config.apply(key, key, &value)?;
            }
        }

        let mut index = 0usize;
        while index < args.len() {
            let flag = args[index].as_str();
            if flag == "-h" || flag == "--help" {
                return Ok(Invocation::Help);
            }
            let key = match flag {
                "--catalog" => CATALOG_ENV_VAR,
                "--seed" => SEED_ENV_VAR,
                "--viewport" => VIEWPORT_ENV_VAR,
                "--ticks" => TICKS_ENV_VAR,
                "--tick-ms" => TICK_MS_ENV_VAR,
                "--speed" => SPEED_ENV_VAR,
                other => {
                    return Err(RunnerError::UnknownArgument {
                        arg: other.to_string(),
                    })
                }
            };
            let value = args.get(index + 1).ok_or_else(|| RunnerError::MissingValue {
                flag: flag.to_string(),
            })?;
            config.apply(key, flag, value)?;
            index += 2;
        }
        Ok(Invocation::Run(config))
    }

    fn apply(&mut self, key: &str, origin: &str, value: &str) -> Result<(), RunnerError> {
        let invalid = |expected: &'static str| RunnerError::InvalidValue {
            origin: origin.to_string(),
            value: value.to_string(),
            expected,
        };
        let value = value.trim();
        match key {
            CATALOG_ENV_VAR => {
                self.catalog_path = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            SEED_ENV_VAR => {
                self.seed = Some(value.parse::<u64>().map_err(|_| invalid("u64"))?);
            }
            VIEWPORT_ENV_VAR => {
                let (width, height) =
                    parse_viewport(value).ok_or_else(|| invalid("WIDTHxHEIGHT"))?;
                self.viewport_width = width;
                self.viewport_height = height;
            }
            TICKS_ENV_VAR => {
                self.ticks = value.parse::<u64>().map_err(|_| invalid("u64"))?;
            }
            TICK_MS_ENV_VAR => {
                self.tick_ms = value
                    .parse::<u64>()
                    .ok()
                    .filter(|ms| *ms > 0)
                    .ok_or_else(|| invalid("positive u64"))?;
            }
            SPEED_ENV_VAR => {
                self.universe.speed_multiplier = value
                    .parse::<f64>()
                    .ok()
                    .filter(|speed| speed.is_finite() && *speed > 0.0)
                    .ok_or_else(|| invalid("positive number"))?;
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn viewport(&self) -> Viewport {
        Viewport::new(
            self.viewport_width,
            self.viewport_height,
            self.universe.tile_size,
        )
    }
}

fn parse_viewport(raw: &str) -> Option<(f64, f64)> {
    let (width, height) = raw.split_once(['x', 'X'])?;
    let width = width.trim().parse::<u32>().ok()?;
    let height = height.trim().parse::<u32>().ok()?;
    (width > 0 && height > 0).then_some((f64::from(width), f64::from(height)))
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

pub(crate) fn config_from_env(args: &[String]) -> Result<Invocation, RunnerError> {
    RunnerConfig::resolve(|key| env::var(key).ok(), args)
}

pub(crate) fn build_universe(config: &RunnerConfig) -> Result<Universe<SystemHost>, RunnerError> {
    let catalog = match &config.catalog_path {
        Some(path) => load_catalog(path)?,
        None => Catalog::builtin()?,
    };
    catalog.validate()?;

    let viewport = config.viewport();
    let host = match config.seed {
        Some(seed) => SystemHost::with_seed(seed, viewport),
        None => SystemHost::new(viewport),
    };
    info!(
        animation_count = catalog.len(),
        width = viewport.width,
        height = viewport.height,
        seed = config.seed,
        "runner_configured"
    );
    Ok(Universe::new(Arc::new(catalog), host, config.universe))
}

pub(crate) fn usage_text() -> String {
    [
        "mate_runner - headless screen-mate simulation",
        "",
        "Usage:",
        "  mate_runner [--catalog <path>] [--seed <u64>] [--viewport <WxH>] [--ticks <u64>] [--tick-ms <u64>] [--speed <f64>]",
        "",
        "Environment:",
        "  MATE_CATALOG, MATE_SEED, MATE_VIEWPORT, MATE_TICKS, MATE_TICK_MS, MATE_SPEED",
        "",
        "Defaults:",
        "  built-in sheep catalog, entropy seed, --viewport 1280x720, --ticks 250, --tick-ms 40, --speed 1",
    ]
    .join("\n")
}
