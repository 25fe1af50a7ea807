//! Configuration for the density estimator

use dedsta_stats::{Bandwidth, Kernel, Kpss, KpssRegression, LagSelection};
use serde::{Deserialize, Serialize};

use crate::adaptation::ModuleKind;
use crate::collaborators::StationarityTest;
use crate::error::{DedstaError, DedstaResult};
use crate::nonstationarity::DEFAULT_WINDOW_SIZE;
use crate::reservoir::validate_bounds;

/// Prefix for environment overrides, e.g. `DEDSTA_RESERVOIR__MAX_SIZE=200`.
pub const ENV_PREFIX: &str = "DEDSTA";

/// Main estimator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DedstaConfig {
    /// Reservoir bounds
    #[serde(default)]
    pub reservoir: ReservoirConfig,

    /// Nonstationarity estimation
    #[serde(default)]
    pub nonstationarity: NonstationarityConfig,

    /// Density fitting
    #[serde(default)]
    pub density: DensityConfig,

    /// Adaptation modules, applied in order
    // config merges list layers element-wise; keep the default list out of
    // the base layer so a shorter file list replaces it
    #[serde(default = "default_modules", skip_serializing_if = "is_default_pipeline")]
    pub modules: Vec<ModuleKind>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DedstaConfig {
    fn default() -> Self {
        Self {
            reservoir: ReservoirConfig::default(),
            nonstationarity: NonstationarityConfig::default(),
            density: DensityConfig::default(),
            modules: default_modules(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Reservoir configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservoirConfig {
    /// Floor for reduction
    #[serde(default = "default_min_size")]
    pub min_size: usize,

    /// Capacity
    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

impl Default for ReservoirConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            max_size: default_max_size(),
        }
    }
}

/// Nonstationarity estimator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonstationarityConfig {
    /// Observations kept for the stationarity test
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Deterministic component removed before the KPSS test
    #[serde(default)]
    pub regression: KpssRegression,

    /// KPSS lag truncation
    #[serde(default)]
    pub lags: LagSelection,
}

impl Default for NonstationarityConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            regression: KpssRegression::default(),
            lags: LagSelection::default(),
        }
    }
}

impl NonstationarityConfig {
    /// The configured KPSS test.
    pub fn kpss(&self) -> Kpss {
        Kpss::new(self.regression, self.lags)
    }
}

/// Density fitting configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DensityConfig {
    /// Kernel name, e.g. `gaussian` or `epa`
    #[serde(default)]
    pub kernel: Kernel,

    /// Bandwidth rule
    #[serde(default)]
    pub bandwidth: Bandwidth,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `tracing` filter directive
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value helpers
fn default_min_size() -> usize {
    50
}

fn default_max_size() -> usize {
    500
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_modules() -> Vec<ModuleKind> {
    ModuleKind::DEFAULT_PIPELINE.to_vec()
}

fn is_default_pipeline(modules: &[ModuleKind]) -> bool {
    modules == ModuleKind::DEFAULT_PIPELINE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DedstaConfig {
    /// Load configuration, layering defaults, an optional file and
    /// `DEDSTA_`-prefixed environment variables. Nested keys are separated
    /// by a double underscore.
    pub fn load(path: Option<&str>) -> DedstaResult<Self> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DedstaConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: DedstaConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> DedstaResult<()> {
        validate_bounds(self.reservoir.min_size, self.reservoir.max_size)?;

        let kpss = self.nonstationarity.kpss();
        let required = kpss.min_observations();
        if self.nonstationarity.window_size < required {
            return Err(DedstaError::InvalidConfig(format!(
                "nonstationarity window_size {} is below the KPSS minimum of {}",
                self.nonstationarity.window_size, required
            )));
        }

        self.density.bandwidth.validate()?;
        Ok(())
    }
}
