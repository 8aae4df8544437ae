use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod optimizer_config;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_tracing;
pub use optimizer_config::{
    AnalysisConfig, BaseConfig, Filters, OptimizerConfig, ParameterRange, ParameterSpace, Weights,
};
pub use settings::{
    Backtest, BollingerParams, Config, Dca, HybridSmartParams, Logging, MacdParams, MultiSignalParams,
    ProximityBollingerParams, RsiParams, Simulation, Strategies,
};

/// Prefix for environment overrides, e.g. `TRANCHE__DCA__MAX_LOTS=8`.
pub const ENV_PREFIX: &str = "TRANCHE";

/// Loads and validates the application configuration.
///
/// Values come from the TOML file at `path`, then from `TRANCHE__*`
/// environment variables. Sections missing from both fall back to defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Loads a grid-optimisation job description from a TOML file.
pub fn load_optimizer_config(path: &Path) -> Result<OptimizerConfig, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .build()?;

    let optimizer_config = builder.try_deserialize::<OptimizerConfig>()?;
    optimizer_config.validate()?;
    Ok(optimizer_config)
}
