pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use app::batch::load_batch;
pub use app::estimators::{CmleEstimator, Inference, LocalEstimator, LocalModel};
pub use config::{toml_config::TomlConfig, CmleSettings, LocalSettings, Settings};
pub use core::runner::{RunReport, SmokeRunner};
pub use domain::model::{sample_batch, InferenceType, Instance, PredictionOutput};
pub use domain::ports::Estimator;
pub use utils::error::{Result, SmokeError};
