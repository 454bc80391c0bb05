pub mod cmle;
pub mod local;

use crate::config::Settings;
use crate::core::{Estimator, InferenceType, Instance, PredictionOutput};
use crate::utils::error::Result;
use async_trait::async_trait;

pub use cmle::CmleEstimator;
pub use local::{LocalEstimator, LocalModel};

/// 依 `InferenceType` 選出的預測函式
pub enum Inference {
    Local(LocalEstimator),
    Cmle(CmleEstimator),
}

impl Inference {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        match settings.inference_type {
            InferenceType::Local => {
                let model = match &settings.local.model_path {
                    Some(path) => {
                        tracing::info!("📦 Loading local model from {}", path);
                        LocalModel::from_file(path)?
                    }
                    None => {
                        tracing::debug!("Using built-in local model");
                        LocalModel::default()
                    }
                };
                Ok(Inference::Local(LocalEstimator::new(model)))
            }
            InferenceType::Cmle => {
                let estimator = CmleEstimator::new(&settings.cmle)?;
                tracing::info!("☁️ Remote prediction endpoint: {}", estimator.predict_url());
                Ok(Inference::Cmle(estimator))
            }
        }
    }
}

#[async_trait]
impl Estimator for Inference {
    async fn estimate(&self, batch: &[Instance]) -> Result<PredictionOutput> {
        match self {
            Inference::Local(estimator) => estimator.estimate(batch).await,
            Inference::Cmle(estimator) => estimator.estimate(batch).await,
        }
    }

    fn inference_type(&self) -> InferenceType {
        match self {
            Inference::Local(_) => InferenceType::Local,
            Inference::Cmle(_) => InferenceType::Cmle,
        }
    }
}
