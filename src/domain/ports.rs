use crate::domain::model::{InferenceType, Instance, PredictionOutput};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 預測函式：接收完整批次，回傳可列印的預測結果
#[async_trait]
pub trait Estimator: Send + Sync {
    async fn estimate(&self, batch: &[Instance]) -> Result<PredictionOutput>;

    fn inference_type(&self) -> InferenceType;
}
