use crate::config::CmleSettings;
use crate::core::{Estimator, InferenceType, Instance, PredictionOutput};
use crate::utils::error::{Result, SmokeError};
use crate::utils::validation::validate_required_field;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: &'a [Instance],
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// 呼叫託管 ML 服務線上預測 API 的預測函式
pub struct CmleEstimator {
    client: Client,
    predict_url: String,
    access_token: Option<String>,
}

impl CmleEstimator {
    pub fn new(settings: &CmleSettings) -> Result<Self> {
        let project = validate_required_field("cmle.project", &settings.project)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            predict_url: predict_url(
                &settings.endpoint,
                project,
                &settings.model,
                settings.version.as_deref(),
            ),
            access_token: settings.access_token.clone(),
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    pub async fn estimate_cmle(&self, batch: &[Instance]) -> Result<PredictionOutput> {
        tracing::debug!("📡 POST {} ({} instances)", self.predict_url, batch.len());

        let mut request = self
            .client
            .post(&self.predict_url)
            .json(&PredictRequest { instances: batch });

        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("📡 Prediction response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SmokeError::PredictionError {
                message: format!("HTTP {}: {}", status, body.trim()),
            });
        }

        let body: PredictResponse = response.json().await?;
        if let Some(error) = body.error {
            let message = match error {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(SmokeError::PredictionError { message });
        }

        let predictions = body.predictions.ok_or_else(|| SmokeError::PredictionError {
            message: "Response contains no 'predictions' field".to_string(),
        })?;

        Ok(PredictionOutput::new(predictions))
    }
}

#[async_trait]
impl Estimator for CmleEstimator {
    async fn estimate(&self, batch: &[Instance]) -> Result<PredictionOutput> {
        self.estimate_cmle(batch).await
    }

    fn inference_type(&self) -> InferenceType {
        InferenceType::Cmle
    }
}

/// 組出 `{endpoint}/v1/projects/{project}/models/{model}[/versions/{version}]:predict`
pub fn predict_url(endpoint: &str, project: &str, model: &str, version: Option<&str>) -> String {
    let base = endpoint.trim_end_matches('/');
    match version.filter(|v| !v.trim().is_empty()) {
        Some(version) => format!(
            "{}/v1/projects/{}/models/{}/versions/{}:predict",
            base, project, model, version
        ),
        None => format!("{}/v1/projects/{}/models/{}:predict", base, project, model),
    }
}
