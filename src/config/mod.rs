#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::app::batch::INSTANCE_FILE_EXTENSIONS;
use crate::core::InferenceType;
use crate::core::runner::DEFAULT_ITERATIONS;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_non_empty_string, validate_positive_number, validate_range,
    validate_required_field, validate_url, Validate,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CMLE_ENDPOINT: &str = "https://ml.googleapis.com";
pub const DEFAULT_MODEL_NAME: &str = "babyweight_estimator";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// 解析後的執行設定：預設值 < TOML 檔 < CLI 參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub inference_type: InferenceType,
    pub iterations: usize,
    pub instances: Option<String>,
    pub local: LocalSettings,
    pub cmle: CmleSettings,
    pub verbose: bool,
    pub monitor: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalSettings {
    pub model_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmleSettings {
    pub endpoint: String,
    pub project: Option<String>,
    pub model: String,
    pub version: Option<String>,
    pub access_token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for CmleSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CMLE_ENDPOINT.to_string(),
            project: None,
            model: DEFAULT_MODEL_NAME.to_string(),
            version: None,
            access_token: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inference_type: InferenceType::default(),
            iterations: DEFAULT_ITERATIONS,
            instances: None,
            local: LocalSettings::default(),
            cmle: CmleSettings::default(),
            verbose: false,
            monitor: false,
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_positive_number("iterations", self.iterations, 1)?;

        if let Some(instances) = &self.instances {
            validate_file_extension("instances", instances, INSTANCE_FILE_EXTENSIONS)?;
        }

        if let Some(model_path) = &self.local.model_path {
            validate_file_extension("local.model_path", model_path, &["json"])?;
        }

        // 只有遠端模式才需要服務位置
        if self.inference_type == InferenceType::Cmle {
            validate_url("cmle.endpoint", &self.cmle.endpoint)?;
            let project = validate_required_field("cmle.project", &self.cmle.project)?;
            validate_non_empty_string("cmle.project", project)?;
            validate_non_empty_string("cmle.model", &self.cmle.model)?;
            validate_range("cmle.timeout_seconds", self.cmle.timeout_seconds, 1, 600)?;
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
