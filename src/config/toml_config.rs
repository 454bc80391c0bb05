use crate::config::Settings;
use crate::core::InferenceType;
use crate::utils::error::{Result, SmokeError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 冒煙測試的 TOML 設定檔，所有區段皆為選填
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub inference: Option<InferenceSection>,
    pub local: Option<LocalSection>,
    pub cmle: Option<CmleSection>,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceSection {
    pub r#type: Option<String>,
    pub iterations: Option<usize>,
    pub instances: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalSection {
    pub model_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CmleSection {
    pub endpoint: Option<String>,
    pub project: Option<String>,
    pub model: Option<String>,
    pub version: Option<String>,
    pub access_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: Option<bool>,
    pub verbose: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SmokeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GCP_ACCESS_TOKEN})，找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SmokeError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 把檔案中有設定的欄位覆蓋到 `settings`
    pub fn apply_to(&self, settings: &mut Settings) -> Result<()> {
        if let Some(inference) = &self.inference {
            if let Some(kind) = &inference.r#type {
                settings.inference_type = kind.parse::<InferenceType>()?;
            }
            if let Some(iterations) = inference.iterations {
                settings.iterations = iterations;
            }
            if inference.instances.is_some() {
                settings.instances = inference.instances.clone();
            }
        }

        if let Some(local) = &self.local {
            if local.model_path.is_some() {
                settings.local.model_path = local.model_path.clone();
            }
        }

        if let Some(cmle) = &self.cmle {
            if let Some(endpoint) = &cmle.endpoint {
                settings.cmle.endpoint = endpoint.clone();
            }
            if let Some(project) = resolved(&cmle.project) {
                settings.cmle.project = Some(project);
            }
            if let Some(model) = &cmle.model {
                settings.cmle.model = model.clone();
            }
            if let Some(version) = resolved(&cmle.version) {
                settings.cmle.version = Some(version);
            }
            if let Some(token) = resolved(&cmle.access_token) {
                settings.cmle.access_token = Some(token);
            }
            if let Some(timeout) = cmle.timeout_seconds {
                settings.cmle.timeout_seconds = timeout;
            }
        }

        if let Some(monitoring) = &self.monitoring {
            if let Some(enabled) = monitoring.enabled {
                settings.monitor = enabled;
            }
            if let Some(verbose) = monitoring.verbose {
                settings.verbose = verbose;
            }
        }

        Ok(())
    }

    pub fn to_settings(&self) -> Result<Settings> {
        let mut settings = Settings::default();
        self.apply_to(&mut settings)?;
        Ok(settings)
    }
}

/// 仍含未解析 `${VAR}` 的值視為未設定
fn resolved(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.contains("${")).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[inference]
type = "cmle"
iterations = 3
instances = "batch.json"

[cmle]
endpoint = "https://ml.example.com"
project = "my-project"
model = "babyweight"
version = "v2"
timeout_seconds = 10

[monitoring]
enabled = true
"#;

        let settings = TomlConfig::from_toml_str(toml_content)
            .unwrap()
            .to_settings()
            .unwrap();

        assert_eq!(settings.inference_type, InferenceType::Cmle);
        assert_eq!(settings.iterations, 3);
        assert_eq!(settings.instances.as_deref(), Some("batch.json"));
        assert_eq!(settings.cmle.endpoint, "https://ml.example.com");
        assert_eq!(settings.cmle.project.as_deref(), Some("my-project"));
        assert_eq!(settings.cmle.model, "babyweight");
        assert_eq!(settings.cmle.version.as_deref(), Some("v2"));
        assert_eq!(settings.cmle.timeout_seconds, 10);
        assert!(settings.monitor);
        assert!(!settings.verbose);
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let settings = TomlConfig::from_toml_str("").unwrap().to_settings().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SMOKE_TEST_GCP_PROJECT", "env-project");

        let toml_content = r#"
[cmle]
project = "${SMOKE_TEST_GCP_PROJECT}"
access_token = "${SMOKE_TEST_TOKEN_THAT_IS_NOT_SET}"
"#;

        let settings = TomlConfig::from_toml_str(toml_content)
            .unwrap()
            .to_settings()
            .unwrap();
        assert_eq!(settings.cmle.project.as_deref(), Some("env-project"));
        assert_eq!(settings.cmle.access_token, None);

        std::env::remove_var("SMOKE_TEST_GCP_PROJECT");
    }

    #[test]
    fn test_unresolved_project_is_reported_missing() {
        use crate::utils::validation::Validate;

        let toml_content = r#"
[inference]
type = "cmle"

[cmle]
project = "${SMOKE_TEST_PROJECT_THAT_IS_NOT_SET}"
version = "v-${SMOKE_TEST_VERSION_THAT_IS_NOT_SET}"
"#;

        let settings = TomlConfig::from_toml_str(toml_content)
            .unwrap()
            .to_settings()
            .unwrap();
        assert_eq!(settings.cmle.project, None);
        assert_eq!(settings.cmle.version, None);

        let err = settings.validate().unwrap_err();
        match err {
            SmokeError::MissingConfigError { field } => assert_eq!(field, "cmle.project"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_inference_type_rejected() {
        let config = TomlConfig::from_toml_str("[inference]\ntype = \"batch\"\n").unwrap();
        let err = config.to_settings().unwrap_err();
        assert!(matches!(err, SmokeError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[inference\n").unwrap_err();
        assert!(matches!(err, SmokeError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[inference]\ntype = \"local\"\n\n[local]\nmodel_path = \"model.json\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        let settings = config.to_settings().unwrap();
        assert_eq!(settings.inference_type, InferenceType::Local);
        assert_eq!(settings.local.model_path.as_deref(), Some("model.json"));
    }
}
