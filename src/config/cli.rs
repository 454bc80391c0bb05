use crate::config::toml_config::TomlConfig;
use crate::config::Settings;
use crate::core::InferenceType;
use crate::utils::error::Result;
use clap::Parser;
use std::fmt;

/// 所有參數皆為選填，不帶參數即可執行
#[derive(Clone, Default, Parser)]
#[command(name = "inference-smoke")]
#[command(about = "Smoke-test a birth-weight prediction model, locally or on the managed ML service")]
pub struct CliConfig {
    #[arg(long, help = "Path to a TOML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Prediction strategy: local | cmle [default: local]")]
    pub inference_type: Option<InferenceType>,

    #[arg(long, help = "Number of prediction calls [default: 5]")]
    pub iterations: Option<usize>,

    #[arg(long, help = "Instances file (.json or .csv) replacing the built-in batch")]
    pub instances: Option<String>,

    #[arg(long, help = "Local model weights (.json)")]
    pub model_path: Option<String>,

    #[arg(long, help = "Prediction service base URL")]
    pub cmle_endpoint: Option<String>,

    #[arg(long, help = "Cloud project hosting the model")]
    pub project: Option<String>,

    #[arg(long, help = "Deployed model name")]
    pub model: Option<String>,

    #[arg(long, help = "Model version (service default when omitted)")]
    pub model_version: Option<String>,

    #[arg(long, help = "OAuth2 bearer token for the prediction service")]
    pub access_token: Option<String>,

    #[arg(long, help = "Request timeout in seconds")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage once the timed calls finish")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

// access_token 不可出現在日誌中
impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("config", &self.config)
            .field("inference_type", &self.inference_type)
            .field("iterations", &self.iterations)
            .field("instances", &self.instances)
            .field("model_path", &self.model_path)
            .field("cmle_endpoint", &self.cmle_endpoint)
            .field("project", &self.project)
            .field("model", &self.model)
            .field("model_version", &self.model_version)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .field("timeout_seconds", &self.timeout_seconds)
            .field("verbose", &self.verbose)
            .field("monitor", &self.monitor)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

impl CliConfig {
    /// 預設值 → 設定檔 → 命令列參數，依序覆蓋
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(path) = &self.config {
            tracing::debug!("Loading config file {}", path);
            TomlConfig::from_file(path)?.apply_to(&mut settings)?;
        }

        if let Some(inference_type) = self.inference_type {
            settings.inference_type = inference_type;
        }
        if let Some(iterations) = self.iterations {
            settings.iterations = iterations;
        }
        if self.instances.is_some() {
            settings.instances = self.instances.clone();
        }
        if self.model_path.is_some() {
            settings.local.model_path = self.model_path.clone();
        }
        if let Some(endpoint) = &self.cmle_endpoint {
            settings.cmle.endpoint = endpoint.clone();
        }
        if self.project.is_some() {
            settings.cmle.project = self.project.clone();
        }
        if let Some(model) = &self.model {
            settings.cmle.model = model.clone();
        }
        if self.model_version.is_some() {
            settings.cmle.version = self.model_version.clone();
        }
        if self.access_token.is_some() {
            settings.cmle.access_token = self.access_token.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.cmle.timeout_seconds = timeout;
        }

        settings.verbose |= self.verbose;
        settings.monitor |= self.monitor;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_no_flags_resolves_to_defaults() {
        let cli = CliConfig::parse_from(["inference-smoke"]);
        assert_eq!(cli.resolve().unwrap(), Settings::default());
    }

    #[test]
    fn test_flags_are_parsed() {
        let cli = CliConfig::parse_from([
            "inference-smoke",
            "--inference-type",
            "cmle",
            "--iterations",
            "2",
            "--project",
            "my-project",
            "--model-version",
            "v3",
            "--monitor",
        ]);

        let settings = cli.resolve().unwrap();
        assert_eq!(settings.inference_type, InferenceType::Cmle);
        assert_eq!(settings.iterations, 2);
        assert_eq!(settings.cmle.project.as_deref(), Some("my-project"));
        assert_eq!(settings.cmle.version.as_deref(), Some("v3"));
        assert!(settings.monitor);
    }

    #[test]
    fn test_invalid_inference_type_flag_rejected() {
        let result = CliConfig::try_parse_from(["inference-smoke", "--inference-type", "batch"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                b"[inference]\ntype = \"cmle\"\niterations = 7\n\n[cmle]\nproject = \"file-project\"\nmodel = \"file-model\"\n",
            )
            .unwrap();

        let cli = CliConfig {
            config: Some(temp_file.path().to_str().unwrap().to_string()),
            project: Some("cli-project".to_string()),
            ..Default::default()
        };

        let settings = cli.resolve().unwrap();
        assert_eq!(settings.inference_type, InferenceType::Cmle);
        assert_eq!(settings.iterations, 7);
        assert_eq!(settings.cmle.project.as_deref(), Some("cli-project"));
        assert_eq!(settings.cmle.model, "file-model");
    }

    #[test]
    fn test_debug_output_masks_access_token() {
        let cli = CliConfig::parse_from([
            "inference-smoke",
            "--verbose",
            "--access-token",
            "ya29.SECRET",
        ]);

        let dump = format!("CLI config: {:?}", cli);
        assert!(!dump.contains("ya29.SECRET"));
        assert!(dump.contains(r#"access_token: Some("***")"#));
        assert!(dump.contains("verbose: true"));

        let without_token = format!("{:?}", CliConfig::parse_from(["inference-smoke"]));
        assert!(without_token.contains("access_token: None"));
    }

    #[test]
    fn test_missing_config_file_fails() {
        let cli = CliConfig {
            config: Some("/nonexistent/smoke.toml".to_string()),
            ..Default::default()
        };
        assert!(cli.resolve().is_err());
    }
}
