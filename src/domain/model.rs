use crate::utils::error::SmokeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 單筆預測輸入（特徵名稱 → 值）
///
/// 布林旗標以文字 `"True"` / `"False"` 傳遞，與模型服務簽章一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub is_male: String,
    pub mother_age: f64,
    pub mother_race: String,
    pub plurality: f64,
    pub gestation_weeks: i64,
    pub mother_married: String,
    pub cigarette_use: String,
    pub alcohol_use: String,
}

impl Instance {
    pub fn is_flag_set(flag: &str) -> bool {
        flag.eq_ignore_ascii_case("true")
    }
}

/// 固定的冒煙測試批次：兩筆相同的紀錄
pub fn sample_batch() -> Vec<Instance> {
    let instance = Instance {
        is_male: "True".to_string(),
        mother_age: 26.0,
        mother_race: "Asian Indian".to_string(),
        plurality: 1.0,
        gestation_weeks: 39,
        mother_married: "True".to_string(),
        cigarette_use: "False".to_string(),
        alcohol_use: "False".to_string(),
    };

    vec![instance.clone(), instance]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceType {
    #[default]
    Local,
    Cmle,
}

impl InferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InferenceType::Local => "local",
            InferenceType::Cmle => "cmle",
        }
    }
}

impl fmt::Display for InferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InferenceType {
    type Err = SmokeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(InferenceType::Local),
            "cmle" => Ok(InferenceType::Cmle),
            other => Err(SmokeError::InvalidConfigValueError {
                field: "inference_type".to_string(),
                value: other.to_string(),
                reason: "Expected 'local' or 'cmle'".to_string(),
            }),
        }
    }
}

/// 預測函式的回傳值，每筆輸入對應一個 JSON 預測
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub predictions: Vec<serde_json::Value>,
}

impl PredictionOutput {
    pub fn new(predictions: Vec<serde_json::Value>) -> Self {
        Self { predictions }
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

impl fmt::Display for PredictionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(&self.predictions).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}
