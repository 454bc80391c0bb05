use crate::core::{Estimator, InferenceType, Instance, PredictionOutput};
use crate::utils::error::{Result, SmokeError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// 匯出的線性回歸模型（預測出生體重，單位磅）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalModel {
    pub bias: f64,
    pub mother_age: f64,
    pub plurality: f64,
    pub gestation_weeks: f64,
    #[serde(default)]
    pub is_male: f64,
    #[serde(default)]
    pub mother_married: f64,
    #[serde(default)]
    pub cigarette_use: f64,
    #[serde(default)]
    pub alcohol_use: f64,
    /// 類別權重，未出現在表中的類別貢獻為 0
    #[serde(default)]
    pub mother_race: HashMap<String, f64>,
}

impl Default for LocalModel {
    fn default() -> Self {
        let mother_race = [
            ("White", 0.12),
            ("Black", -0.28),
            ("American Indian", -0.05),
            ("Chinese", -0.09),
            ("Japanese", -0.07),
            ("Hawaiian", 0.02),
            ("Filipino", -0.14),
            ("Asian Indian", -0.31),
            ("Korean", -0.06),
            ("Samoan", 0.18),
            ("Vietnamese", -0.11),
        ]
        .into_iter()
        .map(|(race, weight)| (race.to_string(), weight))
        .collect();

        Self {
            bias: -4.35,
            mother_age: 0.011,
            plurality: -1.62,
            gestation_weeks: 0.30,
            is_male: 0.27,
            mother_married: 0.09,
            cigarette_use: -0.38,
            alcohol_use: -0.12,
            mother_race,
        }
    }
}

impl LocalModel {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let model: LocalModel = serde_json::from_str(content).map_err(|e| SmokeError::ModelError {
            message: format!("Invalid model file: {}", e),
        })?;
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> Result<()> {
        let scalars = [
            ("bias", self.bias),
            ("mother_age", self.mother_age),
            ("plurality", self.plurality),
            ("gestation_weeks", self.gestation_weeks),
            ("is_male", self.is_male),
            ("mother_married", self.mother_married),
            ("cigarette_use", self.cigarette_use),
            ("alcohol_use", self.alcohol_use),
        ];
        let races = self.mother_race.iter().map(|(k, v)| (k.as_str(), *v));

        for (name, weight) in scalars.into_iter().chain(races) {
            if !weight.is_finite() {
                return Err(SmokeError::ModelError {
                    message: format!("Weight '{}' is not a finite number", name),
                });
            }
        }
        Ok(())
    }

    pub fn predict(&self, instance: &Instance) -> f64 {
        let flag = |text: &str, weight: f64| {
            if Instance::is_flag_set(text) {
                weight
            } else {
                0.0
            }
        };

        self.bias
            + self.mother_age * instance.mother_age
            + self.plurality * instance.plurality
            + self.gestation_weeks * instance.gestation_weeks as f64
            + flag(&instance.is_male, self.is_male)
            + flag(&instance.mother_married, self.mother_married)
            + flag(&instance.cigarette_use, self.cigarette_use)
            + flag(&instance.alcohol_use, self.alcohol_use)
            + self
                .mother_race
                .get(&instance.mother_race)
                .copied()
                .unwrap_or(0.0)
    }
}

/// 在程序內執行模型的預測函式
#[derive(Debug, Clone, Default)]
pub struct LocalEstimator {
    model: LocalModel,
}

impl LocalEstimator {
    pub fn new(model: LocalModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &LocalModel {
        &self.model
    }

    pub fn estimate_local(&self, batch: &[Instance]) -> PredictionOutput {
        PredictionOutput::new(
            batch
                .iter()
                .map(|instance| serde_json::json!({ "predictions": [self.model.predict(instance)] }))
                .collect(),
        )
    }
}

#[async_trait]
impl Estimator for LocalEstimator {
    async fn estimate(&self, batch: &[Instance]) -> Result<PredictionOutput> {
        Ok(self.estimate_local(batch))
    }

    fn inference_type(&self) -> InferenceType {
        InferenceType::Local
    }
}
