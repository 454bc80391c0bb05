use crate::core::{sample_batch, Instance};
use crate::utils::error::{Result, SmokeError};
use crate::utils::validation::validate_file_extension;
use std::path::Path;

pub const INSTANCE_FILE_EXTENSIONS: &[&str] = &["json", "csv"];

/// 取得預測批次：未指定檔案時使用內建的兩筆樣本
pub fn load_batch(path: Option<&str>) -> Result<Vec<Instance>> {
    match path {
        Some(path) => load_instances(path),
        None => Ok(sample_batch()),
    }
}

pub fn load_instances(path: &str) -> Result<Vec<Instance>> {
    validate_file_extension("instances", path, INSTANCE_FILE_EXTENSIONS)?;

    let instances = match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some("csv") => read_csv(path)?,
        _ => {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        }
    };

    tracing::info!("📂 Loaded {} instances from {}", instances.len(), path);
    Ok(instances)
}

fn read_csv(path: &str) -> Result<Vec<Instance>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

    let mut instances = Vec::new();
    for (line, record) in reader.deserialize::<Instance>().enumerate() {
        let instance = record.map_err(|e| SmokeError::ValidationError {
            message: format!("Row {} of {}: {}", line + 1, path, e),
        })?;
        instances.push(instance);
    }
    Ok(instances)
}
