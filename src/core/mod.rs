pub mod runner;

pub use crate::domain::model::{sample_batch, InferenceType, Instance, PredictionOutput};
pub use crate::domain::ports::Estimator;
pub use crate::utils::error::Result;
