pub mod batch;
pub mod estimators;
