// Domain layer: prediction input/output models and the estimator port.

pub mod model;
pub mod ports;
