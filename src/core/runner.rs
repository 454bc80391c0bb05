use crate::core::{Estimator, InferenceType, Instance, PredictionOutput};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::{DateTime, Utc};
use std::io::Write;

pub const DEFAULT_ITERATIONS: usize = 5;

const SEPARATOR: &str = ".......................................";

#[derive(Debug, Clone)]
pub struct RunReport {
    pub inference_type: InferenceType,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outputs: Vec<PredictionOutput>,
    pub elapsed_seconds: f64,
}

/// 冒煙測試驅動：以同一批次連續呼叫預測函式並計時
pub struct SmokeRunner<E: Estimator> {
    estimator: E,
    iterations: usize,
    monitor: SystemMonitor,
}

impl<E: Estimator> SmokeRunner<E> {
    pub fn new(estimator: E) -> Self {
        Self {
            estimator,
            iterations: DEFAULT_ITERATIONS,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(estimator: E, monitor_enabled: bool) -> Self {
        Self {
            estimator,
            iterations: DEFAULT_ITERATIONS,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// 依序執行 `iterations` 次預測，結果逐行寫到 `out`。
    ///
    /// 任何一次預測失敗都會立即中止並回傳錯誤，不重試。
    pub async fn run<W: Write + Send>(&self, batch: &[Instance], out: &mut W) -> Result<RunReport> {
        let inference_type = self.estimator.inference_type();

        writeln!(out)?;
        writeln!(out, "Inference Type:{}", inference_type)?;
        writeln!(out)?;

        let started_at = Utc::now();
        writeln!(out, "Inference started at {}", started_at.format("%H:%M:%S"))?;
        writeln!(out, "{}", SEPARATOR)?;

        tracing::debug!(
            "Running {} {} inference calls with batch of {} instances",
            self.iterations,
            inference_type,
            batch.len()
        );

        let mut outputs = Vec::with_capacity(self.iterations);
        for i in 0..self.iterations {
            let output = self.estimator.estimate(batch).await?;
            writeln!(out, "{}", output)?;
            tracing::debug!("Call {}/{} returned {} predictions", i + 1, self.iterations, output.len());
            outputs.push(output);
        }

        let finished_at = Utc::now();
        writeln!(out, "{}", SEPARATOR)?;
        writeln!(out, "Inference finished at {}", finished_at.format("%H:%M:%S"))?;
        writeln!(out)?;

        let elapsed_seconds = elapsed_seconds(started_at, finished_at);
        writeln!(out, "Inference elapsed time: {} seconds", elapsed_seconds)?;
        out.flush()?;

        // 資源取樣會列舉程序，只能在計時區間之外進行
        self.monitor.log_stats("Inference loop");
        self.monitor.log_final_stats();

        Ok(RunReport {
            inference_type,
            started_at,
            finished_at,
            outputs,
            elapsed_seconds,
        })
    }
}

/// 牆鐘時間可能倒退，下限為 0
pub fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let delta = end.signed_duration_since(start);
    match delta.num_microseconds() {
        Some(us) if us > 0 => us as f64 / 1_000_000.0,
        Some(_) => 0.0,
        None => delta.num_seconds().max(0) as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sample_batch;
    use crate::utils::error::SmokeError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// 記錄呼叫次數與每次收到的批次內容
    #[derive(Clone)]
    struct RecordingEstimator {
        inference_type: InferenceType,
        calls: Arc<AtomicUsize>,
        batches: Arc<Mutex<Vec<Vec<Instance>>>>,
        fail_on_call: Option<usize>,
    }

    impl RecordingEstimator {
        fn new(inference_type: InferenceType) -> Self {
            Self {
                inference_type,
                calls: Arc::new(AtomicUsize::new(0)),
                batches: Arc::new(Mutex::new(Vec::new())),
                fail_on_call: None,
            }
        }

        fn failing_on(mut self, call: usize) -> Self {
            self.fail_on_call = Some(call);
            self
        }
    }

    #[async_trait]
    impl Estimator for RecordingEstimator {
        async fn estimate(&self, batch: &[Instance]) -> Result<PredictionOutput> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.batches.lock().unwrap().push(batch.to_vec());

            if self.fail_on_call == Some(call) {
                return Err(SmokeError::PredictionError {
                    message: format!("call {} failed", call),
                });
            }

            Ok(PredictionOutput::new(
                batch
                    .iter()
                    .map(|_| serde_json::json!({"predictions": [call as f64]}))
                    .collect(),
            ))
        }

        fn inference_type(&self) -> InferenceType {
            self.inference_type
        }
    }

    #[tokio::test]
    async fn test_run_calls_estimator_five_times_with_full_batch() {
        let estimator = RecordingEstimator::new(InferenceType::Local);
        let calls = estimator.calls.clone();
        let batches = estimator.batches.clone();
        let runner = SmokeRunner::new(estimator);

        let mut out = Vec::new();
        let report = runner.run(&sample_batch(), &mut out).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        let batches = batches.lock().unwrap();
        assert_eq!(batches.len(), 5);
        assert!(batches.iter().all(|batch| *batch == sample_batch()));
        assert_eq!(report.outputs.len(), 5);
        assert_eq!(report.inference_type, InferenceType::Local);
        assert!(report.elapsed_seconds >= 0.0);
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn test_run_console_layout() {
        let runner = SmokeRunner::new(RecordingEstimator::new(InferenceType::Cmle));

        let mut out = Vec::new();
        let report = runner.run(&sample_batch(), &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "Inference Type:cmle");
        assert_eq!(lines[2], "");
        assert!(lines[3].starts_with("Inference started at "));
        assert_eq!(lines[4], SEPARATOR);
        assert_eq!(lines[5], r#"[{"predictions":[1.0]},{"predictions":[1.0]}]"#);
        assert_eq!(lines[9], r#"[{"predictions":[5.0]},{"predictions":[5.0]}]"#);
        assert_eq!(lines[10], SEPARATOR);
        assert!(lines[11].starts_with("Inference finished at "));
        assert_eq!(lines[12], "");
        assert_eq!(
            lines[13],
            format!("Inference elapsed time: {} seconds", report.elapsed_seconds)
        );
        assert_eq!(lines.len(), 14);
    }

    #[tokio::test]
    async fn test_run_aborts_on_first_failure() {
        let estimator = RecordingEstimator::new(InferenceType::Cmle).failing_on(3);
        let calls = estimator.calls.clone();
        let runner = SmokeRunner::new(estimator);

        let mut out = Vec::new();
        let result = runner.run(&sample_batch(), &mut out).await;

        assert!(matches!(result, Err(SmokeError::PredictionError { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("Inference finished at"));
    }

    #[tokio::test]
    async fn test_run_respects_custom_iterations() {
        let estimator = RecordingEstimator::new(InferenceType::Local);
        let calls = estimator.calls.clone();
        let runner = SmokeRunner::new(estimator).with_iterations(2);

        let mut out = Vec::new();
        let report = runner.run(&sample_batch(), &mut out).await.unwrap();

        assert_eq!(runner.iterations(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.outputs.len(), 2);
    }

    #[tokio::test]
    async fn test_monitored_run_keeps_timing_window() {
        let estimator = RecordingEstimator::new(InferenceType::Local);
        let calls = estimator.calls.clone();
        let runner = SmokeRunner::new_with_monitoring(estimator, true);

        let mut out = Vec::new();
        let report = runner.run(&sample_batch(), &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(text.lines().count(), 14);
        assert_eq!(
            report.elapsed_seconds,
            elapsed_seconds(report.started_at, report.finished_at)
        );
        // 取樣發生在結束時間戳之後
        assert!(Utc::now() >= report.finished_at);
    }

    #[test]
    fn test_elapsed_seconds_is_difference() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let end = start + chrono::Duration::milliseconds(1_500);
        assert_eq!(elapsed_seconds(start, end), 1.5);
    }

    #[test]
    fn test_elapsed_seconds_never_negative() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let end = start - chrono::Duration::seconds(2);
        assert_eq!(elapsed_seconds(start, end), 0.0);
    }
}
