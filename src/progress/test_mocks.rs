// テスト用の進捗報告モック実装

use super::traits::ProgressReporter;
use std::sync::{Arc, Mutex};

/// 受け取った進捗をすべて記録する報告者
#[derive(Default)]
pub struct RecordingProgressReporter {
    pub progress_calls: Arc<Mutex<Vec<f64>>>,
}

impl RecordingProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> Vec<f64> {
        self.progress_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ProgressReporter for RecordingProgressReporter {
    async fn report_progress(&self, progress: f64) {
        self.progress_calls.lock().unwrap().push(progress);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_reporter() {
        let reporter = RecordingProgressReporter::new();
        let reporter_ref: &dyn ProgressReporter = &reporter;

        reporter_ref.report_progress(0.5).await;
        reporter_ref.report_progress(1.0).await;

        assert_eq!(reporter.values(), vec![0.5, 1.0]);
    }
}
