// 進捗報告の基本実装群

use super::ProgressReporter;
use async_trait::async_trait;
use std::sync::Mutex;

/// tracingによる進捗報告実装
///
/// 1%単位で値が変わったときだけ出力する。
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    quiet: bool,
    last_percent: Mutex<Option<u32>>,
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    /// 前回から表示上の値が変わった場合のみ新しいパーセント値を返す
    fn advance(&self, progress: f64) -> Option<u32> {
        let percent = (progress.clamp(0.0, 1.0) * 100.0).floor() as u32;
        let mut last = self.last_percent.lock().unwrap_or_else(|e| e.into_inner());
        if *last == Some(percent) {
            return None;
        }
        *last = Some(percent);
        Some(percent)
    }
}

#[async_trait]
impl ProgressReporter for ConsoleProgressReporter {
    async fn report_progress(&self, progress: f64) {
        if let Some(percent) = self.advance(progress) {
            if !self.quiet {
                tracing::info!(percent, "upscale progress");
            }
        }
    }
}

/// 何もしない進捗報告実装
#[derive(Debug, Default)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report_progress(&self, _progress: f64) {
        // 何もしない
    }
}

/// クロージャを進捗報告として使うためのアダプター
pub struct FnProgressReporter<F> {
    callback: F,
}

impl<F> FnProgressReporter<F>
where
    F: Fn(f64) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl<F> ProgressReporter for FnProgressReporter<F>
where
    F: Fn(f64) + Send + Sync,
{
    async fn report_progress(&self, progress: f64) {
        (self.callback)(progress);
    }
}
