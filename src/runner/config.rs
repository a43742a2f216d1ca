// 起動処理の実行時設定

use crate::core::ValidationError;
use crate::progress::DEFAULT_DIAGNOSTIC_CAPACITY;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 起動処理の設定を抽象化するトレイト
pub trait RunnerConfig: Send + Sync {
    /// 出力ディレクトリの走査間隔
    fn watch_interval(&self) -> Duration;

    /// エラーメッセージ用に保持する診断行の最大数
    fn diagnostic_capacity(&self) -> usize;

    /// プロセス終了後に診断出力の残りを読み切るまで待つ上限
    ///
    /// 超えた場合はパイプを握ったままの子孫をグループごと終了し、
    /// それまでに読めた行だけを使う。
    fn drain_timeout(&self) -> Duration;

    /// 設定の妥当性をチェック
    fn validate(&self) -> Result<(), ValidationError> {
        if self.watch_interval().is_zero() {
            return Err(ValidationError::new(
                "watch_interval",
                "走査間隔は0より大きい必要があります",
            ));
        }
        if self.diagnostic_capacity() == 0 {
            return Err(ValidationError::new(
                "diagnostic_capacity",
                "診断バッファは1以上である必要があります",
            ));
        }
        if self.drain_timeout().is_zero() {
            return Err(ValidationError::new(
                "drain_timeout",
                "読み切り待ちの上限は0より大きい必要があります",
            ));
        }
        Ok(())
    }
}

/// デフォルト設定実装
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultRunnerConfig {
    watch_interval_ms: u64,
    diagnostic_capacity: usize,
    drain_timeout_ms: u64,
}

impl Default for DefaultRunnerConfig {
    fn default() -> Self {
        Self {
            watch_interval_ms: 100,
            diagnostic_capacity: DEFAULT_DIAGNOSTIC_CAPACITY,
            drain_timeout_ms: 500,
        }
    }
}

impl DefaultRunnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_diagnostic_capacity(mut self, capacity: usize) -> Self {
        self.diagnostic_capacity = capacity;
        self
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("実行時設定のJSON解析に失敗しました")
    }
}

impl RunnerConfig for DefaultRunnerConfig {
    fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }

    fn diagnostic_capacity(&self) -> usize {
        self.diagnostic_capacity
    }

    fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}
