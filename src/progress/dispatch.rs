// 進捗報告の単一タスクディスパッチ
// 診断出力の読み取りとディレクトリ監視の両方から届く値を1本の列に並べる

use super::ProgressReporter;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// ディスパッチタスクへ進捗を送るハンドル
#[derive(Debug, Clone)]
pub struct ProgressSender {
    sender: mpsc::UnboundedSender<f64>,
}

impl ProgressSender {
    /// 進捗を送信。ディスパッチャ終了後の送信は黙って捨てる
    pub fn send(&self, progress: f64) {
        tracing::debug!(progress, "progress observed");
        let _ = self.sender.send(progress);
    }
}

/// 報告者を順番に呼び出すバックグラウンドタスク
pub struct ProgressDispatcher {
    sender: ProgressSender,
    handle: JoinHandle<()>,
}

impl ProgressDispatcher {
    pub fn spawn(reporter: Arc<dyn ProgressReporter>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<f64>();
        let handle = tokio::spawn(async move {
            while let Some(progress) = receiver.recv().await {
                reporter.report_progress(progress).await;
            }
        });

        Self {
            sender: ProgressSender { sender },
            handle,
        }
    }

    pub fn sender(&self) -> ProgressSender {
        self.sender.clone()
    }

    /// 送信済みの進捗をすべて配信し終えるまで待つ
    ///
    /// 他の `ProgressSender` がすべて破棄されてから呼ぶこと。
    pub async fn finish(self) -> Result<(), tokio::task::JoinError> {
        drop(self.sender);
        self.handle.await
    }
}
