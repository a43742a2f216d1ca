// 進捗報告のトレイト定義

use async_trait::async_trait;
use mockall::automock;

/// 進捗報告を抽象化するトレイト
///
/// 1回の起動中の報告はすべて単一のディスパッチタスクから順番に呼ばれるため、
/// 実装側で呼び出しの重複を考慮する必要はない。
#[automock]
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// 正規化済みの進捗 `[0, 1]` を報告
    async fn report_progress(&self, progress: f64);
}
