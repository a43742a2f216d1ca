// 出力ディレクトリの監視
//
// tokioのインターバルでディレクトリを走査し、新しく現れたファイルごとに
// ハンドラを呼ぶ購読オブジェクト。`close()` で最終走査をしてから停止し、
// それ以外の経路では `Drop` でタスクを中断する。

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 新規ファイルのハンドラ
pub type CreatedHandler = Box<dyn FnMut(&Path) + Send>;

/// ディレクトリ監視の購読
pub struct OutputWatcher {
    directory: PathBuf,
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl OutputWatcher {
    /// 既存エントリを記録してから監視を開始する
    ///
    /// 開始時点で存在するファイルは通知されない。
    pub async fn start(
        directory: impl Into<PathBuf>,
        interval: Duration,
        on_created: CreatedHandler,
    ) -> std::io::Result<Self> {
        let directory = directory.into();
        let mut scanner = DirectoryScanner::new(directory.clone(), on_created);
        scanner.snapshot().await?;

        let stop = CancellationToken::new();
        let task_stop = stop.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = task_stop.cancelled() => break,
                    _ = ticker.tick() => scanner.scan().await,
                }
            }
            // 停止直前に作られたファイルを取りこぼさないよう最後に1回走査
            scanner.scan().await;
        });

        tracing::debug!(directory = %directory.display(), "output watch started");
        Ok(Self {
            directory,
            stop,
            handle,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// 最終走査を行ってから監視を停止し、すべての通知が終わるまで待つ
    pub async fn close(mut self) {
        self.stop.cancel();
        if let Err(error) = (&mut self.handle).await {
            tracing::warn!(%error, "output watch task ended abnormally");
        }
        tracing::debug!(directory = %self.directory.display(), "output watch closed");
    }
}

impl Drop for OutputWatcher {
    fn drop(&mut self) {
        self.stop.cancel();
        self.handle.abort();
    }
}

/// 既知のファイル名を保持して差分を検出する
struct DirectoryScanner {
    directory: PathBuf,
    seen: HashSet<OsString>,
    on_created: CreatedHandler,
}

impl DirectoryScanner {
    fn new(directory: PathBuf, on_created: CreatedHandler) -> Self {
        Self {
            directory,
            seen: HashSet::new(),
            on_created,
        }
    }

    async fn snapshot(&mut self) -> std::io::Result<()> {
        let existing = list_files(&self.directory).await?;
        self.seen.extend(existing);
        Ok(())
    }

    async fn scan(&mut self) {
        let files = match list_files(&self.directory).await {
            Ok(files) => files,
            Err(error) => {
                tracing::debug!(%error, directory = %self.directory.display(), "output scan failed");
                return;
            }
        };

        let mut created: Vec<OsString> = files
            .into_iter()
            .filter(|name| !self.seen.contains(name))
            .collect();
        created.sort();

        for name in created {
            let path = self.directory.join(&name);
            tracing::debug!(file = %path.display(), "output file created");
            (self.on_created)(&path);
            self.seen.insert(name);
        }
    }
}

/// ディレクトリ直下の通常ファイル名一覧
async fn list_files(directory: &Path) -> std::io::Result<Vec<OsString>> {
    let mut entries = tokio::fs::read_dir(directory).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name());
        }
    }
    Ok(names)
}
