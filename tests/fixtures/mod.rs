// テストユーティリティ
// 外部アップスケーラーの代わりに動くシェルスクリプトを生成する

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use tempfile::TempDir;
use tokio::sync::MutexGuard;
use upscale_orchestrator::progress::FnProgressReporter;
use upscale_orchestrator::{InvocationSpec, ProgressReporter};

/// `-i` と `-o` の値を `$in` / `$out` に取り出す前処理
const ARGUMENT_PARSER: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    -i) in="$2"; shift 2 ;;
    -o) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
"#;

/// 書き込み直後のスクリプトを別スレッドのforkと競合させないため、
/// プロセスを起動するテストは1つずつ実行する
pub async fn serial() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<tokio::sync::Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| tokio::sync::Mutex::new(())).lock().await
}

/// 偽のアップスケーラーと作業ディレクトリ
pub struct FakeUpscaler {
    pub workspace: TempDir,
    pub executable: PathBuf,
}

impl FakeUpscaler {
    /// 引数解析の後に `body` を実行するスクリプトを作成
    pub fn new(body: &str) -> Self {
        Self::raw(&format!("{ARGUMENT_PARSER}\n{body}"))
    }

    /// 引数解析なしで `body` をそのまま実行するスクリプトを作成
    pub fn raw(body: &str) -> Self {
        let workspace = TempDir::new().unwrap();
        let executable = workspace.path().join("fake-upscaler.sh");
        fs::write(&executable, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&executable, fs::Permissions::from_mode(0o755)).unwrap();
        Self {
            workspace,
            executable,
        }
    }

    /// 作業ディレクトリ内のパス
    pub fn path(&self, relative: &str) -> PathBuf {
        self.workspace.path().join(relative)
    }

    /// 入力ファイルを作成
    pub fn create_input_file(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"fake image").unwrap();
        path
    }

    /// `count` 個のファイルを持つ入力ディレクトリを作成
    pub fn create_input_directory(&self, relative: &str, count: usize) -> PathBuf {
        let directory = self.path(relative);
        fs::create_dir_all(&directory).unwrap();
        for i in 0..count {
            fs::write(directory.join(format!("frame{i:03}.png")), b"fake image").unwrap();
        }
        directory
    }

    pub fn spec(&self, input: &Path, output: &Path) -> InvocationSpec {
        InvocationSpec::new(
            self.executable.to_string_lossy(),
            input.to_string_lossy(),
            output.to_string_lossy(),
        )
    }
}

/// 受け取った進捗を記録する報告者
pub fn recording_reporter() -> (Arc<Mutex<Vec<f64>>>, Arc<dyn ProgressReporter>) {
    let values = Arc::new(Mutex::new(Vec::new()));
    let sink = values.clone();
    let reporter = FnProgressReporter::new(move |progress| sink.lock().unwrap().push(progress));
    (values, Arc::new(reporter))
}

pub fn assert_progress(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "progress values: {actual:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "progress values: {actual:?}, expected {expected:?}");
    }
}
