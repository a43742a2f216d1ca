// UpscaleRunner - 外部アップスケーラー1回分の起動を管理する
//
// 検証 → 出力先作成 → プロセス起動 → 進捗監視 → 後始末 の順に進み、
// 起動以降の結果はすべて UpscaleOutcome として返す。

use super::config::{DefaultRunnerConfig, RunnerConfig};
use super::process::{kill_process_group, kill_tree, spawn_upscaler, ProcessExit};
use crate::core::{InputMode, UpscaleError, UpscaleOutcome, UpscaleResult};
use crate::invocation::InvocationSpec;
use crate::progress::{
    count_input_files, parse_percentage, DiagnosticBuffer, FileCountTracker, ProgressDispatcher,
    ProgressReporter, ProgressSender,
};
use crate::watcher::OutputWatcher;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::ChildStderr;
use tokio_util::sync::CancellationToken;

/// プロセス待機の結末
enum Completion {
    Exited(std::io::Result<ExitStatus>),
    Cancelled,
}

/// 外部アップスケーラーの起動エンジン
///
/// 実行ごとの状態（診断バッファ、ファイル数）は `run` の中だけに閉じているため、
/// 同じインスタンスから複数の起動を並行して行える。
#[derive(Debug, Clone, Default)]
pub struct UpscaleRunner<C = DefaultRunnerConfig> {
    config: C,
}

impl UpscaleRunner<DefaultRunnerConfig> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C> UpscaleRunner<C>
where
    C: RunnerConfig,
{
    pub fn with_config(config: C) -> Self {
        Self { config }
    }

    /// 設定への参照を取得
    pub fn config(&self) -> &C {
        &self.config
    }

    /// 外部アップスケーラーを1回起動し、終了またはキャンセルまで待つ
    ///
    /// 入力パスの不在と起動失敗だけがエラーになる。非ゼロ終了とキャンセルは
    /// `UpscaleOutcome` で報告される。`reporter` がない場合は進捗の購読も
    /// ディレクトリ監視も行わない。
    pub async fn run(
        &self,
        spec: &InvocationSpec,
        reporter: Option<Arc<dyn ProgressReporter>>,
        cancel: Option<CancellationToken>,
    ) -> UpscaleResult<UpscaleOutcome> {
        let cancel = cancel.unwrap_or_default();
        if cancel.is_cancelled() {
            tracing::info!("upscale cancelled before start");
            return Ok(UpscaleOutcome::cancelled());
        }

        // 検証
        self.config.validate()?;
        let (input, mode) = resolve_input(&spec.input_path).await?;

        // 起動
        let output_directory = prepare_output(&spec.output_path, mode).await?;
        for directive in &spec.gpu_directives {
            if !directive.has_supported_tile_size() {
                tracing::warn!(
                    gpu = directive.id,
                    tile_size = directive.tile_size,
                    "tile size should be 0 or greater than 31; passing through"
                );
            }
        }
        tracing::info!(
            executable = %spec.executable_path,
            input = %input.display(),
            directory_mode = mode.is_directory(),
            command = %spec.compile(),
            "starting upscaler"
        );

        let dispatcher = reporter.map(ProgressDispatcher::spawn);
        // 監視開始前のファイルは数えないよう、プロセス起動より先にスナップショットを取る
        let watcher = match (&dispatcher, mode) {
            (Some(dispatcher), InputMode::Directory { total_files }) => Some(
                start_output_watch(
                    &output_directory,
                    total_files,
                    dispatcher.sender(),
                    &self.config,
                )
                .await?,
            ),
            _ => None,
        };

        let mut child = spawn_upscaler(&spec.executable_path, &spec.arguments())?;
        // 回収後は `child.id()` が取れなくなるため先に控えておく
        let process_group = child.id();

        // 実行中
        let line_progress = match (&dispatcher, mode) {
            (Some(dispatcher), InputMode::SingleFile) => Some(dispatcher.sender()),
            _ => None,
        };
        let reader_stop = CancellationToken::new();
        let mut reader = tokio::spawn(read_diagnostics(
            child.stderr.take(),
            line_progress,
            self.config.diagnostic_capacity(),
            reader_stop.clone(),
        ));

        let completion = tokio::select! {
            biased;
            status = child.wait() => Completion::Exited(status),
            _ = cancel.cancelled() => Completion::Cancelled,
        };

        if let Completion::Cancelled = completion {
            tracing::info!("cancellation requested; killing upscaler");
            kill_tree(&mut child);
            if let Err(error) = child.wait().await {
                tracing::debug!(%error, "failed to reap killed upscaler");
            }
        }

        // 後始末 - どの経路でも監視と読み取りを必ず解放する
        if let Some(watcher) = watcher {
            watcher.close().await;
        }
        let joined = match completion {
            Completion::Cancelled => {
                reader_stop.cancel();
                reader.await
            }
            Completion::Exited(_) => {
                match tokio::time::timeout(self.config.drain_timeout(), &mut reader).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        // 子孫がパイプを握ったまま残っている
                        tracing::warn!("diagnostic stream still open after exit; killing process group");
                        kill_process_group(process_group);
                        reader_stop.cancel();
                        reader.await
                    }
                }
            }
        };
        let diagnostics = joined.unwrap_or_else(|error| {
            tracing::warn!(%error, "diagnostic reader task failed");
            DiagnosticBuffer::with_capacity(self.config.diagnostic_capacity())
        });
        // 報告者の失敗はログのみ。起動結果は常に返す
        if let Some(dispatcher) = dispatcher {
            if let Err(error) = dispatcher.finish().await {
                tracing::warn!(%error, "progress reporter task failed");
            }
        }

        let outcome = match completion {
            Completion::Cancelled => UpscaleOutcome::cancelled(),
            Completion::Exited(status) => {
                let exit = ProcessExit::from_status(status.map_err(UpscaleError::process)?);
                compose_outcome(exit, &diagnostics)
            }
        };

        if outcome.is_success() {
            tracing::info!("upscaler finished successfully");
        } else if !outcome.is_cancelled() {
            tracing::warn!(exit_code = outcome.exit_code, "upscaler failed");
        }
        Ok(outcome)
    }
}

/// 既定設定で1回起動する便利関数
pub async fn run_upscale(
    spec: &InvocationSpec,
    reporter: Option<Arc<dyn ProgressReporter>>,
    cancel: Option<CancellationToken>,
) -> UpscaleResult<UpscaleOutcome> {
    UpscaleRunner::new().run(spec, reporter, cancel).await
}

/// 入力パスを絶対パスに解決し、動作モードを判定する
async fn resolve_input(input_path: &str) -> UpscaleResult<(PathBuf, InputMode)> {
    let absolute = std::path::absolute(input_path).unwrap_or_else(|_| PathBuf::from(input_path));

    match tokio::fs::metadata(&absolute).await {
        Ok(metadata) if metadata.is_file() => Ok((absolute, InputMode::SingleFile)),
        Ok(metadata) if metadata.is_dir() => {
            let total_files = count_input_files(&absolute);
            Ok((absolute, InputMode::Directory { total_files }))
        }
        _ => Err(UpscaleError::input_not_found(absolute)),
    }
}

/// 出力先ディレクトリ（ファイル入力なら親ディレクトリ）を作成して返す
async fn prepare_output(output_path: &str, mode: InputMode) -> UpscaleResult<PathBuf> {
    let output = PathBuf::from(output_path);
    let directory = match mode {
        InputMode::Directory { .. } => output,
        InputMode::SingleFile => output
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    if !directory.as_os_str().is_empty() {
        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|source| UpscaleError::output_preparation(&directory, source))?;
    }
    Ok(directory)
}

async fn start_output_watch(
    directory: &Path,
    total_files: usize,
    progress: ProgressSender,
    config: &impl RunnerConfig,
) -> UpscaleResult<OutputWatcher> {
    let mut tracker = FileCountTracker::new(total_files);
    OutputWatcher::start(
        directory,
        config.watch_interval(),
        Box::new(move |_: &Path| {
            if let Some(value) = tracker.record_created() {
                progress.send(value);
            }
        }),
    )
    .await
    .map_err(|source| UpscaleError::output_preparation(directory, source))
}

/// 診断出力を行単位で読み、進捗行と診断行に振り分ける
///
/// パーセンテージ行は `progress` がある場合のみ転送し、それ以外の行は
/// 直近の数行だけバッファに残す。`stop` が発火した時点で読み取りをやめ、
/// それまでの行を返す。
async fn read_diagnostics(
    stderr: Option<ChildStderr>,
    progress: Option<ProgressSender>,
    capacity: usize,
    stop: CancellationToken,
) -> DiagnosticBuffer {
    let mut buffer = DiagnosticBuffer::with_capacity(capacity);
    let Some(stderr) = stderr else {
        return buffer;
    };

    let mut reader = BufReader::new(stderr);
    let mut raw = Vec::new();
    loop {
        raw.clear();
        let read = tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            read = reader.read_until(b'\n', &mut raw) => read,
        };
        match read {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&raw);
                match parse_percentage(&line) {
                    Some(value) => {
                        if let Some(progress) = &progress {
                            progress.send(value);
                        }
                    }
                    None => {
                        let line = line.trim_end();
                        if !line.is_empty() {
                            buffer.push(line);
                        }
                    }
                }
            }
            Err(error) => {
                tracing::debug!(%error, "diagnostic stream read failed");
                break;
            }
        }
    }
    buffer
}

fn compose_outcome(exit: ProcessExit, diagnostics: &DiagnosticBuffer) -> UpscaleOutcome {
    if exit.is_success() {
        return UpscaleOutcome::success();
    }

    let message = match (diagnostics.to_message(), exit.signal_name()) {
        (Some(lines), Some(signal)) => format!("{lines}\nprocess terminated by {signal}"),
        (Some(lines), None) => lines,
        (None, Some(signal)) => format!("process terminated by {signal}"),
        (None, None) => format!("process exited with code {}", exit.code),
    };
    UpscaleOutcome::failure(exit.code, message)
}
