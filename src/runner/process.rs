// 外部プロセスの起動と強制終了

use crate::core::{UpscaleError, UpscaleResult, SIGNAL_EXIT_BASE};
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};

/// 診断出力（stderr）だけをパイプして起動する
///
/// Unixでは子プロセス自身を新しいプロセスグループのリーダーにし、
/// キャンセル時にグループごと終了できるようにする。
pub fn spawn_upscaler(executable: &str, arguments: &[String]) -> UpscaleResult<Child> {
    let mut command = Command::new(executable);
    command
        .args(arguments)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    {
        command.process_group(0);
    }

    command
        .spawn()
        .map_err(|source| UpscaleError::launch(executable, source))
}

/// 子プロセスとその子孫を即座に強制終了する（猶予なし）
pub fn kill_tree(child: &mut Child) {
    if kill_process_group(child.id()) {
        return;
    }
    if let Err(error) = child.start_kill() {
        tracing::debug!(%error, "child already exited");
    }
}

/// 起動時に記録したプロセスグループへSIGKILLを送る
///
/// リーダーが回収済みでも、グループに残った子孫はこれで終了する。
/// 送信できた場合のみ `true` を返す。
pub fn kill_process_group(group: Option<u32>) -> bool {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = group {
            match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
                Ok(()) => return true,
                Err(error) => tracing::debug!(%error, pid, "killpg failed"),
            }
        }
    }
    #[cfg(not(unix))]
    let _ = group;

    false
}

/// 子プロセスの終了状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// 報告する終了コード。シグナル終了は `128 + シグナル番号`
    pub code: i32,
    /// 終了させたシグナル番号
    pub signal: Option<i32>,
}

impl ProcessExit {
    pub fn exited(code: i32) -> Self {
        Self { code, signal: None }
    }

    pub fn signaled(signal: i32) -> Self {
        Self {
            code: SIGNAL_EXIT_BASE + signal,
            signal: Some(signal),
        }
    }

    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;

            if let Some(signal) = status.signal() {
                return Self::signaled(signal);
            }
        }

        // コードもシグナルもない終了は一般的な失敗として扱う
        Self::exited(1)
    }

    pub fn is_success(&self) -> bool {
        self.code == 0 && self.signal.is_none()
    }

    /// シグナル名（例: `SIGKILL`）。不明な番号は `signal N`
    pub fn signal_name(&self) -> Option<String> {
        self.signal.map(|signal| {
            #[cfg(unix)]
            {
                if let Ok(named) = nix::sys::signal::Signal::try_from(signal) {
                    return named.as_str().to_string();
                }
            }
            format!("signal {signal}")
        })
    }
}
