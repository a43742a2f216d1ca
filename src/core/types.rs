// 起動処理に関連するデータ型定義

use serde::Serialize;

/// 開始前にキャンセルされた場合などに使う終了コード
pub const CANCELLED_EXIT_CODE: i32 = -1;

/// シグナルで終了したプロセスの終了コードの基準値（シェルと同じ `128 + N`）
pub const SIGNAL_EXIT_BASE: i32 = 128;

/// キャンセル時のメッセージ
pub const CANCELLED_MESSAGE: &str = "operation cancelled";

/// 1回の起動の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpscaleOutcome {
    /// 0 = 成功、それ以外は失敗
    pub exit_code: i32,
    /// 失敗時のみ設定される診断メッセージ
    pub error_message: Option<String>,
}

impl UpscaleOutcome {
    pub fn success() -> Self {
        Self {
            exit_code: 0,
            error_message: None,
        }
    }

    pub fn failure(exit_code: i32, error_message: impl Into<String>) -> Self {
        Self {
            exit_code,
            error_message: Some(error_message.into()),
        }
    }

    pub fn cancelled() -> Self {
        Self::failure(CANCELLED_EXIT_CODE, CANCELLED_MESSAGE)
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn is_cancelled(&self) -> bool {
        self.exit_code == CANCELLED_EXIT_CODE
            && self.error_message.as_deref() == Some(CANCELLED_MESSAGE)
    }
}

/// 入力パスの種類によって決まる動作モード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// 単一ファイル入力 - 診断出力のパーセンテージで進捗を推定
    SingleFile,
    /// ディレクトリ入力 - 出力ファイル数で進捗を推定
    Directory { total_files: usize },
}

impl InputMode {
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }
}
