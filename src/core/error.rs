// アップスケーラー起動処理のエラー型定義
// 外部プロセスの副作用が発生する前に検出できる失敗のみをエラーとして扱う

use std::path::PathBuf;
use thiserror::Error;

/// 起動処理固有のエラー型
///
/// 非ゼロ終了コードやキャンセルはエラーではなく、
/// `UpscaleOutcome` として通常の戻り値で報告される。
#[derive(Error, Debug)]
pub enum UpscaleError {
    #[error("入力パスが見つかりません (not found): {}", .path.display())]
    InputNotFound { path: PathBuf },

    #[error("出力先の作成エラー: {} - {source}", .path.display())]
    OutputPreparation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("プロセス起動エラー: {executable} - {source}")]
    Launch {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    #[error("プロセス待機エラー: {source}")]
    Process {
        #[source]
        source: std::io::Error,
    },

    #[error("タスクエラー: {source}")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("設定エラー: {message}")]
    Configuration { message: String },
}

impl UpscaleError {
    /// 入力パス不在エラーの作成
    pub fn input_not_found(path: impl Into<PathBuf>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    /// 出力先作成エラーの作成
    pub fn output_preparation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputPreparation {
            path: path.into(),
            source,
        }
    }

    /// 起動エラーの作成
    pub fn launch(executable: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch {
            executable: executable.into(),
            source,
        }
    }

    /// プロセス待機エラーの作成
    pub fn process(source: std::io::Error) -> Self {
        Self::Process { source }
    }

    /// タスクエラーの作成
    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::Task { source }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::InputNotFound { .. } | Self::Configuration { .. } => ErrorSeverity::High,
            Self::OutputPreparation { .. } => ErrorSeverity::High,
            Self::Launch { .. } | Self::Task { .. } => ErrorSeverity::Critical,
            Self::Process { .. } => ErrorSeverity::Medium,
        }
    }

    /// 呼び出し側で入力を直せば再実行できるかどうか
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InputNotFound { .. } | Self::Configuration { .. } => true,
            Self::OutputPreparation { .. } => true,
            Self::Launch { .. } => false,
            Self::Process { .. } | Self::Task { .. } => false,
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 要対応
    High,
    /// 致命的 - この起動は続行不能
    Critical,
}

impl ErrorSeverity {
    /// 重要度の文字列表現を取得
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// 起動処理の結果型
pub type UpscaleResult<T> = std::result::Result<T, UpscaleError>;

/// バリデーション専用エラー型
#[derive(Error, Debug, Clone)]
#[error("バリデーションエラー: {field} - {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    /// 新しいバリデーションエラーを作成
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<ValidationError> for UpscaleError {
    fn from(error: ValidationError) -> Self {
        UpscaleError::configuration(error.to_string())
    }
}

impl From<tokio::task::JoinError> for UpscaleError {
    fn from(error: tokio::task::JoinError) -> Self {
        UpscaleError::Task { source: error }
    }
}
