// コアレイヤー - エラー定義と結果型
// 他のレイヤーから参照される基本的な型を提供

pub mod error;
pub mod types;

// 公開API
pub use error::{ErrorSeverity, UpscaleError, UpscaleResult, ValidationError};
pub use types::{InputMode, UpscaleOutcome, CANCELLED_EXIT_CODE, CANCELLED_MESSAGE, SIGNAL_EXIT_BASE};
