// 進捗推定と報告
//
// 単一ファイル入力では診断出力のパーセンテージ行、
// ディレクトリ入力では出力ファイル数から進捗を推定する。

pub mod diagnostics;
pub mod dispatch;
pub mod implementations;
pub mod parser;
pub mod tracker;
pub mod traits;

#[cfg(test)]
pub mod test_mocks;

// 公開API
pub use diagnostics::{DiagnosticBuffer, DEFAULT_DIAGNOSTIC_CAPACITY};
pub use dispatch::{ProgressDispatcher, ProgressSender};
pub use implementations::*;
pub use parser::parse_percentage;
pub use tracker::{count_input_files, FileCountTracker};
pub use traits::*;

// テストモック（テスト時のみ）
#[cfg(test)]
pub use test_mocks::*;
