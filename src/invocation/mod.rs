// 外部アップスケーラーの起動設定
//
// - gpu.rs     - GPUごとのチューニング
// - format.rs  - 出力画像形式
// - command.rs - 起動設定とコマンドライン構築

pub mod command;
pub mod format;
pub mod gpu;

// 公開API
pub use command::*;
pub use format::OutputFormat;
pub use gpu::{GpuDirective, AUTO_TILE_SIZE};
