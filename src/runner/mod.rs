// 外部アップスケーラーの起動管理
//
// - config.rs       - 実行時設定
// - process.rs      - 子プロセスの起動と強制終了
// - orchestrator.rs - 検証から結果作成までの状態遷移

pub mod config;
pub mod orchestrator;
pub mod process;

// 公開API
pub use config::{DefaultRunnerConfig, RunnerConfig};
pub use process::ProcessExit;
pub use orchestrator::{run_upscale, UpscaleRunner};
