//! 外部アップスケーラー（realesrgan-ncnn-vulkan 互換）の起動管理
//!
//! 起動設定からコマンドラインを構築し、子プロセスとして実行しながら
//! 診断出力と出力ディレクトリの2つの経路で進捗を推定する。
//!
//! ```no_run
//! use std::sync::Arc;
//! use upscale_orchestrator::{
//!     invocation::{GpuDirective, InvocationSpec},
//!     progress::{ConsoleProgressReporter, ProgressReporter},
//!     UpscaleRunner,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let spec = InvocationSpec::new("./realesrgan-ncnn-vulkan", "input.png", "out/input.png")
//!     .with_scale(2)
//!     .with_gpu(GpuDirective::new(0).with_tile_size(256));
//!
//! let reporter: Arc<dyn ProgressReporter> = Arc::new(ConsoleProgressReporter::new());
//! let outcome = UpscaleRunner::new().run(&spec, Some(reporter), None).await?;
//! println!("exit code: {}", outcome.exit_code);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod invocation;
pub mod progress;
pub mod runner;
pub mod watcher;

pub use crate::core::{UpscaleError, UpscaleOutcome, UpscaleResult};
pub use invocation::{GpuDirective, InvocationSpec, OutputFormat};
pub use progress::ProgressReporter;
pub use runner::{run_upscale, DefaultRunnerConfig, RunnerConfig, UpscaleRunner};
pub use tokio_util::sync::CancellationToken;
