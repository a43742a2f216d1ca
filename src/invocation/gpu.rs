// GPUごとのチューニング設定

use serde::{Deserialize, Serialize};

/// 外部ツールが自動でタイルサイズを決めることを示す値
pub const AUTO_TILE_SIZE: u32 = 0;

/// GPU 1台分のチューニング設定
///
/// タイルサイズは `0`（自動）または `32` 以上が外部ツールの想定だが、
/// ここでは検証せずそのまま渡す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuDirective {
    pub id: u32,
    pub tile_size: u32,
    pub load_threads: u32,
    pub process_threads: u32,
    pub save_threads: u32,
}

impl Default for GpuDirective {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GpuDirective {
    /// 外部ツールの既定値（タイル自動、スレッド 1:2:2）で作成
    pub fn new(id: u32) -> Self {
        Self {
            id,
            tile_size: AUTO_TILE_SIZE,
            load_threads: 1,
            process_threads: 2,
            save_threads: 2,
        }
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_threads(mut self, load: u32, process: u32, save: u32) -> Self {
        self.load_threads = load;
        self.process_threads = process;
        self.save_threads = save;
        self
    }

    /// 外部ツールが受け付けるタイルサイズかどうか
    pub fn has_supported_tile_size(&self) -> bool {
        self.tile_size == AUTO_TILE_SIZE || self.tile_size > 31
    }

    /// `-j` に渡す `load:process:save` 形式
    pub fn thread_spec(&self) -> String {
        format!(
            "{}:{}:{}",
            self.load_threads, self.process_threads, self.save_threads
        )
    }
}
