// ディレクトリ入力時の出力ファイル数による進捗推定

use std::path::Path;
use walkdir::WalkDir;

/// 入力ディレクトリ直下のファイル数（再帰しない）
pub fn count_input_files(directory: &Path) -> usize {
    WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .count()
}

/// 出力ファイルが1つ増えるごとに `1 / total_files` ずつ進む
#[derive(Debug, Clone)]
pub struct FileCountTracker {
    total_files: usize,
    created_files: usize,
}

impl FileCountTracker {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            created_files: 0,
        }
    }

    /// 出力ファイル作成を記録し、新しい進捗を返す（入力が空なら `None`）
    pub fn record_created(&mut self) -> Option<f64> {
        if self.total_files == 0 {
            return None;
        }
        self.created_files += 1;
        Some((self.created_files as f64 / self.total_files as f64).min(1.0))
    }

    pub fn created_files(&self) -> usize {
        self.created_files
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }
}
