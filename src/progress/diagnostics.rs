// 直近の診断出力を保持する固定長バッファ

use std::collections::VecDeque;

pub const DEFAULT_DIAGNOSTIC_CAPACITY: usize = 16;

/// 容量を超えると古い行から捨てるリングバッファ
#[derive(Debug, Clone)]
pub struct DiagnosticBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for DiagnosticBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DIAGNOSTIC_CAPACITY)
    }
}

impl DiagnosticBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 古い順の行
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// 古い順に改行で連結したメッセージ（空なら `None`）
    pub fn to_message(&self) -> Option<String> {
        if self.lines.is_empty() {
            return None;
        }
        Some(self.lines().collect::<Vec<_>>().join("\n"))
    }
}
