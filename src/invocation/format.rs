use serde::{Deserialize, Serialize};

/// 外部ツールが出力できる画像形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 外部ツールの既定（`-f` を渡さない）
    #[default]
    Default,
    Png,
    Jpg,
    Webp,
}

impl OutputFormat {
    /// `-f` に渡す名前。`Default` の場合は `None`
    pub const fn flag_value(&self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::Png => Some("png"),
            Self::Jpg => Some("jpg"),
            Self::Webp => Some("webp"),
        }
    }
}
