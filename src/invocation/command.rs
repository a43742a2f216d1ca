// 外部アップスケーラーのコマンドライン構築

use super::{GpuDirective, OutputFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SCALE: u32 = 4;
pub const DEFAULT_MODEL_DIRECTORY: &str = "models";
pub const DEFAULT_MODEL_NAME: &str = "realesr-animevideov3";

/// 外部ツール1回分の起動設定
///
/// 実行ファイルと入力パスの存在は起動時に確認する（ここでは確認しない）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationSpec {
    pub executable_path: String,
    pub input_path: String,
    pub output_path: String,
    pub scale: u32,
    pub model_directory: String,
    pub model_name: String,
    pub output_format: OutputFormat,
    pub tta_enabled: bool,
    /// 空の場合は外部ツールがGPUを自動選択する
    pub gpu_directives: Vec<GpuDirective>,
}

impl Default for InvocationSpec {
    fn default() -> Self {
        Self {
            executable_path: String::new(),
            input_path: String::new(),
            output_path: String::new(),
            scale: DEFAULT_SCALE,
            model_directory: DEFAULT_MODEL_DIRECTORY.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            output_format: OutputFormat::Default,
            tta_enabled: false,
            gpu_directives: Vec::new(),
        }
    }
}

/// コマンドライン上の1フラグ
struct Flag {
    name: &'static str,
    value: Option<String>,
    quoted: bool,
}

impl Flag {
    fn switch(name: &'static str) -> Self {
        Self {
            name,
            value: None,
            quoted: false,
        }
    }

    fn plain(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: Some(value.into()),
            quoted: false,
        }
    }

    fn quoted(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: Some(value.into()),
            quoted: true,
        }
    }
}

impl InvocationSpec {
    pub fn new(
        executable_path: impl Into<String>,
        input_path: impl Into<String>,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            executable_path: executable_path.into(),
            input_path: input_path.into(),
            output_path: output_path.into(),
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_model_directory(mut self, model_directory: impl Into<String>) -> Self {
        self.model_directory = model_directory.into();
        self
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }

    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    pub fn with_tta(mut self, enabled: bool) -> Self {
        self.tta_enabled = enabled;
        self
    }

    pub fn with_gpu(mut self, directive: GpuDirective) -> Self {
        self.gpu_directives.push(directive);
        self
    }

    /// 外部ツールに渡すフラグを固定順で並べる
    ///
    /// scale は 1 < scale < 4 のときだけ出力し、それ以外は外部ツールの既定に任せる。
    fn flags(&self) -> Vec<Flag> {
        let mut flags = vec![
            Flag::quoted("-i", self.input_path.as_str()),
            Flag::quoted("-o", self.output_path.as_str()),
        ];

        if self.scale > 1 && self.scale < 4 {
            flags.push(Flag::plain("-s", self.scale.to_string()));
        }

        if self.model_directory != DEFAULT_MODEL_DIRECTORY {
            flags.push(Flag::quoted("-m", self.model_directory.as_str()));
        }

        flags.push(Flag::plain("-n", self.model_name.as_str()));

        if let Some(format) = self.output_format.flag_value() {
            flags.push(Flag::plain("-f", format));
        }

        if self.tta_enabled {
            flags.push(Flag::switch("-x"));
        }

        if !self.gpu_directives.is_empty() {
            let ids = self.join_directives(|d| d.id.to_string());
            let tiles = self.join_directives(|d| d.tile_size.to_string());
            let threads = self.join_directives(GpuDirective::thread_spec);

            flags.push(Flag::plain("-g", ids));
            flags.push(Flag::plain("-t", tiles));
            flags.push(Flag::plain("-j", threads));
        }

        flags
    }

    fn join_directives(&self, field: impl Fn(&GpuDirective) -> String) -> String {
        self.gpu_directives
            .iter()
            .map(field)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// 外部ツールのコマンドライン文字列を構築
    ///
    /// パスは与えられたまま引用符で囲む（埋め込みの引用符はエスケープしない）。
    pub fn compile(&self) -> String {
        self.flags()
            .into_iter()
            .map(|flag| match (flag.value, flag.quoted) {
                (Some(value), true) => format!("{} \"{}\"", flag.name, value),
                (Some(value), false) => format!("{} {}", flag.name, value),
                (None, _) => flag.name.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `compile()` と同じ内容を、プロセス起動用のトークン列として返す
    pub fn arguments(&self) -> Vec<String> {
        let mut arguments = Vec::new();
        for flag in self.flags() {
            arguments.push(flag.name.to_string());
            if let Some(value) = flag.value {
                arguments.push(value);
            }
        }
        arguments
    }

    /// JSONから設定をデシリアライズ（欠けている項目は既定値）
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("起動設定のJSON解析に失敗しました")
    }

    /// JSONファイルから設定を読み込む
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("起動設定ファイルを読み込めません: {}", path.display()))?;
        Self::from_json(&json)
    }

    /// 設定をJSONにシリアライズ
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("起動設定のシリアライズに失敗しました")
    }
}
