use crate::options::FeatureOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub segmentation: Segmentation,
    #[serde(default)]
    pub summarization: Summarization,
    #[serde(default)]
    pub options: FeatureOptions,
    #[serde(default)]
    pub extraction: Extraction,
    #[serde(default)]
    pub postprocess: Postprocess,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub security: Security,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// A stable, normalization-friendly string for hashing.
    pub fn normalized_for_hash(&self) -> String {
        toml::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub provider: String,
    pub model: String,
    /// Overrides the provider's default endpoint when non-empty.
    pub base_url: String,
    /// Overrides the provider's default API-key variable when non-empty.
    pub api_key_env: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}
impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            base_url: "".into(),
            api_key_env: "".into(),
            temperature: 0.3,
            timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Segmentation {
    pub summary_chunk_size: usize,
    pub summary_overlap: usize,
    pub aspect_chunk_size: usize,
    pub aspect_overlap: usize,
}
impl Default for Segmentation {
    fn default() -> Self {
        Self {
            summary_chunk_size: 4000,
            summary_overlap: 400,
            aspect_chunk_size: 2000,
            aspect_overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Summarization {
    /// Joined partial summaries longer than this are reduced in groups first.
    pub reduce_max_chars: usize,
}
impl Default for Summarization {
    fn default() -> Self {
        Self {
            reduce_max_chars: 12_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Extraction {
    pub python_exe: String,
    pub scripts_dir: String,
    pub timeout_seconds: u64,
    pub max_input_file_bytes: u64,
}
impl Default for Extraction {
    fn default() -> Self {
        Self {
            python_exe: "python3".into(),
            scripts_dir: "scripts".into(),
            timeout_seconds: 120,
            max_input_file_bytes: 200 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Postprocess {
    pub normalize_unicode: bool,
    pub normalize_newlines: bool,
    pub trim_trailing_whitespace: bool,
    pub control_chars_to_sanitize: Vec<u8>,
    pub remove_repeated_lines: bool,
    pub repeated_line_min_occurrences: u32,
    pub repeated_line_max_length: u32,
    pub remove_by_regex: bool,
    pub regex: PostprocessRegex,
}
impl Default for Postprocess {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            normalize_newlines: true,
            trim_trailing_whitespace: true,
            control_chars_to_sanitize: (0u8..32).filter(|c| !matches!(c, 9 | 10 | 13)).collect(),
            remove_repeated_lines: true,
            repeated_line_min_occurrences: 6,
            repeated_line_max_length: 120,
            remove_by_regex: true,
            regex: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocessRegex {
    pub patterns: Vec<String>,
}
impl Default for PostprocessRegex {
    fn default() -> Self {
        Self {
            patterns: vec!["(?i)^(page\\s+\\d+|\\d+\\s*/\\s*\\d+)$".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub out_dir: String,
    pub write_markdown: bool,
    pub write_text: bool,
    pub write_document_json: bool,
    pub write_report_json: bool,
    pub markdown_filename: String,
    pub text_filename: String,
    pub document_filename: String,
    pub report_filename: String,
    pub dump_effective_config: bool,
    pub print_summary: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            out_dir: "out".into(),
            write_markdown: true,
            write_text: true,
            write_document_json: true,
            write_report_json: true,
            markdown_filename: "explanation.md".into(),
            text_filename: "explanation.txt".into(),
            document_filename: "document.json".into(),
            report_filename: "report.json".into(),
            dump_effective_config: true,
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: true,
            file_path: "".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Security {
    pub reject_url_inputs: bool,
    pub pin_scripts_dir: bool,
}
impl Default for Security {
    fn default() -> Self {
        Self {
            reject_url_inputs: true,
            pin_scripts_dir: true,
        }
    }
}
