use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix for environment overrides, e.g. `TIKTRANSLATE__SYSTEM_CONFIG__PORT=8080`.
pub const ENV_PREFIX: &str = "TIKTRANSLATE";

static ENV_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{(\w+)\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub inference_config: InferenceConfig,
    #[serde(default)]
    pub translation_config: TranslationConfig,
    #[serde(default)]
    pub chat_config: ChatConfig,
    #[serde(default)]
    pub tts_config: TtsConfig,
    #[serde(default)]
    pub session_config: SessionConfig,
    #[serde(default)]
    pub asset_config: AssetConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

/// Connection to the model-serving service that hosts the pretrained models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default = "default_inference_url")]
    pub base_url: String,
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

fn default_inference_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_inference_timeout() -> u64 {
    120
}

fn default_max_concurrent_requests() -> usize {
    4
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_inference_url(),
            timeout_secs: default_inference_timeout(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

impl InferenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How the translation model expects its language metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TranslationFamily {
    /// Multilingual model steered by `src_lang` and a forced BOS language token.
    M2m100,
    /// Many-to-one MarianMT model; input is prefixed with `>src<`.
    MarianMultilingual,
    /// Single-pair MarianMT model.
    MarianPair { source: String, target: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_translation_model")]
    pub model: String,
    #[serde(default = "default_translation_family")]
    pub family: TranslationFamily,
    #[serde(default = "default_translation_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default)]
    pub truncation: bool,
}

fn default_translation_model() -> String {
    "facebook/m2m100_418M".to_string()
}

fn default_translation_family() -> TranslationFamily {
    TranslationFamily::M2m100
}

fn default_translation_max_new_tokens() -> u32 {
    200
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_translation_model(),
            family: default_translation_family(),
            max_new_tokens: default_translation_max_new_tokens(),
            truncation: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// `causal_lm` or `chat_pipeline`.
    #[serde(default = "default_chat_backend")]
    pub backend: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_chat_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default = "default_true")]
    pub do_sample: bool,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default)]
    pub top_k: Option<u32>,
    #[serde(default)]
    pub repetition_penalty: Option<f32>,
}

fn default_chat_backend() -> String {
    "causal_lm".to_string()
}

fn default_chat_model() -> String {
    "facebook/opt-1.3b".to_string()
}

fn default_chat_max_new_tokens() -> u32 {
    50
}

fn default_true() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.9
}

fn default_top_p() -> f32 {
    0.9
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            backend: default_chat_backend(),
            model: default_chat_model(),
            max_new_tokens: default_chat_max_new_tokens(),
            do_sample: true,
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: None,
            repetition_penalty: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_tts_url")]
    pub base_url: String,
    #[serde(default = "default_max_chars")]
    pub max_chars_per_request: usize,
    #[serde(default)]
    pub slow: bool,
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,
}

fn default_tts_url() -> String {
    "https://translate.google.com/translate_tts".to_string()
}

fn default_max_chars() -> usize {
    100
}

fn default_tts_timeout() -> u64 {
    30
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_tts_url(),
            max_chars_per_request: default_max_chars(),
            slow: false,
            timeout_secs: default_tts_timeout(),
        }
    }
}

impl TtsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_idle_ttl")]
    pub idle_ttl_secs: u64,
    /// Zero keeps every turn.
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,
}

fn default_cookie_name() -> String {
    "tiktranslate_session".to_string()
}

fn default_idle_ttl() -> u64 {
    60 * 60
}

fn default_max_turns() -> usize {
    200
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            idle_ttl_secs: default_idle_ttl(),
            max_turns: default_max_turns(),
        }
    }
}

impl SessionConfig {
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_secs(self.idle_ttl_secs)
    }
}

/// Lifetime policy for generated speech files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
    /// Zero disables the count limit.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_max_age() -> u64 {
    30 * 60
}

fn default_max_files() -> usize {
    500
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_max_age(),
            max_files: default_max_files(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl AssetConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        let lower = path.to_string_lossy().to_lowercase();
        if lower.ends_with(".jsonld") || lower.ends_with(".json") {
            ConfigFormat::Json
        } else {
            ConfigFormat::Yaml
        }
    }
}

impl Config {
    /// Candidate config files, first match wins.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()));

        let mut paths: Vec<PathBuf> = Vec::new();
        if let Ok(path) = std::env::var("CONFIG_PATH") {
            paths.push(PathBuf::from(path));
        }
        for name in ["conf.jsonld", "conf.json", "conf.yaml"] {
            paths.push(PathBuf::from(name));
            if let Some(dir) = &exe_dir {
                paths.push(dir.join(name));
            }
        }
        paths
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Configuration file not found: {}", path.display()))?;
        let (content, _) = encoding_rs::UTF_8.decode_with_bom_removal(&bytes);
        Self::from_str(&content, ConfigFormat::from_path(path), ENV_PREFIX)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Parse a config document, substitute `${VAR}` placeholders and layer
    /// `<env_prefix>__SECTION__KEY` environment overrides on top.
    pub fn from_str(content: &str, format: ConfigFormat, env_prefix: &str) -> Result<Self> {
        let content = substitute_env(content);

        let mut document: serde_json::Value = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(&content)?,
        };
        if document.is_null() {
            document = serde_json::json!({});
        }
        // JSON-LD context carries no settings
        if let Some(obj) = document.as_object_mut() {
            obj.remove("@context");
        }

        let layered = config::Config::builder()
            .add_source(config::File::from_str(
                &document.to_string(),
                config::FileFormat::Json,
            ))
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(layered.try_deserialize()?)
    }
}

fn substitute_env(content: &str) -> String {
    ENV_PLACEHOLDER
        .replace_all(content, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_str("{}", ConfigFormat::Json, "TT_TEST_EMPTY").unwrap();
        assert_eq!(config.system_config.port, 5000);
        assert_eq!(config.translation_config.family, TranslationFamily::M2m100);
        assert_eq!(config.chat_config.max_new_tokens, 50);
        assert!((config.chat_config.temperature - 0.9).abs() < f32::EPSILON);
        assert_eq!(config.session_config.cookie_name, "tiktranslate_session");
    }

    #[test]
    fn jsonld_context_is_ignored() {
        let doc = r#"{
            "@context": {"@vocab": "https://example.org/config#"},
            "system_config": {"port": 9000, "static_dir": "public"},
            "chat_config": {"backend": "chat_pipeline", "model": "deepseek-ai/DeepSeek-R1"}
        }"#;
        let config = Config::from_str(doc, ConfigFormat::Json, "TT_TEST_JSONLD").unwrap();
        assert_eq!(config.system_config.port, 9000);
        assert_eq!(config.system_config.static_dir, "public");
        assert_eq!(config.chat_config.backend, "chat_pipeline");
    }

    #[test]
    fn yaml_with_marian_pair() {
        let doc = r#"
translation_config:
  model: Helsinki-NLP/opus-mt-en-fr
  family:
    kind: marian_pair
    source: en
    target: fr
"#;
        let config = Config::from_str(doc, ConfigFormat::Yaml, "TT_TEST_YAML").unwrap();
        assert_eq!(
            config.translation_config.family,
            TranslationFamily::MarianPair {
                source: "en".to_string(),
                target: "fr".to_string()
            }
        );
    }

    #[test]
    fn placeholders_come_from_environment() {
        std::env::set_var("TT_TEST_INFERENCE_URL", "http://models:9000");
        let doc = r#"{"inference_config": {"base_url": "${TT_TEST_INFERENCE_URL}"}}"#;
        let config = Config::from_str(doc, ConfigFormat::Json, "TT_TEST_PLACEHOLDER").unwrap();
        assert_eq!(config.inference_config.base_url, "http://models:9000");
    }

    #[test]
    fn unknown_placeholder_is_left_alone() {
        assert_eq!(substitute_env("${TT_TEST_SURELY_UNSET}"), "${TT_TEST_SURELY_UNSET}");
    }

    #[test]
    fn environment_overrides_file_values() {
        std::env::set_var("TT_TEST_OVERRIDE__SYSTEM_CONFIG__PORT", "8081");
        let doc = r#"{"system_config": {"port": 9000}}"#;
        let config = Config::from_str(doc, ConfigFormat::Json, "TT_TEST_OVERRIDE").unwrap();
        assert_eq!(config.system_config.port, 8081);
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("conf.jsonld")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("conf.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("conf.yaml")), ConfigFormat::Yaml);
    }
}
