use serde::{de::DeserializeOwned, Deserialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::application::{PipelineSettings, ResumeSettings};
use crate::domain::layout::PageSpec;

const CONFIG_FILE: &str = "config.yaml";
const PROMPTS_FILE: &str = "prompts.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{var} must be set for the {feature}")]
    MissingEnv {
        var: &'static str,
        feature: &'static str,
    },
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub rag: RagConfig,
    pub storage: StorageConfig,
    pub resume: ResumeConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    /// Normally supplied through `OPEN_ROUTER_API_KEY`.
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub referer: String,
    pub title: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "anthropic/claude-3-opus:beta".to_string(),
            api_key: None,
            max_tokens: 1000,
            temperature: 0.7,
            timeout_seconds: 30,
            referer: "https://resume.in".to_string(),
            title: "Resume.in Chatbot".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    Hashed,
    OpenAi,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hashed,
            model: "text-embedding-ada-002".to_string(),
            dimension: 1536,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
    pub max_history: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_history: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextBackend {
    Memory,
    Qdrant,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub conversations: ConversationBackend,
    pub context: ContextBackend,
    pub redis_url: String,
    pub qdrant_url: String,
    pub collection: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            conversations: ConversationBackend::Memory,
            context: ContextBackend::Memory,
            redis_url: "redis://localhost:6379".to_string(),
            qdrant_url: "http://localhost:6334".to_string(),
            collection: "context_documents".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResumeConfig {
    pub output_dir: PathBuf,
    pub cleanup_delay_seconds: u64,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output/resume_pdfs"),
            cleanup_delay_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub chat: ChatPrompts,
    pub resume: ResumePrompts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatPrompts {
    pub system: String,
    pub fallback: String,
    pub not_configured: String,
}

impl Default for ChatPrompts {
    fn default() -> Self {
        let settings = PipelineSettings::default();
        Self {
            system: settings.system_prompt,
            fallback: settings.fallback_answer,
            not_configured: "I'm sorry, but my connection to the language model is not \
                             configured correctly. Please check your OPEN_ROUTER_API_KEY \
                             environment variable."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResumePrompts {
    pub hint: String,
}

impl Default for ResumePrompts {
    fn default() -> Self {
        Self {
            hint: "I've saved this information for your resume. When you're ready, you can \
                   generate your resume by sending a request to the generate-resume endpoint."
                .to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `CONFIG_DIR` (default `config`) and applies environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
        let mut config = Self::load_from(dir)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Missing files fall back to built-in defaults.
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        Ok(Self {
            config: read_yaml(&dir.join(CONFIG_FILE))?,
            prompts: read_yaml(&dir.join(PROMPTS_FILE))?,
        })
    }

    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let cfg = &mut self.config;

        if let Some(host) = lookup("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            cfg.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SERVER_PORT",
                value: port,
            })?;
        }
        if let Some(key) = lookup("OPEN_ROUTER_API_KEY").filter(|k| !k.trim().is_empty()) {
            cfg.llm.api_key = Some(key);
        }
        if let Some(model) = lookup("OPEN_ROUTER_MODEL").filter(|m| !m.trim().is_empty()) {
            cfg.llm.model = model;
        }
        if let Some(url) = lookup("REDIS_URL") {
            cfg.storage.redis_url = url;
        }
        if let Some(url) = lookup("QDRANT_URL") {
            cfg.storage.qdrant_url = url;
        }

        Ok(())
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            system_prompt: self.prompts.chat.system.clone(),
            fallback_answer: self.prompts.chat.fallback.clone(),
            max_history: self.config.rag.max_history,
            timeout: Duration::from_secs(self.config.llm.timeout_seconds),
        }
    }

    pub fn resume_settings(&self) -> ResumeSettings {
        ResumeSettings {
            output_dir: self.config.resume.output_dir.clone(),
            cleanup_delay: Duration::from_secs(self.config.resume.cleanup_delay_seconds),
            page: PageSpec::a4(),
        }
    }
}

fn read_yaml<T: DeserializeOwned + Default>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Ok(T::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_files_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.config.server.port, 8080);
        assert_eq!(config.config.rag.top_k, 5);
        assert_eq!(config.config.rag.max_history, 10);
        assert_eq!(config.config.llm.max_tokens, 1000);
        assert_eq!(config.config.embedding.provider, EmbeddingProvider::Hashed);
        assert!(config.prompts.chat.system.starts_with("You are a helpful assistant."));
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "rag:\n  top_k: 3\nstorage:\n  conversations: redis\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(PROMPTS_FILE),
            "chat:\n  system: \"Be brief. \"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.config.rag.top_k, 3);
        assert_eq!(config.config.rag.max_history, 10);
        assert_eq!(config.config.storage.conversations, ConversationBackend::Redis);
        assert_eq!(config.config.storage.context, ContextBackend::Memory);
        assert_eq!(config.prompts.chat.system, "Be brief. ");
        assert!(config.prompts.chat.fallback.starts_with("I'm sorry"));
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "rag: [unclosed").unwrap();

        let err = AppConfig::load_from(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SERVER_PORT", "9000"),
            ("OPEN_ROUTER_API_KEY", "sk-test"),
            ("OPEN_ROUTER_MODEL", "meta/llama"),
            ("REDIS_URL", "redis://cache:6379"),
        ]);
        let mut config = AppConfig::default();

        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.config.server.port, 9000);
        assert_eq!(config.config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.config.llm.model, "meta/llama");
        assert_eq!(config.config.storage.redis_url, "redis://cache:6379");
        assert_eq!(config.config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|k| (k == "SERVER_PORT").then(|| "eighty".to_string()))
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue { key: "SERVER_PORT", .. }));
    }

    #[test]
    fn test_blank_api_key_ignored() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(|k| (k == "OPEN_ROUTER_API_KEY").then(String::new))
            .unwrap();
        assert!(config.config.llm.api_key.is_none());
    }

    #[test]
    fn test_settings_derived_from_config() {
        let config = AppConfig::default();

        let pipeline = config.pipeline_settings();
        assert_eq!(pipeline.timeout, Duration::from_secs(30));
        assert_eq!(pipeline.max_history, 10);

        let resume = config.resume_settings();
        assert_eq!(resume.cleanup_delay, Duration::from_secs(5));
    }
}
