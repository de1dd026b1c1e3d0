use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
    pub render: RenderConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_ms: u64,
    /// Resolved once at load time, from the config file or GEMINI_API_KEY
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            temperature: 0.8,
            max_output_tokens: 8192,
            timeout_ms: 300000,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Rendering engine executable
    pub program: String,
    /// Combined preview/low-quality flag passed to manim
    pub quality_flag: String,
    /// Quality directory manim nests rendered videos under
    pub quality_dir: String,
    /// Directory source files are written to and manim runs in
    pub workdir: PathBuf,
    pub timeout_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            program: "manim".to_string(),
            quality_flag: "-pql".to_string(),
            quality_dir: "480p15".to_string(),
            workdir: PathBuf::from("."),
            timeout_ms: 600000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum correction cycles per request; renders are bounded by this + 1
    pub max_attempts: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            llm: LlmConfig::default(),
            render: RenderConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file_chain(config_path)?;

        // Credentials are resolved exactly once per process; components receive
        // the key at construction and never read the environment themselves.
        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var("GEMINI_API_KEY").ok();
        }

        Ok(config)
    }

    fn load_file_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.llm.max_output_tokens, 8192);
        assert_eq!(config.render.program, "manim");
        assert_eq!(config.render.quality_flag, "-pql");
        assert_eq!(config.render.quality_dir, "480p15");
        assert_eq!(config.pipeline.max_attempts, 3);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "llm:\n  model: gemini-2.5-pro\npipeline:\n  max_attempts: 5\n"
        )
        .unwrap();

        let path = file.path().to_path_buf();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert_eq!(config.pipeline.max_attempts, 5);
        // untouched sections fall back to defaults
        assert_eq!(config.render.program, "manim");
    }

    #[test]
    fn test_load_missing_explicit_file_errors() {
        let path = PathBuf::from("/nonexistent/scenegen.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_api_key_from_file_wins() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "llm:\n  api_key: from-file\n").unwrap();

        let path = file.path().to_path_buf();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("log_level: debug\n").unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.llm.temperature, 0.8);
        assert_eq!(config.render.timeout_ms, 600000);
    }
}
