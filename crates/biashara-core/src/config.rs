//! Application settings
//!
//! Settings resolve in three layers, later layers winning:
//! 1. Embedded defaults (`config/biashara.toml`, compiled into the binary)
//! 2. Override file (`$BIASHARA_CONFIG`, else ~/.local/share/biashara/config.toml)
//! 3. Environment variables (`HF_API_KEY`, `BIASHARA_*`)

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::classifier::{DEFAULT_HOST, DEFAULT_MODEL};
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/biashara.toml");

/// Which zero-shot backend the classifier talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    HuggingFace,
    Mock,
    /// Rules only; unmatched descriptions become Uncategorized
    None,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HuggingFace => "huggingface",
            Self::Mock => "mock",
            Self::None => "none",
        }
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            "mock" => Ok(Self::Mock),
            "none" | "off" | "disabled" => Ok(Self::None),
            other => Err(Error::Config(format!("Unknown classifier backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub backend: BackendKind,
    pub host: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub concurrency: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::HuggingFace,
            host: DEFAULT_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(15),
            concurrency: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("biashara.db"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory of static dashboard files, served as the fallback route
    pub static_dir: Option<PathBuf>,
    /// CORS allow list; empty means permissive
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: Some(PathBuf::from("public")),
            allowed_origins: Vec::new(),
        }
    }
}

/// Fully resolved settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub classifier: ClassifierSettings,
    pub database: DatabaseSettings,
    pub server: ServerSettings,
}

impl Settings {
    /// Load from the default locations and the process environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load with an explicit override file
    ///
    /// A missing override file is not an error; the embedded defaults are used.
    pub fn load_from(override_path: Option<&Path>) -> Result<Self> {
        let mut settings = parse_settings(DEFAULT_CONFIG)?;

        let path = override_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("BIASHARA_CONFIG").map(PathBuf::from))
            .or_else(default_config_path);

        if let Some(path) = path.filter(|p| p.exists()) {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            settings.apply(parse_raw(&content)?)?;
        }

        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Overlay environment variables read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("HF_API_KEY") {
            self.classifier.api_key = Some(key);
        }
        if let Some(backend) = get("BIASHARA_CLASSIFIER_BACKEND") {
            self.classifier.backend = backend.parse()?;
        }
        if let Some(host) = get("BIASHARA_CLASSIFIER_HOST") {
            self.classifier.host = host;
        }
        if let Some(model) = get("BIASHARA_CLASSIFIER_MODEL") {
            self.classifier.model = model;
        }
        if let Some(secs) = get("BIASHARA_CLASSIFIER_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("BIASHARA_CLASSIFIER_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            self.classifier.timeout = classifier_timeout(secs, "BIASHARA_CLASSIFIER_TIMEOUT_SECS")?;
        }
        if let Some(path) = get("BIASHARA_DB") {
            self.database.path = PathBuf::from(path);
        }
        Ok(())
    }

    fn apply(&mut self, raw: RawSettings) -> Result<()> {
        if let Some(c) = raw.classifier {
            if let Some(backend) = c.backend {
                self.classifier.backend = backend;
            }
            if let Some(host) = c.host {
                self.classifier.host = host;
            }
            if let Some(model) = c.model {
                self.classifier.model = model;
            }
            if let Some(key) = c.api_key {
                self.classifier.api_key = Some(key);
            }
            if let Some(secs) = c.timeout_secs {
                self.classifier.timeout = classifier_timeout(secs, "classifier.timeout_secs")?;
            }
            if let Some(n) = c.concurrency {
                self.classifier.concurrency = n.max(1);
            }
        }

        if let Some(d) = raw.database {
            if let Some(path) = d.path {
                self.database.path = path;
            }
        }

        if let Some(s) = raw.server {
            if let Some(host) = s.host {
                self.server.host = host;
            }
            if let Some(port) = s.port {
                self.server.port = port;
            }
            if let Some(dir) = s.static_dir {
                self.server.static_dir = if dir.as_os_str().is_empty() {
                    None
                } else {
                    Some(dir)
                };
            }
            if let Some(origins) = s.allowed_origins {
                self.server.allowed_origins = origins;
            }
        }
        Ok(())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("biashara").join("config.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawSettings {
    classifier: Option<RawClassifier>,
    database: Option<RawDatabase>,
    server: Option<RawServer>,
}

#[derive(Debug, Deserialize)]
struct RawClassifier {
    #[serde(default, deserialize_with = "de_backend")]
    backend: Option<BackendKind>,
    host: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
    concurrency: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawDatabase {
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawServer {
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
    allowed_origins: Option<Vec<String>>,
}

fn de_backend<'de, D>(deserializer: D) -> std::result::Result<Option<BackendKind>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| s.parse().map_err(serde::de::Error::custom))
        .transpose()
}

fn parse_raw(content: &str) -> Result<RawSettings> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))
}

/// Parse settings from TOML content on top of the built-in defaults
pub fn parse_settings(content: &str) -> Result<Settings> {
    let mut settings = Settings::default();
    settings.apply(parse_raw(content)?)?;
    Ok(settings)
}

/// A zero timeout would fail every model call, so it is refused
fn classifier_timeout(secs: u64, source: &str) -> Result<Duration> {
    if secs == 0 {
        return Err(Error::Config(format!("{} must be at least 1 second", source)));
    }
    Ok(Duration::from_secs(secs))
}
