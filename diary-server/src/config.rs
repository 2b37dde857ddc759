//! Configuration resolution for diary-server
//!
//! Every setting resolves CLI → environment → TOML → compiled default.
//! clap covers the first two tiers; `diary_common::config` covers the
//! TOML tier.

use clap::Parser;
use diary_common::config::{self, TomlConfig};
use diary_common::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BIND_HOST: &str = "127.0.0.1";
const DEFAULT_BIND_PORT: u16 = 8031;
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_EMOTION_URL: &str = "http://127.0.0.1:8041";
const DEFAULT_EMBEDDING_URL: &str = "http://127.0.0.1:8042";
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
const DEFAULT_SESSION_CAPACITY: usize = 1024;

/// Command-line arguments (each also readable from the environment)
#[derive(Debug, Default, Parser)]
#[command(name = "diary-server", about = "Deep Diary journaling service")]
pub struct Args {
    /// Path to a TOML config file (skips the platform lookup)
    #[arg(long, env = "DEEP_DIARY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Bind host for the HTTP server
    #[arg(long, env = "DEEP_DIARY_BIND_HOST")]
    pub bind_host: Option<String>,

    /// Bind port for the HTTP server
    #[arg(long, env = "DEEP_DIARY_BIND_PORT")]
    pub bind_port: Option<u16>,

    /// API key for the hosted generative model
    #[arg(long, env = "GEMINI_API_KEY")]
    pub gemini_api_key: Option<String>,

    /// Model name for the hosted generative model
    #[arg(long, env = "DEEP_DIARY_GEMINI_MODEL")]
    pub gemini_model: Option<String>,

    /// Base URL of the emotion classification service
    #[arg(long, env = "DEEP_DIARY_EMOTION_URL")]
    pub emotion_service_url: Option<String>,

    /// Base URL of the text embedding service
    #[arg(long, env = "DEEP_DIARY_EMBEDDING_URL")]
    pub embedding_service_url: Option<String>,

    /// Path to the song catalog JSON file
    #[arg(long, env = "DEEP_DIARY_CATALOG")]
    pub catalog_path: Option<PathBuf>,

    /// Directory where saved diaries are written
    #[arg(long, env = "DEEP_DIARY_DIARY_DIR")]
    pub diary_dir: Option<PathBuf>,

    /// Idle session lifetime in seconds
    #[arg(long, env = "DEEP_DIARY_SESSION_TTL_SECS")]
    pub session_ttl_secs: Option<u64>,

    /// Maximum number of live sessions
    #[arg(long, env = "DEEP_DIARY_SESSION_CAPACITY")]
    pub session_capacity: Option<usize>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_host: String,
    pub bind_port: u16,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub emotion_service_url: String,
    pub embedding_service_url: String,
    pub catalog_path: PathBuf,
    pub diary_dir: PathBuf,
    pub session_ttl: Duration,
    pub session_capacity: usize,
}

impl ServerConfig {
    /// Merge CLI/env arguments over the TOML file over defaults
    pub fn resolve(args: Args) -> Result<Self> {
        let toml: TomlConfig = match &args.config {
            Some(path) => config::load_toml_config(path)?,
            None => config::load_default_config()?,
        };

        let gemini_api_key = args
            .gemini_api_key
            .or(toml.gemini_api_key)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "Gemini API key not configured. Please configure using one of:\n\
                     1. Environment: GEMINI_API_KEY=your-key-here\n\
                     2. CLI: --gemini-api-key your-key-here\n\
                     3. TOML config: gemini_api_key = \"your-key\""
                        .to_string(),
                )
            })?;

        let data_root = default_data_root();

        Ok(Self {
            bind_host: args
                .bind_host
                .or(toml.bind_host)
                .unwrap_or_else(|| DEFAULT_BIND_HOST.to_string()),
            bind_port: args
                .bind_port
                .or(toml.bind_port)
                .unwrap_or(DEFAULT_BIND_PORT),
            gemini_api_key,
            gemini_model: args
                .gemini_model
                .or(toml.gemini_model)
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            emotion_service_url: args
                .emotion_service_url
                .or(toml.emotion_service_url)
                .unwrap_or_else(|| DEFAULT_EMOTION_URL.to_string()),
            embedding_service_url: args
                .embedding_service_url
                .or(toml.embedding_service_url)
                .unwrap_or_else(|| DEFAULT_EMBEDDING_URL.to_string()),
            catalog_path: args
                .catalog_path
                .or(toml.catalog_path.map(PathBuf::from))
                .unwrap_or_else(|| data_root.join("catalog.json")),
            diary_dir: args
                .diary_dir
                .or(toml.diary_dir.map(PathBuf::from))
                .unwrap_or_else(|| data_root.join("diaries")),
            session_ttl: Duration::from_secs(
                args.session_ttl_secs
                    .or(toml.session_ttl_secs)
                    .unwrap_or(DEFAULT_SESSION_TTL_SECS),
            ),
            session_capacity: args
                .session_capacity
                .or(toml.session_capacity)
                .unwrap_or(DEFAULT_SESSION_CAPACITY),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }
}

/// OS-dependent default data directory
fn default_data_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("deep-diary"))
        .unwrap_or_else(|| PathBuf::from("./deep-diary-data"))
}
