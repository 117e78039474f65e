use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Speech provider
    pub tts_api_keys: Vec<String>,
    pub tts_base_url: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub tts_max_chunk_bytes: usize,
    pub tts_concurrency: usize,
    pub tts_backoff_ms: u64,
    // Object storage
    pub storage_url: String,
    pub storage_service_key: String,
    pub storage_bucket: String,
    // Trigger endpoint
    pub narration_api_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let tts_api_keys = split_keys(&env::var("TTS_API_KEYS")?);
        if tts_api_keys.is_empty() {
            return Err("TTS_API_KEYS must list at least one key".into());
        }

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .as_str()
            {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            tts_api_keys,
            tts_base_url: env::var("TTS_BASE_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }),
            tts_model: env::var("TTS_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash-preview-tts".to_string()),
            tts_voice: env::var("TTS_VOICE").unwrap_or_else(|_| "Kore".to_string()),
            tts_max_chunk_bytes: env::var("TTS_MAX_CHUNK_BYTES")
                .unwrap_or_else(|_| "4500".to_string())
                .parse()?,
            tts_concurrency: env::var("TTS_CONCURRENCY")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
            tts_backoff_ms: env::var("TTS_BACKOFF_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
            storage_url: env::var("STORAGE_URL")?,
            storage_service_key: env::var("STORAGE_SERVICE_KEY")?,
            storage_bucket: env::var("STORAGE_BUCKET").unwrap_or_else(|_| "narrations".to_string()),
            narration_api_token: env::var("NARRATION_API_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
        };

        Ok(config)
    }
}

/// Comma separated keys, blanks dropped, order kept.
pub fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
