// config.rs
use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";
pub const DEFAULT_HISTORY_COLLECTION: &str = "geriapp-history";
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yaml";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
}

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub api_key: Option<String>,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai: OpenAiConfig,
    /// `None` when no Firebase project is configured; history then only goes to the log.
    pub firestore: Option<FirestoreConfig>,
    pub bind_address: SocketAddr,
    pub interactive_mode: bool,
    pub log_config: String,
}

impl AppConfig {
    /// Reads the configuration from the process environment. Call `dotenv()` first
    /// to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = var("OPENAI_API_KEY").ok_or_else(|| anyhow!("OPENAI_API_KEY not set"))?;

        let openai = OpenAiConfig {
            api_key,
            base_url: var("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            chat_model: var("OPENAI_CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
        };

        let firestore = var("FIREBASE_PROJECT_ID").map(|project_id| FirestoreConfig {
            base_url: var("FIRESTORE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FIRESTORE_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            project_id,
            api_key: var("FIREBASE_API_KEY"),
            collection: var("HISTORY_COLLECTION")
                .unwrap_or_else(|| DEFAULT_HISTORY_COLLECTION.to_string()),
        });

        let bind_address = var("BIND_ADDRESS")
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_address
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid BIND_ADDRESS: {}", bind_address))?;

        let interactive_mode = var("INTERACTIVE_MODE")
            .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(AppConfig {
            openai,
            firestore,
            bind_address,
            interactive_mode,
            log_config: var("LOG_CONFIG").unwrap_or_else(|| DEFAULT_LOG_CONFIG.to_string()),
        })
    }
}
