//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.charla/config.json`) and
//! environment. Secrets (WhatsApp access token, verify token, responder API
//! key) are never hard-coded; env variables override the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// WhatsApp Cloud API settings (tokens, phone number id).
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Chat-completion responder settings.
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Event log storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Router keyword lists.
    #[serde(default)]
    pub router: RouterConfig,
}

/// Gateway bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the webhook HTTP server (default 8080).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1"). Non-loopback binds require a
    /// configured verify token.
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// WhatsApp Cloud API config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppConfig {
    /// Graph API bearer token. Overridden by WHATSAPP_ACCESS_TOKEN env when set.
    pub access_token: Option<String>,
    /// Sender phone number id (the path segment of /{id}/messages).
    pub phone_number_id: Option<String>,
    /// Shared secret echoed back during the webhook subscription handshake.
    /// Overridden by WHATSAPP_VERIFY_TOKEN env when set.
    pub verify_token: Option<String>,
    /// Graph API base URL (default "https://graph.facebook.com").
    pub api_base: Option<String>,
    /// Graph API version segment (default "v21.0").
    pub api_version: Option<String>,
}

/// Chat-completion responder config (OpenAI-compatible endpoint).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponderConfig {
    /// API key. Overridden by OPENAI_API_KEY env when set.
    pub api_key: Option<String>,
    /// Model name (default "gpt-3.5-turbo").
    pub model: Option<String>,
    /// Completion token cap (default 150).
    pub max_tokens: Option<u32>,
    /// Base URL (default "https://api.openai.com").
    pub api_base: Option<String>,
}

/// Event log storage config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// SQLite database path (default ~/.charla/charla.db).
    pub db_path: Option<PathBuf>,
}

/// Router keyword lists. The query keyword set is configuration, not
/// hard-coded vocabulary; the interpreter's own SHOW/ADD sets are fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    /// Substring keywords that send a message to the record-query interpreter.
    #[serde(default = "default_query_keywords")]
    pub query_keywords: Vec<String>,

    /// Substring keywords that trigger the static welcome reply.
    #[serde(default = "default_greeting_keywords")]
    pub greeting_keywords: Vec<String>,
}

fn default_query_keywords() -> Vec<String> {
    ["mostrar", "ver", "buscar", "muestra", "dime", "agregar", "añadir", "crear"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_greeting_keywords() -> Vec<String> {
    vec!["hola".to_string()]
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            query_keywords: default_query_keywords(),
            greeting_keywords: default_greeting_keywords(),
        }
    }
}

/// Resolve the Graph API access token: env WHATSAPP_ACCESS_TOKEN overrides config.
pub fn resolve_access_token(config: &Config) -> Option<String> {
    env_or("WHATSAPP_ACCESS_TOKEN", config.whatsapp.access_token.as_deref())
}

/// Resolve the webhook verify token: env WHATSAPP_VERIFY_TOKEN overrides config.
pub fn resolve_verify_token(config: &Config) -> Option<String> {
    env_or("WHATSAPP_VERIFY_TOKEN", config.whatsapp.verify_token.as_deref())
}

/// Resolve the responder API key: env OPENAI_API_KEY overrides config.
pub fn resolve_responder_key(config: &Config) -> Option<String> {
    env_or("OPENAI_API_KEY", config.responder.api_key.as_deref())
}

fn env_or(var: &str, fallback: Option<&str>) -> Option<String> {
    std::env::var(var)
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            fallback
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("CHARLA_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".charla").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Resolve the SQLite event log path: config override or ~/.charla/charla.db.
pub fn resolve_db_path(config: &Config) -> PathBuf {
    config.storage.db_path.clone().unwrap_or_else(|| {
        dirs::home_dir()
            .map(|h| h.join(".charla").join("charla.db"))
            .unwrap_or_else(|| PathBuf::from("charla.db"))
    })
}

/// Load config from the default path (or CHARLA_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gateway_port_and_bind() {
        let g = GatewayConfig::default();
        assert_eq!(g.port, 8080);
        assert_eq!(g.bind, "127.0.0.1");
    }

    #[test]
    fn default_query_keywords_cover_show_and_add() {
        let r = RouterConfig::default();
        for kw in ["mostrar", "ver", "agregar", "añadir"] {
            assert!(r.query_keywords.iter().any(|k| k == kw), "missing {}", kw);
        }
    }

    #[test]
    fn empty_config_json_parses_to_defaults() {
        let config: Config = serde_json::from_str("{}").expect("parse empty config");
        assert_eq!(config.gateway.port, 8080);
        assert!(config.whatsapp.access_token.is_none());
        assert_eq!(config.router.greeting_keywords, vec!["hola"]);
    }

    #[test]
    fn camel_case_fields_parse() {
        let config: Config = serde_json::from_str(
            r#"{
                "whatsapp": { "phoneNumberId": "123", "verifyToken": "secret" },
                "responder": { "maxTokens": 200 },
                "storage": { "dbPath": "/tmp/test.db" }
            }"#,
        )
        .expect("parse config");
        assert_eq!(config.whatsapp.phone_number_id.as_deref(), Some("123"));
        assert_eq!(config.whatsapp.verify_token.as_deref(), Some("secret"));
        assert_eq!(config.responder.max_tokens, Some(200));
        assert_eq!(resolve_db_path(&config), PathBuf::from("/tmp/test.db"));
    }

    #[test]
    fn loopback_bind_detection() {
        assert!(is_loopback_bind("127.0.0.1"));
        assert!(is_loopback_bind(" localhost "));
        assert!(!is_loopback_bind("0.0.0.0"));
    }
}
