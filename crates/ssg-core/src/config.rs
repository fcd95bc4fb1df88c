use std::{env, fs, path::Path, time::Duration};

use crate::{
    dispatcher::RetryPolicy,
    errors::Error,
    router::{RouterConfig, DEFAULT_AI_MARKER, DEFAULT_BRAND_NAME, DEFAULT_FALLBACK_REPLY},
    Result,
};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Typed configuration for the gateway, read from the environment.
#[derive(Clone, Debug)]
pub struct Config {
    // Transport
    pub telegram_bot_token: String,
    pub event_queue_capacity: usize,

    // AI
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub ai_timeout: Option<Duration>,

    // Routing
    pub ai_marker: String,
    pub brand_name: String,

    // Outbound delivery
    pub send_max_attempts: u32,
    pub send_retry_delay: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process env in `load`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Required
        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
        })?;
        let gemini_api_key = get("GEMINI_API_KEY")
            .or_else(|| get("GOOGLE_API_KEY"))
            .ok_or_else(|| {
                Error::Config("GEMINI_API_KEY (or GOOGLE_API_KEY) is required".to_string())
            })?;

        let gemini_model = get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
        let gemini_base_url = get("GEMINI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        // 0 disables the timeout.
        let ai_timeout = match parse_u64(get("AI_TIMEOUT_MS")).unwrap_or(60_000) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        let ai_marker = get("AI_MARKER")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_AI_MARKER.to_string());
        let brand_name = get("BRAND_NAME").unwrap_or_else(|| DEFAULT_BRAND_NAME.to_string());

        let send_max_attempts = parse_u64(get("SEND_MAX_ATTEMPTS"))
            .unwrap_or(3)
            .clamp(1, u32::MAX as u64) as u32;
        let send_retry_delay =
            Duration::from_millis(parse_u64(get("SEND_RETRY_DELAY_MS")).unwrap_or(1000));

        let event_queue_capacity = parse_u64(get("EVENT_QUEUE_CAPACITY"))
            .unwrap_or(64)
            .max(1) as usize;

        Ok(Self {
            telegram_bot_token,
            event_queue_capacity,
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            ai_timeout,
            ai_marker,
            brand_name,
            send_max_attempts,
            send_retry_delay,
        })
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            ai_marker: self.ai_marker.clone(),
            brand_name: self.brand_name.clone(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
            ai_timeout: self.ai_timeout,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.send_max_attempts,
            delay: self.send_retry_delay,
        }
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = &val[1..val.len() - 1];
        }

        out.push((key.to_string(), val.to_string()));
    }
    out
}

fn parse_u64(v: Option<String>) -> Option<u64> {
    v.and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
