use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_TEXT_MODEL: &str = "mixtral-8x7b-32768";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub common: core_config::Config,
    pub groq: GroqConfig,
}

/// Upstream provider settings.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// Never required at startup; requests fail individually while unset.
    pub api_key: Option<Secret<String>>,
    pub base_url: String,
    pub model: String,
    /// Client-wide request timeout. `None` keeps the HTTP client's default.
    pub timeout_secs: Option<u64>,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            model: DEFAULT_TEXT_MODEL.to_string(),
            timeout_secs: None,
        }
    }
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Builds the service settings from an arbitrary variable source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()) == "prod";

        let api_key = lookup("GROQ_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(Secret::new);

        let timeout_secs = lookup("GROQ_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "GROQ_TIMEOUT_SECS must be a whole number of seconds, got '{}': {}",
                        raw,
                        e
                    ))
                })
            })
            .transpose()?;

        Ok(GatewayConfig {
            common,
            groq: GroqConfig {
                api_key,
                base_url: get_env(&lookup, "GROQ_BASE_URL", Some(DEFAULT_GROQ_BASE_URL), is_prod)?,
                model: get_env(&lookup, "GENAI_TEXT_MODEL", Some(DEFAULT_TEXT_MODEL), is_prod)?,
                timeout_secs,
            },
        })
    }
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
