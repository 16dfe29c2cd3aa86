use std::env;
use std::time::Duration;

use crate::shared::constants::{ENHANCE_RATE_LIMIT, PROXY_RATE_LIMIT, RATE_LIMIT_WINDOW_SECS};

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub identity: IdentityConfig,
    pub openai: OpenAiConfig,
    pub github: GithubConfig,
    pub rate_limit: RateLimitConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub debug_mode: bool,
}

/// Identity service (OAuth provider backend) used to verify session tokens
/// and look up linked provider credentials.
///
/// The secrets are optional on purpose: a missing value degrades every
/// request that needs it to a 500 configuration error instead of preventing
/// the process from starting.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub base_url: Option<String>,
    pub service_key: Option<String>,
    pub anon_key: Option<String>,
    pub request_timeout: Duration,
}

/// Completion API used for AI release-note enhancement.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub request_timeout: Duration,
}

/// GitHub REST API reached through the proxy endpoint.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per window for the AI enhancement endpoint
    pub enhance_limit: u32,
    /// Requests per window for the GitHub proxy endpoints
    pub proxy_limit: u32,
    pub window_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            identity: IdentityConfig::from_env()?,
            openai: OpenAiConfig::from_env()?,
            github: GithubConfig::from_env()?,
            rate_limit: RateLimitConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string.
        // "*" means mirror the request origin (credentialed CORS).
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let debug_mode = env::var("DEBUG_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            debug_mode,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl IdentityConfig {
    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("IDENTITY_SERVICE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| s.trim_end_matches('/').to_string());
        let service_key = env::var("IDENTITY_SERVICE_KEY").ok().filter(|s| !s.is_empty());
        let anon_key = env::var("IDENTITY_ANON_KEY").ok().filter(|s| !s.is_empty());

        Ok(Self {
            base_url,
            service_key,
            anon_key,
            request_timeout: external_request_timeout()?,
        })
    }
}

impl OpenAiConfig {
    const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty());
        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = env::var("OPENAI_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            base_url,
            model,
            request_timeout: external_request_timeout()?,
        })
    }
}

impl GithubConfig {
    const DEFAULT_BASE_URL: &'static str = "https://api.github.com";

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("GITHUB_API_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            base_url,
            request_timeout: external_request_timeout()?,
        })
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Result<Self, String> {
        let enhance_limit = env::var("RATE_LIMIT_ENHANCE")
            .unwrap_or_else(|_| ENHANCE_RATE_LIMIT.to_string())
            .parse::<u32>()
            .map_err(|_| "RATE_LIMIT_ENHANCE must be a valid number".to_string())?;

        let proxy_limit = env::var("RATE_LIMIT_PROXY")
            .unwrap_or_else(|_| PROXY_RATE_LIMIT.to_string())
            .parse::<u32>()
            .map_err(|_| "RATE_LIMIT_PROXY must be a valid number".to_string())?;

        let window_secs = env::var("RATE_LIMIT_WINDOW_SECS")
            .unwrap_or_else(|_| RATE_LIMIT_WINDOW_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "RATE_LIMIT_WINDOW_SECS must be a valid number".to_string())?;

        Ok(Self {
            enhance_limit,
            proxy_limit,
            window_secs,
        })
    }

    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_secs as i64)
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Relnotes API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Release notes backend: GitHub proxy and AI enhancement".to_string()
        });

        Ok(Self {
            title,
            version,
            description,
        })
    }
}

const DEFAULT_EXTERNAL_TIMEOUT_SECS: u64 = 30;

/// Shared bounded timeout applied to every upstream HTTP client.
fn external_request_timeout() -> Result<Duration, String> {
    let secs = env::var("EXTERNAL_TIMEOUT_SECS")
        .unwrap_or_else(|_| DEFAULT_EXTERNAL_TIMEOUT_SECS.to_string())
        .parse::<u64>()
        .map_err(|_| "EXTERNAL_TIMEOUT_SECS must be a valid number".to_string())?;
    Ok(Duration::from_secs(secs))
}
