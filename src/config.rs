use std::str::FromStr;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://app.db";
const DEFAULT_API_BASE_URL: &str = "https://www.kamwaalay.com/api";
const DEFAULT_OTP_TTL_SECS: i64 = 600;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub api_base_url: String,
    pub otp_ttl_secs: i64,
    /// Return issued codes in the login response. No SMS gateway is wired
    /// up, so this is how development clients get their code.
    pub echo_otp: bool,
}

impl Config {
    /// Reads settings from the environment, falling back to defaults for
    /// anything missing or unparsable.
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            api_base_url: std::env::var("API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            otp_ttl_secs: env_parse("OTP_TTL_SECS", DEFAULT_OTP_TTL_SECS),
            echo_otp: env_parse("OTP_ECHO", false),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            otp_ttl_secs: DEFAULT_OTP_TTL_SECS,
            echo_otp: false,
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "unparsable setting, using default");
            default
        }),
        Err(_) => default,
    }
}
